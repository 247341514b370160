//! One-time setup check before running a content migration.
//!
//! Creates `config/wordpress.json` from the template if it is missing,
//! merges `WP_<SITE>_<FIELD>` environment overrides, validates every site and
//! pings each site's diagnostic endpoint. Safe to re-run.
//!
//! ```sh
//! export WP_POLYTHING_CO_UK_USERNAME='editor'
//! export WP_POLYTHING_CO_UK_PASSWORD='abcd efgh ijkl mnop'
//! cargo run --bin migrate-setup -- ./config/wordpress.json
//! ```

use tracing_subscriber::EnvFilter;
use wp_migrate::config::{ConfigManager, EnvSnapshot, DEFAULT_CONFIG_PATH};
use wp_migrate::logger::{ErrorLogger, DEFAULT_SUMMARY_PATH};
use wp_migrate::{client_config_for_site, logger_config_from, ResilientClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let manager = ConfigManager::new(&path).with_env(EnvSnapshot::capture());

    println!("Checking migration setup ({path})...\n");

    // 1. Make sure a configuration file exists
    match manager.create_config_from_template() {
        Ok(true) => println!("  Created {path} from template; fill in your sites and re-run."),
        Ok(false) => println!("  Using existing {path}"),
        Err(e) => {
            eprintln!("Error: Failed to write configuration template: {e}");
            std::process::exit(1);
        }
    }

    // 2. Load strictly, so parse errors are reported instead of ignored
    let doc = match manager.try_load_config() {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            eprintln!("Error: {path} disappeared while loading");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: Failed to parse {path}: {e}");
            std::process::exit(1);
        }
    };
    let resolved = manager.merge_env_vars(&doc);

    let masked = manager.mask_sensitive_data(&resolved);
    match serde_json::to_string_pretty(&masked) {
        Ok(json) => println!("\n{json}\n"),
        Err(e) => eprintln!("Warning: Failed to render configuration: {e}"),
    }

    // 3. Validate
    let report = manager.validate_config(&resolved);
    if !report.valid {
        eprintln!("Configuration is invalid:");
        for message in &report.errors {
            eprintln!("  - {message}");
        }
        std::process::exit(1);
    }
    println!("  Configuration valid ({} sites)", resolved.sites.len());

    // 4. Ping every site
    let mut logger = ErrorLogger::new(logger_config_from(&resolved.logging_or_default()));
    logger.initialize().await;

    let export = resolved.export_or_default();
    for (domain, site) in &resolved.sites {
        let endpoint = site.test_endpoint.as_deref().unwrap_or("");
        print!("  Checking {domain}... ");

        let client = match client_config_for_site(site, Some(&export))
            .map_err(|e| e.to_string())
            .and_then(|config| ResilientClient::new(config).map_err(|e| e.to_string()))
        {
            Ok(client) => client,
            Err(e) => {
                println!("skipped ({e})");
                logger.log_api_error(endpoint, &e, None).await;
                continue;
            }
        };

        let health = client.health_check(endpoint).await;
        if health.healthy {
            println!("ok ({} ms)", health.elapsed.as_millis());
        } else {
            println!("FAILED: {}", health.detail);
            logger
                .log_api_error(endpoint, &health.detail, health.status)
                .await;
        }
    }

    // 5. Summary
    let stats = logger.get_error_stats();
    if let Err(e) = logger.save_error_summary(DEFAULT_SUMMARY_PATH).await {
        eprintln!("Warning: Failed to write {DEFAULT_SUMMARY_PATH}: {e}");
    }

    if stats.total == 0 {
        println!("\nSetup complete. All sites reachable.");
    } else {
        println!(
            "\nSetup complete with {} unreachable sites. See {DEFAULT_SUMMARY_PATH}.",
            stats.total
        );
    }
}
