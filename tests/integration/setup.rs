use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wp_migrate::config::{ConfigManager, EnvSnapshot, REDACTION_MARKER};
use wp_migrate::logger::ErrorLogger;
use wp_migrate::{client_config_for_site, ResilientClient};

use crate::common::{logger_config, manager_for, site_document};

#[test]
fn template_then_env_then_validation() {
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [
        ("WP_POLYTHING_CO_UK_USERNAME", "editor"),
        ("WP_POLYTHING_CO_UK_PASSWORD", "abcd efgh ijkl mnop"),
        ("WP_EXAMPLE_COM_API_KEY", "0123456789abcdef"),
    ]
    .into_iter()
    .collect();
    let manager = ConfigManager::new(dir.path().join("config/wordpress.json")).with_env(env);

    assert!(manager.create_config_from_template().unwrap());
    assert!(!manager.create_config_from_template().unwrap());

    let resolved = manager.resolved_config();
    assert!(manager.validate_config(&resolved).valid);

    let masked = serde_json::to_string(&manager.mask_sensitive_data(&resolved)).unwrap();
    assert!(!masked.contains("abcd efgh ijkl mnop"));
    assert!(!masked.contains("0123456789abcdef"));
    assert!(masked.contains(REDACTION_MARKER));
    assert!(masked.contains("\"username\":\"editor\""));

    // the file on disk never received the secrets
    let on_disk = std::fs::read_to_string(manager.path()).unwrap();
    assert!(!on_disk.contains("abcd efgh ijkl mnop"));
}

#[tokio::test]
async fn health_checks_report_instead_of_failing() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/healthy/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut doc = site_document(&format!("{}/healthy", mock_server.uri()));
    doc["sites"]["broken.example"] = json!({
        "url": "https://broken.example",
        "apiBase": format!("{}/broken", mock_server.uri()),
        "testEndpoint": "/posts"
    });
    let manager = manager_for(dir.path(), &doc, EnvSnapshot::empty());
    let resolved = manager.resolved_config();

    let mut logger = ErrorLogger::new(logger_config(dir.path()));
    logger.initialize().await;

    let mut healthy = Vec::new();
    for (domain, site) in &resolved.sites {
        let client = ResilientClient::new(
            client_config_for_site(site, resolved.export.as_ref()).unwrap(),
        )
        .unwrap();
        let endpoint = site.test_endpoint.as_deref().unwrap_or("");
        let health = client.health_check(endpoint).await;
        if !health.healthy {
            logger
                .log_api_error(endpoint, &health.detail, health.status)
                .await;
        }
        healthy.push((domain.clone(), health.healthy, health.status));
    }

    assert_eq!(
        healthy,
        vec![
            ("broken.example".to_string(), false, Some(503)),
            ("polything.co.uk".to_string(), true, Some(200)),
        ]
    );
    assert_eq!(logger.get_error_stats().api, 1);
    assert!(logger
        .generate_error_summary()
        .contains("1 errors encountered"));
}
