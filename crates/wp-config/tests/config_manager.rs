//! File and environment behavior of `ConfigManager`, isolated in temp dirs.

use std::path::Path;

use serde_json::{json, Value};
use wp_migrate_config::{
    ConfigDocument, ConfigManager, EnvSnapshot, ErrorKind, REDACTION_MARKER,
};

fn write_json(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn polything_only() -> Value {
    json!({
        "sites": {
            "polything.co.uk": {
                "url": "https://polything.co.uk",
                "apiBase": "https://polything.co.uk/wp-json/wp/v2",
                "testEndpoint": "/posts?per_page=1",
                "contentTypes": ["posts", "pages", "case-studies"],
                "testData": {"posts": [5307], "pages": ["about"]},
                "username": "editor",
                "locale": "en-GB"
            }
        },
        "export": {
            "outputDir": "./content",
            "mediaDir": "./public/images",
            "batchSize": 25,
            "retryAttempts": 5,
            "retryDelay": 250,
            "timeout": 15000
        },
        "schemaVersion": 3
    })
}

fn manager(dir: &tempfile::TempDir, env: EnvSnapshot) -> ConfigManager {
    ConfigManager::new(dir.path().join("config/wordpress.json")).with_env(env)
}

#[test]
fn missing_file_loads_as_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());

    let doc = manager.load_config();
    assert!(doc.is_empty());
    assert!(manager.list_sites().is_empty());
}

#[test]
fn malformed_file_loads_as_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    std::fs::create_dir_all(manager.path().parent().unwrap()).unwrap();
    std::fs::write(manager.path(), "{\"sites\": [").unwrap();

    assert_eq!(manager.load_config(), ConfigDocument::default());
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("a/b/c/wordpress.json"))
        .with_env(EnvSnapshot::empty());

    manager
        .save_config(&manager.generate_default_config())
        .unwrap();
    assert!(manager.path().is_file());
    assert_eq!(manager.list_sites(), vec!["example.com", "polything.co.uk"]);
}

#[test]
fn save_of_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    let original = polything_only();
    write_json(manager.path(), &original);

    manager.save_config(&manager.load_config()).unwrap();

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(manager.path()).unwrap()).unwrap();
    assert_eq!(written, original);
}

#[test]
fn partial_sections_round_trip_without_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    let original = json!({
        "sites": {
            "polything.co.uk": {
                "url": "https://polything.co.uk",
                "apiBase": "https://polything.co.uk/wp-json/wp/v2",
                "username": "editor",
                "password": null
            }
        },
        "export": {"outputDir": "./out"},
        "fieldMapping": {"hero": {"video": ["acf_video"]}},
        "logging": {"level": "debug"}
    });
    write_json(manager.path(), &original);

    let doc = manager.load_config();
    let export = doc.export_or_default();
    assert_eq!(export.output_dir(), Path::new("./out"));
    assert_eq!(export.batch_size(), 10);
    assert_eq!(doc.logging_or_default().max_files(), 5);

    manager.save_config(&doc).unwrap();
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(manager.path()).unwrap()).unwrap();
    assert_eq!(written, original);
}

#[test]
fn mistyped_section_does_not_hide_sites() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    let mut original = polything_only();
    original["export"]["batchSize"] = json!("25");
    write_json(manager.path(), &original);

    assert_eq!(manager.list_sites(), vec!["polything.co.uk"]);
    let doc = manager.load_config();
    assert!(doc.export.is_none());
    assert_eq!(doc.export_or_default().batch_size(), 10);

    // the bad section is written back as it was
    manager.save_config(&doc).unwrap();
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(manager.path()).unwrap()).unwrap();
    assert_eq!(written, original);
}

#[test]
fn mistyped_site_record_skips_only_that_site() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    let mut original = polything_only();
    original["sites"]["example.com"] = json!({
        "url": "https://example.com",
        "apiBase": "https://example.com/wp-json/wp/v2",
        "testData": {"posts": {"id": 1}}
    });
    write_json(manager.path(), &original);

    assert_eq!(manager.list_sites(), vec!["polything.co.uk"]);
    assert_eq!(manager.get_export_config("polything.co.uk").unwrap().export.batch_size(), 25);
}

#[test]
fn non_object_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    write_json(manager.path(), &json!([1, 2, 3]));

    let err = manager.try_load_config().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Json(_)));
    assert!(manager.load_config().is_empty());
}

#[test]
fn merge_without_matching_vars_is_identity() {
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [("HOME", "/root"), ("PATH", "/usr/bin"), ("WPX_A_URL", "x")]
        .into_iter()
        .collect();
    let manager = manager(&dir, env);
    write_json(manager.path(), &polything_only());

    let doc = manager.load_config();
    let merged = manager.merge_env_vars(&doc);
    assert_eq!(merged, doc);
}

#[test]
fn empty_env_values_never_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [
        ("WP_POLYTHING_CO_UK_USERNAME", ""),
        ("WP_POLYTHING_CO_UK_API_BASE", ""),
    ]
    .into_iter()
    .collect();
    let manager = manager(&dir, env);
    write_json(manager.path(), &polything_only());

    let site = manager.get_site_config("polything.co.uk").unwrap();
    assert_eq!(site.username.as_deref(), Some("editor"));
    assert_eq!(site.api_base, "https://polything.co.uk/wp-json/wp/v2");
}

#[test]
fn env_overrides_reach_dotted_site_keys() {
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [
        ("WP_POLYTHING_CO_UK_PASSWORD", "abcd efgh ijkl mnop"),
        ("WP_POLYTHING_CO_UK_API_KEY", "0123456789abcdef0123"),
    ]
    .into_iter()
    .collect();
    let manager = manager(&dir, env);
    write_json(manager.path(), &polything_only());

    let doc = manager.load_config();
    let merged = manager.merge_env_vars(&doc);

    let site = &merged.sites["polything.co.uk"];
    assert_eq!(site.password.as_deref(), Some("abcd efgh ijkl mnop"));
    assert_eq!(site.api_key.as_deref(), Some("0123456789abcdef0123"));
    // the loaded document is untouched
    assert!(doc.sites["polything.co.uk"].password.is_none());
}

#[test]
fn env_site_key_without_tld_does_not_reach_file_site() {
    // `WP_POLYTHING_PASSWORD` normalizes to `polything`, which is a different
    // key from the file's `polything.co.uk`. A new, incomplete site appears.
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [("WP_POLYTHING_PASSWORD", "abcd efgh ijkl mnop")]
        .into_iter()
        .collect();
    let manager = manager(&dir, env);
    write_json(manager.path(), &polything_only());

    assert_eq!(manager.list_sites(), vec!["polything", "polything.co.uk"]);
    assert!(manager
        .get_site_config("polything.co.uk")
        .unwrap()
        .password
        .is_none());

    let stray = manager.get_site_config("polything").unwrap();
    assert_eq!(stray.password.as_deref(), Some("abcd efgh ijkl mnop"));
    assert!(!manager.validate_site_config(&stray).valid);
}

#[test]
fn custom_prefix_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [
        ("CMS_POLYTHING_CO_UK_TOKEN", "tok"),
        ("WP_POLYTHING_CO_UK_TOKEN", "ignored"),
    ]
    .into_iter()
    .collect();
    let manager = manager(&dir, env).with_env_prefix("CMS_");
    write_json(manager.path(), &polything_only());

    let site = manager.get_site_config("polything.co.uk").unwrap();
    assert_eq!(site.token.as_deref(), Some("tok"));
}

#[test]
fn missing_site_lookup_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    write_json(manager.path(), &polything_only());

    assert!(manager.get_site_config("missing.example").is_none());
}

#[test]
fn export_and_media_accessors() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());
    write_json(manager.path(), &polything_only());

    let export = manager.get_export_config("polything.co.uk").unwrap();
    assert_eq!(export.domain, "polything.co.uk");
    assert_eq!(export.export.batch_size(), 25);
    // no fieldMapping section in the file
    assert!(export.field_mapping.hero().contains_key("video"));

    let media = manager.get_media_config("polything.co.uk").unwrap();
    assert_eq!(media.site_url, "https://polything.co.uk");
    assert_eq!(media.retry_attempts, 5);
    assert_eq!(media.timeout, std::time::Duration::from_secs(15));

    let err = manager.get_export_config("missing.example").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SiteNotFound(ref d) if d == "missing.example"));
    assert!(manager
        .get_media_config("missing.example")
        .unwrap_err()
        .is_site_not_found());
}

#[test]
fn template_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(&dir, EnvSnapshot::empty());

    assert!(manager.create_config_from_template().unwrap());

    write_json(manager.path(), &polything_only());
    assert!(!manager.create_config_from_template().unwrap());
    // the existing file was kept
    assert_eq!(manager.list_sites(), vec!["polything.co.uk"]);
}

#[test]
fn masking_hides_merged_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let password = "abcd efgh ijkl mnop";
    let api_key = "0123456789abcdef0123";
    let env: EnvSnapshot = [
        ("WP_POLYTHING_CO_UK_PASSWORD", password),
        ("WP_POLYTHING_CO_UK_API_KEY", api_key),
    ]
    .into_iter()
    .collect();
    let manager = manager(&dir, env);
    write_json(manager.path(), &polything_only());

    let masked = manager.mask_sensitive_data(&manager.resolved_config());
    let printed = serde_json::to_string(&masked).unwrap();
    assert!(!printed.contains(password));
    assert!(!printed.contains(api_key));
    assert!(printed.contains(REDACTION_MARKER));

    let site = &masked.sites["polything.co.uk"];
    assert_eq!(site.username.as_deref(), Some("editor"));
}

#[test]
fn validate_config_reports_per_domain() {
    let dir = tempfile::tempdir().unwrap();
    let env: EnvSnapshot = [("WP_POLYTHING_CO_UK_PASSWORD", "short")]
        .into_iter()
        .collect();
    let manager = manager(&dir, env);
    write_json(manager.path(), &polything_only());

    let report = manager.validate_config(&manager.resolved_config());
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("polything.co.uk: Password"));

    let err = report.into_result().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation(ref msgs) if msgs.len() == 1));
}
