use std::path::Path;

use serde_json::{json, Value};
use wp_migrate::config::{ConfigManager, EnvSnapshot};
use wp_migrate::logger::LoggerConfig;
use wp_migrate::LogLevel;

/// Configuration document with one site whose API lives on `api_base`.
pub fn site_document(api_base: &str) -> Value {
    json!({
        "sites": {
            "polything.co.uk": {
                "url": "https://polything.co.uk",
                "apiBase": api_base,
                "testEndpoint": "/posts?per_page=1",
                "contentTypes": ["posts", "pages"],
                "username": "editor"
            }
        },
        "export": {
            "retryAttempts": 3,
            "retryDelay": 20,
            "timeout": 2000
        },
        "logging": {
            "level": "debug",
            "console": false
        }
    })
}

/// Write `doc` under `dir` and return a manager reading it with `env`.
pub fn manager_for(dir: &Path, doc: &Value, env: EnvSnapshot) -> ConfigManager {
    let path = dir.join("config/wordpress.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
    ConfigManager::new(path).with_env(env)
}

/// Quiet logger writing under `dir/logs`.
pub fn logger_config(dir: &Path) -> LoggerConfig {
    LoggerConfig::default()
        .with_log_dir(dir.join("logs"))
        .with_level(LogLevel::Debug)
        .with_console(false)
}
