use base64::Engine;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wp_migrate::client::RequestDescriptor;
use wp_migrate::config::EnvSnapshot;
use wp_migrate::logger::ErrorLogger;
use wp_migrate::{client_config_for_site, logger_config_from, record_request_failure};
use wp_migrate::{LogLevel, ResilientClient};

use crate::common::{logger_config, manager_for, site_document};

#[tokio::test]
async fn env_credentials_reach_the_wire() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let password = "abcd efgh ijkl mnop";
    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("editor:{password}"))
    );

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(header("authorization", expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5307}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let env: EnvSnapshot = [("WP_POLYTHING_CO_UK_PASSWORD", password)]
        .into_iter()
        .collect();
    let manager = manager_for(
        dir.path(),
        &site_document(&format!("{}/wp-json/wp/v2", mock_server.uri())),
        env,
    );

    let export = manager.get_export_config("polything.co.uk").unwrap();
    let client =
        ResilientClient::new(client_config_for_site(&export.site, Some(&export.export)).unwrap())
            .unwrap();

    let posts: Vec<serde_json::Value> = client.get_json("/posts").await.unwrap();
    assert_eq!(posts[0]["id"], 5307);

    mock_server.verify().await;
}

#[tokio::test]
async fn configured_retries_recover_from_server_errors() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/pages"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(
        dir.path(),
        &site_document(&format!("{}/wp-json/wp/v2", mock_server.uri())),
        EnvSnapshot::empty(),
    );
    let site = manager.get_site_config("polything.co.uk").unwrap();
    let export = manager.load_config().export_or_default();
    let client = ResilientClient::new(client_config_for_site(&site, Some(&export)).unwrap()).unwrap();

    let response = client.get("/pages").await.unwrap();
    assert_eq!(
        response.body().as_json(),
        Some(&json!({"data": "success"}))
    );

    mock_server.verify().await;
}

#[tokio::test]
async fn failures_are_recorded_in_the_logger() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "rest_post_invalid_id",
            "message": "Invalid post ID."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_for(
        dir.path(),
        &site_document(&format!("{}/wp-json/wp/v2", mock_server.uri())),
        EnvSnapshot::empty(),
    );
    let site = manager.get_site_config("polything.co.uk").unwrap();
    let client = ResilientClient::new(client_config_for_site(&site, None).unwrap()).unwrap();

    let mut logger = ErrorLogger::new(logger_config(dir.path()));
    logger.initialize().await;

    let err = client.get("/posts/404").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    record_request_failure(&mut logger, "/posts/404", &err).await;

    assert_eq!(logger.get_error_stats().api, 1);
    let log = std::fs::read_to_string(logger.log_file(LogLevel::Error)).unwrap();
    assert!(log.contains("API request failed: /posts/404"));
    assert!(log.contains("\"status\":404"));
    assert!(log.contains("Request failed: 404 Not Found"));
}

#[tokio::test]
async fn batch_failures_feed_the_summary() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    for id in [1, 2, 4] {
        Mock::given(method("GET"))
            .and(path(format!("/wp-json/wp/v2/posts/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id})))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts/3"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let manager = manager_for(
        dir.path(),
        &site_document(&format!("{}/wp-json/wp/v2", mock_server.uri())),
        EnvSnapshot::empty(),
    );
    let doc = manager.resolved_config();
    let client = ResilientClient::new(
        client_config_for_site(&doc.sites["polything.co.uk"], doc.export.as_ref()).unwrap(),
    )
    .unwrap();

    let requests = (1..=4)
        .map(|id| RequestDescriptor::get(format!("/posts/{id}")))
        .collect();
    let outcome = client.batch(requests, 2).await;

    assert_eq!(
        outcome.successes.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![0, 1, 3]
    );
    assert_eq!(outcome.failures.len(), 1);

    let mut logger = ErrorLogger::new(
        logger_config_from(&doc.logging_or_default()).with_log_dir(dir.path().join("logs")),
    );
    logger.initialize().await;
    for failure in &outcome.failures {
        let endpoint = format!("/posts/{}", failure.index + 1);
        record_request_failure(&mut logger, &endpoint, &failure.error).await;
    }

    let summary_path = dir.path().join("error-summary.md");
    logger.save_error_summary(&summary_path).await.unwrap();
    let summary = std::fs::read_to_string(summary_path).unwrap();
    assert!(summary.contains("- API errors: 1"));
    assert!(summary.contains("1 errors encountered"));
}
