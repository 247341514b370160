//! Starter configuration written by `create_config_from_template`.

use std::collections::BTreeMap;

use crate::document::{
    ConfigDocument, ExportSettings, FieldMapping, LoggingSettings, SiteConfig, TestId,
};

fn site(domain: &str, test_endpoint: &str, test_data: &[(&str, Vec<TestId>)]) -> SiteConfig {
    SiteConfig {
        url: format!("https://{domain}"),
        api_base: format!("https://{domain}/wp-json/wp/v2"),
        test_endpoint: Some(test_endpoint.to_string()),
        content_types: Some(vec!["posts".into(), "pages".into()]),
        test_data: Some(
            test_data
                .iter()
                .map(|(kind, ids)| (kind.to_string(), ids.clone()))
                .collect::<BTreeMap<_, _>>(),
        ),
        ..Default::default()
    }
}

/// The template document: two example sites and default sections.
///
/// Credentials are left out; they are expected from the environment.
pub fn generate_default_config() -> ConfigDocument {
    let mut sites = BTreeMap::new();
    sites.insert(
        "polything.co.uk".to_string(),
        site(
            "polything.co.uk",
            "/posts?per_page=1",
            &[
                ("posts", vec![TestId::Id(5307)]),
                ("pages", vec![TestId::Id(10)]),
            ],
        ),
    );
    sites.insert(
        "example.com".to_string(),
        site(
            "example.com",
            "/posts?per_page=1",
            &[("posts", vec![TestId::Slug("hello-world".into())])],
        ),
    );

    ConfigDocument {
        sites,
        export: Some(ExportSettings::explicit_defaults()),
        field_mapping: Some(FieldMapping::explicit_defaults()),
        logging: Some(LoggingSettings::explicit_defaults()),
        extra: Default::default(),
    }
}
