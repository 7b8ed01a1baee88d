//! Registry client tests against a mock registry

use super::*;
use crate::mods::manifest::MANIFEST_FILE;
use serde_json::json;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const PACKAGE_PATH: &str = "/api/experimental/package/Evaisa/LethalLib/";

fn test_config(server: &MockServer) -> RegistryConfig {
    RegistryConfig {
        base_url: server.uri(),
        retry_delay: Duration::from_millis(10),
        max_attempts: 3,
        ..RegistryConfig::default()
    }
}

fn package_body(version: &str) -> serde_json::Value {
    json!({
        "name": "LethalLib",
        "owner": "Evaisa",
        "latest": {
            "version_number": version,
            "download_url": format!("https://thunderstore.io/package/download/Evaisa/LethalLib/{}/", version),
            "dependencies": []
        }
    })
}

async fn mount_package(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path(PACKAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_body(version)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_package() {
    let server = MockServer::start().await;
    mount_package(&server, "0.15.0").await;

    let client = RegistryClient::new(test_config(&server)).unwrap();
    let package = client.fetch_package("Evaisa", "LethalLib").await.unwrap();

    assert_eq!(package.version_number, "0.15.0");
    assert!(package.download_url.ends_with("/Evaisa/LethalLib/0.15.0/"));
}

#[tokio::test]
async fn test_transient_status_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PACKAGE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_package(&server, "0.15.0").await;

    let client = RegistryClient::new(test_config(&server)).unwrap();
    let package = client.fetch_package("Evaisa", "LethalLib").await.unwrap();

    assert_eq!(package.version_number, "0.15.0");
}

#[tokio::test]
async fn test_retries_are_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PACKAGE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = RegistryClient::new(test_config(&server)).unwrap();
    let result = client.fetch_package("Evaisa", "LethalLib").await;

    match result {
        Err(ModError::RetriesExhausted { attempts, last_error, .. }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("500"));
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_response_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PACKAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::new(test_config(&server)).unwrap();
    let result = client.fetch_package("Evaisa", "LethalLib").await;

    assert!(matches!(result, Err(ModError::MalformedResponse { .. })));
}

#[tokio::test]
async fn test_connection_refused_exhausts_retries() {
    let config = RegistryConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        retry_delay: Duration::from_millis(1),
        max_attempts: 2,
        ..RegistryConfig::default()
    };

    let client = RegistryClient::new(config).unwrap();
    let result = client.fetch_package("Evaisa", "LethalLib").await;

    assert!(matches!(result, Err(ModError::RetriesExhausted { attempts: 2, .. })));
}

#[cfg(test)]
mod fetch_info_tests {
    use super::*;

    async fn fetch_with_local(local: Option<&str>, latest: &str) -> Mod {
        let server = MockServer::start().await;
        mount_package(&server, latest).await;

        let dir = tempdir().unwrap();
        let paths = GamePaths::new(dir.path().join("game"), dir.path().join("temp"));
        let mut m = Mod::new("LethalLib", "Evaisa");

        if let Some(contents) = local {
            let folder = m.plugin_folder(&paths);
            tokio::fs::create_dir_all(&folder).await.unwrap();
            tokio::fs::write(folder.join(MANIFEST_FILE), contents).await.unwrap();
        }

        let client = RegistryClient::new(test_config(&server)).unwrap();
        client.fetch_info(&mut m, &paths).await.unwrap();
        m
    }

    #[tokio::test]
    async fn test_same_version_is_up_to_date() {
        let m = fetch_with_local(Some("{\"version_number\": \"1.2.0\"}"), "1.2.0").await;

        assert!(m.is_up_to_date);
        assert_eq!(m.local_version.as_deref(), Some("1.2.0"));
    }

    #[tokio::test]
    async fn test_older_version_needs_install() {
        let m = fetch_with_local(Some("{\"version_number\": \"1.1.0\"}"), "1.2.0").await;

        assert!(!m.is_up_to_date);
        assert_eq!(m.latest_version.as_deref(), Some("1.2.0"));
        assert!(m.is_resolved());
    }

    #[tokio::test]
    async fn test_not_installed_needs_install() {
        let m = fetch_with_local(None, "0.15.0").await;

        assert!(!m.is_up_to_date);
        assert_eq!(m.local_version, None);
        assert!(m.download_url.is_some());
    }

    #[tokio::test]
    async fn test_broken_local_manifest_is_reinstalled() {
        let m = fetch_with_local(Some("not json"), "1.2.0").await;

        assert!(!m.is_up_to_date);
        assert_eq!(m.local_version, None);
    }
}
