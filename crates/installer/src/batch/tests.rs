use super::*;
use crate::config::RegistryConfig;
use crate::mods::manifest::MANIFEST_FILE;
use crate::test_support::zip_bytes;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn manager(server: &MockServer) -> (TempDir, ModManager) {
    let dir = tempdir().unwrap();
    let paths = GamePaths::new(dir.path().join("game"), dir.path().join("temp"));
    let config = ManagerConfig {
        registry: RegistryConfig {
            base_url: server.uri(),
            retry_delay: Duration::from_millis(10),
            max_attempts: 2,
            ..RegistryConfig::default()
        },
        ..ManagerConfig::default()
    };
    (dir, ModManager::new(config, paths).unwrap())
}

/// Serve `author/name` at `version` from the registry, with its archive on the same server
async fn publish(server: &MockServer, author: &str, name: &str, version: &str, archive: Vec<u8>) {
    let download_path = format!("/package/download/{}/{}/{}/", author, name, version);

    Mock::given(method("GET"))
        .and(path(format!("/api/experimental/package/{}/{}/", author, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latest": {
                "version_number": version,
                "download_url": format!("{}{}", server.uri(), download_path),
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(download_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

fn lethallib_archive() -> Vec<u8> {
    zip_bytes(&[
        ("manifest.json", "{\"name\": \"LethalLib\", \"version_number\": \"0.15.0\"}"),
        ("README.md", "# LethalLib"),
        ("LethalLib.dll", "lethallib"),
    ])
}

#[tokio::test]
async fn test_installs_missing_mod() {
    let server = MockServer::start().await;
    publish(&server, "Evaisa", "LethalLib", "0.15.0", lethallib_archive()).await;
    let (_dir, manager) = manager(&server);

    let summary = manager.run(vec![Mod::new("LethalLib", "Evaisa")]).await.unwrap();

    assert_eq!(summary.installed, vec!["LethalLib".to_string()]);
    assert!(summary.up_to_date.is_empty());
    assert!(!summary.has_failures());

    let plugin_folder = manager.paths().mod_folder("Evaisa-LethalLib");
    assert_eq!(
        std::fs::read_to_string(plugin_folder.join("Evaisa-LethalLib/LethalLib.dll")).unwrap(),
        "lethallib"
    );
    assert!(plugin_folder.join(MANIFEST_FILE).is_file());
    assert!(plugin_folder.join("README.md").is_file());
    assert!(!manager.paths().temp_folder.exists());
}

#[tokio::test]
async fn test_second_run_finds_mod_up_to_date() {
    let server = MockServer::start().await;
    publish(&server, "Evaisa", "LethalLib", "0.15.0", lethallib_archive()).await;
    let (_dir, manager) = manager(&server);

    manager.run(vec![Mod::new("LethalLib", "Evaisa")]).await.unwrap();
    let summary = manager.run(vec![Mod::new("LethalLib", "Evaisa")]).await.unwrap();

    assert_eq!(summary.up_to_date, vec!["LethalLib".to_string()]);
    assert!(summary.installed.is_empty());
}

#[tokio::test]
async fn test_up_to_date_mod_is_not_downloaded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Evaisa/LethalLib/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latest": {
                "version_number": "1.2.0",
                "download_url": format!("{}/package/download/Evaisa/LethalLib/1.2.0/", server.uri()),
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/package/download/Evaisa/LethalLib/1.2.0/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, manager) = manager(&server);
    let plugin_folder = manager.paths().mod_folder("Evaisa-LethalLib");
    std::fs::create_dir_all(&plugin_folder).unwrap();
    std::fs::write(plugin_folder.join(MANIFEST_FILE), "{\"version_number\": \"1.2.0\"}").unwrap();

    let summary = manager.run(vec![Mod::new("LethalLib", "Evaisa")]).await.unwrap();

    assert_eq!(summary.up_to_date, vec!["LethalLib".to_string()]);
    assert!(summary.installed.is_empty());
}

#[tokio::test]
async fn test_check_partitions_mods() {
    let server = MockServer::start().await;
    publish(&server, "Evaisa", "LethalLib", "1.2.0", lethallib_archive()).await;
    publish(&server, "Sligili", "More_Emotes", "1.3.3", zip_bytes(&[("MoreEmotes.dll", "x")])).await;
    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Nobody/Broken/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let (_dir, manager) = manager(&server);
    let plugin_folder = manager.paths().mod_folder("Evaisa-LethalLib");
    std::fs::create_dir_all(&plugin_folder).unwrap();
    std::fs::write(plugin_folder.join(MANIFEST_FILE), "{\"version_number\": \"1.2.0\"}").unwrap();

    let outcome = manager
        .check_mods(vec![
            Mod::new("LethalLib", "Evaisa"),
            Mod::new("More_Emotes", "Sligili"),
            Mod::new("Broken", "Nobody"),
        ])
        .await;

    assert_eq!(outcome.up_to_date.len(), 1);
    assert_eq!(outcome.up_to_date[0].name, "LethalLib");
    assert_eq!(outcome.to_install.len(), 1);
    assert_eq!(outcome.to_install[0].name, "More_Emotes");
    assert_eq!(outcome.unresolved.len(), 1);
    assert_eq!(outcome.unresolved[0].name, "Broken");
    assert_eq!(outcome.unresolved[0].stage, Stage::Check);
}

#[tokio::test]
async fn test_unclassifiable_archive_fails_without_state() {
    let server = MockServer::start().await;
    publish(&server, "Someone", "Notes", "1.0.0", zip_bytes(&[("notes.txt", "hello")])).await;
    publish(&server, "Evaisa", "LethalLib", "0.15.0", lethallib_archive()).await;
    let (_dir, manager) = manager(&server);

    let summary = manager
        .run(vec![Mod::new("Notes", "Someone"), Mod::new("LethalLib", "Evaisa")])
        .await
        .unwrap();

    assert_eq!(summary.installed, vec!["LethalLib".to_string()]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "Notes");
    assert_eq!(summary.failed[0].stage, Stage::Install);
    assert!(!manager.paths().mod_folder("Someone-Notes").exists());
}

#[tokio::test]
async fn test_download_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/experimental/package/Evaisa/LethalLib/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latest": {
                "version_number": "0.15.0",
                "download_url": format!("{}/gone/", server.uri()),
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let (_dir, manager) = manager(&server);

    let summary = manager.run(vec![Mod::new("LethalLib", "Evaisa")]).await.unwrap();

    assert!(summary.installed.is_empty());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].stage, Stage::Download);
    assert_eq!(summary.failed[0].version, "0.15.0");
}

#[tokio::test]
async fn test_progress_events() {
    let server = MockServer::start().await;
    publish(&server, "Evaisa", "LethalLib", "0.15.0", lethallib_archive()).await;
    let (_dir, manager) = manager(&server);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let manager = manager.with_progress_callback(Arc::new(move |event: ProgressEvent| {
        sink.lock().unwrap().push(event);
    }));

    manager.run(vec![Mod::new("LethalLib", "Evaisa")]).await.unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.first(), Some(&ProgressEvent::CheckStarted { total: 1 }));
    assert!(events.contains(&ProgressEvent::CheckComplete {
        to_install: 1,
        up_to_date: 0,
        unresolved: 0,
    }));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Installed {
            name: "LethalLib".to_string(),
            version: "0.15.0".to_string(),
            layout: "dll".to_string(),
        })
    );
}
