use crate::common::{create_test_config, read_lines, write_url_list, ScriptedIds};
use csfd_harvest::crawler::{Discovery, DiscoveryLimits};
use csfd_harvest::storage::{CsvUrlCheckpoint, UrlCheckpoint};
use csfd_harvest::{HarvestError, StoreResult};
use std::collections::BTreeSet;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Checkpoint that only remembers how large each save was
#[derive(Default)]
struct RecordingCheckpoint {
    saves: Vec<usize>,
}

impl UrlCheckpoint for RecordingCheckpoint {
    fn load(&self) -> StoreResult<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    fn save(&mut self, urls: &BTreeSet<String>) -> StoreResult<()> {
        self.saves.push(urls.len());
        Ok(())
    }
}

/// Mounts a small catalog:
/// - 1 is a film page
/// - 2 is missing (404, the mock server default)
/// - 3 answers 200 with a not-found marker
/// - 4 redirects to the search page
/// - 5 redirects to its slugged detail page
async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/film/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Pelíšky</html>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/film/3/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<h1>Stránka neexistuje</h1>"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/film/4/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/hledat/?q=4"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hledat/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Hledání</html>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/film/5/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "/film/5-samotari/"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/film/5-samotari/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Samotáři</html>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_discovery_classifies_every_probe() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let mut discovery = Discovery::from_config(&config, CancellationToken::new())
        .unwrap()
        .with_id_source(ScriptedIds::new(&[1, 2, 1, 3, 4, 5]));

    let limits = DiscoveryLimits {
        target_count: 10,
        max_attempts: 6,
        id_space: 10,
    };
    let output = discovery.discover(limits, BTreeSet::new()).await.unwrap();

    let expected: BTreeSet<String> = [
        format!("{}/film/1/", server.uri()),
        format!("{}/film/5-samotari/", server.uri()),
    ]
    .into_iter()
    .collect();
    assert_eq!(output.urls, expected);

    let report = &output.report;
    assert_eq!(report.attempts, 6);
    assert_eq!(report.tried, 5);
    assert_eq!(report.found, 2);
    assert_eq!(report.count("valid"), 2);
    assert_eq!(report.count("duplicate"), 1);
    assert_eq!(report.count("bad_status"), 1);
    assert_eq!(report.count("not_found"), 1);
    assert_eq!(report.count("shape_mismatch"), 1);
    assert!(!report.interrupted);
    assert!(report.finished_at.is_some());

    // Final save holds the full set, one URL per row after the header
    let lines = read_lines(dir.path().join("links.csv").as_path());
    assert_eq!(lines[0], "url");
    assert_eq!(lines.len(), 3);
    for url in &expected {
        assert!(lines.contains(url));
    }
}

#[tokio::test]
async fn test_discovery_stops_at_target() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let mut discovery = Discovery::from_config(&config, CancellationToken::new())
        .unwrap()
        .with_id_source(ScriptedIds::new(&[1, 5, 2, 3]));

    let limits = DiscoveryLimits {
        target_count: 1,
        max_attempts: 100,
        id_space: 10,
    };
    let output = discovery.discover(limits, BTreeSet::new()).await.unwrap();

    assert_eq!(output.urls.len(), 1);
    assert_eq!(output.report.attempts, 1);
}

#[tokio::test]
async fn test_discovery_terminates_when_nothing_is_valid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let mut discovery = Discovery::from_config(&config, CancellationToken::new()).unwrap();
    let limits = DiscoveryLimits {
        target_count: 5,
        max_attempts: 20,
        id_space: 3,
    };
    let output = discovery.discover(limits, BTreeSet::new()).await.unwrap();

    assert!(output.urls.is_empty());
    assert_eq!(output.report.attempts, 20);
    // Only three distinct identifiers exist, everything else is a duplicate
    assert!(output.report.tried <= 3);
    assert_eq!(output.report.count("duplicate"), 20 - output.report.tried);

    let lines = read_lines(dir.path().join("links.csv").as_path());
    assert_eq!(lines, vec!["url".to_string()]);
}

#[tokio::test]
async fn test_checkpoint_saved_on_schedule_and_at_exit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.discovery.checkpoint_every = 10;

    let ids: Vec<u64> = (1..=25).collect();
    let mut discovery = Discovery::new(
        &config,
        RecordingCheckpoint::default(),
        CancellationToken::new(),
    )
    .unwrap()
    .with_id_source(ScriptedIds::new(&ids));

    let limits = DiscoveryLimits {
        target_count: 1,
        max_attempts: 25,
        id_space: 100,
    };
    discovery.discover(limits, BTreeSet::new()).await.unwrap();

    // After attempts 10 and 20, then once more on exit
    assert_eq!(discovery.checkpoint().saves, vec![0, 0, 0]);
}

#[tokio::test]
async fn test_run_resumes_from_checkpoint() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.discovery.target_count = 2;
    config.discovery.max_attempts = 5;
    config.discovery.id_space = 10;

    let earlier = format!("{}/film/9-obecna-skola/", server.uri());
    write_url_list(
        &dir.path().join("links.csv"),
        &[earlier.clone(), "https://elsewhere.example/x".to_string()],
    );

    let mut discovery = Discovery::from_config(&config, CancellationToken::new())
        .unwrap()
        .with_id_source(ScriptedIds::new(&[1]));
    let output = discovery.run(false).await.unwrap();

    assert_eq!(output.report.resumed_with, 1);
    assert_eq!(output.report.attempts, 1);
    assert_eq!(output.report.newly_found(), 1);
    assert!(output.urls.contains(&earlier));
    assert!(output.urls.contains(&format!("{}/film/1/", server.uri())));
    assert!(!output.urls.contains("https://elsewhere.example/x"));

    let reloaded = CsvUrlCheckpoint::new(dir.path().join("links.csv"))
        .load()
        .unwrap();
    assert_eq!(reloaded, output.urls);
}

#[tokio::test]
async fn test_fresh_run_ignores_checkpoint() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.discovery.target_count = 1;
    config.discovery.max_attempts = 5;

    let earlier = format!("{}/film/9-obecna-skola/", server.uri());
    write_url_list(&dir.path().join("links.csv"), &[earlier.clone()]);

    let mut discovery = Discovery::from_config(&config, CancellationToken::new())
        .unwrap()
        .with_id_source(ScriptedIds::new(&[1]));
    let output = discovery.run(true).await.unwrap();

    assert_eq!(output.report.resumed_with, 0);
    assert_eq!(output.report.attempts, 1);
    assert!(!output.urls.contains(&earlier));
    assert_eq!(output.urls.len(), 1);
}

#[tokio::test]
async fn test_cancelled_discovery_still_saves() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut discovery = Discovery::from_config(&config, cancel).unwrap();
    let limits = DiscoveryLimits {
        target_count: 5,
        max_attempts: 100,
        id_space: 10,
    };
    let output = discovery.discover(limits, BTreeSet::new()).await.unwrap();

    assert!(output.report.interrupted);
    assert_eq!(output.report.attempts, 0);
    assert!(dir.path().join("links.csv").exists());
}

#[tokio::test]
async fn test_unreadable_checkpoint_fails_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    std::fs::write(dir.path().join("links.csv"), "odkaz\nhttps://x/film/1/\n").unwrap();

    let mut discovery = Discovery::from_config(&config, CancellationToken::new()).unwrap();
    let result = discovery.run(false).await;
    assert!(matches!(result, Err(HarvestError::Store(_))));
}

#[tokio::test]
async fn test_seed_above_target_is_capped_but_kept_on_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>film</html>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.discovery.target_count = 2;

    let seeded: Vec<String> = (1..=5)
        .map(|id| format!("{}/film/{}/", server.uri(), id))
        .collect();
    write_url_list(&dir.path().join("links.csv"), &seeded);

    let mut discovery = Discovery::from_config(&config, CancellationToken::new()).unwrap();
    let output = discovery.run(false).await.unwrap();

    assert_eq!(output.report.attempts, 0);
    assert_eq!(output.report.resumed_with, 5);
    assert_eq!(output.report.found, 2);
    assert_eq!(output.urls.len(), 2);
    assert!(output.urls.iter().all(|url| seeded.contains(url)));

    let on_disk = CsvUrlCheckpoint::new(dir.path().join("links.csv"))
        .load()
        .unwrap();
    assert_eq!(on_disk.len(), 5);
}
