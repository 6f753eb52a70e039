use crate::common::{create_test_config, read_lines, write_url_list, BARE_PAGE, FILM_PAGE};
use csfd_harvest::config::Config;
use csfd_harvest::crawler::{extract, Extraction};
use csfd_harvest::storage::{CsvRecordSink, RecordSink};
use csfd_harvest::HarvestError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "delka,zanry,zeme,rok,hodnoceni_procenta,hodnoceni_pocet";
const FILM_ROW: &str = "116,\"Komedie,Drama\",Česko,1999,91,116107";
const UNKNOWN_ROW: &str = "NaN,NaN,NaN,NaN,NaN,NaN";

/// Mounts a film page, a failing page and a page without any data
///
/// Each path expects exactly `hits` requests, checked when the server drops.
async fn mount_pages(server: &MockServer, hits: [u64; 3]) {
    Mock::given(method("GET"))
        .and(path("/film/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FILM_PAGE))
        .expect(hits[0])
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/film/2/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(hits[1])
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/film/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BARE_PAGE))
        .expect(hits[2])
        .mount(server)
        .await;
}

fn film_urls(server: &MockServer) -> Vec<String> {
    (1..=3)
        .map(|id| format!("{}/film/{}/", server.uri(), id))
        .collect()
}

fn setup(server: &MockServer, dir: &Path) -> Config {
    let config = create_test_config(&server.uri(), dir);
    write_url_list(&dir.join("links.csv"), &film_urls(server));
    config
}

#[tokio::test]
async fn test_extraction_writes_one_record_per_url() {
    let server = MockServer::start().await;
    mount_pages(&server, [1, 1, 1]).await;
    let dir = TempDir::new().unwrap();
    let config = setup(&server, dir.path());

    let report = extract(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.resumed_at, 0);
    assert_eq!(report.written, 3);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.remaining(), 0);
    assert!(!report.interrupted);

    let lines = read_lines(&dir.path().join("films.csv"));
    assert_eq!(lines, vec![HEADER, FILM_ROW, UNKNOWN_ROW, UNKNOWN_ROW]);
}

#[tokio::test]
async fn test_extraction_resumes_after_existing_records() {
    let server = MockServer::start().await;
    mount_pages(&server, [0, 1, 1]).await;
    let dir = TempDir::new().unwrap();
    let config = setup(&server, dir.path());

    std::fs::write(
        dir.path().join("films.csv"),
        format!("{}\n{}\n", HEADER, FILM_ROW),
    )
    .unwrap();

    let report = extract(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.resumed_at, 1);
    assert_eq!(report.written, 2);
    assert_eq!(report.total(), 3);

    let lines = read_lines(&dir.path().join("films.csv"));
    assert_eq!(lines, vec![HEADER, FILM_ROW, UNKNOWN_ROW, UNKNOWN_ROW]);
}

#[tokio::test]
async fn test_crash_mid_write_matches_uninterrupted_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/film/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FILM_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BARE_PAGE))
        .mount(&server)
        .await;

    let clean_dir = TempDir::new().unwrap();
    let clean_config = setup(&server, clean_dir.path());
    extract(&clean_config, CancellationToken::new())
        .await
        .unwrap();
    let clean = std::fs::read_to_string(clean_dir.path().join("films.csv")).unwrap();

    // One complete record followed by half of the next one
    let crashed_dir = TempDir::new().unwrap();
    let crashed_config = setup(&server, crashed_dir.path());
    std::fs::write(
        crashed_dir.path().join("films.csv"),
        format!("{}\n{}\nNaN,Na", HEADER, FILM_ROW),
    )
    .unwrap();

    let report = extract(&crashed_config, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.resumed_at, 1);
    assert_eq!(report.written, 2);

    let resumed = std::fs::read_to_string(crashed_dir.path().join("films.csv")).unwrap();
    assert_eq!(resumed, clean);
}

#[tokio::test]
async fn test_network_error_writes_unknown_record() {
    // Nothing listens on port 1
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("http://127.0.0.1:1", dir.path());
    config.http.timeout_secs = 2;
    write_url_list(
        &dir.path().join("links.csv"),
        &["http://127.0.0.1:1/film/1/".to_string()],
    );

    let report = extract(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.written, 1);
    assert_eq!(report.fetch_failures, 1);

    let lines = read_lines(&dir.path().join("films.csv"));
    assert_eq!(lines, vec![HEADER, UNKNOWN_ROW]);
}

#[tokio::test]
async fn test_blank_input_row_keeps_positions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/film/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FILM_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    std::fs::write(
        dir.path().join("links.csv"),
        format!("url\n\"  \"\n{}/film/1/\n", server.uri()),
    )
    .unwrap();

    let report = extract(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(report.fetch_failures, 0);

    let lines = read_lines(&dir.path().join("films.csv"));
    assert_eq!(lines, vec![HEADER, UNKNOWN_ROW, FILM_ROW]);
}

#[tokio::test]
async fn test_missing_input_fails_before_any_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let result = extract(&config, CancellationToken::new()).await;
    assert!(matches!(result, Err(HarvestError::MissingInput { .. })));
    assert!(!dir.path().join("films.csv").exists());
}

#[tokio::test]
async fn test_empty_input_fails_before_any_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    std::fs::write(dir.path().join("links.csv"), "url\n").unwrap();

    let result = extract(&config, CancellationToken::new()).await;
    assert!(matches!(result, Err(HarvestError::EmptyInput { .. })));
    assert!(!dir.path().join("films.csv").exists());
}

#[tokio::test]
async fn test_more_records_than_input_is_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_url_list(
        &dir.path().join("links.csv"),
        &[format!("{}/film/1/", server.uri())],
    );
    std::fs::write(
        dir.path().join("films.csv"),
        format!("{}\n{}\n{}\n", HEADER, FILM_ROW, UNKNOWN_ROW),
    )
    .unwrap();

    let result = extract(&config, CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(HarvestError::ResumeMismatch {
            done: 2,
            input_len: 1
        })
    ));
}

#[tokio::test]
async fn test_cancel_before_start_writes_nothing() {
    let server = MockServer::start().await;
    mount_pages(&server, [0, 0, 0]).await;
    let dir = TempDir::new().unwrap();
    let config = setup(&server, dir.path());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = extract(&config, cancel).await.unwrap();
    assert!(report.interrupted);
    assert_eq!(report.written, 0);
    assert_eq!(report.remaining(), 3);

    let lines = read_lines(&dir.path().join("films.csv"));
    assert_eq!(lines, vec![HEADER]);
}

#[tokio::test]
async fn test_cancel_during_delay_stops_between_records() {
    let server = MockServer::start().await;
    mount_pages(&server, [1, 0, 0]).await;
    let dir = TempDir::new().unwrap();
    let mut config = setup(&server, dir.path());
    config.extraction.delay_ms = 30_000;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let input = film_urls(&server);
    let sink = CsvRecordSink::open(dir.path().join("films.csv")).unwrap();
    let mut extraction = Extraction::new(&config, input, sink, cancel).unwrap();
    let report = extraction.run().await.unwrap();

    assert!(report.interrupted);
    assert_eq!(report.written, 1);
    assert_eq!(extraction.sink().cursor().position(), 1);

    let lines = read_lines(&dir.path().join("films.csv"));
    assert_eq!(lines, vec![HEADER, FILM_ROW]);
}
