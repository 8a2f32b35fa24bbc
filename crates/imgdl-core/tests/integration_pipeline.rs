//! Integration tests: full parser/downloader runs against a local image server.

mod common;

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use common::image_server::{self, Route};
use imgdl_core::config::Settings;
use imgdl_core::pipeline::{Pipeline, PipelineEvent};
use imgdl_core::source::{Producer, SourceEncoding};
use tempfile::tempdir;

fn settings(save_dir: &Path, workers: usize) -> Settings {
    Settings {
        save_dir: save_dir.to_path_buf(),
        timeout: Some(Duration::from_secs(2)),
        max_reattempts: 2,
        proxy: Default::default(),
        no_proxy: Some("127.0.0.1,localhost".into()),
        workers,
        queue_capacity: 50,
        default_extension: "jfif".into(),
        buffer_bytes: 1024,
    }
}

fn source(lines: &[String]) -> Producer {
    Producer::from_bytes(Path::new("urls.txt"), lines.join("\n").as_bytes()).unwrap()
}

fn files_in(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn png_body() -> Vec<u8> {
    (0u8..=255).cycle().take(10 * 1024).collect()
}

#[test]
fn only_the_image_url_is_saved() {
    let body = png_body();
    let server = image_server::start(vec![
        ("/cat.png", Route::image("image/png", body.clone())),
        ("/index.html", Route::page("text/html; charset=utf-8", "<html></html>")),
    ]);
    let dir = tempdir().unwrap();
    let lines = vec![
        server.url("/cat.png"),
        server.url("/missing.png"),
        server.url("/index.html"),
    ];

    let report = Pipeline::from_settings(settings(dir.path(), 2))
        .run(source(&lines))
        .unwrap();

    assert_eq!(report.lines, 3);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.saved.len(), 1);
    assert_eq!(report.queue_remaining, 1);
    assert_eq!(files_in(dir.path()), BTreeSet::from(["cat.png".to_string()]));
    assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), body);
    assert_eq!(report.saved_bytes(), body.len() as u64);
    assert_eq!(server.hits("HEAD", "/missing.png"), 1);
    assert_eq!(server.hits("GET", "/missing.png"), 0, "rejected URLs are never fetched");
    assert_eq!(server.hits("GET", "/index.html"), 0);
}

#[test]
fn empty_source_saves_nothing_and_terminates() {
    let dir = tempdir().unwrap();
    for workers in [1, 4] {
        let report = Pipeline::from_settings(settings(dir.path(), workers))
            .run(source(&[]))
            .unwrap();
        assert_eq!(report.lines, 0);
        assert!(report.saved.is_empty());
        assert_eq!(report.queue_remaining, 1);
    }
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn utf16_source_with_bom_downloads_the_same() {
    let server = image_server::start(vec![("/a.gif", Route::image("image/gif", b"GIF89a".to_vec()))]);
    let dir = tempdir().unwrap();
    let text = format!("{}\r\n", server.url("/a.gif"));
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let producer = Producer::from_bytes(Path::new("urls.txt"), &bytes).unwrap();
    assert_eq!(producer.encoding(), SourceEncoding::Utf16Le);

    let report = Pipeline::from_settings(settings(dir.path(), 1)).run(producer).unwrap();
    assert_eq!(report.saved.len(), 1);
    assert_eq!(std::fs::read(dir.path().join("a.gif")).unwrap(), b"GIF89a");
}

#[test]
fn duplicate_urls_get_distinct_files() {
    let server = image_server::start(vec![("/cat.png", Route::image("image/png", png_body()))]);
    let dir = tempdir().unwrap();
    let url = server.url("/cat.png");

    let report = Pipeline::from_settings(settings(dir.path(), 2))
        .run(source(&[url.clone(), url]))
        .unwrap();

    assert_eq!(report.saved.len(), 2);
    assert_eq!(
        files_in(dir.path()),
        BTreeSet::from(["application_image_0.jfif".to_string(), "cat.png".to_string()])
    );
}

#[test]
fn names_come_from_the_requested_url() {
    let server = image_server::start(vec![
        ("/cat.png", Route::image("image/png", png_body())),
        ("/old.png", Route::redirect("/cat.png")),
        ("/img/photo.jpg", Route::image("image/jpeg", b"jpeg".to_vec())),
        ("/render.php", Route::image("image/webp", b"webp".to_vec())),
    ]);
    let dir = tempdir().unwrap();
    let lines = vec![
        server.url("/old.png"),
        server.url("/img/photo.jpg?size=large#top"),
        server.url("/render.php"),
    ];

    let report = Pipeline::from_settings(settings(dir.path(), 3))
        .run(source(&lines))
        .unwrap();

    assert_eq!(report.saved.len(), 3);
    assert_eq!(
        files_in(dir.path()),
        BTreeSet::from([
            "old.png".to_string(),
            "photo.jpg".to_string(),
            "render.jfif".to_string(),
        ])
    );
    assert_eq!(server.hits("GET", "/cat.png"), 1, "redirect is followed for the body");
}

#[test]
fn failed_get_is_abandoned_without_a_file() {
    let server = image_server::start(vec![(
        "/gone.png",
        Route::image("image/png", png_body()).with_get_status(404),
    )]);
    let dir = tempdir().unwrap();
    let (tx, rx) = std::sync::mpsc::channel();

    let report = Pipeline::from_settings(settings(dir.path(), 2))
        .with_events(tx)
        .run(source(&[server.url("/gone.png")]))
        .unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(report.abandoned, 1);
    assert!(files_in(dir.path()).is_empty());
    assert_eq!(server.hits("GET", "/gone.png"), 1, "HTTP errors are not retried");
    let events: Vec<_> = rx.iter().collect();
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::Abandoned { reason, .. } if reason.contains("404"))));
}
