//! Background polling of the count feed file

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use intersection_sim::simulation::{CountFeed, FeedReading};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn feed_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "intersection_sim_feed_{}_{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Replace the feed file in one step so the poller never sees a partial write
fn write_feed(path: &Path, contents: &str) {
    let staging = path.with_extension("tmp");
    std::fs::write(&staging, contents).unwrap();
    std::fs::rename(&staging, path).unwrap();
}

fn wait_for(feed: &CountFeed, done: impl Fn(Option<FeedReading>) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done(feed.latest()) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_poller_publishes_valid_reading() {
    let dir = feed_dir("valid");
    let path = dir.join("counts.json");
    write_feed(&path, r#"{"total": 14, "timestamp": 1700000000.0}"#);

    let feed = CountFeed::new();
    let handle = feed.spawn_file_poller(path.clone(), POLL_INTERVAL);

    assert!(wait_for(&feed, |latest| latest.map(|r| r.total) == Some(14)));
    assert!(!handle.is_finished());

    // A newer record replaces the cached one
    write_feed(&path, r#"{"total": 3, "timestamp": 1700000001.0}"#);
    assert!(wait_for(&feed, |latest| latest.map(|r| r.total) == Some(3)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_poller_clears_cache_on_malformed_content() {
    let dir = feed_dir("malformed");
    let path = dir.join("counts.json");
    write_feed(&path, r#"{"total": 9, "timestamp": 1700000000.0}"#);

    let feed = CountFeed::new();
    let handle = feed.spawn_file_poller(path.clone(), POLL_INTERVAL);
    assert!(wait_for(&feed, |latest| latest.is_some()));

    write_feed(&path, r#"{"total": "lots"}"#);
    assert!(wait_for(&feed, |latest| latest.is_none()));
    assert!(!handle.is_finished());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_poller_survives_missing_file() {
    let dir = feed_dir("missing");
    let path = dir.join("counts.json");
    write_feed(&path, r#"{"total": 21, "timestamp": 1700000000.0}"#);

    let feed = CountFeed::new();
    let handle = feed.spawn_file_poller(path.clone(), POLL_INTERVAL);
    assert!(wait_for(&feed, |latest| latest.is_some()));
    let cached = feed.latest();

    // Unreadable: the cache keeps its last value while the poller retries
    std::fs::remove_file(&path).unwrap();
    thread::sleep(POLL_INTERVAL * 8);
    assert!(!handle.is_finished());
    assert_eq!(feed.latest(), cached);

    // Once the file is back the poller picks it up again
    write_feed(&path, r#"{"total": 2, "timestamp": 1700000002.0}"#);
    assert!(wait_for(&feed, |latest| latest.map(|r| r.total) == Some(2)));

    let _ = std::fs::remove_dir_all(&dir);
}
