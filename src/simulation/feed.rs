//! Optional external vehicle-count feed
//!
//! A detector elsewhere publishes `{ "total": .., "timestamp": .. }` records.
//! The tick loop only ever reads the cached value; a background poller keeps
//! the cache refreshed and never blocks a tick.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::Deserialize;

/// Longest pause between retries after a failed read
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// One reading from the count feed. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FeedReading {
    pub total: u32,
    /// Unix time in seconds
    pub timestamp: f64,
}

impl FeedReading {
    pub fn parse(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// A reading counts as fresh when it is at most `freshness` seconds old
    pub fn is_fresh(&self, now: f64, freshness: f32) -> bool {
        now - self.timestamp <= f64::from(freshness)
    }
}

/// Current Unix time in seconds
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Shared cache of the most recent reading
#[derive(Debug, Clone, Default)]
pub struct CountFeed {
    latest: Arc<Mutex<Option<FeedReading>>>,
}

impl CountFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, reading: FeedReading) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(reading);
        }
    }

    /// Drop the cached reading, reverting to feed-absent behavior
    pub fn clear(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = None;
        }
    }

    pub fn latest(&self) -> Option<FeedReading> {
        self.latest.lock().ok().and_then(|latest| *latest)
    }

    /// The cached total, if a reading exists and is fresh at `now`
    pub fn latest_total(&self, now: f64, freshness: f32) -> Option<u32> {
        self.latest()
            .filter(|reading| reading.is_fresh(now, freshness))
            .map(|reading| reading.total)
    }

    /// Start a thread that re-reads `path` every `interval`.
    ///
    /// Unreadable files are retried with exponential backoff. Malformed
    /// content clears the cache.
    pub fn spawn_file_poller(&self, path: PathBuf, interval: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        thread::spawn(move || {
            let mut backoff = interval;
            loop {
                match std::fs::read_to_string(&path) {
                    Ok(source) => {
                        backoff = interval;
                        match FeedReading::parse(&source) {
                            Ok(reading) => {
                                debug!("Count feed: total={} at {:.0}", reading.total, reading.timestamp);
                                feed.publish(reading);
                            }
                            Err(e) => {
                                warn!("Malformed count feed {}: {}", path.display(), e);
                                feed.clear();
                            }
                        }
                        thread::sleep(interval);
                    }
                    Err(e) => {
                        warn!(
                            "Count feed {} unavailable ({}); retrying in {:?}",
                            path.display(),
                            e,
                            backoff
                        );
                        thread::sleep(backoff);
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                    }
                }
            }
        })
    }
}
