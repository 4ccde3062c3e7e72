//! Timetable snapshots with a refresh policy.
//!
//! The provider never fails: when the configuration store is unreachable it
//! serves the last snapshot it validated, and when it has none (or the stored
//! document is invalid) it serves the built-in default timetable.

use super::store::TimetableSource;
use crate::models::TimetableConfig;
use crate::ui::messages::warning;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Freshly read and validated.
    Store,
    /// Store unreachable; previous good snapshot reused.
    LastKnownGood,
    BuiltInDefault,
}

struct Cached {
    config: Arc<TimetableConfig>,
    origin: SnapshotOrigin,
    /// `None` once invalidated.
    fetched_at: Option<Instant>,
}

pub struct TimetableProvider<S: TimetableSource> {
    source: S,
    refresh: Duration,
    cache: Mutex<Option<Cached>>,
}

impl<S: TimetableSource> TimetableProvider<S> {
    pub fn new(source: S, refresh: Duration) -> Self {
        Self {
            source,
            refresh,
            cache: Mutex::new(None),
        }
    }

    /// The timetable to use for one evaluation or sweep.
    pub fn snapshot(&self) -> Arc<TimetableConfig> {
        self.snapshot_with_origin().0
    }

    pub fn snapshot_with_origin(&self) -> (Arc<TimetableConfig>, SnapshotOrigin) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(c) = cache.as_ref()
            && c.fetched_at.is_some_and(|t| t.elapsed() < self.refresh)
        {
            return (Arc::clone(&c.config), c.origin);
        }

        match self.source.fetch_timetable() {
            Ok(Some(cfg)) => match cfg.validate() {
                Ok(()) => store(&mut cache, Arc::new(cfg), SnapshotOrigin::Store),
                Err(e) => {
                    warning(format!("{}; using the built-in timetable", e));
                    store(&mut cache, default_config(), SnapshotOrigin::BuiltInDefault)
                }
            },
            Ok(None) => store(&mut cache, default_config(), SnapshotOrigin::BuiltInDefault),
            Err(e) if e.is_configuration() => {
                warning(format!("{}; using the built-in timetable", e));
                store(&mut cache, default_config(), SnapshotOrigin::BuiltInDefault)
            }
            Err(e) => {
                warning(format!("Timetable store unavailable: {}", e));
                match cache.as_ref() {
                    // Keep the old fetch time so the next call retries the store.
                    Some(c) if c.origin != SnapshotOrigin::BuiltInDefault => {
                        (Arc::clone(&c.config), SnapshotOrigin::LastKnownGood)
                    }
                    _ => (default_config(), SnapshotOrigin::BuiltInDefault),
                }
            }
        }
    }

    /// Force the next snapshot to hit the store.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(c) = cache.as_mut() {
            c.fetched_at = None;
        }
    }
}

fn default_config() -> Arc<TimetableConfig> {
    Arc::new(TimetableConfig::default())
}

fn store(
    cache: &mut Option<Cached>,
    config: Arc<TimetableConfig>,
    origin: SnapshotOrigin,
) -> (Arc<TimetableConfig>, SnapshotOrigin) {
    *cache = Some(Cached {
        config: Arc::clone(&config),
        origin,
        fetched_at: Some(Instant::now()),
    });
    (config, origin)
}
