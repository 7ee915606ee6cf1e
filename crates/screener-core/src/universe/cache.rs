//! Process-wide cache of the scored universe for one source file.
//!
//! The snapshot is rebuilt when the file's modification time changes, when
//! the TTL elapses, or after [`UniverseCache::invalidate`]. Readers receive an
//! `Arc<Universe>` and never observe a partially built table.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info};

use super::Universe;
use crate::loader::{load_csv, LoadOptions};
use crate::ScreenerResult;

/// Default time-to-live of a cached universe.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Entry {
    universe: Arc<Universe>,
    modified: Option<SystemTime>,
    loaded_at: Instant,
}

#[derive(Debug)]
pub struct UniverseCache {
    path: PathBuf,
    options: LoadOptions,
    ttl: Duration,
    entry: RwLock<Option<Entry>>,
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl UniverseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: LoadOptions::default(),
            ttl: DEFAULT_TTL,
            entry: RwLock::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        entry.loaded_at.elapsed() < self.ttl && entry.modified == modified(&self.path)
    }

    /// Current snapshot, loading or rebuilding it first if stale.
    pub fn get(&self) -> ScreenerResult<Arc<Universe>> {
        {
            let guard = self.entry.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = guard.as_ref().filter(|e| self.is_fresh(e)) {
                debug!(path = %self.path.display(), "universe cache hit");
                return Ok(Arc::clone(&entry.universe));
            }
        }

        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        // Another writer may have rebuilt while we waited for the lock.
        if let Some(entry) = guard.as_ref().filter(|e| self.is_fresh(e)) {
            return Ok(Arc::clone(&entry.universe));
        }

        let stamp = modified(&self.path);
        let raw = load_csv(&self.path, &self.options)?;
        let universe = Arc::new(Universe::build(raw)?);
        info!(path = %self.path.display(), rows = universe.len(), "universe cache rebuilt");
        *guard = Some(Entry {
            universe: Arc::clone(&universe),
            modified: stamp,
            loaded_at: Instant::now(),
        });
        Ok(universe)
    }

    /// Drop the snapshot; the next [`get`](Self::get) reloads from disk.
    pub fn invalidate(&self) {
        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            debug!(path = %self.path.display(), "universe cache invalidated");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.entry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreenerError;
    use std::io::Write;

    fn temp_csv(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "screener-cache-{}-{}",
            std::process::id(),
            name
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("universe.csv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_get_reuses_snapshot() {
        let path = temp_csv("reuse", "Symbol,ROE\nAAA,10\nBBB,20\n");
        let cache = UniverseCache::new(&path);
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let path = temp_csv("invalidate", "Symbol,ROE\nAAA,10\n");
        let cache = UniverseCache::new(&path);
        let first = cache.get().unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());
        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_zero_ttl_always_rebuilds() {
        let path = temp_csv("ttl", "Symbol,ROE\nAAA,10\n");
        let cache = UniverseCache::new(&path).with_ttl(Duration::ZERO);
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let cache = UniverseCache::new("/nonexistent/screener/universe.csv");
        let err = cache.get().unwrap_err();
        assert!(matches!(err, ScreenerError::SourceNotFound { .. }));
        assert!(!cache.is_loaded());
    }
}
