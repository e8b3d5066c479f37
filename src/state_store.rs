// =============================================================================
// Snapshot Store — previous-run indicator snapshots, persisted as JSON
// =============================================================================
//
// The MACD-cross rule compares today's snapshot with the previous run's.
// Keeping the previous snapshots on disk (atomic tmp + rename, same pattern
// as the runtime config) means a restart between runs does not silently
// disable crossing detection.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::indicators::IndicatorSnapshot;

pub struct SnapshotStore {
    path: PathBuf,
    snapshots: HashMap<String, IndicatorSnapshot>,
}

impl SnapshotStore {
    /// Open the store at `path`, loading any previous snapshots. A missing or
    /// unreadable file starts empty (first run, or acceptable loss: only the
    /// crossing rule is affected for one run).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshots = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, IndicatorSnapshot>>(&raw) {
                Ok(map) => {
                    info!(path = %path.display(), count = map.len(), "snapshot store loaded");
                    map
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "snapshot store corrupt — starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self { path, snapshots }
    }

    /// Snapshot from the previous completed run, if any.
    pub fn previous(&self, symbol: &str) -> Option<&IndicatorSnapshot> {
        self.snapshots.get(symbol)
    }

    /// Record this run's snapshot for `symbol` (becomes "previous" after
    /// `persist`).
    pub fn record(&mut self, snapshot: IndicatorSnapshot) {
        self.snapshots.insert(snapshot.symbol.clone(), snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Write the store to disk with tmp + rename so a crash mid-write never
    /// leaves a truncated file.
    pub fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let raw = serde_json::to_string_pretty(&self.snapshots)
            .context("failed to serialise snapshot store")?;
        std::fs::write(&tmp, raw)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to rename {} into place", tmp.display()))?;
        info!(path = %self.path.display(), count = self.snapshots.len(), "snapshot store persisted");
        Ok(())
    }

    #[cfg(test)]
    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(symbol: &str, macd: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            symbol: symbol.to_string(),
            timestamp: 1_700_000_000_000,
            close: 100.0,
            sma: 99.0,
            macd,
            macd_signal: 0.0,
            rsi: 55.0,
            volatility: 0.03,
            avg_volume: 1_500_000.0,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("sentinel-store-test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn missing_file_starts_empty() {
        let store = SnapshotStore::open(temp_path("does-not-exist.json"));
        assert!(store.is_empty());
        assert!(store.previous("AAPL").is_none());
    }

    #[test]
    fn record_and_previous() {
        let mut store = SnapshotStore::open(temp_path("record.json"));
        store.record(snapshot("AAPL", 1.0));
        assert_eq!(store.previous("AAPL").unwrap().macd, 1.0);
        // Overwrite keeps only the latest per symbol.
        store.record(snapshot("AAPL", 2.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.previous("AAPL").unwrap().macd, 2.0);
    }

    #[test]
    fn persist_and_reload_round_trip() {
        let path = temp_path("roundtrip.json");
        std::fs::remove_file(&path).ok();

        let mut store = SnapshotStore::open(&path);
        store.record(snapshot("AAPL", 1.5));
        store.record(snapshot("MSFT", -0.5));
        store.persist().unwrap();

        let reloaded = SnapshotStore::open(store.path());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.previous("MSFT").unwrap().macd, -0.5);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SnapshotStore::open(&path);
        assert!(store.is_empty());
        std::fs::remove_file(&path).ok();
    }
}
