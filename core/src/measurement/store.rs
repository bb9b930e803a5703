use crate::measurement::snapshot::MeasurementSnapshot;
use crate::telemetry::log::LogManager;
use log::warn;
use std::sync::{Arc, RwLock};

/// Holds the current snapshot and hands out immutable reads of it.
///
/// A replace swaps the whole snapshot at once, so a reader holding the
/// previous `Arc` keeps a complete, consistent view.
pub struct MeasurementStore {
    inner: RwLock<StoreState>,
    logger: LogManager,
}

struct StoreState {
    snapshot: Arc<MeasurementSnapshot>,
    revision: u64,
}

impl MeasurementStore {
    pub fn new(snapshot: MeasurementSnapshot) -> Self {
        report_issues(&snapshot);
        Self {
            inner: RwLock::new(StoreState {
                snapshot: Arc::new(snapshot),
                revision: 0,
            }),
            logger: LogManager::new(),
        }
    }

    pub fn current(&self) -> Arc<MeasurementSnapshot> {
        match self.inner.read() {
            Ok(state) => state.snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().snapshot.clone(),
        }
    }

    /// Bumped on every replace; views compare it to decide when to re-project.
    pub fn revision(&self) -> u64 {
        match self.inner.read() {
            Ok(state) => state.revision,
            Err(poisoned) => poisoned.into_inner().revision,
        }
    }

    /// Snapshot and revision read under one lock, so they always match.
    pub fn current_with_revision(&self) -> (u64, Arc<MeasurementSnapshot>) {
        let state = match self.inner.read() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        (state.revision, state.snapshot.clone())
    }

    pub fn replace_snapshot(&self, snapshot: MeasurementSnapshot) -> u64 {
        report_issues(&snapshot);
        let species = snapshot.species_populations.len();
        let periods = snapshot.time_series.len();
        let mut state = match self.inner.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.snapshot = Arc::new(snapshot);
        state.revision += 1;
        self.logger.record(&format!(
            "snapshot replaced (revision {}, {} species, {} periods)",
            state.revision, species, periods
        ));
        state.revision
    }
}

impl Default for MeasurementStore {
    fn default() -> Self {
        Self::new(MeasurementSnapshot::default())
    }
}

fn report_issues(snapshot: &MeasurementSnapshot) {
    for issue in snapshot.validate() {
        warn!(
            "{} entry {} has a non-numeric {}; it will plot as 0",
            issue.slice, issue.label, issue.field
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::mock::mock_snapshot;

    #[test]
    fn replace_bumps_revision_and_keeps_old_reads() {
        let store = MeasurementStore::new(mock_snapshot());
        let before = store.current();
        assert_eq!(store.revision(), 0);

        let revision = store.replace_snapshot(MeasurementSnapshot::default());
        assert_eq!(revision, 1);
        assert!(store.current().is_empty());
        assert!(!before.is_empty());
    }

    #[test]
    fn revision_and_snapshot_are_read_together() {
        let store = MeasurementStore::new(mock_snapshot());
        store.replace_snapshot(MeasurementSnapshot::default());
        let (revision, snapshot) = store.current_with_revision();
        assert_eq!(revision, 1);
        assert!(snapshot.is_empty());
        assert!(Arc::ptr_eq(&snapshot, &store.current()));
    }

    #[test]
    fn current_reads_share_the_same_snapshot() {
        let store = MeasurementStore::new(mock_snapshot());
        assert!(Arc::ptr_eq(&store.current(), &store.current()));
    }
}
