use crate::measurement::store::MeasurementStore;
use crate::projection::dataset::ChartDataset;
use crate::projection::projector::project;
use crate::projection::selection::{ChartKind, SourceSlice, VisualizationSelection};
use crate::telemetry::{LogManager, MetricsRecorder};
use std::sync::Arc;

/// Tab/mode state machine. Reads as species/bar until the user picks something.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSelector {
    chosen: Option<VisualizationSelection>,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> VisualizationSelection {
        self.chosen.unwrap_or_default()
    }

    pub fn has_explicit_selection(&self) -> bool {
        self.chosen.is_some()
    }

    /// Returns `true` when the active selection changed.
    pub fn select(&mut self, selection: VisualizationSelection) -> bool {
        let changed = self.current() != selection;
        self.chosen = Some(selection);
        changed
    }

    pub fn select_slice(&mut self, source_slice: SourceSlice) -> bool {
        let kind = self.current().chart_kind;
        self.select(VisualizationSelection::new(source_slice, kind))
    }

    pub fn select_kind(&mut self, chart_kind: ChartKind) -> bool {
        let slice = self.current().source_slice;
        self.select(VisualizationSelection::new(slice, chart_kind))
    }
}

/// Selector plus the dataset it currently shows.
///
/// The dataset is recomputed synchronously on every selection change or
/// snapshot replace and swapped in whole.
pub struct ChartView {
    selector: ModeSelector,
    dataset: Arc<ChartDataset>,
    seen_revision: u64,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl ChartView {
    pub fn new(store: &MeasurementStore, metrics: Arc<MetricsRecorder>) -> Self {
        let selector = ModeSelector::new();
        let mut view = Self {
            selector,
            dataset: Arc::new(ChartDataset::default()),
            seen_revision: store.revision(),
            logger: LogManager::new(),
            metrics,
        };
        view.recompute(store);
        view
    }

    pub fn selection(&self) -> VisualizationSelection {
        self.selector.current()
    }

    pub fn selector(&self) -> &ModeSelector {
        &self.selector
    }

    pub fn dataset(&self) -> Arc<ChartDataset> {
        self.dataset.clone()
    }

    pub fn select(&mut self, store: &MeasurementStore, selection: VisualizationSelection) {
        if self.selector.select(selection) {
            self.recompute(store);
        }
    }

    pub fn select_slice(&mut self, store: &MeasurementStore, slice: SourceSlice) {
        if self.selector.select_slice(slice) {
            self.recompute(store);
        }
    }

    pub fn select_kind(&mut self, store: &MeasurementStore, kind: ChartKind) {
        if self.selector.select_kind(kind) {
            self.recompute(store);
        }
    }

    /// Re-projects if the store was replaced since the last projection.
    pub fn refresh(&mut self, store: &MeasurementStore) -> bool {
        if store.revision() == self.seen_revision {
            return false;
        }
        self.recompute(store);
        true
    }

    fn recompute(&mut self, store: &MeasurementStore) {
        let (revision, snapshot) = store.current_with_revision();
        let dataset = project(&snapshot, self.selector.current());
        self.logger.record(&format!(
            "projected {} -> {} points (revision {})",
            dataset.selection,
            dataset.len(),
            revision
        ));
        self.dataset = Arc::new(dataset);
        self.seen_revision = revision;
        self.metrics.record_projection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::mock::mock_snapshot;
    use crate::measurement::snapshot::MeasurementSnapshot;

    #[test]
    fn selector_defaults_to_species_bar() {
        let selector = ModeSelector::new();
        assert!(!selector.has_explicit_selection());
        assert_eq!(
            selector.current(),
            VisualizationSelection::new(SourceSlice::Species, ChartKind::Bar)
        );
    }

    #[test]
    fn selecting_the_default_still_counts_as_explicit() {
        let mut selector = ModeSelector::new();
        assert!(!selector.select(VisualizationSelection::default()));
        assert!(selector.has_explicit_selection());
    }

    #[test]
    fn partial_transitions_keep_the_other_half() {
        let mut selector = ModeSelector::new();
        assert!(selector.select_kind(ChartKind::Pie));
        assert!(selector.select_slice(SourceSlice::Environmental));
        assert_eq!(
            selector.current(),
            VisualizationSelection::new(SourceSlice::Environmental, ChartKind::Pie)
        );
    }

    #[test]
    fn view_follows_selection_changes() {
        let store = MeasurementStore::new(mock_snapshot());
        let metrics = Arc::new(MetricsRecorder::new());
        let mut view = ChartView::new(&store, metrics.clone());
        assert_eq!(view.dataset().len(), 5);

        view.select(
            &store,
            VisualizationSelection::new(SourceSlice::TimeSeries, ChartKind::Line),
        );
        let dataset = view.dataset();
        assert_eq!(dataset.selection.source_slice, SourceSlice::TimeSeries);
        assert!(dataset.points[0].extra.is_some());
        assert_eq!(metrics.snapshot().projections, 2);
    }

    #[test]
    fn held_dataset_survives_a_replace() {
        let store = MeasurementStore::new(mock_snapshot());
        let mut view = ChartView::new(&store, Arc::new(MetricsRecorder::new()));
        let before = view.dataset();

        store.replace_snapshot(MeasurementSnapshot::default());
        assert!(view.refresh(&store));
        assert!(!view.refresh(&store));
        assert!(view.dataset().is_empty());
        assert_eq!(before.len(), 5);
    }
}
