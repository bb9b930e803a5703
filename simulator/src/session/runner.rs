use ecosimcore::measurement::{MeasurementSnapshot, MeasurementStore};
use ecosimcore::projection::{project, ChartDataset, ChartKind, SourceSlice, VisualizationSelection};
use ecosimcore::telemetry::{LogManager, MetricsRecorder};
use std::sync::Arc;

pub struct SessionReport {
    pub revision: u64,
    pub datasets: Vec<ChartDataset>,
    pub coerced_values: usize,
}

/// Shared handle on the session's measurement store.
#[derive(Clone)]
pub struct Runner {
    store: Arc<MeasurementStore>,
    metrics: Arc<MetricsRecorder>,
    logger: Arc<LogManager>,
}

impl Runner {
    pub fn new(snapshot: MeasurementSnapshot) -> Self {
        Self {
            store: Arc::new(MeasurementStore::new(snapshot)),
            metrics: Arc::new(MetricsRecorder::new()),
            logger: Arc::new(LogManager::new()),
        }
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    pub fn snapshot(&self) -> Arc<MeasurementSnapshot> {
        self.store.current()
    }

    pub fn replace(&self, snapshot: MeasurementSnapshot) -> u64 {
        self.store.replace_snapshot(snapshot)
    }

    pub fn project(&self, selection: VisualizationSelection) -> ChartDataset {
        self.project_from(&self.store.current(), selection)
    }

    fn project_from(
        &self,
        snapshot: &MeasurementSnapshot,
        selection: VisualizationSelection,
    ) -> ChartDataset {
        let dataset = project(snapshot, selection);
        self.metrics.record_projection();
        self.logger
            .record(&format!("{} -> {} points", selection, dataset.len()));
        dataset
    }

    /// Projects every slice with the chart kind it is usually shown as.
    ///
    /// All datasets come from the snapshot current when the run starts, even
    /// if it is replaced meanwhile.
    pub fn execute(&self) -> SessionReport {
        let (revision, snapshot) = self.store.current_with_revision();
        let datasets = SourceSlice::ALL
            .into_iter()
            .map(|slice| {
                self.project_from(
                    &snapshot,
                    VisualizationSelection::new(slice, natural_kind(slice)),
                )
            })
            .collect();
        SessionReport {
            revision,
            datasets,
            coerced_values: snapshot.validate().len(),
        }
    }
}

pub fn natural_kind(slice: SourceSlice) -> ChartKind {
    match slice {
        SourceSlice::Species => ChartKind::Bar,
        SourceSlice::Environmental => ChartKind::Pie,
        SourceSlice::TimeSeries => ChartKind::Line,
    }
}
