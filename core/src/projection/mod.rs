pub mod dataset;
pub mod projector;
pub mod selection;
pub mod selector;

pub use dataset::{ChartDataset, ChartPoint};
pub use projector::{compare_periods, project, BIODIVERSITY_INDEX};
pub use selection::{ChartKind, SourceSlice, VisualizationSelection};
pub use selector::{ChartView, ModeSelector};
