//! Visualization core for the EcoSim ecosystem explorer.
//!
//! A measurement snapshot is held read-only by the store, projected into
//! renderer-agnostic chart datasets according to the active tab selection,
//! while a progress driver and the assistant transcript run independently.

pub mod math;
pub mod measurement;
pub mod prelude;
pub mod progress;
pub mod projection;
pub mod telemetry;
pub mod transcript;

pub use measurement::{MeasurementSnapshot, MeasurementStore};
pub use prelude::{CoreError, CoreResult, ExchangeError, ProgressConfig};
pub use projection::{project, ChartDataset, ChartKind, SourceSlice, VisualizationSelection};
