pub mod mock;
pub mod snapshot;
pub mod store;
pub mod value;

pub use mock::mock_snapshot;
pub use snapshot::{MeasureMap, MeasurementSnapshot, PeriodRecord, ValueIssue};
pub use store::MeasurementStore;
pub use value::MeasureValue;
