pub mod driver;
pub mod task;

pub use driver::{ProgressDriver, ProgressState, PROGRESS_MAX};
pub use task::ProgressTask;

use crate::prelude::{CoreResult, ProgressConfig};

impl ProgressConfig {
    pub fn build_driver(&self) -> CoreResult<ProgressDriver> {
        ProgressDriver::new(i32::from(self.target))
    }
}
