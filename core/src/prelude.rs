use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Progress driver settings shared by the simulator and the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub target: u8,
    pub tick_ms: u64,
}

impl ProgressConfig {
    pub const DEFAULT_TARGET: u8 = 75;
    pub const DEFAULT_TICK_MS: u64 = 20;

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            target: Self::DEFAULT_TARGET,
            tick_ms: Self::DEFAULT_TICK_MS,
        }
    }
}

/// Failure of a single assistant round trip.
#[derive(thiserror::Error, Debug)]
pub enum ExchangeError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("assistant returned status {0}")]
    Status(u16),
    #[error("assistant response carried no reply")]
    EmptyReply,
}

/// Common error type for the visualization core.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("snapshot error: {0}")]
    Snapshot(String),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

pub type CoreResult<T> = Result<T, CoreError>;
