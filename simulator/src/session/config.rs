use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use ecosimcore::prelude::{CoreError, ProgressConfig};
use ecosimcore::progress::ProgressDriver;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub progress_target: i32,
    pub tick_ms: u64,
    pub bind: SocketAddr,
    pub snapshot: Option<PathBuf>,
    pub generator: Option<GeneratorConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_target: i32::from(ProgressConfig::DEFAULT_TARGET),
            tick_ms: ProgressConfig::DEFAULT_TICK_MS,
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            snapshot: None,
            generator: None,
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(progress_target: i32, tick_ms: u64, snapshot: Option<PathBuf>) -> Self {
        Self {
            progress_target,
            tick_ms,
            snapshot,
            ..Default::default()
        }
    }

    /// Fails when the progress driver rejects the target.
    pub fn to_progress_config(&self) -> Result<ProgressConfig, CoreError> {
        let driver = ProgressDriver::new(self.progress_target)?;
        Ok(ProgressConfig {
            target: driver.state().target,
            tick_ms: self.tick_ms,
        })
    }
}
