use crate::prelude::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

pub const PROGRESS_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub current: u8,
    pub target: u8,
}

impl ProgressState {
    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }

    /// Completion as a fraction of the full 0..=100 scale.
    pub fn fraction(&self) -> f32 {
        f32::from(self.current) / f32::from(PROGRESS_MAX)
    }
}

/// Bounded counter that climbs one unit per tick until it reaches its target.
#[derive(Debug, Clone)]
pub struct ProgressDriver {
    state: ProgressState,
}

impl ProgressDriver {
    pub fn new(target: i32) -> CoreResult<Self> {
        let target = u8::try_from(target)
            .ok()
            .filter(|target| *target <= PROGRESS_MAX)
            .ok_or_else(|| {
                CoreError::InvalidConfiguration(format!(
                    "progress target {} outside 0..={}",
                    target, PROGRESS_MAX
                ))
            })?;
        Ok(Self {
            state: ProgressState { current: 0, target },
        })
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Advances by one unit. Returns `false` once the target has been reached.
    pub fn tick(&mut self) -> bool {
        if self.state.is_complete() {
            return false;
        }
        self.state.current += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climbs_to_target_without_overshoot() {
        let mut driver = ProgressDriver::new(75).unwrap();
        let mut advances = 0;
        for _ in 0..200 {
            if driver.tick() {
                advances += 1;
            }
        }
        assert_eq!(advances, 75);
        assert_eq!(driver.state(), ProgressState { current: 75, target: 75 });
        assert!(!driver.tick());
        assert_eq!(driver.state().current, 75);
    }

    #[test]
    fn zero_target_is_already_complete() {
        let mut driver = ProgressDriver::new(0).unwrap();
        assert!(driver.is_complete());
        assert!(!driver.tick());
        assert_eq!(driver.state().current, 0);
    }

    #[test]
    fn out_of_range_targets_are_rejected() {
        assert!(matches!(
            ProgressDriver::new(101),
            Err(CoreError::InvalidConfiguration(_))
        ));
        assert!(ProgressDriver::new(-1).is_err());
        assert!(ProgressDriver::new(100).is_ok());
    }

    #[test]
    fn fraction_uses_full_scale() {
        let mut driver = ProgressDriver::new(50).unwrap();
        while driver.tick() {}
        assert_eq!(driver.state().fraction(), 0.5);
    }
}
