use crate::progress::driver::{ProgressDriver, ProgressState};
use log::debug;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Repeating timer that owns a [`ProgressDriver`] and publishes its state.
///
/// The timer stops on its own at the target. Dropping the task (or calling
/// [`ProgressTask::cancel`]) aborts it, so an owner going away never leaves
/// a timer behind.
pub struct ProgressTask {
    receiver: watch::Receiver<ProgressState>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTask {
    /// Spawns the timer on the current tokio runtime.
    pub fn spawn(mut driver: ProgressDriver, period: Duration) -> Self {
        let (sender, receiver) = watch::channel(driver.state());
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval fires immediately.
            ticker.tick().await;
            while !driver.is_complete() {
                ticker.tick().await;
                if driver.tick() && sender.send(driver.state()).is_err() {
                    break;
                }
            }
            debug!("progress timer stopped at {:?}", driver.state());
        });
        Self {
            receiver,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> ProgressState {
        *self.receiver.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.receiver.clone()
    }

    /// Waits until the target is reached. Returns the last published state if
    /// the timer was cancelled first.
    pub async fn finished(&self) -> ProgressState {
        let mut receiver = self.receiver.clone();
        if let Ok(state) = receiver.wait_for(ProgressState::is_complete).await {
            return *state;
        }
        let last = *receiver.borrow();
        last
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
