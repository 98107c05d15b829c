//! The silent-renewal timer.
//!
//! At most one renewal loop exists per timer: `start` cancels the previous
//! loop before spawning a new one, and dropping the timer cancels it.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Default)]
pub struct RenewalTimer {
    handle: Option<JoinHandle<()>>,
}

impl RenewalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tick` every `period`, first one full period from now, until it
    /// returns `ControlFlow::Break` or the timer is cancelled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        self.cancel();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tick().await.is_break() {
                    break;
                }
            }

            tracing::debug!("renewal loop finished");
        });

        tracing::debug!(period_secs = period.as_secs_f64(), "renewal timer started");
        self.handle = Some(handle);
    }

    /// Stop the loop. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    tracing::debug!("renewal timer cancelled");
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RenewalTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
