use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::WeakController;

/// Handle of the running auto-refresh task. Dropping it stops the task.
#[derive(Debug)]
pub struct AutoRefresh {
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// Start refreshing charts and the current reading every `period`.
    ///
    /// The first tick fires one full period after the call. The task only holds a weak
    /// reference, so it exits on its own once the controller is gone.
    pub(crate) fn spawn(controller: WeakController, period: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let Some(controller) = controller.upgrade() else {
                    tracing::debug!("Controller dropped, stopping auto-refresh");
                    break;
                };

                tracing::debug!("Running auto-refresh tick");
                controller.refresh_chart_data().await;
                controller.refresh_current_reading().await;
            }
        });

        tracing::info!(interval_secs = period.as_secs(), "Auto-refresh started");
        Self { task }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.task.abort();
        tracing::info!("Auto-refresh stopped");
    }
}
