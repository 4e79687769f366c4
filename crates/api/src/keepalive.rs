//! Keep-alive pinger.
//!
//! Some hosts put a service to sleep after a period without traffic. When a
//! keep-alive URL is configured, a background task requests it on a fixed
//! period. Failures are logged and the task carries on.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use stockroom_infra::KeepAliveConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle for the running keep-alive task.
#[derive(Debug)]
pub struct KeepAliveHandle {
    join: JoinHandle<()>,
}

impl KeepAliveHandle {
    /// Stop the task. In-flight requests are dropped.
    pub fn shutdown(self) {
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawn the keep-alive task on the current tokio runtime.
///
/// The first request goes out one full `interval` after spawning.
pub fn spawn(config: KeepAliveConfig) -> Result<KeepAliveHandle, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    info!(url = %config.url, interval_secs = config.interval.as_secs(), "keep-alive enabled");

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + config.interval,
            config.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match client.get(&config.url).send().await {
                Ok(res) if res.status().is_success() => {
                    debug!(status = %res.status(), "keep-alive ping ok");
                }
                Ok(res) => warn!(status = %res.status(), "keep-alive ping returned an error status"),
                Err(e) => warn!(error = %e, "keep-alive ping failed"),
            }
        }
    });

    Ok(KeepAliveHandle { join })
}
