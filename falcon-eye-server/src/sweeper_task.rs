use std::time::Duration;

use falcon_eye_core::Engine;

/// Runs the sweeper on a fixed interval, single-threaded per tick: the
/// next tick is scheduled only after the current one returns.
pub fn spawn(engine: Engine, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = falcon_eye_core::sweeper::sweep(&engine).await {
                tracing::warn!(error = %err, "sweeper tick failed");
            }
        }
    });
}
