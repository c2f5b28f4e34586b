//! Delayed task scheduling.
//!
//! There is no cancellation: a scheduled task decides at fire time whether
//! it still has work to do by reading the store.

use std::time::Duration;

use futures::future::BoxFuture;
use tracing::debug;

/// Schedules a task to run once after a delay.
pub trait Timer: Send + Sync {
    fn arm(&self, delay: Duration, task: BoxFuture<'static, ()>);
}

/// Timer backed by the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn arm(&self, delay: Duration, task: BoxFuture<'static, ()>) {
        debug!("Arming timer for {:?}", delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }
}
