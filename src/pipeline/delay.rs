//! Inter-request pacing
//!
//! The pipeline waits a fixed time between two entries, whatever the first
//! entry's outcome. The wait goes through [`Delay`] so tests can swap the
//! real timer for one that returns immediately.

use async_trait::async_trait;
use std::time::Duration;

/// Default pause between two entries
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Suspends the pipeline between entries
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Wall-clock delay backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tracing::trace!("Waiting {:?} before next request", duration);
        tokio::time::sleep(duration).await;
    }
}
