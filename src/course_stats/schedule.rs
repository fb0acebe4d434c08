//! Cooperative scheduling hooks used between chunks.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Hands control back to the host scheduler at a chunk boundary.
#[async_trait]
pub trait Yielder: Send + Sync {
    async fn yield_now(&self);
}

/// Yields to the tokio scheduler so other tasks on the worker can run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioYield;

#[async_trait]
impl Yielder for TokioYield {
    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

/// Never yields. Only useful when the caller owns the thread outright.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

#[async_trait]
impl Yielder for NoYield {
    async fn yield_now(&self) {}
}

/// Cloneable cancellation flag checked by the engine at every chunk boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_tokio_yield_lets_spawned_task_run() {
        let flag = CancelToken::new();
        let setter = flag.clone();
        tokio::spawn(async move { setter.cancel() });

        // Single-threaded test runtime: the spawned task can only run while we are parked.
        assert!(!flag.is_cancelled());
        TokioYield.yield_now().await;
        assert!(flag.is_cancelled());
    }
}
