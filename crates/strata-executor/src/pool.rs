//! Bounded worker pool for deferred execution units
//!
//! Each submitted task waits for a permit before it runs, so at most
//! `max_workers` tasks execute at once. The pool is an ordinary value owned
//! by the engine; proxies that want to share it clone it.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Task was submitted after the pool shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Worker pool is shut down")]
pub struct PoolClosed;

/// Bounded worker pool
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl WorkerPool {
    /// Create a pool running at most `max_workers` tasks at once (at least one)
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        info!(max_workers, "Creating worker pool");
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Workers not currently running a task
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }

    /// Stop accepting tasks; tasks already holding a worker run to completion
    pub fn shutdown(&self) {
        debug!("Shutting down worker pool");
        self.permits.close();
    }

    /// Submit a task; it starts once a worker is free
    ///
    /// The task is not cancelled when the returned handle is dropped.
    pub fn submit<F, T>(&self, task: F) -> JoinHandle<Result<T, PoolClosed>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permits = self.permits.clone();
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.map_err(|_| PoolClosed)?;
            Ok(task.await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let running = running.clone();
                let peak = peak.clone();
                pool.submit(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    i
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(results, (0..8).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.idle_workers(), 2);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown() {
        let pool = WorkerPool::new(1);
        pool.shutdown();
        assert!(pool.is_shut_down());

        let result = pool.submit(async { 42 }).await.unwrap();
        assert_eq!(result, Err(PoolClosed));
    }

    #[test]
    fn test_zero_workers_clamped() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.max_workers(), 1);
    }
}
