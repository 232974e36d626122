//! FIFO async mutex serializing wallet state mutations
//!
//! [`FifoMutex`] queues waiters strictly first-in-first-out and hands the
//! lock directly to the next waiter on release, so the lock never appears
//! transiently free between waiters and a late arrival can never overtake a
//! queued one. There is no waiting timeout; callers own their own timeout
//! and cancellation policy upstream.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::oneshot;

struct LockState {
    locked: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// A fair async mutex with direct lock hand-off
pub struct FifoMutex {
    state: Mutex<LockState>,
}

/// Guard proving exclusive access; releases the lock on drop
pub struct FifoMutexGuard<'a> {
    mutex: &'a FifoMutex,
}

impl Default for FifoMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl FifoMutex {
    /// Create a new unlocked mutex
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState {
                locked: false,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Acquire the lock, waiting in FIFO order behind earlier callers
    pub async fn acquire(&self) -> FifoMutexGuard<'_> {
        let receiver = {
            let mut state = self.state.lock().expect("lock state poisoned");
            if !state.locked {
                state.locked = true;
                return FifoMutexGuard { mutex: self };
            }
            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            receiver
        };

        // If this future is dropped while queued, its sender fails on
        // hand-off and release() moves to the next waiter. Handoff covers
        // the window where the drop races an already-delivered hand-off.
        let mut pending = Handoff {
            mutex: self,
            receiver: Some(receiver),
        };
        // The sender is only dropped without sending if the mutex itself is
        // torn down, which cannot happen while we borrow it.
        let _ = pending
            .receiver
            .as_mut()
            .expect("receiver taken before wait")
            .await;
        pending.receiver = None;
        FifoMutexGuard { mutex: self }
    }

    /// Acquire the lock only if it is free right now
    ///
    /// Never steals from queued waiters: a locked mutex returns `None` even
    /// if release is imminent.
    pub fn try_acquire(&self) -> Option<FifoMutexGuard<'_>> {
        let mut state = self.state.lock().expect("lock state poisoned");
        if state.locked {
            None
        } else {
            state.locked = true;
            Some(FifoMutexGuard { mutex: self })
        }
    }

    /// Run `operation` while holding the lock
    ///
    /// The lock is always released, including when the operation returns an
    /// error or panics; errors propagate to the caller after release.
    pub async fn run_exclusive<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.acquire().await;
        operation().await
    }

    /// Whether the lock is currently held
    pub fn is_locked(&self) -> bool {
        self.state.lock().expect("lock state poisoned").locked
    }

    /// Number of callers currently queued behind the holder
    pub fn queue_len(&self) -> usize {
        self.state.lock().expect("lock state poisoned").waiters.len()
    }

    fn release(&self) {
        let mut state = self.state.lock().expect("lock state poisoned");
        // Hand the lock to the next live waiter; `locked` stays true across
        // the hand-off so the lock is never observably free in between.
        while let Some(next) = state.waiters.pop_front() {
            if next.send(()).is_ok() {
                return;
            }
        }
        state.locked = false;
    }
}

impl Drop for FifoMutexGuard<'_> {
    fn drop(&mut self) {
        self.mutex.release();
    }
}

/// Drop protection for a queued waiter: if the acquiring future is dropped
/// right after the lock was handed to it, pass the lock on instead of
/// stranding it.
struct Handoff<'a> {
    mutex: &'a FifoMutex,
    receiver: Option<oneshot::Receiver<()>>,
}

impl Drop for Handoff<'_> {
    fn drop(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            if receiver.try_recv().is_ok() {
                self.mutex.release();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let mutex = FifoMutex::new();
        assert!(!mutex.is_locked());
        {
            let _guard = mutex.acquire().await;
            assert!(mutex.is_locked());
        }
        assert!(!mutex.is_locked());
    }

    #[tokio::test]
    async fn test_try_acquire_fails_while_held() {
        let mutex = FifoMutex::new();
        let guard = mutex.try_acquire().unwrap();
        assert!(mutex.try_acquire().is_none());
        drop(guard);
        assert!(mutex.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_run_exclusive_releases_on_error() {
        let mutex = FifoMutex::new();
        let result: Result<(), &str> = mutex.run_exclusive(|| async { Err("boom") }).await;
        assert!(result.is_err());
        assert!(!mutex.is_locked());
    }

    #[tokio::test]
    async fn test_fifo_ordering_with_slow_first_operation() {
        let mutex = Arc::new(FifoMutex::new());
        let order = Arc::new(Mutex::new(Vec::new()));
        let started = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for index in 0..3usize {
            let mutex = mutex.clone();
            let order = order.clone();
            let started = started.clone();
            handles.push(tokio::spawn(async move {
                // Stagger the starts so the queue order is deterministic.
                while started.load(Ordering::SeqCst) != index {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                let guard = mutex.acquire().await;
                started.fetch_add(1, Ordering::SeqCst);
                // The first operation is the slowest.
                if index == 0 {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                order.lock().unwrap().push(index);
                drop(guard);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_handoff_never_appears_free() {
        let mutex = Arc::new(FifoMutex::new());
        let guard = mutex.acquire().await;

        let waiter = {
            let mutex = mutex.clone();
            tokio::spawn(async move {
                let _guard = mutex.acquire().await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        // Let the waiter queue up, then release: the lock must pass straight
        // to the waiter without a try_acquire window.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(mutex.queue_len(), 1);
        drop(guard);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(mutex.try_acquire().is_none());
        waiter.await.unwrap();
        assert!(!mutex.is_locked());
    }

    #[tokio::test]
    async fn test_cancelled_waiter_is_skipped() {
        let mutex = Arc::new(FifoMutex::new());
        let guard = mutex.acquire().await;

        let cancelled = {
            let mutex = mutex.clone();
            tokio::spawn(async move {
                let _guard = mutex.acquire().await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancelled.abort();
        let _ = cancelled.await;

        drop(guard);
        // The aborted waiter must not strand the lock.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(mutex.try_acquire().is_some());
    }
}
