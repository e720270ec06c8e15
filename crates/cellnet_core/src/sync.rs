//! Lock acquisition with potential-deadlock reporting.
//!
//! Debug builds acquire with a timeout that grows by ten seconds on every
//! failed round and warn whenever the longest wait seen so far grows.
//! Release builds lock directly. Neither ever gives up.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

static TIMES_WAITED: AtomicU64 = AtomicU64::new(0);
static MAX_WAITED_SECS: AtomicU64 = AtomicU64::new(0);

/// Process-wide lock contention counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockWaitStats {
    /// Timed-out acquisition rounds.
    pub times_waited: u64,
    /// Longest single round that timed out, in seconds.
    pub max_waited_secs: u64,
}

#[must_use]
pub fn lock_wait_stats() -> LockWaitStats {
    LockWaitStats {
        times_waited: TIMES_WAITED.load(Ordering::Relaxed),
        max_waited_secs: MAX_WAITED_SECS.load(Ordering::Relaxed),
    }
}

/// Locks `mutex`, logging slow acquisitions in debug builds.
#[cfg(debug_assertions)]
pub fn lock_watched<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    use std::time::Duration;

    let mut wait = Duration::from_secs(1);
    loop {
        if let Some(guard) = mutex.try_lock_for(wait) {
            return guard;
        }
        TIMES_WAITED.fetch_add(1, Ordering::Relaxed);
        let secs = wait.as_secs();
        if MAX_WAITED_SECS.fetch_max(secs, Ordering::Relaxed) < secs {
            tracing::warn!(
                lock = name,
                max_waited_secs = secs,
                "Potential deadlock, still waiting for lock"
            );
        }
        wait += Duration::from_secs(10);
    }
}

/// Locks `mutex`.
#[cfg(not(debug_assertions))]
pub fn lock_watched<'a, T>(mutex: &'a Mutex<T>, _name: &str) -> MutexGuard<'a, T> {
    mutex.lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_uncontended_lock() {
        let m = Mutex::new(5);
        *lock_watched(&m, "test") += 1;
        assert_eq!(*m.lock(), 6);
    }

    #[test]
    fn test_contended_lock_eventually_acquired() {
        let m = Arc::new(Mutex::new(0u32));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&m);
                thread::spawn(move || {
                    for _ in 0..100 {
                        *lock_watched(&m, "counter") += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*m.lock(), 400);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_slow_acquisition_is_counted() {
        let m = Arc::new(Mutex::new(()));
        let guard = m.lock();
        let waiter = {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                let _g = lock_watched(&m, "held");
            })
        };
        thread::sleep(std::time::Duration::from_millis(1500));
        drop(guard);
        waiter.join().unwrap();

        let stats = lock_wait_stats();
        assert!(stats.times_waited >= 1);
        assert!(stats.max_waited_secs >= 1);
    }
}
