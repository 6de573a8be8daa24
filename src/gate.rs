// src/gate.rs
//! Non-blocking mutual exclusion for gather cycles

use std::sync::atomic::{AtomicBool, Ordering};

/// A try-only lock: acquiring never waits, it either wins or reports
/// contention.
#[derive(Debug, Default)]
pub struct ExclusiveGate {
    held: AtomicBool,
}

impl ExclusiveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the gate held. Returns `false` immediately if it already is.
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Clear the held mark.
    ///
    /// # Panics
    ///
    /// Panics if the gate is not held; that is a lock-discipline bug in the caller.
    pub fn release(&self) {
        if self
            .held
            .compare_exchange(true, false, Ordering::Release, Ordering::Relaxed)
            .is_err()
        {
            panic!("release of an ExclusiveGate that is not held");
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Acquire and return a guard that releases on drop.
    pub fn try_enter(&self) -> Option<GateGuard<'_>> {
        if self.try_acquire() {
            Some(GateGuard { gate: self })
        } else {
            None
        }
    }
}

/// Held gate; released when dropped, including on unwind.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a ExclusiveGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{atomic::AtomicUsize, Arc, Barrier},
        thread,
    };

    #[test]
    fn test_acquire_release_cycle() {
        let gate = ExclusiveGate::new();
        assert!(!gate.is_held());
        assert!(gate.try_acquire());
        assert!(gate.is_held());
        assert!(!gate.try_acquire());
        gate.release();
        assert!(!gate.is_held());
        assert!(gate.try_acquire());
    }

    #[test]
    #[should_panic(expected = "not held")]
    fn test_release_without_acquire_panics() {
        ExclusiveGate::new().release();
    }

    #[test]
    #[should_panic(expected = "not held")]
    fn test_double_release_panics() {
        let gate = ExclusiveGate::new();
        assert!(gate.try_acquire());
        gate.release();
        gate.release();
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let gate = ExclusiveGate::new();
        {
            let _guard = gate.try_enter().unwrap();
            assert!(gate.is_held());
            assert!(gate.try_enter().is_none());
        }
        assert!(!gate.is_held());
        assert!(gate.try_enter().is_some());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let gate = Arc::new(ExclusiveGate::new());
        let inner = Arc::clone(&gate);
        let result = thread::spawn(move || {
            let _guard = inner.try_enter().unwrap();
            panic!("gather blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(!gate.is_held());
    }

    #[test]
    fn test_two_contenders_never_both_win() {
        for _ in 0..1_000 {
            let gate = Arc::new(ExclusiveGate::new());
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let gate = Arc::clone(&gate);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        gate.try_acquire()
                    })
                })
                .collect();
            let wins = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);
        }
    }

    #[test]
    fn test_at_most_one_holder_under_contention() {
        let gate = Arc::new(ExclusiveGate::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let entered = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let inside = Arc::clone(&inside);
                let entered = Arc::clone(&entered);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..2_000 {
                        if let Some(_guard) = gate.try_enter() {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            entered.fetch_add(1, Ordering::SeqCst);
                            inside.fetch_sub(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(entered.load(Ordering::SeqCst) > 0);
        assert!(!gate.is_held());
    }
}
