// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Per-run progress and cancellation.
//!
//! A [`Progress`] belongs to one embedding run. Share it by reference (or in
//! an `Arc`) between the run, which ticks it once per block from any rayon
//! worker, and whoever polls or cancels it. Independent runs use independent
//! handles and never see each other's counts or cancel requests.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::{GboError, Result};

/// Block counter plus cancel flag for one run.
#[derive(Debug, Default)]
pub struct Progress {
    done: AtomicU32,
    total: AtomicU32,
    cancelled: AtomicBool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of blocks and zero the counter. A cancel request made
    /// before the run started stays in force.
    pub fn start(&self, total: u32) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    /// Count one finished block, never past the total.
    pub fn tick(&self) {
        let total = self.total.load(Ordering::Relaxed);
        let _ = self.done.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| (d < total).then_some(d + 1));
    }

    /// Mark every block done.
    pub fn complete(&self) {
        self.done.store(self.total.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// `(blocks done, total blocks)`.
    pub fn snapshot(&self) -> (u32, u32) {
        (self.done.load(Ordering::Relaxed), self.total.load(Ordering::Relaxed))
    }

    /// Ask the run to stop at the next block boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// # Errors
    /// [`GboError::Cancelled`] once [`Progress::cancel`] has been called.
    pub fn ensure_running(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(GboError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ticks_stop_at_total() {
        let p = Progress::new();
        p.start(3);
        for _ in 0..10 {
            p.tick();
        }
        assert_eq!(p.snapshot(), (3, 3));
        p.start(5);
        p.tick();
        assert_eq!(p.snapshot(), (1, 5));
        p.complete();
        assert_eq!(p.snapshot(), (5, 5));
    }

    #[test]
    fn cancel_survives_restart() {
        let p = Progress::new();
        assert!(p.ensure_running().is_ok());
        p.cancel();
        p.start(2);
        assert_eq!(p.ensure_running(), Err(GboError::Cancelled));
    }

    #[test]
    fn handles_are_independent() {
        let a = Arc::new(Progress::new());
        let b = Progress::new();
        a.start(400);
        b.start(7);
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let a = Arc::clone(&a);
                thread::spawn(move || (0..100).for_each(|_| a.tick()))
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        a.cancel();
        assert_eq!(a.snapshot(), (400, 400));
        assert_eq!(b.snapshot(), (0, 7));
        assert!(!b.is_cancelled());
    }
}
