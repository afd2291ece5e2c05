// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Work that must not block the host's UI thread.
//!
//! Jobs run on detached threads and hand results back through a channel.
//! The UI thread drains it on a timer; nothing else crosses threads.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the owner should call [`BackgroundQueue::drain`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct BackgroundQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    alive: Arc<AtomicBool>,
}

impl<T: Send + 'static> Default for BackgroundQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> BackgroundQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Runs `job` on a named, detached thread. Its result is queued unless
    /// the queue was shut down in the meantime.
    pub fn spawn<F>(&self, name: &str, job: F) -> Result<()>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let tx = self.tx.clone();
        let alive = Arc::clone(&self.alive);
        let thread_name = name.to_string();

        thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let result = job();
                if !alive.load(Ordering::Acquire) {
                    log::debug!("Discarding result of {}; owner is gone", thread_name);
                    return;
                }
                // The receiver lives as long as the queue; a failed send
                // only means the owner dropped it.
                let _ = tx.send(result);
            })
            .with_context(|| format!("Failed to spawn background thread {}", name))?;
        Ok(())
    }

    /// Everything that arrived since the last call. Empty after shutdown.
    pub fn drain(&self) -> Vec<T> {
        if !self.is_alive() {
            return Vec::new();
        }
        self.rx.try_iter().collect()
    }

    /// Drains every [`POLL_INTERVAL`] until something arrives or `timeout` passes.
    pub fn wait(&self, timeout: Duration) -> Vec<T> {
        let deadline = Instant::now() + timeout;
        loop {
            let items = self.drain();
            if !items.is_empty() || !self.is_alive() || Instant::now() >= deadline {
                return items;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Stops consulting workers. Running jobs finish but their results are dropped.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl<T> Drop for BackgroundQueue<T> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
