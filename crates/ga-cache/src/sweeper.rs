// sweeper.rs — Background TTL sweep with an explicit lifecycle.
//
// The sweeper bounds memory under low query volume: without it, expired
// entries linger until the next lookup touches them. It is an owned object
// with explicit start/stop — constructed once at process start and shut
// down on exit, never a process-wide global.
//
// Each tick removes at most one bounded batch, so the cache lock is never
// held long enough to starve foreground lookups.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::cache::PermissionCache;

/// Handle to the background sweep thread. Stops on `stop()` or drop.
pub struct CacheSweeper {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl CacheSweeper {
    /// Spawn the sweep thread. Every `interval` it scans up to `batch`
    /// entries and removes the expired ones.
    pub fn start(
        cache: Arc<PermissionCache>,
        interval: Duration,
        batch: usize,
    ) -> std::io::Result<Self> {
        let (shutdown, ticks) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("ga-cache-sweeper".to_string())
            .spawn(move || loop {
                match ticks.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let removed = cache.purge_expired(batch);
                        if removed > 0 {
                            debug!(removed, "cache sweep removed expired entries");
                        }
                    }
                    // Shutdown signal or sender dropped — either way, done.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        // Send fails only if the thread already exited; joining still works.
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
