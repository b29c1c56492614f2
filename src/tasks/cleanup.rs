//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Something the cleanup task can sweep.
pub trait Sweep: Send + Sync + 'static {
    /// Removes expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

// == Cleanup Handle ==
/// Owner of a running cleanup task.
///
/// Dropping the handle closes the shutdown channel, which stops the task at
/// its next wake-up.
#[derive(Debug)]
pub struct CleanupHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CleanupHandle {
    /// Signals the task and waits until it has exited.
    pub async fn stop(self) {
        // The task may already be gone if its target was dropped.
        let _ = self.shutdown.send(());

        if let Err(err) = self.task.await {
            warn!("TTL cleanup task ended abnormally: {}", err);
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that periodically sweeps `target`.
///
/// The task holds only a weak reference, so it never keeps a cache alive; it
/// exits once the target is dropped, the handle is stopped, or the handle is
/// dropped. A panic inside one sweep is caught and logged, and the next tick
/// sweeps again.
///
/// Returns None when `interval` is zero or there is no tokio runtime to run on.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(Arc::downgrade(&shared), Duration::from_secs(60));
/// // Later, during shutdown:
/// if let Some(handle) = handle {
///     handle.stop().await;
/// }
/// ```
pub fn spawn_cleanup_task<S: Sweep>(target: Weak<S>, interval: Duration) -> Option<CleanupHandle> {
    if interval.is_zero() {
        debug!("TTL cleanup disabled (zero interval)");
        return None;
    }

    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(runtime) => runtime,
        Err(_) => {
            warn!("No tokio runtime available; TTL cleanup falls back to lazy expiry");
            return None;
        }
    };

    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let task = runtime.spawn(async move {
        debug!("Starting TTL cleanup task with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {}
            }

            let Some(target) = target.upgrade() else {
                break;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| target.sweep())) {
                Ok(0) => debug!("TTL cleanup: no expired entries found"),
                Ok(removed) => info!("TTL cleanup: removed {} expired entries", removed),
                Err(_) => warn!("TTL cleanup: sweep panicked, retrying next tick"),
            }
        }

        debug!("TTL cleanup task stopped");
    });

    Some(CleanupHandle { shutdown, task })
}
