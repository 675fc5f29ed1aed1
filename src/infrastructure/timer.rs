use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Owns the single deferred auto-logout task.
///
/// Arming always aborts the previously armed task first, so at most one task
/// is ever pending. A fired task leaves its finished handle in the slot;
/// `is_armed` reports only live tasks.
#[derive(Debug, Default)]
pub struct SessionTimer {
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `on_expire` to run after `delay`, replacing any pending task.
    pub fn arm<F>(&self, delay: Duration, on_expire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.take() {
            trace!("Aborting previously armed session timer");
            previous.abort();
        }
        debug!(delay_ms = delay.as_millis() as u64, "Arming session timer");
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire.await;
        }));
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.slot.lock().take() {
            debug!("Cancelling armed session timer");
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
