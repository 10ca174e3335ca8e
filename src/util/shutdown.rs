use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative stop signal for a daemon instance.
///
/// Cloning the handle shares the underlying signal. Once triggered the signal
/// stays triggered, so a daemon started after the trigger returns right away.
#[derive(Clone, Debug)]
pub struct Shutdown(Arc<watch::Sender<bool>>);

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self(Arc::new(tx))
    }

    /// Request a stop. Calling this more than once has no further effect.
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Wait until the signal is triggered.
    pub async fn wait(&self) {
        let mut rx = self.0.subscribe();
        // the sender lives in `self` so the channel cannot close while waiting
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
