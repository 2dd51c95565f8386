//! Host-side stop signal.
//!
//! Fired by the manager's stop callback or by Ctrl-C; the stdin feeder and
//! the main task listen for it.

use tokio::sync::broadcast;

/// One-to-many stop signal. Clones fire the same channel, so a clone can be
/// moved into the manager's stop callback.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every current listener and return how many were reached.
    /// Listeners that subscribe afterwards do not see it.
    pub fn trigger(&self) -> usize {
        let reached = self.tx.send(()).unwrap_or(0);
        tracing::info!(listeners = reached, "Shutdown triggered");
        reached
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_from_clone_reaches_listeners() {
        let shutdown = Shutdown::new();
        let mut feeder = shutdown.subscribe();
        let mut main_task = shutdown.subscribe();

        let from_callback = shutdown.clone();
        assert_eq!(from_callback.trigger(), 2);

        assert!(feeder.recv().await.is_ok());
        assert!(main_task.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_listeners() {
        assert_eq!(Shutdown::new().trigger(), 0);
    }
}
