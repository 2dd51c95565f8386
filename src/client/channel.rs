//! In-process control channel.
//!
//! `ChannelClient` is the consuming side handed to the manager; the paired
//! `ControlPlane` handle pushes lifecycle events into it. The host binary
//! feeds the handle from stdin, tests drive it directly.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use crate::client::types::AgentInfo;
use crate::client::unit::Unit;
use crate::client::{ClientError, ControlClient, UnitChange, UnitChangeKind};

/// Control client backed by an unbounded tokio channel.
pub struct ChannelClient {
    agent_info: AgentInfo,
    changes: Mutex<mpsc::UnboundedReceiver<UnitChange>>,
    closed: watch::Sender<bool>,
    started: AtomicBool,
}

/// Sending half of a [`ChannelClient`].
#[derive(Clone)]
pub struct ControlPlane {
    tx: mpsc::UnboundedSender<UnitChange>,
}

impl ChannelClient {
    /// Create a client and the handle that feeds it.
    pub fn new(agent_info: AgentInfo) -> (Self, ControlPlane) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);

        (
            Self {
                agent_info,
                changes: Mutex::new(rx),
                closed,
                started: AtomicBool::new(false),
            },
            ControlPlane { tx },
        )
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

#[async_trait]
impl ControlClient for ChannelClient {
    async fn start(&self) -> Result<(), ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        self.started.store(true, Ordering::SeqCst);
        tracing::debug!(agent_id = %self.agent_info.id, "Control channel started");
        Ok(())
    }

    fn stop(&self) {
        if !self.closed.send_replace(true) {
            tracing::debug!("Control channel closed");
        }
    }

    async fn next_change(&self) -> Option<UnitChange> {
        let mut closed = self.closed.subscribe();
        let already_closed = *closed.borrow();
        if already_closed {
            return None;
        }

        let mut changes = self.changes.lock().await;
        tokio::select! {
            biased;
            _ = closed.changed() => None,
            change = changes.recv() => change,
        }
    }

    fn agent_info(&self) -> AgentInfo {
        self.agent_info.clone()
    }
}

impl ControlPlane {
    pub fn send(&self, change: UnitChange) -> Result<(), ClientError> {
        self.tx.send(change).map_err(|_| ClientError::Disconnected)
    }

    pub fn added(&self, unit: Arc<dyn Unit>) -> Result<(), ClientError> {
        self.send(UnitChange::new(UnitChangeKind::Added, unit))
    }

    pub fn modified(&self, unit: Arc<dyn Unit>) -> Result<(), ClientError> {
        self.send(UnitChange::new(UnitChangeKind::Modified, unit))
    }

    pub fn removed(&self, unit: Arc<dyn Unit>) -> Result<(), ClientError> {
        self.send(UnitChange::new(UnitChangeKind::Removed, unit))
    }
}
