//! Line-delimited JSON unit events → [`ControlPlane`].
//!
//! One event per line:
//! ```text
//! {"event":"added","id":"log-1","type":"input","config":{"type":"log","streams":[...]}}
//! {"event":"modified","id":"log-1","type":"input","state":"STOPPED"}
//! {"event":"removed","id":"log-1","type":"input"}
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;

use crate::client::channel::ControlPlane;
use crate::client::types::{UnitConfig, UnitId, UnitLogLevel, UnitState, UnitType};
use crate::client::unit::{ManagedUnit, Unit};
use crate::client::{ClientError, UnitChangeKind};

/// Errors that end the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read unit events: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A single unit event as written on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitEvent {
    pub event: UnitChangeKind,
    pub id: UnitId,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    #[serde(default = "default_state")]
    pub state: UnitState,
    #[serde(default)]
    pub log_level: UnitLogLevel,
    /// Omitted on a modification: the unit keeps its previous configuration.
    #[serde(default)]
    pub config: Option<UnitConfig>,
}

fn default_state() -> UnitState {
    UnitState::Healthy
}

/// Read events until EOF or shutdown, forwarding each to `plane`.
///
/// Returns the number of events forwarded. Malformed lines are logged and
/// skipped.
pub async fn feed_lines<R>(
    reader: R,
    plane: ControlPlane,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<usize, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut units: HashMap<UnitId, Arc<ManagedUnit>> = HashMap::new();
    let mut forwarded = 0;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.recv() => break,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: UnitEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed unit event");
                continue;
            }
        };

        if apply_event(event, &mut units, &plane)? {
            forwarded += 1;
        }
    }

    tracing::debug!(forwarded, "Unit event feed finished");
    Ok(forwarded)
}

fn apply_event(
    event: UnitEvent,
    units: &mut HashMap<UnitId, Arc<ManagedUnit>>,
    plane: &ControlPlane,
) -> Result<bool, ClientError> {
    match event.event {
        UnitChangeKind::Added => {
            let unit = new_unit(&event);
            units.insert(event.id, unit.clone());
            plane.added(unit)?;
        }
        UnitChangeKind::Modified => {
            let unit = match units.get(&event.id) {
                Some(unit) => {
                    let config = match event.config {
                        Some(config) => config,
                        None => unit.expected().config.as_ref().clone(),
                    };
                    unit.set_expected(event.state, event.log_level, config);
                    unit.clone()
                }
                None => {
                    let unit = new_unit(&event);
                    units.insert(event.id, unit.clone());
                    unit
                }
            };
            plane.modified(unit)?;
        }
        UnitChangeKind::Removed => match units.remove(&event.id) {
            Some(unit) => {
                unit.mark_removed();
                plane.removed(unit)?;
            }
            None => {
                tracing::warn!(unit_id = %event.id, "Ignoring removal of unknown unit");
                return Ok(false);
            }
        },
    }
    Ok(true)
}

fn new_unit(event: &UnitEvent) -> Arc<ManagedUnit> {
    Arc::new(
        ManagedUnit::new(
            event.id.clone(),
            event.unit_type,
            event.state,
            event.config.clone().unwrap_or_default(),
        )
        .with_log_level(event.log_level),
    )
}
