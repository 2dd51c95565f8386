//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! manager / event loop / reload tasks produce:
//!     → logging.rs (structured tracing events: unit_id, unit_type, state)
//!     → metrics.rs (event, reload outcome and registry size metrics)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the host binary installs the subscriber
//! - Metrics go through the `metrics` facade, no exporter is bundled

pub mod logging;
pub mod metrics;
