//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     manager stop callback / Ctrl-C → Shutdown::trigger
//!     → every subscriber (stdin feeder, main task) winds down
//! ```
//!
//! # Design Decisions
//! - The manager never exits the process itself; it only fires the stop
//!   callback, and the host decides what termination means

pub mod shutdown;

pub use shutdown::Shutdown;
