//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, [management] table)
//!     → loader.rs (parse & deserialize)
//!     → ManagementConfig
//!     → UnitManager::new (enabled flag decides whether the client is kept)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file means "unmanaged"
//! - Unit configuration itself arrives from the control plane, never from disk

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{AgentIdentity, ManagementConfig, Settings};
