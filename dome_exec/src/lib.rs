//! # Dome control library
//!
//! Startup configuration for the dome daemon. Status codes and states reported by the daemon are
//! defined in `comms_if::dome`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Loading and validation of the daemon configuration file.
pub mod config;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use config::{BeltSensors, ConfigError, DomeConfig, SideLabels};
