//! Utility library for the dome control software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod host;
pub mod logger;
pub mod params;
pub mod registry;
pub mod schema;
pub mod session;
pub mod time;
