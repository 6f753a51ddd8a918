//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the dome software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Status codes and states reported by the dome daemon
pub mod dome;
