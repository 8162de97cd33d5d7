//! Dragline Common Utilities
//!
//! Shared infrastructure for all Dragline crates:
//! - Error types and result aliases
//! - Clocks that drive the drag-start delay timer
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
