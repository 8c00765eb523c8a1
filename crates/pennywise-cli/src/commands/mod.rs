//! CLI command implementations
//!
//! - `analyze` - Offline analysis of exported records (analyze, recommend)
//! - `serve` - Web server command

pub mod analyze;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use serve::*;
