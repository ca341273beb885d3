//! CLI command implementations

pub mod frames;
pub mod render;
pub mod session;
pub mod stats;
pub mod watch;
