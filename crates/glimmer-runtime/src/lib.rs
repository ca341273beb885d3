//! Glimmer Runtime - Host loop infrastructure
//!
//! Provides the single-threaded cooperative building blocks that drive a
//! mounted animation:
//! - `Cadence` - fixed-period due-time tracker
//! - `Host` - virtual-time event loop with frame timers, interval timers and
//!   resize notifications
//! - `TimerHandle` / `ListenerHandle` - RAII cancellation handles
//! - `Component` - trait for anything mounted on a host

mod clock;
mod host;
mod system;

pub use clock::Cadence;
pub use host::{Host, HostEvent, ListenerHandle, ListenerId, TimerHandle, TimerId};
pub use system::Component;
