//! Mounted component trait

use crate::host::{Host, HostEvent};
use glimmer_core::Result;

/// Something mounted on a [`Host`] and driven by its events
///
/// A component registers its own timers and listeners when it is created and
/// releases all of them in `teardown`. After teardown, `handle` must not
/// mutate any state.
pub trait Component {
    /// Called for every event the host delivers, in wall-clock order
    fn handle(&mut self, host: &Host, event: &HostEvent) -> Result<()>;

    /// Cancel every timer and listener. Must be idempotent.
    fn teardown(&mut self);

    /// Whether the component still holds live timers
    fn is_running(&self) -> bool;

    /// Human-readable name for this component
    fn name(&self) -> &str;
}
