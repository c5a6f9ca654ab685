//! Fatal simulation faults surfaced to the caller.

use std::fmt;

use bevy_ecs::prelude::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The world no longer satisfies the dispatch invariants (an owned
    /// picked-up order changed hands, or a driver exceeded capacity).
    /// The run aborts with this diagnostic.
    StateCorruption(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::StateCorruption(detail) => {
                write!(f, "simulation state corrupted: {detail}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Set by systems when they detect a fatal inconsistency; the runner checks
/// it after every tick and aborts the run.
#[derive(Debug, Default, Resource)]
pub struct SimFault(pub Option<DispatchError>);
