//! Enumeration types shared across the pelagic workspace.

use serde::{Deserialize, Serialize};

/// The kinds of lifecycle/action events a FAD manager dispatches.
///
/// Observers subscribe per kind; regulations and monitoring collaborators
/// use the same channel. The full payloads live in the device crate --
/// this enum is only the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A device was deployed at a cell (one unit of stock consumed).
    Deployed,
    /// A device passed its turn-off threshold and stopped attracting.
    Deactivated,
    /// A device was lost (sunk, removed by regulation, etc.).
    Lost,
    /// A device was fished: its held biology became a catch.
    Fished,
    /// Held fish were discarded rather than transferred back to a cell.
    BiomassLost,
}

impl EventKind {
    /// All event kinds, in dispatch-registry order.
    pub const ALL: [Self; 5] = [
        Self::Deployed,
        Self::Deactivated,
        Self::Lost,
        Self::Fished,
        Self::BiomassLost,
    ];
}
