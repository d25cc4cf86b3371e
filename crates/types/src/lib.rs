//! Shared types for the production network simulator.
//!
//! Everything that crosses a crate boundary by value lives here:
//! identifier newtypes, time aliases, and the receiver handle used by
//! the routing layer to refer to nodes without owning them.

mod identifiers;

pub use identifiers::{NodeId, PackageId, ReceiverId, ReceiverKind};

/// One discrete simulation time step. Rounds are 1-based: the first
/// round of a run is round 1.
pub type Round = u64;

/// A span measured in rounds (delivery interval, processing duration).
pub type TimeOffset = u64;
