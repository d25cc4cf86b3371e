//! Simulation core for the production network.
//!
//! Packages originate at ramps, flow probabilistically through workers,
//! and accumulate in storehouses, one discrete round at a time. This
//! crate holds everything with algorithmic content:
//!
//! - [`PackageIdPool`] — unique-id lifecycle with a free list
//! - [`PackageQueue`] — FIFO/LIFO stockpile strategies
//! - [`ReceiverPreferences`] — always-normalized weighted routing
//! - [`Ramp`], [`Worker`], [`Storehouse`] — the per-round node state
//!   machines, composed from sender/receiver capabilities
//! - [`NodeCollection`] — stable-identity registries
//! - [`Factory`] — the orchestrator running the three per-round phases
//!   and the reachability-based consistency check
//!
//! The crate is single-threaded and fully deterministic once the
//! probability generator is seeded; the driver lives in
//! `netsim-simulation`.

mod error;
mod factory;
mod nodes;
mod package;
mod registry;
mod routing;
mod storage;

pub use error::QueueError;
pub use factory::Factory;
pub use nodes::{PackageReceiver, PackageSender, Ramp, Storehouse, Worker};
pub use package::{Package, PackageIdPool};
pub use registry::{Identifiable, NodeCollection};
pub use routing::{
    default_probability_generator, fixed_probability_generator, seeded_probability_generator,
    ProbabilityGenerator, ReceiverPreferences,
};
pub use storage::{PackageQueue, QueueType};
