//! Deterministic simulation driver.
//!
//! Runs a [`Factory`](netsim_engine::Factory) for a fixed number of
//! rounds, invoking an observer hook after every completed round.
//! Given the same network and a seeded probability generator, a run
//! produces identical results every time.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 simulate(f, n)               │
//! │                                              │
//! │  for round in 1..=n:                         │
//! │      f.do_deliveries(round)   ramps emit     │
//! │      f.route()                senders route  │
//! │      f.do_work(round)         workers work   │
//! │      observer(&f, round)      read-only      │
//! └──────────────────────────────────────────────┘
//! ```

mod runner;

pub use runner::{simulate, SimulationError};
