//! Node variants and their per-round state machines.
//!
//! Sending and receiving are independent capabilities: [`Ramp`] only
//! sends, [`Storehouse`] only receives, [`Worker`] does both. The
//! sending side is the concrete [`PackageSender`] embedded in each
//! sending variant; the receiving side is the [`PackageReceiver`]
//! trait, dispatched by the factory through [`ReceiverId`] handles.

use crate::package::{Package, PackageIdPool};
use crate::registry::Identifiable;
use crate::routing::{ProbabilityGenerator, ReceiverPreferences};
use crate::storage::{PackageQueue, QueueType};
use netsim_types::{NodeId, ReceiverId, Round, TimeOffset};
use tracing::{debug, trace};

/// Common sending capability: one buffered outgoing package plus the
/// weighted routing table deciding where it goes.
#[derive(Debug)]
pub struct PackageSender {
    buffer: Option<Package>,
    preferences: ReceiverPreferences,
}

impl PackageSender {
    /// Create a sender with an empty buffer drawing routing decisions
    /// from the given generator.
    pub fn new(generator: ProbabilityGenerator) -> Self {
        Self {
            buffer: None,
            preferences: ReceiverPreferences::new(generator),
        }
    }

    /// Place a package in the outgoing buffer.
    ///
    /// The buffer must be empty; node logic guarantees it never pushes
    /// over an unsent package.
    pub fn push_package(&mut self, package: Package) {
        debug_assert!(self.buffer.is_none(), "outgoing buffer already occupied");
        self.buffer = Some(package);
    }

    /// The buffered outgoing package, if any.
    pub fn buffered(&self) -> Option<&Package> {
        self.buffer.as_ref()
    }

    /// Whether a package is waiting to be sent.
    pub fn has_buffered(&self) -> bool {
        self.buffer.is_some()
    }

    /// Pair the buffered package with a chosen receiver handle.
    ///
    /// Returns `None` when the buffer is empty, or when no receivers
    /// are configured — in the latter case the package stays buffered
    /// and is retried next round. Actual delivery is the factory's
    /// job, since only it holds the receiving nodes.
    pub fn dispatch(&mut self) -> Option<(Package, ReceiverId)> {
        if self.buffer.is_none() {
            return None;
        }
        let receiver = self.preferences.choose_receiver()?;
        let package = self.buffer.take()?;
        Some((package, receiver))
    }

    /// Put a package back after a failed delivery.
    pub(crate) fn rebuffer(&mut self, package: Package) {
        self.buffer = Some(package);
    }

    /// The routing table, read-only.
    pub fn preferences(&self) -> &ReceiverPreferences {
        &self.preferences
    }

    /// The routing table, for wiring up receivers.
    pub fn preferences_mut(&mut self) -> &mut ReceiverPreferences {
        &mut self.preferences
    }
}

/// Common receiving capability, implemented by workers and storehouses.
///
/// Accepting a package is a pure side effect with no failure path; the
/// stockpile accessor exists for read-only occupancy reporting.
pub trait PackageReceiver {
    /// The node's id.
    fn id(&self) -> NodeId;

    /// Accept an incoming package.
    fn receive(&mut self, package: Package);

    /// The node's package store, for inspection.
    fn stockpile(&self) -> &PackageQueue;
}

/// Source node: originates packages at a fixed interval.
///
/// No input storage — a fresh package goes straight into the outgoing
/// buffer and is forwarded during the routing phase.
#[derive(Debug)]
pub struct Ramp {
    id: NodeId,
    delivery_interval: TimeOffset,
    sender: PackageSender,
}

impl Ramp {
    /// Create a ramp delivering every `delivery_interval` rounds.
    /// Intervals below 1 are clamped to 1.
    pub fn new(id: NodeId, delivery_interval: TimeOffset, generator: ProbabilityGenerator) -> Self {
        Self {
            id,
            delivery_interval: delivery_interval.max(1),
            sender: PackageSender::new(generator),
        }
    }

    /// The ramp's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Rounds between deliveries.
    pub fn delivery_interval(&self) -> TimeOffset {
        self.delivery_interval
    }

    /// Deliver a fresh package when the round calls for one.
    ///
    /// Delivers when `(round - 1) % delivery_interval == 0`, which
    /// always produces a package on round 1 regardless of interval.
    /// Rounds are 1-based; round 0 is a no-op. A delivery is skipped
    /// while an earlier package is still stuck in the buffer (no
    /// receivers configured), rather than displacing it.
    pub fn deliver_goods(&mut self, round: Round, pool: &mut PackageIdPool) {
        if round == 0 || (round - 1) % self.delivery_interval != 0 {
            return;
        }
        if self.sender.has_buffered() {
            debug!(ramp = %self.id, round, "skipping delivery, outgoing buffer still occupied");
            return;
        }
        let package = pool.create();
        trace!(ramp = %self.id, round, package = %package.id(), "delivered package");
        self.sender.push_package(package);
    }

    /// The sending capability, read-only.
    pub fn sender(&self) -> &PackageSender {
        &self.sender
    }

    /// The sending capability, for wiring and dispatch.
    pub fn sender_mut(&mut self) -> &mut PackageSender {
        &mut self.sender
    }
}

/// Processing node: queues incoming packages, processes one at a time
/// for a fixed duration, then forwards it.
#[derive(Debug)]
pub struct Worker {
    id: NodeId,
    processing_duration: TimeOffset,
    queue: PackageQueue,
    slot: Option<ProcessingSlot>,
    sender: PackageSender,
}

/// The package currently being processed and the round work started.
#[derive(Debug)]
struct ProcessingSlot {
    package: Package,
    started_at: Round,
}

impl Worker {
    /// Create a worker with the given input queue strategy.
    /// Durations below 1 are clamped to 1.
    pub fn new(
        id: NodeId,
        processing_duration: TimeOffset,
        queue_type: QueueType,
        generator: ProbabilityGenerator,
    ) -> Self {
        Self {
            id,
            processing_duration: processing_duration.max(1),
            queue: PackageQueue::new(queue_type),
            slot: None,
            sender: PackageSender::new(generator),
        }
    }

    /// The worker's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Rounds needed to process one package.
    pub fn processing_duration(&self) -> TimeOffset {
        self.processing_duration
    }

    /// The package currently in the processing slot, if any.
    pub fn processing(&self) -> Option<&Package> {
        self.slot.as_ref().map(|slot| &slot.package)
    }

    /// The round the current processing started, if busy.
    pub fn processing_started_at(&self) -> Option<Round> {
        self.slot.as_ref().map(|slot| slot.started_at)
    }

    /// Advance the worker's state machine by one round.
    ///
    /// An idle worker with a non-empty queue pulls one package into the
    /// slot (per the queue's strategy) and records `round` as the
    /// start. A busy worker finishes once
    /// `round - start >= processing_duration - 1`, moving the package
    /// to the outgoing buffer — unless the buffer still holds an
    /// unsent package, in which case completion waits for a later
    /// round instead of losing either package.
    pub fn do_work(&mut self, round: Round) {
        if self.slot.is_none() {
            if let Ok(package) = self.queue.pop() {
                trace!(worker = %self.id, round, package = %package.id(), "started processing");
                self.slot = Some(ProcessingSlot {
                    package,
                    started_at: round,
                });
            }
        }

        let finished = self
            .slot
            .as_ref()
            .is_some_and(|slot| round - slot.started_at >= self.processing_duration - 1);

        if finished {
            if self.sender.has_buffered() {
                debug!(worker = %self.id, round, "outgoing buffer occupied, holding finished package");
            } else if let Some(slot) = self.slot.take() {
                trace!(worker = %self.id, round, package = %slot.package.id(), "finished processing");
                self.sender.push_package(slot.package);
            }
        }
    }

    /// The sending capability, read-only.
    pub fn sender(&self) -> &PackageSender {
        &self.sender
    }

    /// The sending capability, for wiring and dispatch.
    pub fn sender_mut(&mut self) -> &mut PackageSender {
        &mut self.sender
    }
}

impl PackageReceiver for Worker {
    fn id(&self) -> NodeId {
        self.id
    }

    /// Enqueue an incoming package without disturbing current work.
    fn receive(&mut self, package: Package) {
        self.queue.push(package);
    }

    fn stockpile(&self) -> &PackageQueue {
        &self.queue
    }
}

/// Terminal node: accumulates packages forever (or until retired).
#[derive(Debug)]
pub struct Storehouse {
    id: NodeId,
    stockpile: PackageQueue,
}

impl Storehouse {
    /// Create a storehouse with the default FIFO stockpile.
    pub fn new(id: NodeId) -> Self {
        Self::with_stockpile(id, PackageQueue::new(QueueType::Fifo))
    }

    /// Create a storehouse over a specific stockpile.
    pub fn with_stockpile(id: NodeId, stockpile: PackageQueue) -> Self {
        Self { id, stockpile }
    }

    /// The storehouse's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Remove every stored package, oldest first.
    pub(crate) fn take_packages(&mut self) -> Vec<Package> {
        let mut packages = Vec::with_capacity(self.stockpile.len());
        while let Ok(package) = self.stockpile.pop() {
            packages.push(package);
        }
        packages
    }
}

impl PackageReceiver for Storehouse {
    fn id(&self) -> NodeId {
        self.id
    }

    fn receive(&mut self, package: Package) {
        self.stockpile.push(package);
    }

    fn stockpile(&self) -> &PackageQueue {
        &self.stockpile
    }
}

impl Identifiable for Ramp {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl Identifiable for Worker {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl Identifiable for Storehouse {
    fn id(&self) -> NodeId {
        self.id
    }
}
