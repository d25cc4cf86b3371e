//! The factory orchestrator.
//!
//! Owns the three node registries plus the package id pool, runs the
//! three per-round phases in driver order (deliveries, routing, work),
//! and verifies network consistency: every ramp must have some path
//! through the routing graph to a storehouse.

use crate::nodes::{PackageReceiver, Ramp, Storehouse, Worker};
use crate::package::{Package, PackageIdPool};
use crate::registry::NodeCollection;
use netsim_types::{NodeId, ReceiverId, ReceiverKind, Round};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// DFS coloring for the consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeColor {
    /// Not yet explored from any path.
    Unvisited,
    /// On the current DFS path; re-entering means a cycle.
    InProgress,
    /// Known to reach a storehouse.
    Verified,
}

/// The production network: registries, orchestration, consistency.
///
/// All node mutation goes through the factory so that removing a
/// receiver also purges it from every sender's preferences, keeping
/// routing handles from dangling. Mutation is only valid between
/// simulation phases; the per-round entry points never change the
/// node set.
#[derive(Debug, Default)]
pub struct Factory {
    ramps: NodeCollection<Ramp>,
    workers: NodeCollection<Worker>,
    storehouses: NodeCollection<Storehouse>,
    package_ids: PackageIdPool,
}

impl Factory {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    // Structure management.

    /// Add a ramp.
    pub fn add_ramp(&mut self, ramp: Ramp) {
        self.ramps.add(ramp);
    }

    /// Add a worker.
    pub fn add_worker(&mut self, worker: Worker) {
        self.workers.add(worker);
    }

    /// Add a storehouse.
    pub fn add_storehouse(&mut self, storehouse: Storehouse) {
        self.storehouses.add(storehouse);
    }

    /// Remove a ramp. Ramps are never routing targets, so no purge is
    /// needed. Unknown ids are a no-op.
    pub fn remove_ramp(&mut self, id: NodeId) {
        self.ramps.remove_by_id(id);
    }

    /// Remove a worker, first purging it from every sender's
    /// preferences. Unknown ids are a no-op.
    pub fn remove_worker(&mut self, id: NodeId) {
        if !self.workers.contains(id) {
            return;
        }
        self.purge_receiver(ReceiverId::worker(id));
        self.workers.remove_by_id(id);
    }

    /// Remove a storehouse, first purging it from every sender's
    /// preferences. Unknown ids are a no-op.
    pub fn remove_storehouse(&mut self, id: NodeId) {
        if !self.storehouses.contains(id) {
            return;
        }
        self.purge_receiver(ReceiverId::storehouse(id));
        self.storehouses.remove_by_id(id);
    }

    /// Drop a receiver from every sender's routing table. Must run
    /// before the node itself is erased, or stale handles remain.
    fn purge_receiver(&mut self, receiver: ReceiverId) {
        for ramp in self.ramps.iter_mut() {
            ramp.sender_mut().preferences_mut().remove_receiver(receiver);
        }
        for worker in self.workers.iter_mut() {
            worker
                .sender_mut()
                .preferences_mut()
                .remove_receiver(receiver);
        }
    }

    /// Find a ramp by id.
    pub fn find_ramp_by_id(&self, id: NodeId) -> Option<&Ramp> {
        self.ramps.get(id)
    }

    /// Find a ramp by id, mutably (for wiring up receivers).
    pub fn find_ramp_by_id_mut(&mut self, id: NodeId) -> Option<&mut Ramp> {
        self.ramps.get_mut(id)
    }

    /// Find a worker by id.
    pub fn find_worker_by_id(&self, id: NodeId) -> Option<&Worker> {
        self.workers.get(id)
    }

    /// Find a worker by id, mutably (for wiring up receivers).
    pub fn find_worker_by_id_mut(&mut self, id: NodeId) -> Option<&mut Worker> {
        self.workers.get_mut(id)
    }

    /// Find a storehouse by id.
    pub fn find_storehouse_by_id(&self, id: NodeId) -> Option<&Storehouse> {
        self.storehouses.get(id)
    }

    /// Iterate ramps in registration order.
    pub fn ramps(&self) -> impl Iterator<Item = &Ramp> {
        self.ramps.iter()
    }

    /// Iterate workers in registration order.
    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    /// Iterate storehouses in registration order.
    pub fn storehouses(&self) -> impl Iterator<Item = &Storehouse> {
        self.storehouses.iter()
    }

    // Per-round phases, in driver order.

    /// Delivery phase: every ramp whose schedule fires buffers a fresh
    /// package.
    pub fn do_deliveries(&mut self, round: Round) {
        for ramp in self.ramps.iter_mut() {
            ramp.deliver_goods(round, &mut self.package_ids);
        }
    }

    /// Routing phase: every sender with a buffered package hands it to
    /// a chosen receiver — ramps first, then workers, each in
    /// registration order. Senders with no configured receivers keep
    /// their package for the next round.
    pub fn route(&mut self) {
        for id in self.ramps.ids() {
            let Some(ramp) = self.ramps.get_mut(id) else {
                continue;
            };
            if let Some((package, receiver)) = ramp.sender_mut().dispatch() {
                if let Some(package) = self.deliver(receiver, package) {
                    self.return_to_ramp(id, package, receiver);
                }
            }
        }

        for id in self.workers.ids() {
            let Some(worker) = self.workers.get_mut(id) else {
                continue;
            };
            if let Some((package, receiver)) = worker.sender_mut().dispatch() {
                if let Some(package) = self.deliver(receiver, package) {
                    self.return_to_worker(id, package, receiver);
                }
            }
        }
    }

    /// Work phase: every worker advances its state machine.
    pub fn do_work(&mut self, round: Round) {
        for worker in self.workers.iter_mut() {
            worker.do_work(round);
        }
    }

    /// Hand a package to the addressed receiver. Gives the package
    /// back when the handle does not resolve to a live node.
    fn deliver(&mut self, receiver: ReceiverId, package: Package) -> Option<Package> {
        match self.receiver_mut(receiver) {
            Some(node) => {
                trace!(%receiver, package = %package.id(), "routed package");
                node.receive(package);
                None
            }
            None => Some(package),
        }
    }

    fn return_to_ramp(&mut self, id: NodeId, package: Package, receiver: ReceiverId) {
        warn!(%receiver, ramp = %id, "chosen receiver no longer exists, package stays buffered");
        match self.ramps.get_mut(id) {
            Some(ramp) => ramp.sender_mut().rebuffer(package),
            None => self.package_ids.release(package),
        }
    }

    fn return_to_worker(&mut self, id: NodeId, package: Package, receiver: ReceiverId) {
        warn!(%receiver, worker = %id, "chosen receiver no longer exists, package stays buffered");
        match self.workers.get_mut(id) {
            Some(worker) => worker.sender_mut().rebuffer(package),
            None => self.package_ids.release(package),
        }
    }

    fn receiver_mut(&mut self, receiver: ReceiverId) -> Option<&mut dyn PackageReceiver> {
        match receiver.kind {
            ReceiverKind::Worker => self
                .workers
                .get_mut(receiver.node)
                .map(|w| w as &mut dyn PackageReceiver),
            ReceiverKind::Storehouse => self
                .storehouses
                .get_mut(receiver.node)
                .map(|s| s as &mut dyn PackageReceiver),
        }
    }

    // Lifecycle.

    /// Retire every package accumulated in a storehouse, returning
    /// their ids to the pool. Returns the number retired; unknown ids
    /// retire nothing.
    pub fn retire_storehouse_packages(&mut self, id: NodeId) -> usize {
        let Some(storehouse) = self.storehouses.get_mut(id) else {
            return 0;
        };
        let packages = storehouse.take_packages();
        let count = packages.len();
        for package in packages {
            self.package_ids.release(package);
        }
        debug!(storehouse = %id, count, "retired packages");
        count
    }

    // Consistency.

    /// Check that every ramp can reach at least one storehouse through
    /// the routing graph. Read-only.
    ///
    /// Depth-first search over the preference edges with three colors:
    /// a node re-entered while in progress is a dead end along that
    /// path only — it reverts to unvisited on backtrack so a different
    /// entry path can still verify it. A ramp with no receivers at all
    /// fails immediately.
    pub fn is_consistent(&self) -> bool {
        let mut colors: HashMap<NodeId, NodeColor> = HashMap::new();

        for ramp in self.ramps.iter() {
            let reached = ramp
                .sender()
                .preferences()
                .iter()
                .any(|(receiver, _)| self.reaches_storehouse(receiver, &mut colors));
            if !reached {
                debug!(ramp = %ramp.id(), "no path to any storehouse");
                return false;
            }
        }
        true
    }

    fn reaches_storehouse(
        &self,
        receiver: ReceiverId,
        colors: &mut HashMap<NodeId, NodeColor>,
    ) -> bool {
        match receiver.kind {
            ReceiverKind::Storehouse => self.storehouses.contains(receiver.node),
            ReceiverKind::Worker => self.worker_reaches_storehouse(receiver.node, colors),
        }
    }

    fn worker_reaches_storehouse(
        &self,
        id: NodeId,
        colors: &mut HashMap<NodeId, NodeColor>,
    ) -> bool {
        match colors.get(&id) {
            Some(NodeColor::Verified) => return true,
            Some(NodeColor::InProgress) => return false,
            Some(NodeColor::Unvisited) | None => {}
        }
        let Some(worker) = self.workers.get(id) else {
            return false;
        };

        colors.insert(id, NodeColor::InProgress);
        for (receiver, _) in worker.sender().preferences().iter() {
            if self.reaches_storehouse(receiver, colors) {
                colors.insert(id, NodeColor::Verified);
                return true;
            }
        }
        colors.insert(id, NodeColor::Unvisited);
        false
    }
}
