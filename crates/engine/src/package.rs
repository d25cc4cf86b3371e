//! Package identity and the id pool.

use netsim_types::PackageId;
use std::collections::BTreeSet;

/// A product flowing through the network.
///
/// Deliberately neither `Clone` nor `Copy`: a package's id is unique
/// among live packages, and duplicating the value would duplicate the
/// identity. Ownership moves from ramp buffer to queue to slot to
/// storehouse, and finally back into the pool via
/// [`PackageIdPool::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct Package {
    id: PackageId,
}

impl Package {
    /// The package's id.
    pub fn id(&self) -> PackageId {
        self.id
    }
}

/// Allocator for package ids.
///
/// Ids start at 1 and grow monotonically; retired ids land on a free
/// list and are handed out again lowest-first. The pool is an explicit
/// value owned by the factory rather than process-global state, so
/// independent simulations (and tests) never share an allocator.
#[derive(Debug, Default)]
pub struct PackageIdPool {
    /// Highest id ever assigned, freed or not.
    high_water: u64,
    /// Retired ids available for reuse.
    freed: BTreeSet<u64>,
}

impl PackageIdPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a package with the lowest available id: the smallest
    /// freed id if any, otherwise one past the highest ever assigned.
    pub fn create(&mut self) -> Package {
        let id = match self.freed.pop_first() {
            Some(id) => id,
            None => {
                self.high_water += 1;
                self.high_water
            }
        };
        Package { id: PackageId(id) }
    }

    /// Create a package with a caller-chosen id, removing it from the
    /// free list if present. Used when rebuilding a network from an
    /// external description that already fixed the ids.
    pub fn create_with_id(&mut self, id: PackageId) -> Package {
        self.freed.remove(&id.0);
        self.high_water = self.high_water.max(id.0);
        Package { id }
    }

    /// Retire a package, returning its id to the free list.
    pub fn release(&mut self, package: Package) {
        self.freed.insert(package.id.0);
    }
}
