//! Package stockpiles and queue strategies.

use crate::error::QueueError;
use crate::package::Package;
use std::collections::VecDeque;

/// Retrieval strategy for a [`PackageQueue`].
///
/// Insertion is always at the tail; the strategy only decides which
/// end `pop` takes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    /// Retrieve the oldest-inserted package.
    Fifo,
    /// Retrieve the newest-inserted package.
    Lifo,
}

/// Ordered package container with a fixed retrieval strategy.
///
/// Backs both a worker's input queue and a storehouse's stockpile.
/// Iteration is always oldest-to-newest regardless of strategy, for
/// reporting.
#[derive(Debug)]
pub struct PackageQueue {
    queue_type: QueueType,
    packages: VecDeque<Package>,
}

impl PackageQueue {
    /// Create an empty queue with the given strategy.
    pub fn new(queue_type: QueueType) -> Self {
        Self {
            queue_type,
            packages: VecDeque::new(),
        }
    }

    /// Append a package at the tail. O(1).
    pub fn push(&mut self, package: Package) {
        self.packages.push_back(package);
    }

    /// Remove a package according to the strategy. O(1).
    ///
    /// Fails with [`QueueError::Empty`] on an empty queue; callers
    /// check [`is_empty`](Self::is_empty) first.
    pub fn pop(&mut self) -> Result<Package, QueueError> {
        let package = match self.queue_type {
            QueueType::Fifo => self.packages.pop_front(),
            QueueType::Lifo => self.packages.pop_back(),
        };
        package.ok_or(QueueError::Empty)
    }

    /// The configured retrieval strategy.
    pub fn queue_type(&self) -> QueueType {
        self.queue_type
    }

    /// Number of stored packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the queue holds no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate stored packages oldest-to-newest.
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }
}
