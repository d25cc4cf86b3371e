//! Weighted receiver selection.
//!
//! Every sender owns a [`ReceiverPreferences`]: a weighted set of
//! candidate receivers whose weights always sum to 1.0. Selection walks
//! the entries in insertion order accumulating weight, which makes a
//! run fully reproducible once the probability generator is fixed.

use indexmap::IndexMap;
use netsim_types::ReceiverId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Injectable source of routing randomness.
///
/// A zero-argument closure returning a draw in `[0, 1)`. The handle is
/// cheaply cloneable so one generator can be shared across every sender
/// in a network, which pins down the exact draw order for reproducible
/// runs (the simulation is single-threaded, hence `Rc<RefCell<..>>`).
pub type ProbabilityGenerator = Rc<RefCell<dyn FnMut() -> f64>>;

/// Entropy-seeded generator; the default for new preferences.
pub fn default_probability_generator() -> ProbabilityGenerator {
    let mut rng = ChaCha8Rng::from_entropy();
    Rc::new(RefCell::new(move || rng.gen::<f64>()))
}

/// Generator seeded for deterministic replay. Same seed, same draws.
pub fn seeded_probability_generator(seed: u64) -> ProbabilityGenerator {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Rc::new(RefCell::new(move || rng.gen::<f64>()))
}

/// Generator returning the same value on every draw. Test scaffolding
/// for scripting exact routing decisions.
pub fn fixed_probability_generator(p: f64) -> ProbabilityGenerator {
    Rc::new(RefCell::new(move || p))
}

/// Weighted, always-normalized set of candidate receivers.
///
/// Invariant: whenever the set is non-empty, each of the N entries
/// carries weight `1/N`, so the total is 1.0 up to float rounding.
/// Adding or removing a receiver renormalizes every entry.
pub struct ReceiverPreferences {
    /// Insertion order doubles as the deterministic walk order for
    /// selection.
    preferences: IndexMap<ReceiverId, f64>,
    generator: ProbabilityGenerator,
}

impl ReceiverPreferences {
    /// Create an empty set drawing from the given generator.
    pub fn new(generator: ProbabilityGenerator) -> Self {
        Self {
            preferences: IndexMap::new(),
            generator,
        }
    }

    /// Insert a receiver and renormalize all entries to `1/N`.
    /// Re-adding a known receiver just renormalizes.
    pub fn add_receiver(&mut self, receiver: ReceiverId) {
        self.preferences.insert(receiver, 1.0);
        self.rebalance();
    }

    /// Erase a receiver and renormalize the rest to `1/(N-1)`.
    /// Unknown receivers and the empty set are no-ops.
    pub fn remove_receiver(&mut self, receiver: ReceiverId) {
        // shift_remove keeps the walk order of the remaining entries.
        self.preferences.shift_remove(&receiver);
        self.rebalance();
    }

    fn rebalance(&mut self) {
        if self.preferences.is_empty() {
            return;
        }
        let weight = 1.0 / self.preferences.len() as f64;
        for value in self.preferences.values_mut() {
            *value = weight;
        }
    }

    /// Pick a receiver from the weighted distribution.
    ///
    /// Draws `p` from the generator and returns the first entry whose
    /// cumulative weight reaches `p`. If float drift exhausts the walk
    /// without a match, the last entry is the safety-net fallback.
    /// Returns `None` only when the set is empty.
    pub fn choose_receiver(&self) -> Option<ReceiverId> {
        let p = (&mut *self.generator.borrow_mut())();
        let mut cumulative = 0.0;

        for (&receiver, &weight) in &self.preferences {
            cumulative += weight;
            if p <= cumulative {
                return Some(receiver);
            }
        }

        // Numerical-error fallback: the walk can only get here when the
        // accumulated weights rounded below the drawn value.
        self.preferences.keys().last().copied()
    }

    /// Weight of a specific receiver, if present.
    pub fn weight(&self, receiver: ReceiverId) -> Option<f64> {
        self.preferences.get(&receiver).copied()
    }

    /// Iterate `(receiver, weight)` entries in walk order.
    pub fn iter(&self) -> impl Iterator<Item = (ReceiverId, f64)> + '_ {
        self.preferences.iter().map(|(&r, &w)| (r, w))
    }

    /// Number of candidate receivers.
    pub fn len(&self) -> usize {
        self.preferences.len()
    }

    /// Whether no receivers are configured.
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
    }
}

impl std::fmt::Debug for ReceiverPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverPreferences")
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}
