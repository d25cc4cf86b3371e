//! End-to-end simulation tests.
//!
//! These run whole networks through the driver and check the two
//! properties the engine is built around: packages flow from ramps to
//! storehouses at the rate the node timings dictate, and a seeded
//! generator makes the entire run reproducible.

use netsim_engine::{
    seeded_probability_generator, Factory, PackageReceiver, ProbabilityGenerator, QueueType, Ramp,
    Storehouse, Worker,
};
use netsim_simulation::{simulate, SimulationError};
use netsim_types::{NodeId, PackageId, ReceiverId, Round};
use tracing_test::traced_test;

fn link_ramp(factory: &mut Factory, ramp: u64, receiver: ReceiverId) {
    factory
        .find_ramp_by_id_mut(NodeId(ramp))
        .unwrap()
        .sender_mut()
        .preferences_mut()
        .add_receiver(receiver);
}

fn link_worker(factory: &mut Factory, worker: u64, receiver: ReceiverId) {
    factory
        .find_worker_by_id_mut(NodeId(worker))
        .unwrap()
        .sender_mut()
        .preferences_mut()
        .add_receiver(receiver);
}

/// Linear pipeline: one ramp, one worker, one storehouse, everything
/// driven by one shared generator.
fn pipeline(
    delivery_interval: u64,
    processing_duration: u64,
    generator: ProbabilityGenerator,
) -> Factory {
    let mut factory = Factory::new();
    factory.add_ramp(Ramp::new(NodeId(1), delivery_interval, generator.clone()));
    factory.add_worker(Worker::new(
        NodeId(2),
        processing_duration,
        QueueType::Fifo,
        generator,
    ));
    factory.add_storehouse(Storehouse::new(NodeId(3)));
    link_ramp(&mut factory, 1, ReceiverId::worker(NodeId(2)));
    link_worker(&mut factory, 2, ReceiverId::storehouse(NodeId(3)));
    factory
}

fn stored_ids(factory: &Factory, storehouse: u64) -> Vec<PackageId> {
    factory
        .find_storehouse_by_id(NodeId(storehouse))
        .unwrap()
        .stockpile()
        .iter()
        .map(|p| p.id())
        .collect()
}

#[test]
#[traced_test]
fn test_pipeline_throughput_matches_node_timings() {
    // Interval 2, duration 2: a package delivered on round t reaches
    // the storehouse on round t + 2 (one round of processing, one
    // routing hop). Deliveries fire on rounds 1, 3, 5, 7, 9, so four
    // packages have arrived by round 10.
    let mut factory = pipeline(2, 2, seeded_probability_generator(1));

    simulate(&mut factory, 10, |_, _| {}).unwrap();

    assert_eq!(stored_ids(&factory, 3).len(), 4);
}

#[test]
#[traced_test]
fn test_arrivals_observed_in_round_order() {
    let mut factory = pipeline(1, 1, seeded_probability_generator(1));
    let mut arrivals: Vec<(Round, usize)> = Vec::new();

    simulate(&mut factory, 6, |f, round| {
        arrivals.push((round, stored_ids(f, 3).len()));
    })
    .unwrap();

    // Duration 1: the first package lands on round 2, then one more
    // every round. Counts never decrease.
    assert_eq!(arrivals.first(), Some(&(1, 0)));
    assert_eq!(arrivals.last(), Some(&(6, 5)));
    for pair in arrivals.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
#[traced_test]
fn test_package_visible_downstream_only_after_next_route() {
    // Interval 2, duration 2. The package delivered on round 1 sits in
    // the worker's outgoing buffer at the end of round 2 and reaches
    // the storehouse only via round 3's routing phase; the interval-2
    // ramp fires again on rounds 3 and 5, never on even rounds.
    let mut factory = pipeline(2, 2, seeded_probability_generator(5));
    let mut stored_per_round = Vec::new();
    let mut worker_buffered_per_round = Vec::new();

    simulate(&mut factory, 5, |f, _| {
        stored_per_round.push(stored_ids(f, 3).len());
        worker_buffered_per_round.push(
            f.find_worker_by_id(NodeId(2))
                .unwrap()
                .sender()
                .has_buffered(),
        );
    })
    .unwrap();

    assert_eq!(stored_per_round, vec![0, 0, 1, 1, 2]);
    assert_eq!(
        worker_buffered_per_round,
        vec![false, true, false, true, false]
    );
}

/// Branching network: one ramp feeding two workers that both drain
/// into the same storehouse. Routing decisions come from the shared
/// seeded generator.
fn branching(seed: u64) -> Factory {
    let generator = seeded_probability_generator(seed);
    let mut factory = Factory::new();
    factory.add_ramp(Ramp::new(NodeId(1), 1, generator.clone()));
    factory.add_worker(Worker::new(
        NodeId(2),
        1,
        QueueType::Fifo,
        generator.clone(),
    ));
    factory.add_worker(Worker::new(NodeId(3), 2, QueueType::Lifo, generator));
    factory.add_storehouse(Storehouse::new(NodeId(4)));
    link_ramp(&mut factory, 1, ReceiverId::worker(NodeId(2)));
    link_ramp(&mut factory, 1, ReceiverId::worker(NodeId(3)));
    link_worker(&mut factory, 2, ReceiverId::storehouse(NodeId(4)));
    link_worker(&mut factory, 3, ReceiverId::storehouse(NodeId(4)));
    factory
}

#[test]
#[traced_test]
fn test_same_seed_reproduces_the_run() {
    let run = |seed| {
        let mut factory = branching(seed);
        simulate(&mut factory, 30, |_, _| {}).unwrap();
        (
            stored_ids(&factory, 4),
            factory
                .find_worker_by_id(NodeId(2))
                .unwrap()
                .stockpile()
                .len(),
            factory
                .find_worker_by_id(NodeId(3))
                .unwrap()
                .stockpile()
                .len(),
        )
    };

    let first = run(42);
    let second = run(42);
    assert_eq!(first, second);
}

#[test]
fn test_different_seeds_usually_diverge() {
    let run = |seed| {
        let mut factory = branching(seed);
        simulate(&mut factory, 30, |_, _| {}).unwrap();
        stored_ids(&factory, 4)
    };

    // Not guaranteed in principle, but 30 rounds of coin flips
    // agreeing across seeds would point at a broken generator hookup.
    assert_ne!(run(1), run(2));
}

#[test]
fn test_every_live_package_is_somewhere() {
    let mut factory = branching(7);
    simulate(&mut factory, 30, |_, _| {}).unwrap();

    let stored = stored_ids(&factory, 4).len();
    let queued: usize = factory.workers().map(|w| w.stockpile().len()).sum();
    let in_slots = factory.workers().filter(|w| w.processing().is_some()).count();
    let buffered = factory
        .workers()
        .filter(|w| w.sender().has_buffered())
        .count()
        + factory
            .ramps()
            .filter(|r| r.sender().has_buffered())
            .count();

    // Interval 1 over 30 rounds: 30 packages created, none destroyed.
    assert_eq!(stored + queued + in_slots + buffered, 30);
}

#[test]
fn test_inconsistent_network_never_starts() {
    // The ramp's only path dead-ends in a worker cycle.
    let generator = seeded_probability_generator(3);
    let mut factory = Factory::new();
    factory.add_ramp(Ramp::new(NodeId(1), 1, generator.clone()));
    factory.add_worker(Worker::new(
        NodeId(2),
        1,
        QueueType::Fifo,
        generator.clone(),
    ));
    factory.add_worker(Worker::new(NodeId(3), 1, QueueType::Fifo, generator));
    factory.add_storehouse(Storehouse::new(NodeId(4)));
    link_ramp(&mut factory, 1, ReceiverId::worker(NodeId(2)));
    link_worker(&mut factory, 2, ReceiverId::worker(NodeId(3)));
    link_worker(&mut factory, 3, ReceiverId::worker(NodeId(2)));

    let mut observed = false;
    let result = simulate(&mut factory, 10, |_, _| observed = true);

    assert_eq!(result, Err(SimulationError::InconsistentNetwork));
    assert!(!observed, "no round runs on a refused network");
}

#[test]
fn test_topology_can_change_between_runs() {
    let mut factory = branching(9);
    simulate(&mut factory, 5, |_, _| {}).unwrap();
    let after_first = stored_ids(&factory, 4).len();

    // Retire worker 3 between runs; the purge keeps routing valid and
    // the network stays consistent through worker 2.
    factory.remove_worker(NodeId(3));
    assert!(factory.is_consistent());

    simulate(&mut factory, 10, |_, _| {}).unwrap();
    assert!(stored_ids(&factory, 4).len() >= after_first);
}
