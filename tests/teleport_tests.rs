// tests/teleport_tests.rs

// End-to-end teleportation over noiseless channels: exact for basis
// eigenstates, statistically correct for rotated states.

use qnet::agent::{connect_classical, connect_quantum};
use qnet::protocols::{TeleportReceiver, TeleportSender};
use qnet::{Agent, Outcome, RegisterStream, Simulation};
use std::f64::consts::PI;

fn run_teleportation(angles: Vec<f64>, seed: u64) -> Vec<u8> {
    let stream = RegisterStream::new(3, angles.len());
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum(&mut alice, &mut bob).unwrap();
    connect_classical(&mut alice, &mut bob).unwrap();

    let mut simulation = Simulation::with_seed(seed);
    simulation.add(alice, TeleportSender::new("Bob", angles));
    simulation.add(bob, TeleportReceiver::new("Alice"));

    let report = simulation.run().unwrap();
    report.outcome("Bob").unwrap().as_bits().unwrap().to_vec()
}

#[test]
fn basis_eigenstates_teleport_exactly() {
    // RX(0)|0> = |0>, RX(π)|0> = -i|1>: the receiver's bit must equal the
    // prepared bit on every trial, for both inputs.
    let angles = vec![0.0, PI, PI, 0.0, PI, 0.0];
    let received = run_teleportation(angles, 11);
    assert_eq!(received, vec![0, 1, 1, 0, 1, 0]);
}

#[test]
fn basis_eigenstates_teleport_exactly_across_seeds() {
    for seed in [1, 2, 3, 4, 5] {
        assert_eq!(run_teleportation(vec![0.0, PI], seed), vec![0, 1]);
    }
}

#[test]
fn rotated_state_statistics_converge_to_sin_squared() {
    // Teleporting RX(θ)|0> yields outcome 1 with frequency → sin²(θ/2).
    let theta = PI / 3.0;
    let trials = 600;
    let expected = (theta / 2.0).sin().powi(2);

    let received = run_teleportation(vec![theta; trials], 77);
    let ones = received.iter().filter(|&&bit| bit == 1).count();
    let frequency = ones as f64 / trials as f64;
    assert!(
        (frequency - expected).abs() < 0.1,
        "empirical frequency {} too far from sin²(θ/2) = {}",
        frequency,
        expected
    );
}

#[test]
fn teleported_outcomes_depend_on_seed_but_not_on_rerun() {
    let theta = PI / 4.0;
    let first = run_teleportation(vec![theta; 50], 123);
    let second = run_teleportation(vec![theta; 50], 123);
    assert_eq!(first, second);
}

#[test]
fn angle_count_mismatch_is_a_wiring_error() {
    let stream = RegisterStream::new(3, 4);
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum(&mut alice, &mut bob).unwrap();
    connect_classical(&mut alice, &mut bob).unwrap();
    bob.set_recv_timeout(std::time::Duration::from_millis(100));

    let mut simulation = Simulation::with_seed(5);
    simulation.add(alice, TeleportSender::new("Bob", vec![0.0; 3])); // one short
    simulation.add(bob, TeleportReceiver::new("Alice"));
    assert!(simulation.run().is_err());
}

#[test]
fn sender_publishes_nothing_receiver_publishes_bits() {
    let stream = RegisterStream::new(3, 2);
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum(&mut alice, &mut bob).unwrap();
    connect_classical(&mut alice, &mut bob).unwrap();

    let mut simulation = Simulation::with_seed(9);
    simulation.add(alice, TeleportSender::new("Bob", vec![0.0, 0.0]));
    simulation.add(bob, TeleportReceiver::new("Alice"));
    let report = simulation.run().unwrap();

    assert!(report.outcome("Alice").is_none());
    assert_eq!(report.outcome("Bob"), Some(&Outcome::Bits(vec![0, 0])));
    assert_eq!(report.consumed("Alice"), Some(2));
    assert_eq!(report.consumed("Bob"), Some(2));
}
