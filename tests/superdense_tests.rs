// tests/superdense_tests.rs

// Superdense coding: two classical bits per Bell pair, exact over a
// noiseless channel.

use qnet::agent::connect_quantum;
use qnet::protocols::{SuperdenseReceiver, SuperdenseSender};
use qnet::{Agent, RegisterStream, Simulation};

fn to_bits(message: &str) -> Vec<u8> {
    message
        .bytes()
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .collect()
}

fn run_superdense(bits: Vec<u8>, seed: u64) -> Vec<u8> {
    let stream = RegisterStream::new(2, bits.len() / 2);
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum(&mut alice, &mut bob).unwrap();

    let mut simulation = Simulation::with_seed(seed);
    simulation.add(alice, SuperdenseSender::new("Bob", bits));
    simulation.add(bob, SuperdenseReceiver::new("Alice"));

    let report = simulation.run().unwrap();
    report.outcome("Bob").unwrap().as_bits().unwrap().to_vec()
}

#[test]
fn all_four_bit_pairs_decode_exactly() {
    let bits = vec![0, 0, 0, 1, 1, 0, 1, 1];
    assert_eq!(run_superdense(bits.clone(), 6), bits);
}

#[test]
fn a_text_message_survives_the_noiseless_channel() {
    let bits = to_bits("qubits!");
    for seed in [1, 2, 3] {
        assert_eq!(run_superdense(bits.clone(), seed), bits, "seed {}", seed);
    }
}

#[test]
fn odd_data_length_is_a_wiring_error() {
    let stream = RegisterStream::new(2, 2);
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum(&mut alice, &mut bob).unwrap();
    bob.set_recv_timeout(std::time::Duration::from_millis(100));

    let mut simulation = Simulation::with_seed(6);
    simulation.add(alice, SuperdenseSender::new("Bob", vec![1, 0, 1])); // needs 4 bits
    simulation.add(bob, SuperdenseReceiver::new("Alice"));
    assert!(simulation.run().is_err());
}
