// demos/teleportation.rs

//! Teleports a stream of prepared qubit states from Alice to Bob and checks
//! the received statistics against the prepared rotation angle.

use qnet::agent::{connect_classical, connect_quantum};
use qnet::protocols::{TeleportReceiver, TeleportSender};
use qnet::{Agent, RegisterStream, Simulation};
use std::f64::consts::PI;

fn main() {
    env_logger::init();

    let trials = 500;
    let theta = PI / 4.0;

    let stream = RegisterStream::new(3, trials);
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum(&mut alice, &mut bob).expect("wiring");
    connect_classical(&mut alice, &mut bob).expect("wiring");

    let mut simulation = Simulation::with_seed(42);
    simulation.monitor_progress(true);
    simulation.add(alice, TeleportSender::new("Bob", vec![theta; trials]));
    simulation.add(bob, TeleportReceiver::new("Alice"));

    println!("Teleporting {trials} qubits prepared with RX({theta:.4})...");
    let report = simulation.run().expect("simulation");

    let bits = report
        .outcome("Bob")
        .and_then(|outcome| outcome.as_bits())
        .expect("Bob publishes his measurement record");
    let ones = bits.iter().filter(|&&bit| bit == 1).count();
    let frequency = ones as f64 / trials as f64;
    let expected = (theta / 2.0).sin().powi(2);

    println!("{report}");
    println!("Measured |1> frequency: {frequency:.4}");
    println!("Expected sin²(θ/2):     {expected:.4}");
}
