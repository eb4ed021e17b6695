// demos/shor_transmission.rs

//! Transmits a short message over a channel that corrupts up to one qubit
//! per nine-qubit block, once without protection and once through the Shor
//! code, then prints both decoded strings.

use qnet::agent::{Agent, connect_quantum_with};
use qnet::noise::{ErrorModel, GroupedUnitary};
use qnet::protocols::{ShorReceiver, ShorSender};
use qnet::{Outcome, RegisterStream, Simulation};

fn noisy_pipeline() -> Vec<Box<dyn ErrorModel>> {
    vec![Box::new(GroupedUnitary::new(9, 0.5).expect("valid stage"))]
}

fn to_bits(message: &str) -> Vec<u8> {
    message
        .bytes()
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .collect()
}

fn from_bits(bits: &[u8]) -> String {
    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit) as char)
        .collect()
}

fn transmit_unprotected(bits: &[u8], seed: u64) -> Vec<u8> {
    let stream = RegisterStream::new(9, bits.len());
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum_with(&mut alice, &mut bob, noisy_pipeline).expect("wiring");

    let data = bits.to_vec();
    let mut simulation = Simulation::with_seed(seed);
    simulation.add(alice, move |agent: &mut Agent| {
        let mut trial = 0;
        while let Some(register) = agent.next_register() {
            let block = register.qubits();
            if data[trial] == 1 {
                qnet::operations::x(&block[0])?;
            }
            for qubit in block {
                agent.qsend("Bob", Some(qubit))?;
            }
            trial += 1;
        }
        Ok(())
    });
    simulation.add(bob, |agent: &mut Agent| {
        let mut received = Vec::new();
        while let Some(_register) = agent.next_register() {
            let mut block = Vec::with_capacity(9);
            for _ in 0..9 {
                block.push(agent.qrecv("Alice")?);
            }
            let payload = block.into_iter().next().flatten().expect("nothing dropped");
            received.push(agent.measure(&payload)?);
        }
        agent.output(Outcome::Bits(received))
    });

    let report = simulation.run().expect("simulation");
    report.outcome("Bob").unwrap().as_bits().unwrap().to_vec()
}

fn transmit_protected(bits: &[u8], seed: u64) -> Vec<u8> {
    let stream = RegisterStream::new(9, bits.len());
    let mut alice = Agent::new("Alice", stream.clone());
    let mut bob = Agent::new("Bob", stream);
    connect_quantum_with(&mut alice, &mut bob, noisy_pipeline).expect("wiring");

    let mut simulation = Simulation::with_seed(seed);
    simulation.add(alice, ShorSender::new("Bob", bits.to_vec()));
    simulation.add(bob, ShorReceiver::new("Alice"));

    let report = simulation.run().expect("simulation");
    report.outcome("Bob").unwrap().as_bits().unwrap().to_vec()
}

fn main() {
    env_logger::init();

    let message = "peace & love";
    let bits = to_bits(message);
    println!("Transmitting {:?} ({} nine-qubit blocks)...", message, bits.len());

    let raw = transmit_unprotected(&bits, 1337);
    let corrected = transmit_protected(&bits, 1337);

    println!("Unprotected channel: {:?}", from_bits(&raw));
    println!("Shor-protected:      {:?}", from_bits(&corrected));
}
