// src/lib.rs

//! `qnet` - agent-based simulation of quantum networks
//!
//! This library simulates networks of concurrently-executing agents that
//! exchange quantum and classical information over explicit channels, with
//! optional per-channel error injection, to study protocols such as quantum
//! teleportation, superdense coding, and the Shor error-correcting code.
//!
//! Registers hold dense 2^N state vectors; agents run as independent
//! threads, communicating only through FIFO channels whose receives block
//! (with a deadlock-detecting timeout); quantum channels may corrupt qubits
//! in transit through stateful, composable error stages.
//!
//! ```
//! use qnet::{Agent, Classical, Outcome, RegisterStream, Simulation};
//! use qnet::agent::{connect_classical, connect_quantum};
//! use qnet::operations as ops;
//!
//! // Alice prepares Bell pairs and forwards one half plus a parity bit;
//! // Bob checks that his half always agrees.
//! let stream = RegisterStream::new(2, 8);
//! let mut alice = Agent::new("Alice", stream.clone());
//! let mut bob = Agent::new("Bob", stream);
//! connect_quantum(&mut alice, &mut bob).unwrap();
//! connect_classical(&mut alice, &mut bob).unwrap();
//!
//! let mut simulation = Simulation::with_seed(7);
//! simulation.add(alice, |agent: &mut Agent| {
//!     while let Some(register) = agent.next_register() {
//!         let near = register.qubit(0)?;
//!         let far = register.qubit(1)?;
//!         ops::h(&near)?;
//!         ops::cnot(&near, &far)?;
//!         agent.qsend("Bob", Some(far))?;
//!         let bit = agent.measure(&near)?;
//!         agent.csend("Bob", Classical::Bit(bit))?;
//!     }
//!     Ok(())
//! });
//! simulation.add(bob, |agent: &mut Agent| {
//!     let mut agreements = 0u64;
//!     while let Some(_register) = agent.next_register() {
//!         let half = agent.qrecv("Alice")?.expect("noiseless channel");
//!         let expected = agent.crecv("Alice")?.as_bit().unwrap();
//!         if agent.measure(&half)? == expected {
//!             agreements += 1;
//!         }
//!     }
//!     agent.output(Outcome::Counts(vec![agreements]))
//! });
//!
//! let report = simulation.run().unwrap();
//! assert_eq!(report.outcome("Bob"), Some(&Outcome::Counts(vec![8])));
//! ```

pub mod agent;
pub mod channel;
pub mod core;
pub mod noise;
pub mod operations;
pub mod protocols;
pub mod simulation;
pub mod stream;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use crate::agent::{Agent, Protocol, connect_classical, connect_quantum, connect_quantum_with};
pub use crate::channel::Classical;
pub use crate::core::{QnetError, Qubit, Register, RegisterHandle};
pub use crate::noise::{Attenuation, ErrorModel, GroupedUnitary, RandomUnitary, SystematicUnitary};
pub use crate::simulation::{Outcome, Simulation, SimulationReport};
pub use crate::stream::RegisterStream;
