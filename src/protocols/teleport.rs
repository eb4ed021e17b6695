// src/protocols/teleport.rs

//! Quantum teleportation between two agents.
//!
//! Each trial uses a three-qubit register: qubit 0 carries the message
//! state, qubits 1 and 2 form the Bell pair. The sender distributes qubit 2,
//! performs the Bell-basis measurement on qubits 0 and 1, and sends the two
//! classical correction bits; the receiver applies the conditional X/Z
//! corrections and measures the reconstructed state.

use crate::agent::{Agent, Protocol};
use crate::channel::Classical;
use crate::core::error::QnetError;
use crate::operations;
use crate::simulation::results::Outcome;

/// Sending role: prepares each message qubit with an X rotation, then
/// teleports it to `peer`.
pub struct TeleportSender {
    peer: String,
    angles: Vec<f64>,
}

impl TeleportSender {
    /// One rotation angle per stream register; angle 0 teleports |0>,
    /// angle π teleports |1> (up to phase).
    pub fn new(peer: impl Into<String>, angles: Vec<f64>) -> Self {
        Self { peer: peer.into(), angles }
    }
}

impl Protocol for TeleportSender {
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        if self.angles.len() != agent.stream_len() {
            return Err(QnetError::StreamMismatch {
                message: format!(
                    "{} preparation angles for {} stream registers",
                    self.angles.len(),
                    agent.stream_len()
                ),
            });
        }

        let mut trial = 0;
        while let Some(register) = agent.next_register() {
            let msg = register.qubit(0)?;
            let here = register.qubit(1)?;
            let there = register.qubit(2)?;

            // Prepare the state to teleport.
            operations::rx(&msg, self.angles[trial])?;

            // Entangle the Bell pair and distribute the far half.
            operations::h(&here)?;
            operations::cnot(&here, &there)?;
            agent.qsend(&self.peer, Some(there))?;

            // Bell-basis measurement on the message and the near half.
            operations::cnot(&msg, &here)?;
            operations::h(&msg)?;
            let msg_bit = agent.measure(&msg)?;
            let here_bit = agent.measure(&here)?;
            agent.csend(&self.peer, Classical::Bits(vec![msg_bit, here_bit]))?;

            trial += 1;
        }
        Ok(())
    }
}

/// Receiving role: applies the classical corrections and measures each
/// reconstructed qubit, publishing the outcome bits.
pub struct TeleportReceiver {
    peer: String,
}

impl TeleportReceiver {
    pub fn new(peer: impl Into<String>) -> Self {
        Self { peer: peer.into() }
    }
}

impl Protocol for TeleportReceiver {
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        let mut outcomes = Vec::new();
        while let Some(_register) = agent.next_register() {
            let received = agent.qrecv(&self.peer)?;
            let corrections = agent.crecv(&self.peer)?;
            let bits = corrections.as_bits().ok_or_else(|| QnetError::InvalidOperation {
                message: "teleportation corrections must arrive as a bit pair".to_string(),
            })?;
            if bits.len() != 2 {
                return Err(QnetError::InvalidOperation {
                    message: format!("expected 2 correction bits, got {}", bits.len()),
                });
            }

            match received {
                Some(qubit) => {
                    if bits[1] == 1 {
                        operations::x(&qubit)?;
                    }
                    if bits[0] == 1 {
                        operations::z(&qubit)?;
                    }
                    outcomes.push(agent.measure(&qubit)?);
                }
                // Lost in transit: record the trial as a zero, the same
                // convention the unprotected transmission demos use.
                None => outcomes.push(0),
            }
        }
        agent.output(Outcome::Bits(outcomes))
    }
}
