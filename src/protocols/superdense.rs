// src/protocols/superdense.rs

//! Superdense coding: two classical bits per transmitted Bell pair.
//!
//! The sender entangles each two-qubit register, forwards one half, encodes
//! a bit pair on the half it kept (X for the second bit, Z for the first),
//! and forwards that too. The receiver undoes the entangling circuit and
//! measures both qubits to recover the pair.

use crate::agent::{Agent, Protocol};
use crate::core::error::QnetError;
use crate::operations;
use crate::simulation::results::Outcome;

/// Sending role: encodes `data` two bits per stream register.
pub struct SuperdenseSender {
    peer: String,
    data: Vec<u8>,
}

impl SuperdenseSender {
    /// `data` must hold exactly two bits per stream register.
    pub fn new(peer: impl Into<String>, data: Vec<u8>) -> Self {
        Self { peer: peer.into(), data }
    }
}

impl Protocol for SuperdenseSender {
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        if self.data.len() != 2 * agent.stream_len() {
            return Err(QnetError::StreamMismatch {
                message: format!(
                    "{} data bits cannot map onto {} two-bit registers",
                    self.data.len(),
                    agent.stream_len()
                ),
            });
        }

        let mut trial = 0;
        while let Some(register) = agent.next_register() {
            let kept = register.qubit(0)?;
            let forwarded = register.qubit(1)?;

            operations::h(&kept)?;
            operations::cnot(&kept, &forwarded)?;
            agent.qsend(&self.peer, Some(forwarded))?;

            let bit1 = self.data[2 * trial];
            let bit2 = self.data[2 * trial + 1];
            if bit2 == 1 {
                operations::x(&kept)?;
            }
            if bit1 == 1 {
                operations::z(&kept)?;
            }
            agent.qsend(&self.peer, Some(kept))?;

            trial += 1;
        }
        Ok(())
    }
}

/// Receiving role: reconstructs the transmitted bits, publishing them as its
/// output. Trials with a lost qubit decode as a zero pair.
pub struct SuperdenseReceiver {
    peer: String,
}

impl SuperdenseReceiver {
    pub fn new(peer: impl Into<String>) -> Self {
        Self { peer: peer.into() }
    }
}

impl Protocol for SuperdenseReceiver {
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        let mut data = Vec::with_capacity(2 * agent.stream_len());
        while let Some(_register) = agent.next_register() {
            let forwarded = agent.qrecv(&self.peer)?;
            let kept = agent.qrecv(&self.peer)?;

            match (kept, forwarded) {
                (Some(kept), Some(forwarded)) => {
                    operations::cnot(&kept, &forwarded)?;
                    operations::h(&kept)?;
                    data.push(agent.measure(&kept)?);
                    data.push(agent.measure(&forwarded)?);
                }
                _ => {
                    data.push(0);
                    data.push(0);
                }
            }
        }
        agent.output(Outcome::Bits(data))
    }
}
