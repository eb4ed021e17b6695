// src/protocols/shor.rs

//! The nine-qubit Shor code and a protected-transmission protocol pair.
//!
//! [`encode`] spreads one logical qubit (position 0 of a nine-qubit block)
//! over all nine physical qubits; [`decode`] is the measurement-free inverse
//! with Toffoli majority voting, which recovers the logical state exactly
//! (up to global phase) after an arbitrary corruption of any single physical
//! qubit. The syndrome ends up in the eight ancilla qubits, disentangled
//! from the recovered logical state.

use crate::agent::{Agent, Protocol};
use crate::core::error::QnetError;
use crate::core::qubit::Qubit;
use crate::operations;
use crate::simulation::results::Outcome;

fn require_block(block: &[Qubit]) -> Result<(), QnetError> {
    if block.len() != 9 {
        return Err(QnetError::DimensionMismatch {
            message: format!("Shor code operates on 9 qubits, got {}", block.len()),
        });
    }
    Ok(())
}

/// Encodes the logical qubit at `block[0]` across the nine-qubit block.
pub fn encode(block: &[Qubit]) -> Result<(), QnetError> {
    require_block(block)?;

    // Phase-flip layer: copy onto the triple anchors, rotate to the |±> basis.
    operations::cnot(&block[0], &block[3])?;
    operations::cnot(&block[0], &block[6])?;
    for anchor in [0, 3, 6] {
        operations::h(&block[anchor])?;
    }
    // Bit-flip layer: copy each anchor across its triple.
    for anchor in [0, 3, 6] {
        operations::cnot(&block[anchor], &block[anchor + 1])?;
        operations::cnot(&block[anchor], &block[anchor + 2])?;
    }
    Ok(())
}

/// Decodes a nine-qubit block, restoring the logical qubit at `block[0]`.
pub fn decode(block: &[Qubit]) -> Result<(), QnetError> {
    require_block(block)?;

    // Bit-flip majority vote within each triple.
    for anchor in [0, 3, 6] {
        operations::cnot(&block[anchor], &block[anchor + 1])?;
        operations::cnot(&block[anchor], &block[anchor + 2])?;
        operations::toffoli(&block[anchor + 1], &block[anchor + 2], &block[anchor])?;
    }
    // Phase-flip majority vote across the triples.
    for anchor in [0, 3, 6] {
        operations::h(&block[anchor])?;
    }
    operations::cnot(&block[0], &block[3])?;
    operations::cnot(&block[0], &block[6])?;
    operations::toffoli(&block[3], &block[6], &block[0])?;
    Ok(())
}

/// Sending role: transmits one data bit per nine-qubit block, Shor-encoded
/// so the channel's per-block corruption is survivable.
pub struct ShorSender {
    peer: String,
    data: Vec<u8>,
}

impl ShorSender {
    /// `data` must hold one bit per stream register.
    pub fn new(peer: impl Into<String>, data: Vec<u8>) -> Self {
        Self { peer: peer.into(), data }
    }
}

impl Protocol for ShorSender {
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        if self.data.len() != agent.stream_len() {
            return Err(QnetError::StreamMismatch {
                message: format!(
                    "{} data bits cannot map onto {} blocks",
                    self.data.len(),
                    agent.stream_len()
                ),
            });
        }

        let mut trial = 0;
        while let Some(register) = agent.next_register() {
            let block = register.qubits();
            if self.data[trial] == 1 {
                operations::x(&block[0])?;
            }
            encode(&block)?;
            for qubit in block {
                agent.qsend(&self.peer, Some(qubit))?;
            }
            trial += 1;
        }
        Ok(())
    }
}

/// Receiving role: collects each nine-qubit block, decodes it, and measures
/// the recovered logical qubit. Blocks with a lost qubit decode as 0.
pub struct ShorReceiver {
    peer: String,
}

impl ShorReceiver {
    pub fn new(peer: impl Into<String>) -> Self {
        Self { peer: peer.into() }
    }
}

impl Protocol for ShorReceiver {
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        let mut data = Vec::with_capacity(agent.stream_len());
        while let Some(_register) = agent.next_register() {
            let mut block = Vec::with_capacity(9);
            for _ in 0..9 {
                block.push(agent.qrecv(&self.peer)?);
            }

            if block.iter().all(Option::is_some) {
                let block: Vec<Qubit> = block.into_iter().flatten().collect();
                decode(&block)?;
                data.push(agent.measure(&block[0])?);
            } else {
                data.push(0);
            }
        }
        agent.output(Outcome::Bits(data))
    }
}
