// src/channel/mod.rs

//! Point-to-point conduits between agents.
//!
//! Both kinds are FIFO with unbounded buffers (sends never block) and a
//! single sender/receiver pair fixed at construction. Quantum channels run
//! an ordered pipeline of [`ErrorModel`](crate::noise::ErrorModel) stages on
//! the send side; classical channels carry exact values with no error
//! pipeline. Receives block with a timeout so that an unsatisfiable receive
//! surfaces as a protocol violation instead of hanging forever.

use crate::core::error::QnetError;
use crate::core::qubit::Qubit;
use crate::noise::ErrorModel;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use rand::rngs::StdRng;
use std::time::Duration;

/// A classical value in transit: exact, ordinary data.
#[derive(Debug, Clone, PartialEq)]
pub enum Classical {
    /// A single bit (0 or 1).
    Bit(u8),
    /// An ordered group of bits, e.g. a measurement outcome pair.
    Bits(Vec<u8>),
    /// A signed integer.
    Int(i64),
    /// A real number.
    Real(f64),
}

impl Classical {
    /// The value as a single bit, if it is one.
    pub fn as_bit(&self) -> Option<u8> {
        match self {
            Classical::Bit(bit) => Some(*bit),
            _ => None,
        }
    }

    /// The value as a bit group, if it is one.
    pub fn as_bits(&self) -> Option<&[u8]> {
        match self {
            Classical::Bits(bits) => Some(bits),
            _ => None,
        }
    }
}

/// Send side of a quantum channel: error pipeline plus FIFO buffer.
///
/// The pipeline is owned by this endpoint; stage state persists for the
/// lifetime of the channel and is never shared with the opposite direction
/// or any other channel.
pub struct QuantumSender {
    tx: Sender<Option<Qubit>>,
    pipeline: Vec<Box<dyn ErrorModel>>,
}

impl QuantumSender {
    /// Runs every error stage left-to-right, then enqueues the survivor.
    ///
    /// A stage may pass the qubit through, corrupt it in place, or withhold
    /// it; a withheld qubit is still delivered as `None` so the receiver's
    /// item count stays aligned with the sender's.
    pub(crate) fn send(&mut self, qubit: Option<Qubit>, rng: &mut StdRng) -> Result<(), QnetError> {
        let mut item = qubit;
        for stage in &mut self.pipeline {
            item = stage.apply(item, rng)?;
        }
        self.tx.send(item).map_err(|_| QnetError::InvalidOperation {
            message: "quantum channel receiver no longer exists".to_string(),
        })
    }
}

/// Receive side of a quantum channel.
pub struct QuantumReceiver {
    rx: Receiver<Option<Qubit>>,
}

impl QuantumReceiver {
    pub(crate) fn recv(&self, timeout: Duration) -> Result<Option<Qubit>, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Send side of a classical channel.
pub struct ClassicalSender {
    tx: Sender<Classical>,
}

impl ClassicalSender {
    pub(crate) fn send(&self, value: Classical) -> Result<(), QnetError> {
        self.tx.send(value).map_err(|_| QnetError::InvalidOperation {
            message: "classical channel receiver no longer exists".to_string(),
        })
    }
}

/// Receive side of a classical channel.
pub struct ClassicalReceiver {
    rx: Receiver<Classical>,
}

impl ClassicalReceiver {
    pub(crate) fn recv(&self, timeout: Duration) -> Result<Classical, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Creates one directed quantum channel with the given error pipeline.
pub(crate) fn quantum(pipeline: Vec<Box<dyn ErrorModel>>) -> (QuantumSender, QuantumReceiver) {
    let (tx, rx) = unbounded();
    (QuantumSender { tx, pipeline }, QuantumReceiver { rx })
}

/// Creates one directed classical channel.
pub(crate) fn classical() -> (ClassicalSender, ClassicalReceiver) {
    let (tx, rx) = unbounded();
    (ClassicalSender { tx }, ClassicalReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::register::{Register, RegisterHandle};
    use rand::SeedableRng;

    #[test]
    fn quantum_channel_preserves_fifo_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let (mut tx, rx) = quantum(Vec::new());
        let handle = RegisterHandle::from_register(Register::new(3));

        for index in 0..3 {
            tx.send(Some(handle.qubit(index).unwrap()), &mut rng).unwrap();
        }
        for index in 0..3 {
            let received = rx.recv(Duration::from_millis(100)).unwrap().unwrap();
            assert_eq!(received.index(), index);
        }
    }

    #[test]
    fn classical_channel_carries_exact_values() {
        let (tx, rx) = classical();
        tx.send(Classical::Bits(vec![1, 0])).unwrap();
        tx.send(Classical::Int(-7)).unwrap();
        assert_eq!(
            rx.recv(Duration::from_millis(100)).unwrap(),
            Classical::Bits(vec![1, 0])
        );
        assert_eq!(rx.recv(Duration::from_millis(100)).unwrap(), Classical::Int(-7));
    }

    #[test]
    fn empty_channel_receive_times_out() {
        let (_tx, rx) = classical();
        let err = rx.recv(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err, RecvTimeoutError::Timeout);
    }
}
