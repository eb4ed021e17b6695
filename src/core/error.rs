// src/core/error.rs

//! Error handling logic

use std::fmt;

/// Error types covering the failure taxonomy of a simulation run.
///
/// Variants fall into two groups: programming errors in protocol logic
/// (`DimensionMismatch`, `StreamMismatch`, `InvalidOperation`), which abort
/// the offending agent, and runtime conditions detected while the network
/// executes (`ProtocolViolation`, `NumericInstability`, `SimulationError`).
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum QnetError {
    /// A blocking receive that can never be satisfied: the peer terminated
    /// or stayed silent past the agent's receive timeout.
    ProtocolViolation {
        /// Name of the agent whose receive was starved.
        agent: String,
        /// Name of the peer that failed to deliver.
        peer: String,
        /// ProtocolViolation failure message
        message: String,
    },

    /// A measurement probability drifted outside [0, 1] beyond the fatal
    /// tolerance. Small drift is clamped and logged instead.
    NumericInstability {
        /// NumericInstability failure message
        message: String,
    },

    /// A gate addressed a qubit index outside its register, duplicated an
    /// operand, or spanned two distinct registers.
    DimensionMismatch {
        /// DimensionMismatch failure message
        message: String,
    },

    /// Agents that should iterate parallel register streams were wired with
    /// streams of different lengths.
    StreamMismatch {
        /// StreamMismatch failure message
        message: String,
    },

    /// An operation inconsistent with the current agent or channel state,
    /// e.g. publishing output twice or sending to an unconnected peer.
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// General error encountered by the simulation substrate itself
    /// (thread panics, poisoned register locks).
    SimulationError {
        /// SimulationError failure message
        message: String,
    },
}

impl fmt::Display for QnetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QnetError::ProtocolViolation { agent, peer, message } => {
                write!(f, "Protocol Violation ({} <- {}): {}", agent, peer, message)
            }
            QnetError::NumericInstability { message } => write!(f, "Numeric Instability: {}", message),
            QnetError::DimensionMismatch { message } => write!(f, "Dimension Mismatch: {}", message),
            QnetError::StreamMismatch { message } => write!(f, "Stream Mismatch: {}", message),
            QnetError::InvalidOperation { message } => write!(f, "Invalid Operation: {}", message),
            QnetError::SimulationError { message } => write!(f, "Simulation Process Error: {}", message),
        }
    }
}

// Implement the standard Error trait to allow for easy integration with Rust error handling.
impl std::error::Error for QnetError {}
