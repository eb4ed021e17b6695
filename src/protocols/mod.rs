// src/protocols/mod.rs

//! Reference protocol roles built on the agent runtime.
//!
//! Each role is a concrete [`Protocol`](crate::agent::Protocol) type; pairs
//! of roles wired over quantum and classical channels reproduce the standard
//! networked experiments: teleportation, superdense coding, and Shor-coded
//! transmission over a noisy channel.

pub mod shor;
pub mod superdense;
pub mod teleport;

pub use shor::{ShorReceiver, ShorSender, decode, encode};
pub use superdense::{SuperdenseReceiver, SuperdenseSender};
pub use teleport::{TeleportReceiver, TeleportSender};
