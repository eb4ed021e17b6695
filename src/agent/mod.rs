// src/agent/mod.rs

//! Agent runtime: identity, stream, channel ports, and protocol logic.
//!
//! An [`Agent`] is an independently-scheduled execution unit. It pulls
//! registers from its stream, applies gates, exchanges qubits and classical
//! values with peers over the channels wired to it before the simulation
//! starts, and publishes its result exactly once. Protocol behavior is
//! supplied through the [`Protocol`] trait: one concrete type per role
//! (sender, receiver, ...) selected at construction, not by inheritance.

use crate::channel::{self, Classical, ClassicalReceiver, ClassicalSender, QuantumReceiver, QuantumSender};
use crate::core::error::QnetError;
use crate::core::qubit::Qubit;
use crate::core::register::RegisterHandle;
use crate::noise::ErrorModel;
use crate::simulation::results::{Outcome, SharedOutcomes};
use crate::stream::RegisterStream;
use crossbeam_channel::RecvTimeoutError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Default patience for a blocking receive before it is reported as a
/// deadlock.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// User-supplied protocol logic run by one agent.
///
/// Implemented by distinct role types (e.g. a teleportation sender and
/// receiver); closures of the matching shape are accepted too, which keeps
/// one-off test protocols lightweight.
pub trait Protocol: Send {
    /// Executes this role to completion on the given agent.
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError>;
}

impl<F> Protocol for F
where
    F: FnMut(&mut Agent) -> Result<(), QnetError> + Send,
{
    fn run(&mut self, agent: &mut Agent) -> Result<(), QnetError> {
        self(agent)
    }
}

/// An entity (Alice, Bob, ...) exchanging qubits and classical values with
/// peers over explicit channels.
pub struct Agent {
    name: String,
    stream: RegisterStream,
    rng: StdRng,
    recv_timeout: Duration,
    q_out: HashMap<String, QuantumSender>,
    q_in: HashMap<String, QuantumReceiver>,
    c_out: HashMap<String, ClassicalSender>,
    c_in: HashMap<String, ClassicalReceiver>,
    outputs: SharedOutcomes,
    published: bool,
    progress: Arc<AtomicUsize>,
}

impl Agent {
    /// Creates an agent with a name (its key in the results mapping) and the
    /// register stream it will iterate.
    ///
    /// The random source starts from OS entropy; attach the agent to a
    /// seeded [`Simulation`](crate::simulation::Simulation) or call
    /// [`Agent::with_seed`] for reproducible runs.
    pub fn new(name: impl Into<String>, stream: RegisterStream) -> Self {
        Self {
            name: name.into(),
            stream,
            rng: StdRng::from_os_rng(),
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            q_out: HashMap::new(),
            q_in: HashMap::new(),
            c_out: HashMap::new(),
            c_in: HashMap::new(),
            outputs: SharedOutcomes::new(),
            published: false,
            progress: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replaces the agent's random source with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// How long a blocking receive waits before reporting a deadlock.
    pub fn set_recv_timeout(&mut self, timeout: Duration) {
        self.recv_timeout = timeout;
    }

    /// The agent's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of registers in this agent's stream.
    pub fn stream_len(&self) -> usize {
        self.stream.len()
    }

    /// Pulls the next register from the stream, advancing the agent's
    /// progress counter.
    pub fn next_register(&mut self) -> Option<RegisterHandle> {
        let handle = self.stream.next();
        if handle.is_some() {
            self.progress.fetch_add(1, Ordering::Relaxed);
        }
        handle
    }

    /// The agent's random source, used for measurement and error sampling.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Measures a qubit with this agent's random source.
    pub fn measure(&mut self, qubit: &Qubit) -> Result<u8, QnetError> {
        crate::operations::measure(qubit, &mut self.rng)
    }

    /// Sends a qubit handle to `peer`, running the channel's error pipeline.
    ///
    /// Passing `None` forwards an already-absent item, keeping block counts
    /// aligned when a protocol relays losses downstream.
    pub fn qsend(&mut self, peer: &str, qubit: Option<Qubit>) -> Result<(), QnetError> {
        let port = self.q_out.get_mut(peer).ok_or_else(|| QnetError::InvalidOperation {
            message: format!("agent '{}' has no quantum channel to '{}'", self.name, peer),
        })?;
        port.send(qubit, &mut self.rng)
    }

    /// Blocks until a qubit (or a recorded loss, `None`) arrives from `peer`.
    pub fn qrecv(&mut self, peer: &str) -> Result<Option<Qubit>, QnetError> {
        let port = self.q_in.get(peer).ok_or_else(|| QnetError::InvalidOperation {
            message: format!("agent '{}' has no quantum channel from '{}'", self.name, peer),
        })?;
        port.recv(self.recv_timeout)
            .map_err(|cause| starved_receive(&self.name, peer, self.recv_timeout, cause))
    }

    /// Sends a classical value to `peer`; exact, no error pipeline.
    pub fn csend(&mut self, peer: &str, value: Classical) -> Result<(), QnetError> {
        let port = self.c_out.get(peer).ok_or_else(|| QnetError::InvalidOperation {
            message: format!("agent '{}' has no classical channel to '{}'", self.name, peer),
        })?;
        port.send(value)
    }

    /// Blocks until a classical value arrives from `peer`.
    pub fn crecv(&mut self, peer: &str) -> Result<Classical, QnetError> {
        let port = self.c_in.get(peer).ok_or_else(|| QnetError::InvalidOperation {
            message: format!("agent '{}' has no classical channel from '{}'", self.name, peer),
        })?;
        port.recv(self.recv_timeout)
            .map_err(|cause| starved_receive(&self.name, peer, self.recv_timeout, cause))
    }

    /// Publishes this agent's result into the shared results mapping.
    ///
    /// Write-once: a second call is an invalid operation.
    pub fn output(&mut self, value: Outcome) -> Result<(), QnetError> {
        if self.published {
            return Err(QnetError::InvalidOperation {
                message: format!("agent '{}' already published its output", self.name),
            });
        }
        self.outputs.publish(&self.name, value)?;
        self.published = true;
        Ok(())
    }

    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub(crate) fn install_outputs(&mut self, outputs: SharedOutcomes) {
        self.outputs = outputs;
    }

    pub(crate) fn progress_handle(&self) -> Arc<AtomicUsize> {
        self.progress.clone()
    }

    fn attach_quantum_out(&mut self, peer: &str, port: QuantumSender) -> Result<(), QnetError> {
        if self.q_out.insert(peer.to_string(), port).is_some() {
            return Err(duplicate_channel(&self.name, peer, "quantum"));
        }
        Ok(())
    }

    fn attach_quantum_in(&mut self, peer: &str, port: QuantumReceiver) -> Result<(), QnetError> {
        if self.q_in.insert(peer.to_string(), port).is_some() {
            return Err(duplicate_channel(&self.name, peer, "quantum"));
        }
        Ok(())
    }

    fn attach_classical_out(&mut self, peer: &str, port: ClassicalSender) -> Result<(), QnetError> {
        if self.c_out.insert(peer.to_string(), port).is_some() {
            return Err(duplicate_channel(&self.name, peer, "classical"));
        }
        Ok(())
    }

    fn attach_classical_in(&mut self, peer: &str, port: ClassicalReceiver) -> Result<(), QnetError> {
        if self.c_in.insert(peer.to_string(), port).is_some() {
            return Err(duplicate_channel(&self.name, peer, "classical"));
        }
        Ok(())
    }
}

fn duplicate_channel(agent: &str, peer: &str, kind: &str) -> QnetError {
    QnetError::InvalidOperation {
        message: format!(
            "agents '{}' and '{}' are already connected by a {} channel",
            agent, peer, kind
        ),
    }
}

fn starved_receive(agent: &str, peer: &str, timeout: Duration, cause: RecvTimeoutError) -> QnetError {
    let message = match cause {
        RecvTimeoutError::Timeout => format!(
            "receive starved for {:?}; peer never delivered enough items",
            timeout
        ),
        RecvTimeoutError::Disconnected => {
            "peer terminated without sending enough items".to_string()
        }
    };
    QnetError::ProtocolViolation {
        agent: agent.to_string(),
        peer: peer.to_string(),
        message,
    }
}

/// Connects two agents with noiseless quantum channels in both directions.
pub fn connect_quantum(a: &mut Agent, b: &mut Agent) -> Result<(), QnetError> {
    connect_quantum_with(a, b, Vec::new)
}

/// Connects two agents with quantum channels in both directions, each
/// direction carrying its own freshly-built error pipeline.
///
/// The factory runs once per direction so stage state is never shared
/// between the two channels.
pub fn connect_quantum_with<F>(a: &mut Agent, b: &mut Agent, make_pipeline: F) -> Result<(), QnetError>
where
    F: Fn() -> Vec<Box<dyn ErrorModel>>,
{
    let (a_to_b_tx, a_to_b_rx) = channel::quantum(make_pipeline());
    let (b_to_a_tx, b_to_a_rx) = channel::quantum(make_pipeline());

    let (a_name, b_name) = (a.name().to_string(), b.name().to_string());
    a.attach_quantum_out(&b_name, a_to_b_tx)?;
    b.attach_quantum_in(&a_name, a_to_b_rx)?;
    b.attach_quantum_out(&a_name, b_to_a_tx)?;
    a.attach_quantum_in(&b_name, b_to_a_rx)?;
    Ok(())
}

/// Connects two agents with classical channels in both directions.
pub fn connect_classical(a: &mut Agent, b: &mut Agent) -> Result<(), QnetError> {
    let (a_to_b_tx, a_to_b_rx) = channel::classical();
    let (b_to_a_tx, b_to_a_rx) = channel::classical();

    let (a_name, b_name) = (a.name().to_string(), b.name().to_string());
    a.attach_classical_out(&b_name, a_to_b_tx)?;
    b.attach_classical_in(&a_name, a_to_b_rx)?;
    b.attach_classical_out(&a_name, b_to_a_tx)?;
    a.attach_classical_in(&b_name, b_to_a_rx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations;
    use std::time::Duration;

    #[test]
    fn qubits_move_between_agents_in_order() {
        let stream = RegisterStream::new(2, 1);
        let mut alice = Agent::new("Alice", stream.clone()).with_seed(1);
        let mut bob = Agent::new("Bob", stream).with_seed(2);
        connect_quantum(&mut alice, &mut bob).unwrap();

        let register = alice.next_register().unwrap();
        let q0 = register.qubit(0).unwrap();
        let q1 = register.qubit(1).unwrap();
        operations::x(&q1).unwrap();

        alice.qsend("Bob", Some(q0)).unwrap();
        alice.qsend("Bob", Some(q1)).unwrap();

        let first = bob.qrecv("Alice").unwrap().unwrap();
        let second = bob.qrecv("Alice").unwrap().unwrap();
        assert_eq!(bob.measure(&first).unwrap(), 0);
        assert_eq!(bob.measure(&second).unwrap(), 1);
    }

    #[test]
    fn sending_to_unknown_peer_is_invalid() {
        let mut alice = Agent::new("Alice", RegisterStream::new(1, 1));
        let err = alice.csend("Bob", Classical::Bit(1)).unwrap_err();
        assert!(matches!(err, QnetError::InvalidOperation { .. }));
    }

    #[test]
    fn starved_receive_is_reported_not_hung() {
        let stream = RegisterStream::new(1, 1);
        let mut alice = Agent::new("Alice", stream.clone());
        let mut bob = Agent::new("Bob", stream);
        connect_classical(&mut alice, &mut bob).unwrap();

        bob.set_recv_timeout(Duration::from_millis(20));
        let err = bob.crecv("Alice").unwrap_err();
        assert!(matches!(err, QnetError::ProtocolViolation { .. }));
    }

    #[test]
    fn double_connect_is_a_wiring_error() {
        let stream = RegisterStream::new(1, 1);
        let mut alice = Agent::new("Alice", stream.clone());
        let mut bob = Agent::new("Bob", stream);
        connect_classical(&mut alice, &mut bob).unwrap();
        let err = connect_classical(&mut alice, &mut bob).unwrap_err();
        assert!(matches!(err, QnetError::InvalidOperation { .. }));
    }

    #[test]
    fn output_is_write_once() {
        let mut alice = Agent::new("Alice", RegisterStream::new(1, 1));
        alice.output(Outcome::Bit(0)).unwrap();
        let err = alice.output(Outcome::Bit(1)).unwrap_err();
        assert!(matches!(err, QnetError::InvalidOperation { .. }));
    }
}
