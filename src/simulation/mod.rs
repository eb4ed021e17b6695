// src/simulation/mod.rs

//! Runs a wired set of agents to completion.
//!
//! The [`Simulation`] orchestrator starts every agent as its own thread,
//! optionally reports coarse per-agent progress through the `log` facade,
//! and blocks the caller until all agents have finished. It interprets no
//! results itself, being purely a lifecycle and synchronization facility;
//! published outputs come back in the [`SimulationReport`].

pub mod results;

pub use results::{Outcome, SimulationReport};

use crate::agent::{Agent, Protocol};
use crate::core::error::QnetError;
use results::SharedOutcomes;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// How often the optional progress monitor samples agent counters.
const MONITOR_INTERVAL: Duration = Duration::from_millis(200);

/// Orchestrates a set of agents whose channels are already wired.
pub struct Simulation {
    agents: Vec<(Agent, Box<dyn Protocol>)>,
    outputs: SharedOutcomes,
    seed: Option<u64>,
    monitor: bool,
}

impl Simulation {
    /// Creates an empty simulation with entropy-seeded agents.
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            outputs: SharedOutcomes::new(),
            seed: None,
            monitor: false,
        }
    }

    /// Creates a simulation whose agents draw reproducible randomness.
    ///
    /// Each agent's source is seeded from `seed` and its own name, so runs
    /// with the same seed and wiring produce identical measurement and
    /// error-sampling sequences.
    pub fn with_seed(seed: u64) -> Self {
        let mut simulation = Self::new();
        simulation.seed = Some(seed);
        simulation
    }

    /// Enables coarse per-agent progress logging while the run executes.
    pub fn monitor_progress(&mut self, enabled: bool) {
        self.monitor = enabled;
    }

    /// Registers an agent together with the protocol role it will execute.
    pub fn add<P: Protocol + 'static>(&mut self, mut agent: Agent, protocol: P) {
        agent.install_outputs(self.outputs.clone());
        self.agents.push((agent, Box::new(protocol)));
    }

    /// Starts all agents concurrently and blocks until every one finishes.
    ///
    /// Wiring defects (duplicate names, diverging stream lengths) are
    /// rejected before any agent starts. After the join, the first agent
    /// failure (a panic counts, reported as a simulation error) is
    /// returned; otherwise the completed results mapping is.
    pub fn run(mut self) -> Result<SimulationReport, QnetError> {
        if self.agents.is_empty() {
            return Ok(SimulationReport::new(HashMap::new(), HashMap::new()));
        }

        self.check_wiring()?;
        if let Some(seed) = self.seed {
            for (agent, _) in &mut self.agents {
                agent.reseed(derive_agent_seed(seed, agent.name()));
            }
        }

        let progress: Vec<(String, Arc<AtomicUsize>, usize)> = self
            .agents
            .iter()
            .map(|(agent, _)| {
                (
                    agent.name().to_string(),
                    agent.progress_handle(),
                    agent.stream_len(),
                )
            })
            .collect();

        let stop = Arc::new(AtomicBool::new(false));
        let monitor = self.monitor.then(|| {
            let stop = stop.clone();
            let progress = progress.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    for (name, counter, total) in &progress {
                        log::debug!("{}: {}/{} registers consumed", name, counter.load(Ordering::Relaxed), total);
                    }
                    thread::sleep(MONITOR_INTERVAL);
                }
            })
        });

        let handles: Vec<_> = self
            .agents
            .drain(..)
            .map(|(mut agent, mut protocol)| {
                let name = agent.name().to_string();
                let handle = thread::spawn(move || protocol.run(&mut agent));
                (name, handle)
            })
            .collect();

        let mut first_failure: Option<QnetError> = None;
        for (name, handle) in handles {
            let result = handle.join().unwrap_or_else(|_| {
                Err(QnetError::SimulationError {
                    message: format!("agent '{}' panicked during its run", name),
                })
            });
            if let Err(error) = result {
                log::error!("agent '{}' failed: {}", name, error);
                first_failure.get_or_insert(attribute(error, &name));
            }
        }

        stop.store(true, Ordering::Relaxed);
        if let Some(handle) = monitor {
            let _ = handle.join();
        }

        if let Some(error) = first_failure {
            return Err(error);
        }

        let consumed = progress
            .iter()
            .map(|(name, counter, _)| (name.clone(), counter.load(Ordering::Relaxed)))
            .collect();
        Ok(SimulationReport::new(self.outputs.collect()?, consumed))
    }

    /// Rejects wiring defects before any agent thread starts.
    fn check_wiring(&self) -> Result<(), QnetError> {
        let mut names = HashSet::new();
        for (agent, _) in &self.agents {
            if !names.insert(agent.name().to_string()) {
                return Err(QnetError::InvalidOperation {
                    message: format!("two agents share the name '{}'", agent.name()),
                });
            }
        }

        // Agents of one run iterate parallel streams in lockstep; diverging
        // lengths mean mismatched copies.
        let mut first: Option<(&str, usize)> = None;
        for (agent, _) in &self.agents {
            match first {
                None => first = Some((agent.name(), agent.stream_len())),
                Some((first_name, first_len)) => {
                    if agent.stream_len() != first_len {
                        return Err(QnetError::StreamMismatch {
                            message: format!(
                                "agent '{}' iterates {} registers but agent '{}' iterates {}",
                                first_name,
                                first_len,
                                agent.name(),
                                agent.stream_len()
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives one agent's seed from the run seed and the agent's name.
fn derive_agent_seed(seed: u64, name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    name.hash(&mut hasher);
    hasher.finish()
}

/// Re-attributes an agent failure so the report names the offender, keeping
/// the original variant intact.
fn attribute(error: QnetError, agent: &str) -> QnetError {
    let prefix = |message: String| format!("agent '{}': {}", agent, message);
    match error {
        QnetError::ProtocolViolation { .. } => error, // already carries both names
        QnetError::NumericInstability { message } => QnetError::NumericInstability { message: prefix(message) },
        QnetError::DimensionMismatch { message } => QnetError::DimensionMismatch { message: prefix(message) },
        QnetError::StreamMismatch { message } => QnetError::StreamMismatch { message: prefix(message) },
        QnetError::InvalidOperation { message } => QnetError::InvalidOperation { message: prefix(message) },
        QnetError::SimulationError { message } => QnetError::SimulationError { message: prefix(message) },
    }
}
