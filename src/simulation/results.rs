// src/simulation/results.rs

//! The shared results mapping and the report returned by a finished run.

use crate::core::error::QnetError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A value published by an agent as its final result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A single bit.
    Bit(u8),
    /// A sequence of measurement bits.
    Bits(Vec<u8>),
    /// Aggregated counters, e.g. per-outcome tallies.
    Counts(Vec<u64>),
    /// A decoded text value.
    Text(String),
    /// A real-valued summary statistic.
    Real(f64),
}

impl Outcome {
    /// The outcome as a bit sequence, if it is one.
    pub fn as_bits(&self) -> Option<&[u8]> {
        match self {
            Outcome::Bits(bits) => Some(bits),
            _ => None,
        }
    }

    /// The outcome as text, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Outcome::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The write-once-per-agent results mapping shared by all agents of a run.
#[derive(Clone, Default)]
pub struct SharedOutcomes {
    inner: Arc<Mutex<HashMap<String, Outcome>>>,
}

impl SharedOutcomes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `value` under `agent`, rejecting a second write to the key.
    pub(crate) fn publish(&self, agent: &str, value: Outcome) -> Result<(), QnetError> {
        let mut map = self.inner.lock().map_err(|_| QnetError::SimulationError {
            message: "results mapping lock poisoned".to_string(),
        })?;
        if map.contains_key(agent) {
            return Err(QnetError::InvalidOperation {
                message: format!("results mapping already holds an output for '{}'", agent),
            });
        }
        map.insert(agent.to_string(), value);
        Ok(())
    }

    pub(crate) fn collect(&self) -> Result<HashMap<String, Outcome>, QnetError> {
        let map = self.inner.lock().map_err(|_| QnetError::SimulationError {
            message: "results mapping lock poisoned".to_string(),
        })?;
        Ok(map.clone())
    }
}

/// Everything a finished simulation reports back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    outcomes: HashMap<String, Outcome>,
    consumed: HashMap<String, usize>,
}

impl SimulationReport {
    pub(crate) fn new(outcomes: HashMap<String, Outcome>, consumed: HashMap<String, usize>) -> Self {
        Self { outcomes, consumed }
    }

    /// The output published by `agent`, if any.
    pub fn outcome(&self, agent: &str) -> Option<&Outcome> {
        self.outcomes.get(agent)
    }

    /// All published outputs, keyed by agent name.
    pub fn outcomes(&self) -> &HashMap<String, Outcome> {
        &self.outcomes
    }

    /// How many stream registers `agent` consumed.
    pub fn consumed(&self, agent: &str) -> Option<usize> {
        self.consumed.get(agent).copied()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.outcomes.is_empty() {
            writeln!(f, "  No agent published an output.")?;
        } else {
            // Sort by agent name for consistent and readable output
            let mut sorted: Vec<_> = self.outcomes.iter().collect();
            sorted.sort_by_key(|(name, _)| name.as_str());
            for (name, outcome) in sorted {
                writeln!(f, "  {}: {:?}", name, outcome)?;
            }
        }
        Ok(())
    }
}
