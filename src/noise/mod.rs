// src/noise/mod.rs

//! Stateful error stages for qubits in transit.
//!
//! A quantum channel owns an ordered list of [`ErrorModel`] stages, applied
//! left-to-right to every item sent. Each stage owns its private mutable
//! state (counters, flags), passed the channel's contextual parameters at
//! construction; nothing is shared across channels or directions. Every
//! stage must tolerate an absent item (an upstream stage may already have
//! withheld the qubit) by passing `None` through untouched.

use crate::core::error::QnetError;
use crate::core::qubit::Qubit;
use crate::core::register::SingleQubitGate;
use crate::operations;
use num_complex::Complex;
use rand::Rng;
use rand::rngs::StdRng;
use std::f64::consts::TAU;

/// Fiber attenuation in dB/km used by [`Attenuation::fiber`].
pub const FIBER_ATTENUATION_DB_PER_KM: f64 = -0.16;

/// A stateful transformation applied to each item crossing a quantum channel.
///
/// Implementations mutate the qubit's register through its handle (unitary
/// corruptions), withhold the item by returning `None`, or pass it through
/// unchanged. Randomness comes from the sending agent's source so runs stay
/// reproducible under a fixed seed.
pub trait ErrorModel: Send {
    /// Transforms one in-transit item; `None` marks an already-withheld qubit.
    fn apply(&mut self, item: Option<Qubit>, rng: &mut StdRng) -> Result<Option<Qubit>, QnetError>;
}

/// Samples a Haar-random 2x2 unitary.
///
/// Standard parametrization: U = e^(iα) · [[e^(iψ)cosθ, e^(iχ)sinθ],
/// [-e^(-iχ)sinθ, e^(-iψ)cosθ]] with α, ψ, χ uniform on [0, 2π) and
/// θ = asin(√ξ) for ξ uniform on [0, 1).
pub fn haar_unitary(rng: &mut StdRng) -> SingleQubitGate {
    let alpha = rng.random::<f64>() * TAU;
    let psi = rng.random::<f64>() * TAU;
    let chi = rng.random::<f64>() * TAU;
    let theta = rng.random::<f64>().sqrt().asin();

    let global = Complex::from_polar(1.0, alpha);
    let cos = theta.cos();
    let sin = theta.sin();
    [
        [
            global * Complex::from_polar(cos, psi),
            global * Complex::from_polar(sin, chi),
        ],
        [
            global * -Complex::from_polar(sin, -chi),
            global * Complex::from_polar(cos, -psi),
        ],
    ]
}

/// Normally-distributed sample via the Box–Muller transform.
fn gaussian(rng: &mut StdRng, sigma: f64) -> f64 {
    // 1 - u keeps the argument of ln strictly positive.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    sigma * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Corrupts at most one qubit per consecutive group of `group_size` items.
///
/// At each group boundary one coin is flipped: with `probability` the group
/// is marked for corruption, and the group's first present item then
/// receives a freshly-drawn Haar-random unitary; the rest of the group
/// passes clean. A group is corrupted with probability exactly
/// `probability`, independent of the group size. The per-group state lives
/// here, never in the channel.
pub struct GroupedUnitary {
    group_size: usize,
    probability: f64,
    counter: usize,
    pending: bool,
}

impl GroupedUnitary {
    /// `group_size` must be at least 1 and `probability` within [0, 1].
    pub fn new(group_size: usize, probability: f64) -> Result<Self, QnetError> {
        if group_size == 0 {
            return Err(QnetError::InvalidOperation {
                message: "error group size must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(QnetError::InvalidOperation {
                message: format!("error probability {} outside [0, 1]", probability),
            });
        }
        Ok(Self {
            group_size,
            probability,
            counter: 0,
            pending: false,
        })
    }
}

impl ErrorModel for GroupedUnitary {
    fn apply(&mut self, item: Option<Qubit>, rng: &mut StdRng) -> Result<Option<Qubit>, QnetError> {
        if self.counter == 0 {
            // Group boundary: decide this group's fate with a single coin.
            self.pending = rng.random::<f64>() < self.probability;
        }
        self.counter = (self.counter + 1) % self.group_size;

        let Some(qubit) = item else {
            // An upstream stage withheld the qubit; the corruption stays
            // pending for the group's next present item.
            return Ok(None);
        };
        if self.pending {
            let unitary = haar_unitary(rng);
            operations::apply(&qubit, &unitary)?;
            self.pending = false;
        }
        Ok(Some(qubit))
    }
}

/// Possible loss of a photon in a fiber-optic channel.
///
/// With probability `1 - survival` the qubit is measured (collapsing its
/// register) and withheld from the receiver.
pub struct Attenuation {
    survival: f64,
}

impl Attenuation {
    /// Directly specifies the per-item survival probability.
    pub fn new(survival: f64) -> Result<Self, QnetError> {
        if !(0.0..=1.0).contains(&survival) {
            return Err(QnetError::InvalidOperation {
                message: format!("survival probability {} outside [0, 1]", survival),
            });
        }
        Ok(Self { survival })
    }

    /// Survival derived from fiber length: 10^(length · dB/km / 10).
    pub fn fiber(length_km: f64) -> Result<Self, QnetError> {
        let decibel_loss = length_km * FIBER_ATTENUATION_DB_PER_KM;
        Self::new(10f64.powf(decibel_loss / 10.0))
    }
}

impl ErrorModel for Attenuation {
    fn apply(&mut self, item: Option<Qubit>, rng: &mut StdRng) -> Result<Option<Qubit>, QnetError> {
        let Some(qubit) = item else {
            return Ok(None);
        };
        if rng.random::<f64>() > self.survival {
            // Lost photon: the environment measures it.
            operations::measure(&qubit, rng)?;
            return Ok(None);
        }
        Ok(Some(qubit))
    }
}

/// Independent X and Z rotations with Gaussian-distributed angles.
pub struct RandomUnitary {
    sigma: f64,
}

impl RandomUnitary {
    /// `sigma` is the standard deviation of both rotation angles, in radians.
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }
}

impl ErrorModel for RandomUnitary {
    fn apply(&mut self, item: Option<Qubit>, rng: &mut StdRng) -> Result<Option<Qubit>, QnetError> {
        let Some(qubit) = item else {
            return Ok(None);
        };
        let x_angle = gaussian(rng, self.sigma);
        let z_angle = gaussian(rng, self.sigma);
        operations::rx(&qubit, x_angle)?;
        operations::rz(&qubit, z_angle)?;
        Ok(Some(qubit))
    }
}

/// One fixed unitary applied to every item on the channel.
pub struct SystematicUnitary {
    matrix: SingleQubitGate,
}

impl SystematicUnitary {
    /// Rejects matrices that are not unitary within 1e-9.
    pub fn new(matrix: SingleQubitGate) -> Result<Self, QnetError> {
        if !crate::validation::is_unitary(&matrix, 1e-9) {
            return Err(QnetError::InvalidOperation {
                message: "systematic error operator must be unitary".to_string(),
            });
        }
        Ok(Self { matrix })
    }
}

impl ErrorModel for SystematicUnitary {
    fn apply(&mut self, item: Option<Qubit>, _rng: &mut StdRng) -> Result<Option<Qubit>, QnetError> {
        let Some(qubit) = item else {
            return Ok(None);
        };
        operations::apply(&qubit, &self.matrix)?;
        Ok(Some(qubit))
    }
}
