// src/core/register.rs

//! Dense state-vector storage for a fixed-size group of qubits.
//!
//! A [`Register`] owns the full 2^N complex amplitude vector of its qubits
//! and provides the unitary-application and projective-measurement primitives
//! the rest of the crate is built on. The Hilbert-space dimension is fixed at
//! construction; composite registers are formed by tensor product when the
//! register is created, never by growing one dynamically.

use crate::core::error::QnetError;
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A single-qubit operator in the computational basis.
pub type SingleQubitGate = [[Complex<f64>; 2]; 2];

/// A two-qubit operator over the basis |q1 q2> = |00>, |01>, |10>, |11>.
pub type TwoQubitGate = [[Complex<f64>; 4]; 4];

/// Probability drift that is silently absorbed by clamping.
const DRIFT_WARN_TOLERANCE: f64 = 1e-9;
/// Probability drift beyond this indicates a gate-application bug and is fatal.
const DRIFT_FATAL_TOLERANCE: f64 = 1e-6;

/// Owns the dense state vector for a group of qubits.
///
/// Qubit index 0 corresponds to the most significant bit of the basis-state
/// index, so for two qubits the amplitude order is |00>, |01>, |10>, |11>.
/// Invariant: the vector norm stays at 1 modulo floating-point drift; it is
/// re-established after every measurement.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct Register {
    state: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl Register {
    /// Creates a register of `num_qubits` fresh qubits in the |0...0> state.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let mut state = vec![Complex::zero(); dim];
        state[0] = Complex::new(1.0, 0.0);
        Self { state, num_qubits }
    }

    /// Builds a register from explicit amplitudes.
    ///
    /// The vector length must be a power of two and the norm must already be
    /// 1 within tolerance; useful for preparing test states.
    pub fn from_amplitudes(amplitudes: Vec<Complex<f64>>) -> Result<Self, QnetError> {
        let dim = amplitudes.len();
        if dim == 0 || !dim.is_power_of_two() {
            return Err(QnetError::DimensionMismatch {
                message: format!("state vector length {} is not a power of two", dim),
            });
        }
        crate::validation::check_normalization(&amplitudes, None)?;
        let num_qubits = dim.trailing_zeros() as usize;
        Ok(Self { state: amplitudes, num_qubits })
    }

    /// Number of qubits held by this register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Dimension of the underlying Hilbert space (2^N).
    pub fn dim(&self) -> usize {
        self.state.len()
    }

    /// Read-only access to the amplitude vector.
    pub fn state(&self) -> &[Complex<f64>] {
        &self.state
    }

    fn check_index(&self, index: usize) -> Result<(), QnetError> {
        if index >= self.num_qubits {
            Err(QnetError::DimensionMismatch {
                message: format!(
                    "qubit index {} out of range for a {}-qubit register",
                    index, self.num_qubits
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Bit mask selecting the basis-index bit belonging to `index`.
    fn bit_mask(&self, index: usize) -> usize {
        1 << (self.num_qubits - 1 - index)
    }

    /// Applies a 2x2 unitary to one qubit, leaving all other qubits untouched
    /// except through entanglement already present.
    pub fn apply_single(&mut self, target: usize, matrix: &SingleQubitGate) -> Result<(), QnetError> {
        self.check_index(target)?;
        let mask = self.bit_mask(target);

        // Walk the basis-state pairs differing only in the target bit.
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let amp0 = self.state[i];
                let amp1 = self.state[j];
                self.state[i] = matrix[0][0] * amp0 + matrix[0][1] * amp1;
                self.state[j] = matrix[1][0] * amp0 + matrix[1][1] * amp1;
            }
        }
        Ok(())
    }

    /// Applies a 4x4 unitary to the ordered qubit pair (`q1`, `q2`).
    pub fn apply_two(&mut self, q1: usize, q2: usize, matrix: &TwoQubitGate) -> Result<(), QnetError> {
        self.check_index(q1)?;
        self.check_index(q2)?;
        if q1 == q2 {
            return Err(QnetError::DimensionMismatch {
                message: format!("two-qubit gate requires distinct operands, got index {} twice", q1),
            });
        }

        let mask1 = self.bit_mask(q1);
        let mask2 = self.bit_mask(q2);

        // Every basis state with both operand bits clear anchors a 4-amplitude
        // subspace; rows/cols of the matrix follow |q1 q2> ordering.
        for base in 0..self.dim() {
            if base & mask1 != 0 || base & mask2 != 0 {
                continue;
            }
            let indices = [base, base | mask2, base | mask1, base | mask1 | mask2];
            let mut amps = [Complex::zero(); 4];
            for (slot, &idx) in amps.iter_mut().zip(indices.iter()) {
                *slot = self.state[idx];
            }
            for (row, &idx) in indices.iter().enumerate() {
                let mut acc = Complex::zero();
                for (col, amp) in amps.iter().enumerate() {
                    acc += matrix[row][col] * amp;
                }
                self.state[idx] = acc;
            }
        }
        Ok(())
    }

    /// Applies `matrix` to `target` conditioned on `control` being |1>.
    ///
    /// The 4x4 embedding acts as identity on the control-|0> subspace and as
    /// `matrix` on the target within the control-|1> subspace.
    pub fn apply_controlled(
        &mut self,
        control: usize,
        target: usize,
        matrix: &SingleQubitGate,
    ) -> Result<(), QnetError> {
        let one = Complex::new(1.0, 0.0);
        let controlled: TwoQubitGate = [
            [one, Complex::zero(), Complex::zero(), Complex::zero()],
            [Complex::zero(), one, Complex::zero(), Complex::zero()],
            [Complex::zero(), Complex::zero(), matrix[0][0], matrix[0][1]],
            [Complex::zero(), Complex::zero(), matrix[1][0], matrix[1][1]],
        ];
        self.apply_two(control, target, &controlled)
    }

    /// Doubly-controlled NOT. The two controls are symmetric.
    pub fn apply_toffoli(&mut self, c1: usize, c2: usize, target: usize) -> Result<(), QnetError> {
        self.check_index(c1)?;
        self.check_index(c2)?;
        self.check_index(target)?;
        if c1 == c2 || c1 == target || c2 == target {
            return Err(QnetError::DimensionMismatch {
                message: format!(
                    "Toffoli requires three distinct operands, got ({}, {}, {})",
                    c1, c2, target
                ),
            });
        }

        let c1_mask = self.bit_mask(c1);
        let c2_mask = self.bit_mask(c2);
        let t_mask = self.bit_mask(target);

        for i in 0..self.dim() {
            // Swap the target pair wherever both control bits are set.
            if i & c1_mask != 0 && i & c2_mask != 0 && i & t_mask == 0 {
                self.state.swap(i, i | t_mask);
            }
        }
        Ok(())
    }

    /// Marginal probability of measuring `target` as 0.
    pub fn prob_of_zero(&self, target: usize) -> Result<f64, QnetError> {
        self.check_index(target)?;
        let mask = self.bit_mask(target);
        let prob: f64 = self
            .state
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask == 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum();
        Ok(prob)
    }

    /// Projective measurement of one qubit in the computational basis.
    ///
    /// The outcome is drawn from the caller's random source, the state vector
    /// is collapsed to consistency with the outcome and fully renormalized.
    /// Probability drift beyond [`DRIFT_FATAL_TOLERANCE`] aborts; smaller
    /// drift is clamped away and logged.
    pub fn measure<R: Rng + ?Sized>(&mut self, target: usize, rng: &mut R) -> Result<u8, QnetError> {
        let prob0 = self.prob_of_zero(target)?;
        let clamped = prob0.clamp(0.0, 1.0);
        let drift = (prob0 - clamped).abs();
        if drift > DRIFT_FATAL_TOLERANCE {
            return Err(QnetError::NumericInstability {
                message: format!(
                    "measurement probability {} drifted {} outside [0, 1]",
                    prob0, drift
                ),
            });
        }
        if drift > DRIFT_WARN_TOLERANCE {
            log::warn!("clamped measurement probability {prob0} into [0, 1]");
        }

        let outcome: u8 = if rng.random::<f64>() < clamped { 0 } else { 1 };

        let mask = self.bit_mask(target);
        let keep_bit = if outcome == 0 { 0 } else { mask };
        for (i, amp) in self.state.iter_mut().enumerate() {
            if i & mask != keep_bit {
                *amp = Complex::zero();
            }
        }
        self.normalize();
        Ok(outcome)
    }

    /// Rescales the state vector to unit norm.
    pub(crate) fn normalize(&mut self) {
        let norm_sqr: f64 = self.state.iter().map(|amp| amp.norm_sqr()).sum();
        if norm_sqr > 0.0 {
            let norm = norm_sqr.sqrt();
            for amp in &mut self.state {
                *amp /= norm;
            }
        }
    }
}

/// Shared handle to one register, as yielded by a register stream.
///
/// Agents mint [`Qubit`](crate::core::qubit::Qubit) handles from it and may
/// inspect amplitudes for analysis; the register itself stays behind a mutex
/// so a handle received over a channel is usable from the receiving agent's
/// thread.
#[derive(Clone)]
pub struct RegisterHandle {
    inner: Arc<Mutex<Register>>,
    num_qubits: usize,
}

impl RegisterHandle {
    pub(crate) fn new(inner: Arc<Mutex<Register>>, num_qubits: usize) -> Self {
        Self { inner, num_qubits }
    }

    /// Wraps a bare register for standalone (stream-less) use.
    pub fn from_register(register: Register) -> Self {
        let num_qubits = register.num_qubits();
        Self::new(Arc::new(Mutex::new(register)), num_qubits)
    }

    /// Number of qubits in the underlying register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Mints a handle to the qubit at `index`.
    pub fn qubit(&self, index: usize) -> Result<crate::core::qubit::Qubit, QnetError> {
        if index >= self.num_qubits {
            return Err(QnetError::DimensionMismatch {
                message: format!(
                    "qubit index {} out of range for a {}-qubit register",
                    index, self.num_qubits
                ),
            });
        }
        Ok(crate::core::qubit::Qubit::new(self.inner.clone(), index))
    }

    /// Mints handles to every qubit, in index order.
    pub fn qubits(&self) -> Vec<crate::core::qubit::Qubit> {
        (0..self.num_qubits)
            .map(|i| crate::core::qubit::Qubit::new(self.inner.clone(), i))
            .collect()
    }

    /// Snapshot of the current amplitude vector.
    pub fn snapshot(&self) -> Result<Vec<Complex<f64>>, QnetError> {
        Ok(self.lock()?.state().to_vec())
    }

    /// Marginal probability of measuring qubit `index` as 0.
    pub fn prob_of_zero(&self, index: usize) -> Result<f64, QnetError> {
        self.lock()?.prob_of_zero(index)
    }

    pub(crate) fn lock(&self) -> Result<std::sync::MutexGuard<'_, Register>, QnetError> {
        self.inner.lock().map_err(|_| QnetError::SimulationError {
            message: "register lock poisoned by a panicked agent".to_string(),
        })
    }
}

impl fmt::Debug for RegisterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterHandle")
            .field("num_qubits", &self.num_qubits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TOL: f64 = 1e-12;

    fn assert_amps(register: &Register, expected: &[Complex<f64>]) {
        assert_eq!(register.dim(), expected.len());
        for (i, (got, want)) in register.state().iter().zip(expected.iter()).enumerate() {
            assert!(
                (got - want).norm_sqr() < TOL,
                "amplitude mismatch at index {}: got {}, want {}",
                i,
                got,
                want
            );
        }
    }

    #[test]
    fn new_register_is_all_zeros_state() {
        let register = Register::new(3);
        assert_eq!(register.num_qubits(), 3);
        assert_eq!(register.dim(), 8);
        assert!((register.state()[0] - Complex::new(1.0, 0.0)).norm_sqr() < TOL);
        assert!(register.state()[1..].iter().all(|amp| amp.norm_sqr() < TOL));
    }

    #[test]
    fn single_qubit_gate_targets_correct_bit() {
        // X on qubit 1 of |00> gives |01>.
        let mut register = Register::new(2);
        let x = crate::operations::pauli_x_matrix();
        register.apply_single(1, &x).unwrap();
        let one = Complex::new(1.0, 0.0);
        assert_amps(&register, &[Complex::zero(), one, Complex::zero(), Complex::zero()]);
    }

    #[test]
    fn hadamard_then_cnot_builds_bell_pair() {
        let mut register = Register::new(2);
        register.apply_single(0, &crate::operations::hadamard_matrix()).unwrap();
        register
            .apply_controlled(0, 1, &crate::operations::pauli_x_matrix())
            .unwrap();
        let amp = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert_amps(&register, &[amp, Complex::zero(), Complex::zero(), amp]);
    }

    #[test]
    fn toffoli_flips_target_only_when_both_controls_set() {
        let mut register = Register::new(3);
        let x = crate::operations::pauli_x_matrix();
        register.apply_single(0, &x).unwrap();
        register.apply_single(1, &x).unwrap(); // |110>
        register.apply_toffoli(0, 1, 2).unwrap(); // -> |111>
        let one = Complex::new(1.0, 0.0);
        let mut expected = vec![Complex::zero(); 8];
        expected[7] = one;
        assert_amps(&register, &expected);

        // Controls are symmetric.
        let mut register = Register::new(3);
        register.apply_single(1, &x).unwrap(); // |010>: only one control set
        register.apply_toffoli(2, 1, 0).unwrap();
        let mut expected = vec![Complex::zero(); 8];
        expected[2] = one;
        assert_amps(&register, &expected);
    }

    #[test]
    fn toffoli_rejects_duplicate_operands() {
        let mut register = Register::new(3);
        let err = register.apply_toffoli(0, 0, 2).unwrap_err();
        assert!(matches!(err, QnetError::DimensionMismatch { .. }));
    }

    #[test]
    fn gate_index_out_of_range_is_fatal() {
        let mut register = Register::new(2);
        let err = register
            .apply_single(2, &crate::operations::pauli_x_matrix())
            .unwrap_err();
        assert!(matches!(err, QnetError::DimensionMismatch { .. }));
    }

    #[test]
    fn measurement_collapses_and_renormalizes() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut register = Register::new(2);
        register.apply_single(0, &crate::operations::hadamard_matrix()).unwrap();
        register
            .apply_controlled(0, 1, &crate::operations::pauli_x_matrix())
            .unwrap();

        // Bell pair: both qubits must agree after collapse.
        let first = register.measure(0, &mut rng).unwrap();
        let second = register.measure(1, &mut rng).unwrap();
        assert_eq!(first, second);

        let norm_sqr: f64 = register.state().iter().map(|amp| amp.norm_sqr()).sum();
        assert!((norm_sqr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn measurement_of_basis_state_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut register = Register::new(1);
        register.apply_single(0, &crate::operations::pauli_x_matrix()).unwrap();
        for _ in 0..10 {
            assert_eq!(register.measure(0, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn from_amplitudes_rejects_unnormalized_input() {
        let err = Register::from_amplitudes(vec![
            Complex::new(1.0, 0.0),
            Complex::new(1.0, 0.0),
        ])
        .unwrap_err();
        assert!(matches!(err, QnetError::NumericInstability { .. }));
    }
}
