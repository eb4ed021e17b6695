// src/operations/mod.rs

//! Gate operations on qubit handles.
//!
//! Matrix constructors return plain `[[Complex<f64>; 2]; 2]` arrays in the
//! computational basis; the free functions wrap them for application to
//! [`Qubit`] handles, locking the backing register for the duration of the
//! update. Multi-qubit gates require all operands to live in the same
//! register; composite spaces are fixed when a register is constructed.

use crate::core::error::QnetError;
use crate::core::qubit::Qubit;
use crate::core::register::SingleQubitGate;
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;

/// Identity operator.
pub fn identity_matrix() -> SingleQubitGate {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(1.0, 0.0)],
    ]
}

/// Hadamard gate.
pub fn hadamard_matrix() -> SingleQubitGate {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

/// Pauli-X (bit flip).
pub fn pauli_x_matrix() -> SingleQubitGate {
    [
        [Complex::zero(), Complex::new(1.0, 0.0)],
        [Complex::new(1.0, 0.0), Complex::zero()],
    ]
}

/// Pauli-Y (bit + phase flip).
pub fn pauli_y_matrix() -> SingleQubitGate {
    let i = Complex::i();
    [[Complex::zero(), -i], [i, Complex::zero()]]
}

/// Pauli-Z (phase flip).
pub fn pauli_z_matrix() -> SingleQubitGate {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(-1.0, 0.0)],
    ]
}

/// Rotation about the X axis: cos(θ/2)·I - i·sin(θ/2)·X.
pub fn rx_matrix(theta: f64) -> SingleQubitGate {
    let half = theta / 2.0;
    let cos = Complex::new(half.cos(), 0.0);
    let msin = -Complex::i() * half.sin();
    [[cos, msin], [msin, cos]]
}

/// Rotation about the Z axis: cos(θ/2)·I - i·sin(θ/2)·Z.
pub fn rz_matrix(theta: f64) -> SingleQubitGate {
    let half = theta / 2.0;
    [
        [Complex::new(half.cos(), -half.sin()), Complex::zero()],
        [Complex::zero(), Complex::new(half.cos(), half.sin())],
    ]
}

/// Applies an arbitrary single-qubit unitary to a handle.
pub fn apply(qubit: &Qubit, matrix: &SingleQubitGate) -> Result<(), QnetError> {
    qubit.lock()?.apply_single(qubit.index(), matrix)
}

/// Hadamard.
pub fn h(qubit: &Qubit) -> Result<(), QnetError> {
    apply(qubit, &hadamard_matrix())
}

/// Pauli-X.
pub fn x(qubit: &Qubit) -> Result<(), QnetError> {
    apply(qubit, &pauli_x_matrix())
}

/// Pauli-Y.
pub fn y(qubit: &Qubit) -> Result<(), QnetError> {
    apply(qubit, &pauli_y_matrix())
}

/// Pauli-Z.
pub fn z(qubit: &Qubit) -> Result<(), QnetError> {
    apply(qubit, &pauli_z_matrix())
}

/// X-axis rotation by `theta` radians.
pub fn rx(qubit: &Qubit, theta: f64) -> Result<(), QnetError> {
    apply(qubit, &rx_matrix(theta))
}

/// Z-axis rotation by `theta` radians.
pub fn rz(qubit: &Qubit, theta: f64) -> Result<(), QnetError> {
    apply(qubit, &rz_matrix(theta))
}

fn require_same_register(a: &Qubit, b: &Qubit, gate: &str) -> Result<(), QnetError> {
    if a.same_register(b) {
        Ok(())
    } else {
        Err(QnetError::DimensionMismatch {
            message: format!("{} operands live in different registers", gate),
        })
    }
}

/// Controlled-NOT.
pub fn cnot(control: &Qubit, target: &Qubit) -> Result<(), QnetError> {
    require_same_register(control, target, "CNOT")?;
    control
        .lock()?
        .apply_controlled(control.index(), target.index(), &pauli_x_matrix())
}

/// Controlled-Z.
pub fn cz(control: &Qubit, target: &Qubit) -> Result<(), QnetError> {
    require_same_register(control, target, "CZ")?;
    control
        .lock()?
        .apply_controlled(control.index(), target.index(), &pauli_z_matrix())
}

/// Doubly-controlled NOT (Toffoli); symmetric in its two controls.
pub fn toffoli(c1: &Qubit, c2: &Qubit, target: &Qubit) -> Result<(), QnetError> {
    require_same_register(c1, c2, "Toffoli")?;
    require_same_register(c1, target, "Toffoli")?;
    c1.lock()?.apply_toffoli(c1.index(), c2.index(), target.index())
}

/// Projective measurement in the computational basis, drawn from `rng`.
pub fn measure<R: Rng + ?Sized>(qubit: &Qubit, rng: &mut R) -> Result<u8, QnetError> {
    qubit.lock()?.measure(qubit.index(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::register::{Register, RegisterHandle};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn cross_register_cnot_is_rejected() {
        let a = RegisterHandle::from_register(Register::new(1));
        let b = RegisterHandle::from_register(Register::new(1));
        let qa = a.qubit(0).unwrap();
        let qb = b.qubit(0).unwrap();
        let err = cnot(&qa, &qb).unwrap_err();
        assert!(matches!(err, QnetError::DimensionMismatch { .. }));
    }

    #[test]
    fn rx_statistics_match_sin_squared() {
        // P(1) after RX(θ)|0> is sin²(θ/2); check a quarter turn exactly.
        let theta = std::f64::consts::FRAC_PI_2;
        let handle = RegisterHandle::from_register(Register::new(1));
        let qubit = handle.qubit(0).unwrap();
        rx(&qubit, theta).unwrap();
        let p0 = handle.prob_of_zero(0).unwrap();
        assert!((p0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn double_hadamard_is_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        let handle = RegisterHandle::from_register(Register::new(1));
        let qubit = handle.qubit(0).unwrap();
        h(&qubit).unwrap();
        h(&qubit).unwrap();
        assert_eq!(measure(&qubit, &mut rng).unwrap(), 0);
    }

    #[test]
    fn cz_introduces_phase_on_11_only() {
        let handle = RegisterHandle::from_register(Register::new(2));
        let q0 = handle.qubit(0).unwrap();
        let q1 = handle.qubit(1).unwrap();
        x(&q0).unwrap();
        x(&q1).unwrap(); // |11>
        cz(&q0, &q1).unwrap();
        let amps = handle.snapshot().unwrap();
        assert!((amps[3] - Complex::new(-1.0, 0.0)).norm_sqr() < 1e-12);
    }
}
