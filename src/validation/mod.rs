// src/validation/mod.rs

//! Numeric invariant checks shared by the register engine and tests.

use crate::core::error::QnetError;
use crate::core::register::SingleQubitGate;
use num_complex::Complex;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks that a state vector is normalized (sum of squared amplitudes ≈ 1).
///
/// # Arguments
/// * `state` - The amplitude vector to check.
/// * `tolerance` - Allowed deviation from 1.0; defaults to 1e-9.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QnetError::NumericInstability)` otherwise.
pub fn check_normalization(state: &[Complex<f64>], tolerance: Option<f64>) -> Result<(), QnetError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sqr: f64 = state.iter().map(|amp| amp.norm_sqr()).sum();
    if (norm_sqr - 1.0).abs() > effective_tolerance {
        Err(QnetError::NumericInstability {
            message: format!(
                "state vector normalization failed: sum(|c_i|^2) = {} (deviation > {})",
                norm_sqr, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Overlap magnitude |<a|b>| between two state vectors.
///
/// Equal states give 1 regardless of global phase, which makes this the
/// right equality notion for recovered quantum states.
pub fn fidelity(a: &[Complex<f64>], b: &[Complex<f64>]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let overlap: Complex<f64> = a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum();
    overlap.norm()
}

/// Whether a 2x2 matrix is unitary within `tolerance` (U·U† ≈ I).
pub fn is_unitary(matrix: &SingleQubitGate, tolerance: f64) -> bool {
    let mut product = [[Complex::new(0.0, 0.0); 2]; 2];
    for (row, product_row) in product.iter_mut().enumerate() {
        for (col, entry) in product_row.iter_mut().enumerate() {
            // (U·U†)[row][col] = Σ_k U[row][k] · conj(U[col][k])
            for k in 0..2 {
                *entry += matrix[row][k] * matrix[col][k].conj();
            }
        }
    }
    let identity_dev = |r: usize, c: usize| {
        let expected = if r == c { Complex::new(1.0, 0.0) } else { Complex::new(0.0, 0.0) };
        (product[r][c] - expected).norm()
    };
    (0..2).all(|r| (0..2).all(|c| identity_dev(r, c) < tolerance))
}
