// src/core/qubit.rs

//! Qubit handles: the unit agents operate on and transfer over channels.

use crate::core::register::Register;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::error::QnetError;

/// A reference to one qubit's position within a register.
///
/// Handles are deliberately not `Clone`: sending a handle over a quantum
/// channel moves it, transferring mutation rights to the receiving agent.
/// The sender holds no handle to that qubit afterwards, which makes the
/// single-writer hand-off discipline explicit in the type system. Fresh
/// handles are minted from a
/// [`RegisterHandle`](crate::core::register::RegisterHandle).
pub struct Qubit {
    register: Arc<Mutex<Register>>,
    index: usize,
}

impl Qubit {
    pub(crate) fn new(register: Arc<Mutex<Register>>, index: usize) -> Self {
        Self { register, index }
    }

    /// The qubit's position within its register.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether two handles point into the same register storage.
    pub fn same_register(&self, other: &Qubit) -> bool {
        Arc::ptr_eq(&self.register, &other.register)
    }

    /// Locks the backing register for a gate or measurement.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Register>, QnetError> {
        self.register.lock().map_err(|_| QnetError::SimulationError {
            message: "register lock poisoned by a panicked agent".to_string(),
        })
    }
}

impl fmt::Debug for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qubit({})", self.index)
    }
}
