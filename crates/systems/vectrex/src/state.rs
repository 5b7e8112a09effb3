//! Snapshot plumbing between the host and the machine core.
//!
//! The snapshot format belongs to the core; this layer only checks sizes and
//! moves bytes. Cartridge contents are never part of a snapshot.

use thiserror::Error;

use crate::machine::MachineCore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("State buffer is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("Snapshot rejected by the machine core")]
    Rejected,
}

/// Size-checked access to a core's snapshot.
pub struct StateBridge;

impl StateBridge {
    pub fn size<M: MachineCore>(machine: &M) -> usize {
        machine.state_size()
    }

    fn check_len<M: MachineCore>(machine: &M, len: usize) -> Result<(), StateError> {
        let expected = machine.state_size();
        if len != expected {
            return Err(StateError::SizeMismatch {
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    /// Write the core's snapshot into `buf`.
    pub fn save<M: MachineCore>(machine: &M, buf: &mut [u8]) -> Result<(), StateError> {
        Self::check_len(machine, buf.len())?;
        if machine.save_state(buf) {
            Ok(())
        } else {
            Err(StateError::Rejected)
        }
    }

    /// Overwrite the core's state from `buf`. The core is not touched unless
    /// the length matches.
    pub fn restore<M: MachineCore>(machine: &mut M, buf: &[u8]) -> Result<(), StateError> {
        Self::check_len(machine, buf.len())?;
        if machine.restore_state(buf) {
            Ok(())
        } else {
            Err(StateError::Rejected)
        }
    }
}
