//! Collaborator interfaces consumed by an assignment run.
//!
//! Interfaces only; implementations live in `rota_io` (file-backed and
//! in-memory). Runs receive them as parameters, never as globals.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::entities::{Candidate, Role};
use crate::names::CandidateName;
use crate::request::HistoryIncrement;

/// Failure reported by a collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollabError {
    /// Backing store could not be reached or read.
    Unavailable(String),
    /// Backing store content is malformed.
    Corrupt(String),
    /// A write was attempted and did not complete.
    Write(String),
}

impl fmt::Display for CollabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollabError::Unavailable(m) => write!(f, "store unavailable: {m}"),
            CollabError::Corrupt(m) => write!(f, "store corrupt: {m}"),
            CollabError::Write(m) => write!(f, "store write failed: {m}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CollabError {}

/// Read access to people.
pub trait CandidateRegistry {
    /// Candidates whose names are in `pool`. Unknown names are simply absent
    /// from the answer.
    fn list_eligible(&self, pool: &[CandidateName]) -> Result<Vec<Candidate>, CollabError>;
}

/// Read access to roles and their priorities.
pub trait RoleRegistry {
    fn list_roles_with_priority(&self) -> Result<Vec<Role>, CollabError>;
}

/// Persists history deltas. Called exactly once per run, with the whole batch.
pub trait HistorySink {
    fn apply_increments(&mut self, batch: &[HistoryIncrement]) -> Result<(), CollabError>;
}

impl<T: CandidateRegistry + ?Sized> CandidateRegistry for &T {
    fn list_eligible(&self, pool: &[CandidateName]) -> Result<Vec<Candidate>, CollabError> {
        (**self).list_eligible(pool)
    }
}

impl<T: RoleRegistry + ?Sized> RoleRegistry for &T {
    fn list_roles_with_priority(&self) -> Result<Vec<Role>, CollabError> {
        (**self).list_roles_with_priority()
    }
}

impl<T: HistorySink + ?Sized> HistorySink for &mut T {
    fn apply_increments(&mut self, batch: &[HistoryIncrement]) -> Result<(), CollabError> {
        (**self).apply_increments(batch)
    }
}
