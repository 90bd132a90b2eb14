//! Registry entities: candidates, roles and per-role assignment history.
//!
//! These are owned by the registry collaborator and outlive any single run.
//! The allocator only ever reads them from a snapshot.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::names::{CandidateName, RoleName};

/// How often a candidate has filled one role, and when they last did.
///
/// `last_date` is an opaque marker (the caller decides its format); it is
/// copied forward, never parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoleHistory {
    pub count: u32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_date: Option<String>,
}

/// A person who can be placed into roles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub name: CandidateName,
    /// Declared roles; set semantics, insertion order kept for display only.
    pub preferences: Vec<RoleName>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub history: BTreeMap<RoleName, RoleHistory>,
}

impl Candidate {
    /// Build a candidate, dropping repeated preferences (first occurrence wins).
    pub fn new<I>(name: CandidateName, preferences: I) -> Self
    where
        I: IntoIterator<Item = RoleName>,
    {
        let mut c = Candidate { name, preferences: preferences.into_iter().collect(), history: BTreeMap::new() };
        c.dedup_preferences();
        c
    }

    pub fn with_history(mut self, role: RoleName, count: u32, last_date: Option<String>) -> Self {
        self.history.insert(role, RoleHistory { count, last_date });
        self
    }

    /// Remove repeated preferences in place. Returns how many were dropped.
    pub fn dedup_preferences(&mut self) -> usize {
        let before = self.preferences.len();
        let mut seen: BTreeSet<RoleName> = BTreeSet::new();
        self.preferences.retain(|r| seen.insert(r.clone()));
        before - self.preferences.len()
    }

    #[inline]
    pub fn prefers(&self, role: &RoleName) -> bool {
        self.preferences.iter().any(|r| r == role)
    }

    #[inline]
    pub fn preference_count(&self) -> usize {
        self.preferences.len()
    }

    /// Prior assignments to `role`; absent history counts as zero.
    #[inline]
    pub fn history_count(&self, role: &RoleName) -> u32 {
        self.history.get(role).map(|h| h.count).unwrap_or(0)
    }
}

/// A named slot type with a priority rank (lower value = filled earlier).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Role {
    pub name: RoleName,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i64,
}

impl Role {
    pub fn new(name: RoleName, priority: i64) -> Self {
        Role { name, priority }
    }
}
