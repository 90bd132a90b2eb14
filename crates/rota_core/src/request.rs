//! Transient per-run shapes: what the caller asks for, what the allocator
//! answers, and the history deltas that follow.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::names::{CandidateName, RoleName};

/// Role name → number of slots to fill this run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoleRequest {
    slots: BTreeMap<RoleName, u32>,
}

impl RoleRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain list form: one slot per occurrence of a name.
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = RoleName>,
    {
        let mut req = RoleRequest::new();
        for n in names {
            *req.slots.entry(n).or_insert(0) += 1;
        }
        req
    }

    /// Explicit mapping form. A repeated key keeps the last count.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (RoleName, u32)>,
    {
        RoleRequest { slots: counts.into_iter().collect() }
    }

    pub fn insert(&mut self, role: RoleName, slots: u32) {
        self.slots.insert(role, slots);
    }

    /// Requested slots for `role`; unrequested roles have zero.
    pub fn slots(&self, role: &RoleName) -> u32 {
        self.slots.get(role).copied().unwrap_or(0)
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleName> {
        self.slots.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoleName, u32)> {
        self.slots.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total_slots(&self) -> u64 {
        self.slots.values().map(|&v| v as u64).sum()
    }
}

/// Role → chosen candidates, in selection order. Every requested role is
/// present; an empty list means nobody suitable was left.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Assignment {
    by_role: BTreeMap<RoleName, Vec<CandidateName>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, role: RoleName, chosen: Vec<CandidateName>) {
        self.by_role.insert(role, chosen);
    }

    pub fn get(&self, role: &RoleName) -> Option<&[CandidateName]> {
        self.by_role.get(role).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoleName, &[CandidateName])> {
        self.by_role.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_role.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_role.is_empty()
    }

    /// Total number of (role, candidate) placements.
    pub fn placements(&self) -> usize {
        self.by_role.values().map(Vec::len).sum()
    }

    /// Roles that received fewer candidates than requested.
    pub fn unfilled<'a>(&'a self, request: &'a RoleRequest) -> impl Iterator<Item = (&'a RoleName, u32)> + 'a {
        request.iter().filter_map(move |(role, want)| {
            let got = self.by_role.get(role).map(|v| v.len() as u32).unwrap_or(0);
            (got < want).then(|| (role, want - got))
        })
    }
}

/// One queued history update: `candidate` filled `role` once more.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryIncrement {
    pub role: RoleName,
    pub candidate: CandidateName,
    /// Snapshot count + 1.
    pub new_count: u32,
    pub date: String,
}
