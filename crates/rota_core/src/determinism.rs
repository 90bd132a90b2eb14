//! Determinism utilities: explicit comparison keys for role processing order
//! and candidate selection.
//!
//! Both keys are plain records whose derived `Ord` is lexicographic in field
//! declaration order. Do not reorder fields.

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entities::Candidate;
use crate::names::{CandidateName, RoleName};

/* -------------------------------------------------------------------------- */
/*                              Role processing order                          */
/* -------------------------------------------------------------------------- */

/// Priority as seen by the resolver.
///
/// `Unregistered` sorts after every `Registered` value, whatever the integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RolePriority {
    Registered(i64),
    Unregistered,
}

/// `(priority, scarcity, name)` ascending.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoleOrderKey {
    pub priority: RolePriority,
    /// Size of the role's eligibility list at resolution time.
    pub scarcity: usize,
    pub name: RoleName,
}

/* -------------------------------------------------------------------------- */
/*                               Candidate selection                           */
/* -------------------------------------------------------------------------- */

/// Single-preference candidates always rank ahead of flexible ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tier {
    SinglePreference,
    MultiPreference,
}

/// Selection score for one candidate on one role; lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionScore {
    pub tier: Tier,
    /// Prior assignments to this role.
    pub history_count: u32,
    /// 0 for single-preference candidates, else the preference count.
    pub tiebreak: u32,
}

impl SelectionScore {
    /// Score `candidate` for `role`.
    pub fn for_role(candidate: &Candidate, role: &RoleName) -> Self {
        let history_count = candidate.history_count(role);
        let prefs = candidate.preference_count();
        if prefs == 1 {
            SelectionScore { tier: Tier::SinglePreference, history_count, tiebreak: 0 }
        } else {
            SelectionScore {
                tier: Tier::MultiPreference,
                history_count,
                tiebreak: u32::try_from(prefs).unwrap_or(u32::MAX),
            }
        }
    }
}

/// Compare by score, then by candidate name.
#[inline]
pub fn cmp_scored(a: (&SelectionScore, &CandidateName), b: (&SelectionScore, &CandidateName)) -> Ordering {
    match a.0.cmp(b.0) {
        Ordering::Equal => a.1.as_str().cmp(b.1.as_str()),
        o => o,
    }
}

/* ---------------------------------- Tests --------------------------------- */
