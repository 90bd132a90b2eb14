//! Scored greedy allocator.
//!
//! Contract:
//! - Roles are visited in the resolver's processing order.
//! - Per role: drop candidates already used this run, score the rest with
//!   `SelectionScore::for_role`, sort ascending (score, then name) and take
//!   the first `slots` of them. Partial fills and empty roles are normal.
//! - Every chosen (role, candidate) pair queues one `HistoryIncrement` with
//!   `new_count = snapshot count + 1` and the given date marker.
//!
//! Determinism:
//! - The result depends only on the request, the pool snapshot, the role
//!   registry and the date string. Input order of the pool does not matter.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use rota_core::determinism::cmp_scored;
use rota_core::{
    Assignment, Candidate, CandidateName, HistoryIncrement, RoleName, RolePriority, RoleRequest,
    SelectionScore,
};

use crate::resolve::Resolution;

/// One scored contender for a role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedCandidate {
    pub name: CandidateName,
    pub score: SelectionScore,
}

/// Audit entry for one role, in processing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleDecision {
    pub role: RoleName,
    pub priority: RolePriority,
    pub scarcity: usize,
    pub requested: u32,
    /// Unused eligible candidates at the time the role was filled, best first.
    pub ranked: Vec<RankedCandidate>,
    pub chosen: Vec<CandidateName>,
}

impl RoleDecision {
    pub fn is_short(&self) -> bool {
        (self.chosen.len() as u64) < self.requested as u64
    }
}

/// Everything one allocation produces. Nothing here has been persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub assignment: Assignment,
    /// Queued history updates, in processing order.
    pub increments: Vec<HistoryIncrement>,
    pub decisions: Vec<RoleDecision>,
}

/// Fill every requested role from `pool`.
///
/// `pool` must be the same snapshot the resolution was built from; names in
/// the resolution that are missing from `pool` are skipped.
pub fn allocate(resolution: &Resolution, request: &RoleRequest, pool: &[Candidate], date: &str) -> AllocationOutcome {
    let by_name: BTreeMap<&CandidateName, &Candidate> = pool.iter().map(|c| (&c.name, c)).collect();
    let mut used: BTreeSet<CandidateName> = BTreeSet::new();
    let mut out = AllocationOutcome::default();

    for key in &resolution.order {
        let role = &key.name;
        let requested = request.slots(role);

        // 1) Unused eligible candidates, scored.
        let mut ranked: Vec<RankedCandidate> = resolution
            .eligible_for(role)
            .iter()
            .filter(|n| !used.contains(*n))
            .filter_map(|n| by_name.get(n))
            .map(|c| RankedCandidate { name: c.name.clone(), score: SelectionScore::for_role(c, role) })
            .collect();

        // 2) Best first.
        ranked.sort_by(|a, b| cmp_scored((&a.score, &a.name), (&b.score, &b.name)));

        // 3) Take up to `requested`.
        let take = usize::try_from(requested).unwrap_or(usize::MAX).min(ranked.len());
        let chosen: Vec<CandidateName> = ranked[..take].iter().map(|r| r.name.clone()).collect();

        // 4) Commit: mark used, queue increments.
        for name in &chosen {
            used.insert(name.clone());
            let prior = by_name.get(name).map(|c| c.history_count(role)).unwrap_or(0);
            out.increments.push(HistoryIncrement {
                role: role.clone(),
                candidate: name.clone(),
                new_count: prior.saturating_add(1),
                date: date.to_string(),
            });
        }

        out.assignment.record(role.clone(), chosen.clone());
        out.decisions.push(RoleDecision {
            role: role.clone(),
            priority: key.priority,
            scarcity: key.scarcity,
            requested,
            ranked,
            chosen,
        });
    }

    out
}

/// Human-readable one-line summary of a decision (used by logs and the CLI).
pub fn describe(decision: &RoleDecision) -> String {
    use core::fmt::Write;

    let mut s = String::new();
    let _ = write!(s, "{} [{}/{}]:", decision.role, decision.chosen.len(), decision.requested);
    if decision.chosen.is_empty() {
        s.push_str(" -");
    }
    for (i, name) in decision.chosen.iter().enumerate() {
        let _ = write!(s, "{} {}", if i == 0 { "" } else { "," }, name);
    }
    s
}
