//! Snapshot: everything a run reads from the registry, read exactly once.

use std::collections::BTreeSet;

use serde::Serialize;

use rota_core::{Candidate, CandidateName, CandidateRegistry, Role, RoleRegistry, UnknownPoolPolicy};
use rota_io::hasher::sha256_canonical;

use crate::RunError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Pool candidates known to the registry, sorted by name, one entry each.
    pub candidates: Vec<Candidate>,
    /// Registry roles as returned.
    pub roles: Vec<Role>,
    /// Pool names the registry did not return (sorted).
    pub missing: Vec<CandidateName>,
    /// sha256 over the canonical JSON of `{candidates, roles}`.
    pub digest: String,
}

#[derive(Serialize)]
struct SnapshotPayload<'a> {
    candidates: &'a [Candidate],
    roles: &'a [Role],
}

/// Read the pool and the role registry once each.
pub fn take_snapshot<R, L>(
    registry: &R,
    roles: &L,
    pool: &[CandidateName],
    policy: UnknownPoolPolicy,
) -> Result<Snapshot, RunError>
where
    R: CandidateRegistry + ?Sized,
    L: RoleRegistry + ?Sized,
{
    let wanted: BTreeSet<&CandidateName> = pool.iter().collect();
    let unique: Vec<CandidateName> = wanted.iter().map(|n| (*n).clone()).collect();

    let mut candidates = registry
        .list_eligible(&unique)
        .map_err(|e| RunError::Snapshot(format!("candidate registry: {e}")))?;
    let role_list = roles
        .list_roles_with_priority()
        .map_err(|e| RunError::Snapshot(format!("role registry: {e}")))?;

    // Registry answers are trusted for content, not for shape.
    candidates.retain(|c| wanted.contains(&c.name));
    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    candidates.dedup_by(|a, b| a.name == b.name);

    let found: BTreeSet<&CandidateName> = candidates.iter().map(|c| &c.name).collect();
    let missing: Vec<CandidateName> = wanted.difference(&found).map(|n| (*n).clone()).collect();

    if !missing.is_empty() {
        let list = missing.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ");
        match policy {
            UnknownPoolPolicy::Reject => {
                return Err(RunError::Snapshot(format!("unknown pool names: {list}")));
            }
            UnknownPoolPolicy::Ignore => {
                tracing::warn!(count = missing.len(), names = %list, "unknown pool names skipped");
            }
        }
    }

    let digest = sha256_canonical(&SnapshotPayload { candidates: &candidates, roles: &role_list })?;

    Ok(Snapshot { candidates, roles: role_list, missing, digest })
}
