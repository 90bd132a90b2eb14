//! Eligibility & ordering resolver.
//!
//! Contract:
//! - For each requested role, the pool candidates who declared it (pool order,
//!   duplicates dropped; the allocator re-ranks anyway).
//! - Processing order: ascending `(priority, scarcity, name)`, where scarcity
//!   is the size of the role's eligibility list and roles missing from the
//!   registry get `RolePriority::Unregistered`.
//!
//! Never fails: an empty pool or empty request yields an empty resolution.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use rota_core::{Candidate, CandidateName, Role, RoleName, RoleOrderKey, RolePriority, RoleRequest};

/// Output of the resolver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Requested roles in processing order, with the key that placed them.
    pub order: Vec<RoleOrderKey>,
    /// Role → eligible candidate names.
    pub eligible: BTreeMap<RoleName, Vec<CandidateName>>,
}

impl Resolution {
    pub fn eligible_for(&self, role: &RoleName) -> &[CandidateName] {
        self.eligible.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Role names only, in processing order.
    pub fn role_order(&self) -> impl Iterator<Item = &RoleName> {
        self.order.iter().map(|k| &k.name)
    }
}

/// Build eligibility lists and the processing order.
///
/// If `roles` lists a name twice, the last entry's priority is used.
pub fn resolve(request: &RoleRequest, pool: &[Candidate], roles: &[Role]) -> Resolution {
    let priorities: BTreeMap<&RoleName, i64> = roles.iter().map(|r| (&r.name, r.priority)).collect();

    let mut eligible: BTreeMap<RoleName, Vec<CandidateName>> = BTreeMap::new();
    for role in request.roles() {
        let mut seen: BTreeSet<&CandidateName> = BTreeSet::new();
        let names: Vec<CandidateName> = pool
            .iter()
            .filter(|c| c.prefers(role) && seen.insert(&c.name))
            .map(|c| c.name.clone())
            .collect();
        eligible.insert(role.clone(), names);
    }

    let mut order: Vec<RoleOrderKey> = request
        .roles()
        .map(|role| RoleOrderKey {
            priority: priorities
                .get(role)
                .map(|&p| RolePriority::Registered(p))
                .unwrap_or(RolePriority::Unregistered),
            scarcity: eligible.get(role).map(Vec::len).unwrap_or(0),
            name: role.clone(),
        })
        .collect();
    order.sort();

    Resolution { order, eligible }
}
