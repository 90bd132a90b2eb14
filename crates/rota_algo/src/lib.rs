// crates/rota_algo/src/lib.rs
#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! Pure allocation algorithms. No I/O, no clock, no logging: a run is a
//! function of its snapshot inputs.
//!
//! - [`resolve`]: per-role eligibility lists and the role processing order.
//! - [`allocate`]: scored greedy selection, one role per candidate per run,
//!   plus the queued history increments and a per-role decision log.

extern crate alloc;

pub mod resolve;
pub mod allocate;

pub use resolve::{resolve, Resolution};
pub use allocate::{allocate, AllocationOutcome, RankedCandidate, RoleDecision};

// Convenience re-exports (pipeline imports these from crate root)
pub use rota_core::{
    Assignment, Candidate, CandidateName, HistoryIncrement, Role, RoleName, RoleOrderKey,
    RolePriority, RoleRequest, SelectionScore, Tier,
};

/// Resolve and allocate in one call.
pub fn assign(request: &RoleRequest, pool: &[Candidate], roles: &[Role], date: &str) -> AllocationOutcome {
    let resolution = resolve(request, pool, roles);
    allocate(&resolution, request, pool, date)
}
