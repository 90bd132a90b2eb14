//! build_result.rs: run artifacts and their IDs.
//!
//! - `ResultDoc.id`  = `RES:` + sha256 of the canonical result payload (every
//!   field except `id`). Identical inputs and date give an identical ID.
//! - `RunRecordDoc.id` = `RUN:<timestamp>:` + sha256 of the canonical record
//!   payload (every field except `id` and `recorded`). `recorded` is only
//!   known after the sink has answered, so it stays out of the hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rota_algo::{AllocationOutcome, RankedCandidate, RoleDecision};
use rota_core::{
    Assignment, CandidateName, HistoryIncrement, Params, RoleName, RolePriority, RoleRequest,
    SelectionScore,
};
use rota_io::hasher::{res_id_from_canonical, run_id_from_canonical};

use crate::snapshot::Snapshot;
use crate::{EngineMeta, RunError};

/* ---------------------------------- Result ---------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDoc {
    pub id: String,
    /// Date marker stamped on this run's increments.
    pub date: String,
    pub request: RoleRequest,
    /// Roles in processing order.
    pub order: Vec<RoleName>,
    pub assignments: Assignment,
    /// Roles that got fewer candidates than requested → missing slot count.
    pub unfilled: BTreeMap<RoleName, u32>,
}

#[derive(Serialize)]
struct ResultNoId<'a> {
    date: &'a str,
    request: &'a RoleRequest,
    order: &'a [RoleName],
    assignments: &'a Assignment,
    unfilled: &'a BTreeMap<RoleName, u32>,
}

pub fn build_result(request: &RoleRequest, outcome: &AllocationOutcome, date: &str) -> Result<ResultDoc, RunError> {
    let order: Vec<RoleName> = outcome.decisions.iter().map(|d| d.role.clone()).collect();
    let unfilled: BTreeMap<RoleName, u32> =
        outcome.assignment.unfilled(request).map(|(r, n)| (r.clone(), n)).collect();

    let id = res_id_from_canonical(&ResultNoId {
        date,
        request,
        order: &order,
        assignments: &outcome.assignment,
        unfilled: &unfilled,
    })?;

    Ok(ResultDoc {
        id,
        date: date.to_string(),
        request: request.clone(),
        order,
        assignments: outcome.assignment.clone(),
        unfilled,
    })
}

/* -------------------------------- Run record -------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEcho {
    pub name: CandidateName,
    pub score: SelectionScore,
}

/// Serializable mirror of one allocator decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEcho {
    pub role: RoleName,
    pub priority: RolePriority,
    pub scarcity: usize,
    pub requested: u32,
    pub ranked: Vec<RankedEcho>,
    pub chosen: Vec<CandidateName>,
}

impl From<&RoleDecision> for DecisionEcho {
    fn from(d: &RoleDecision) -> Self {
        DecisionEcho {
            role: d.role.clone(),
            priority: d.priority,
            scarcity: d.scarcity,
            requested: d.requested,
            ranked: d
                .ranked
                .iter()
                .map(|RankedCandidate { name, score }| RankedEcho { name: name.clone(), score: *score })
                .collect(),
            chosen: d.chosen.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecordDoc {
    pub id: String,
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub params: Params,
    pub snapshot_sha256: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pool_missing: Vec<CandidateName>,
    pub result_id: String,
    pub increments: Vec<HistoryIncrement>,
    pub decisions: Vec<DecisionEcho>,
    /// Whether the history sink accepted the increment batch.
    pub recorded: bool,
}

#[derive(Serialize)]
struct RunNoId<'a> {
    timestamp_utc: &'a str,
    engine: &'a EngineMeta,
    params: &'a Params,
    snapshot_sha256: &'a str,
    #[serde(skip_serializing_if = "<[CandidateName]>::is_empty")]
    pool_missing: &'a [CandidateName],
    result_id: &'a str,
    increments: &'a [HistoryIncrement],
    decisions: &'a [DecisionEcho],
}

/// Assemble the run record. `timestamp_utc` must already be normalized.
pub fn build_run_record(
    timestamp_utc: &str,
    engine: &EngineMeta,
    params: &Params,
    snapshot: &Snapshot,
    result: &ResultDoc,
    outcome: &AllocationOutcome,
) -> Result<RunRecordDoc, RunError> {
    let decisions: Vec<DecisionEcho> = outcome.decisions.iter().map(DecisionEcho::from).collect();

    let id = run_id_from_canonical(
        timestamp_utc,
        &RunNoId {
            timestamp_utc,
            engine,
            params,
            snapshot_sha256: &snapshot.digest,
            pool_missing: &snapshot.missing,
            result_id: &result.id,
            increments: &outcome.increments,
            decisions: &decisions,
        },
    )?;

    Ok(RunRecordDoc {
        id,
        timestamp_utc: timestamp_utc.to_string(),
        engine: engine.clone(),
        params: params.clone(),
        snapshot_sha256: snapshot.digest.clone(),
        pool_missing: snapshot.missing.clone(),
        result_id: result.id.clone(),
        increments: outcome.increments.clone(),
        decisions,
        recorded: false,
    })
}
