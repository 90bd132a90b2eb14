//! Orchestration of one assignment run.
//!
//! `prepare_run` does steps 1–3 (snapshot, resolve + allocate, artifacts) and
//! never writes. `record_run` is step 4: one `apply_increments` call with the
//! whole batch, empty or not. `run_assignment` chains both for separate
//! collaborators; `run_with_store` does the same for one object that is
//! registry and sink at once (e.g. `FileStore`).

use rota_algo::{allocate, resolve, AllocationOutcome};
use rota_core::{Assignment, CandidateName, CandidateRegistry, HistorySink, Params, RoleRegistry, RoleRequest};
use rota_io::hasher::normalize_utc_seconds;

use crate::build_result::{build_result, build_run_record, ResultDoc, RunRecordDoc};
use crate::snapshot::{take_snapshot, Snapshot};
use crate::{EngineMeta, RunError};

/// Per-run inputs that are not collaborator data.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Marker written as `last_date` on every increment.
    pub date: String,
    /// RFC3339 UTC; part of the run ID.
    pub timestamp_utc: String,
    pub params: Params,
    pub engine: EngineMeta,
}

/// What a run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    pub assignment: Assignment,
    pub result: ResultDoc,
    pub run_record: RunRecordDoc,
}

/// A computed run that has not been recorded yet. Dropping it applies nothing.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub snapshot: Snapshot,
    pub outcome: AllocationOutcome,
    pub outputs: RunOutputs,
}

/// Steps 1–3. Pure with respect to the sink.
pub fn prepare_run<R, L>(
    registry: &R,
    roles: &L,
    request: &RoleRequest,
    pool: &[CandidateName],
    opts: &RunOptions,
) -> Result<PreparedRun, RunError>
where
    R: CandidateRegistry + ?Sized,
    L: RoleRegistry + ?Sized,
{
    let timestamp = normalize_utc_seconds(&opts.timestamp_utc).map_err(|e| RunError::Options(e.to_string()))?;
    opts.params.validate_domains().map_err(|e| RunError::Options(e.to_string()))?;

    // 1) Snapshot
    let snapshot = take_snapshot(registry, roles, pool, opts.params.unknown_pool_policy)?;
    tracing::info!(
        roles = request.len(),
        slots = request.total_slots(),
        pool = snapshot.candidates.len(),
        missing = snapshot.missing.len(),
        "assignment run started"
    );

    // 2) Resolve + allocate
    let resolution = resolve(request, &snapshot.candidates, &snapshot.roles);
    let outcome = allocate(&resolution, request, &snapshot.candidates, &opts.date);
    for d in &outcome.decisions {
        tracing::debug!(
            priority = ?d.priority,
            scarcity = d.scarcity,
            ranked = d.ranked.len(),
            "{}",
            rota_algo::allocate::describe(d)
        );
    }

    // 3) Artifacts
    let result = build_result(request, &outcome, &opts.date)?;
    let run_record = build_run_record(&timestamp, &opts.engine, &opts.params, &snapshot, &result, &outcome)?;

    let outputs = RunOutputs { assignment: outcome.assignment.clone(), result, run_record };
    Ok(PreparedRun { snapshot, outcome, outputs })
}

/// Step 4: hand the whole batch to the sink exactly once.
pub fn record_run<S>(prepared: PreparedRun, sink: &mut S) -> Result<RunOutputs, RunError>
where
    S: HistorySink + ?Sized,
{
    let PreparedRun { outcome, mut outputs, .. } = prepared;
    match sink.apply_increments(&outcome.increments) {
        Ok(()) => {
            outputs.run_record.recorded = true;
            tracing::info!(
                placements = outputs.assignment.placements(),
                unfilled = outputs.result.unfilled.len(),
                result_id = %outputs.result.id,
                "assignment run recorded"
            );
            Ok(outputs)
        }
        Err(reason) => {
            tracing::warn!(error = %reason, increments = outcome.increments.len(), "history not recorded");
            Err(RunError::NotRecorded { outputs: Box::new(outputs), reason })
        }
    }
}

/// Full run against separate collaborators.
pub fn run_assignment<R, L, S>(
    registry: &R,
    roles: &L,
    sink: &mut S,
    request: &RoleRequest,
    pool: &[CandidateName],
    opts: &RunOptions,
) -> Result<RunOutputs, RunError>
where
    R: CandidateRegistry + ?Sized,
    L: RoleRegistry + ?Sized,
    S: HistorySink + ?Sized,
{
    let prepared = prepare_run(registry, roles, request, pool, opts)?;
    record_run(prepared, sink)
}

/// Full run against one store that is both registry and sink.
pub fn run_with_store<S>(
    store: &mut S,
    request: &RoleRequest,
    pool: &[CandidateName],
    opts: &RunOptions,
) -> Result<RunOutputs, RunError>
where
    S: CandidateRegistry + RoleRegistry + HistorySink,
{
    let prepared = prepare_run(&*store, &*store, request, pool, opts)?;
    record_run(prepared, store)
}
