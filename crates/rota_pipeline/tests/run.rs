// crates/rota_pipeline/tests/run.rs
//
// End-to-end runs against the in-memory and file-backed stores.

use assert_json_diff::assert_json_include;
use serde_json::json;

use rota_core::{Candidate, CandidateName, Params, Role, RoleName, RoleRequest, UnknownPoolPolicy};
use rota_io::memory::MemoryStore;
use rota_io::store::FileStore;
use rota_pipeline::{engine_identifiers, run_assignment, run_with_store, RunError, RunOptions};

fn rn(s: &str) -> RoleName {
    s.parse().unwrap()
}
fn cn(s: &str) -> CandidateName {
    s.parse().unwrap()
}
fn names(v: &[&str]) -> Vec<CandidateName> {
    v.iter().map(|s| cn(s)).collect()
}

fn opts() -> RunOptions {
    RunOptions {
        date: "15.10.26".into(),
        timestamp_utc: "2026-10-15T18:00:00Z".into(),
        params: Params::default(),
        engine: engine_identifiers(),
    }
}

fn got(out: &rota_pipeline::RunOutputs, role: &str) -> Vec<String> {
    out.assignment.get(&rn(role)).unwrap_or(&[]).iter().map(|n| n.to_string()).collect()
}

#[test]
fn single_preference_protection_and_history_update() {
    let mut store = MemoryStore::new()
        .with_candidate(Candidate::new(cn("A"), vec![rn("Tank"), rn("Healer")]))
        .with_candidate(Candidate::new(cn("B"), vec![rn("Tank")]));
    let req = RoleRequest::from_counts(vec![(rn("Tank"), 1), (rn("Healer"), 1)]);

    let out = run_with_store(&mut store, &req, &names(&["A", "B"]), &opts()).unwrap();
    assert_eq!(got(&out, "Tank"), vec!["B"]);
    assert_eq!(got(&out, "Healer"), vec!["A"]);
    assert!(out.run_record.recorded);

    let a = &store.data().candidates[&cn("A")];
    assert_eq!(a.history_count(&rn("Healer")), 1);
    assert_eq!(a.history[&rn("Healer")].last_date.as_deref(), Some("15.10.26"));
    assert_eq!(a.history_count(&rn("Tank")), 0);
    assert_eq!(store.sink_calls().len(), 1);
}

#[test]
fn unmatched_role_gives_empty_list_and_empty_batch_is_still_sent() {
    let mut store = MemoryStore::new().with_candidate(Candidate::new(cn("C"), vec![rn("Tank")]));
    let req = RoleRequest::from_names(vec![rn("DPS")]);

    let out = run_with_store(&mut store, &req, &names(&["C"]), &opts()).unwrap();
    assert_eq!(out.assignment.get(&rn("DPS")), Some(&[][..]));
    assert_eq!(store.sink_calls().len(), 1);
    assert!(store.sink_calls()[0].is_empty());
}

#[test]
fn fewest_prior_assignments_fill_multi_slot_role() {
    let mut store = MemoryStore::new()
        .with_candidate(Candidate::new(cn("A"), vec![rn("Tank")]).with_history(rn("Tank"), 3, None))
        .with_candidate(Candidate::new(cn("B"), vec![rn("Tank")]).with_history(rn("Tank"), 1, None))
        .with_candidate(Candidate::new(cn("D"), vec![rn("Tank")]).with_history(rn("Tank"), 2, None));
    let req = RoleRequest::from_counts(vec![(rn("Tank"), 2)]);

    let out = run_with_store(&mut store, &req, &names(&["A", "B", "D"]), &opts()).unwrap();
    assert_eq!(got(&out, "Tank"), vec!["B", "D"]);

    // Chosen pairs +1, everyone else unchanged.
    let d = store.data();
    assert_eq!(d.candidates[&cn("A")].history_count(&rn("Tank")), 3);
    assert_eq!(d.candidates[&cn("B")].history_count(&rn("Tank")), 2);
    assert_eq!(d.candidates[&cn("D")].history_count(&rn("Tank")), 3);
}

#[test]
fn unregistered_role_processed_after_registered() {
    let mut store = MemoryStore::new()
        .with_candidate(Candidate::new(cn("A"), vec![rn("Tank"), rn("Scout")]))
        .with_role(Role::new(rn("Tank"), 0));
    let req = RoleRequest::from_names(vec![rn("Scout"), rn("Tank")]);

    let out = run_with_store(&mut store, &req, &names(&["A"]), &opts()).unwrap();
    assert_eq!(out.result.order, vec![rn("Tank"), rn("Scout")]);
    assert_eq!(got(&out, "Tank"), vec!["A"]);
    assert!(got(&out, "Scout").is_empty());
}

#[test]
fn failed_sink_returns_outputs_as_not_recorded() {
    let registry = MemoryStore::new()
        .with_candidate(Candidate::new(cn("A"), vec![rn("Tank")]))
        .with_role(Role::new(rn("Tank"), 0));
    let mut sink = MemoryStore::new();
    sink.set_fail_writes(true);
    let req = RoleRequest::from_names(vec![rn("Tank")]);

    let err = run_assignment(&registry, &registry, &mut sink, &req, &names(&["A"]), &opts()).unwrap_err();
    match err {
        RunError::NotRecorded { outputs, reason } => {
            assert_eq!(got(&outputs, "Tank"), vec!["A"]);
            assert!(!outputs.run_record.recorded);
            assert_eq!(outputs.run_record.increments.len(), 1);
            assert!(reason.to_string().contains("write"));
        }
        other => panic!("expected NotRecorded, got {other}"),
    }
    assert_eq!(sink.sink_calls().len(), 1);
    assert_eq!(registry.data().candidates[&cn("A")].history_count(&rn("Tank")), 0);
}

#[test]
fn identical_inputs_give_identical_ids() {
    let build = || {
        MemoryStore::new()
            .with_candidate(Candidate::new(cn("A"), vec![rn("Tank"), rn("Healer")]))
            .with_candidate(Candidate::new(cn("B"), vec![rn("Tank"), rn("Healer")]))
    };
    let req = RoleRequest::from_names(vec![rn("Tank"), rn("Healer")]);
    let (mut s1, mut s2) = (build(), build());
    let a = run_with_store(&mut s1, &req, &names(&["A", "B"]), &opts()).unwrap();
    let b = run_with_store(&mut s2, &req, &names(&["B", "A", "A"]), &opts()).unwrap();
    assert_eq!(a.result.id, b.result.id);
    assert_eq!(a.run_record.id, b.run_record.id);
    assert_eq!(a.run_record.snapshot_sha256, b.run_record.snapshot_sha256);
}

#[test]
fn reject_policy_stops_before_any_write() {
    let mut store = MemoryStore::new().with_candidate(Candidate::new(cn("A"), vec![rn("Tank")]));
    let mut o = opts();
    o.params.unknown_pool_policy = UnknownPoolPolicy::Reject;
    let req = RoleRequest::from_names(vec![rn("Tank")]);

    let err = run_with_store(&mut store, &req, &names(&["A", "Ghost"]), &o).unwrap_err();
    assert!(matches!(err, RunError::Snapshot(_)));
    assert!(store.sink_calls().is_empty());

    // Default policy skips the unknown name and notes it in the record.
    let out = run_with_store(&mut store, &req, &names(&["A", "Ghost"]), &opts()).unwrap();
    assert_eq!(out.run_record.pool_missing, vec![cn("Ghost")]);
}

#[test]
fn bad_timestamp_is_an_options_error() {
    let mut store = MemoryStore::new();
    let mut o = opts();
    o.timestamp_utc = "yesterday".into();
    let err = run_with_store(&mut store, &RoleRequest::new(), &[], &o).unwrap_err();
    assert!(matches!(err, RunError::Options(_)));
    assert!(store.sink_calls().is_empty());
}

#[test]
fn second_run_rotates_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clan.json");
    std::fs::write(
        &path,
        r#"{"version":"1.0","players":[
            {"nickname":"A","preferences":["Tank","Healer"]},
            {"nickname":"B","preferences":["Tank","Healer"]}
        ],"roles":[{"name":"Tank","priority":0}]}"#,
    )
    .unwrap();
    let req = RoleRequest::from_names(vec![rn("Tank")]);

    let mut store = FileStore::open(&path).unwrap();
    let first = run_with_store(&mut store, &req, &names(&["A", "B"]), &opts()).unwrap();
    assert_eq!(got(&first, "Tank"), vec!["A"]);

    let mut store = FileStore::open(&path).unwrap();
    let second = run_with_store(&mut store, &req, &names(&["A", "B"]), &opts()).unwrap();
    assert_eq!(got(&second, "Tank"), vec!["B"]);

    let record = serde_json::to_value(&second.run_record).unwrap();
    assert_json_include!(
        actual: record,
        expected: json!({
            "recorded": true,
            "increments": [{"role": "Tank", "candidate": "B", "new_count": 1, "date": "15.10.26"}],
            "decisions": [{"role": "Tank", "priority": {"registered": 0}, "chosen": ["B"]}]
        })
    );
}
