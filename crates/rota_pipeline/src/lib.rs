//! rota_pipeline: one assignment run (snapshot → resolve → allocate → build → record).
//!
//! The allocation itself is pure (`rota_algo`); this crate adds the snapshot,
//! the artifacts with their IDs (through `rota_io`), and the single terminal
//! history write. Nothing is written before the allocation is complete.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rota_core::CollabError;

pub mod snapshot;
pub mod build_result;
pub mod run;

pub use build_result::{DecisionEcho, ResultDoc, RunRecordDoc};
pub use run::{prepare_run, record_run, run_assignment, run_with_store, PreparedRun, RunOptions, RunOutputs};
pub use snapshot::{take_snapshot, Snapshot};

/// Engine identifiers echoed in every run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
    pub build: String,
}

/// Engine identifiers of this build.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        name: "rota".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
    }
}

/// Single error surface for a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Bad run options (e.g. a timestamp that is not RFC3339 UTC).
    #[error("invalid run options: {0}")]
    Options(String),

    /// Registry read failed, or the pool named unknown candidates under the
    /// reject policy. Nothing was computed.
    #[error("snapshot failed: {0}")]
    Snapshot(String),

    /// Artifact serialization / hashing failed. Nothing was written.
    #[error("build failed: {0}")]
    Build(String),

    /// The assignment was computed but the history sink refused the batch.
    /// `outputs` carries the full result (with `recorded = false`).
    #[error("history not recorded: {reason}")]
    NotRecorded { outputs: Box<RunOutputs>, reason: CollabError },
}

impl From<rota_io::IoError> for RunError {
    fn from(e: rota_io::IoError) -> Self {
        RunError::Build(e.to_string())
    }
}
