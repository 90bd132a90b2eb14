//! File-backed collaborators over one JSON data file.
//!
//! `FileStore` reads the data file once at open time and serves the registry
//! traits from memory. `apply_increments` applies the batch to a copy, writes
//! the whole file atomically, and only then swaps the copy in: on a failed
//! write both the file and the in-memory view keep their previous history.

use std::path::{Path, PathBuf};

use rota_core::{
    Candidate, CandidateName, CandidateRegistry, CollabError, HistoryIncrement, HistorySink, Role,
    RoleHistory, RoleRegistry,
};

use crate::datafile::{load_data_file, save_data_file, DataFile};
use crate::IoError;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: DataFile,
}

impl FileStore {
    /// Open an existing data file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        let data = load_data_file(&path)?;
        tracing::debug!(
            path = %path.display(),
            candidates = data.candidates.len(),
            roles = data.roles.len(),
            "data file loaded"
        );
        Ok(FileStore { path, data })
    }

    /// Wrap already-loaded data; nothing is written until a batch is applied.
    pub fn with_data(path: impl Into<PathBuf>, data: DataFile) -> Self {
        FileStore { path: path.into(), data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &DataFile {
        &self.data
    }
}

/// Apply `batch` to `data` in place. Each increment sets the count to its
/// `new_count` (never lowering it) and stamps the date.
pub(crate) fn apply_to(data: &mut DataFile, batch: &[HistoryIncrement]) -> Result<(), CollabError> {
    for inc in batch {
        let cand = data
            .candidates
            .get_mut(&inc.candidate)
            .ok_or_else(|| CollabError::Write(format!("unknown candidate: {}", inc.candidate)))?;
        let entry = cand.history.entry(inc.role.clone()).or_insert_with(RoleHistory::default);
        entry.count = entry.count.max(inc.new_count);
        entry.last_date = Some(inc.date.clone());
    }
    Ok(())
}

/// Pool lookup shared by both stores: registry order, unknown names skipped.
pub(crate) fn lookup_pool(data: &DataFile, pool: &[CandidateName]) -> Vec<Candidate> {
    pool.iter().filter_map(|n| data.candidates.get(n).cloned()).collect()
}

impl CandidateRegistry for FileStore {
    fn list_eligible(&self, pool: &[CandidateName]) -> Result<Vec<Candidate>, CollabError> {
        Ok(lookup_pool(&self.data, pool))
    }
}

impl RoleRegistry for FileStore {
    fn list_roles_with_priority(&self) -> Result<Vec<Role>, CollabError> {
        Ok(self.data.roles_by_priority())
    }
}

impl HistorySink for FileStore {
    fn apply_increments(&mut self, batch: &[HistoryIncrement]) -> Result<(), CollabError> {
        let mut next = self.data.clone();
        apply_to(&mut next, batch)?;
        save_data_file(&self.path, &next).map_err(|e| CollabError::Write(e.to_string()))?;
        self.data = next;
        tracing::debug!(path = %self.path.display(), increments = batch.len(), "history written");
        Ok(())
    }
}
