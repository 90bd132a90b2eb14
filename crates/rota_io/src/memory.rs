//! In-memory registry + history sink, for tests and embedding.

use rota_core::{
    Candidate, CandidateName, CandidateRegistry, CollabError, HistoryIncrement, HistorySink, Role,
    RoleRegistry,
};

use crate::datafile::DataFile;
use crate::store::{apply_to, lookup_pool};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: DataFile,
    fail_writes: bool,
    /// Every batch passed to `apply_increments`, including failed ones.
    calls: Vec<Vec<HistoryIncrement>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: DataFile) -> Self {
        MemoryStore { data, ..Self::default() }
    }

    /// Insert or replace a candidate.
    pub fn with_candidate(mut self, c: Candidate) -> Self {
        self.data.insert_candidate(c);
        self
    }

    /// Insert or replace a role.
    pub fn with_role(mut self, r: Role) -> Self {
        self.data.roles.insert(r.name.clone(), r);
        self
    }

    /// Make every following `apply_increments` fail without applying anything.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn data(&self) -> &DataFile {
        &self.data
    }

    pub fn sink_calls(&self) -> &[Vec<HistoryIncrement>] {
        &self.calls
    }
}

impl CandidateRegistry for MemoryStore {
    fn list_eligible(&self, pool: &[CandidateName]) -> Result<Vec<Candidate>, CollabError> {
        Ok(lookup_pool(&self.data, pool))
    }
}

impl RoleRegistry for MemoryStore {
    fn list_roles_with_priority(&self) -> Result<Vec<Role>, CollabError> {
        Ok(self.data.roles_by_priority())
    }
}

impl HistorySink for MemoryStore {
    fn apply_increments(&mut self, batch: &[HistoryIncrement]) -> Result<(), CollabError> {
        self.calls.push(batch.to_vec());
        if self.fail_writes {
            return Err(CollabError::Write("memory store configured to fail".into()));
        }
        let mut next = self.data.clone();
        apply_to(&mut next, batch)?;
        self.data = next;
        Ok(())
    }
}
