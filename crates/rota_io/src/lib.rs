//! crates/rota_io/src/lib.rs
//! File-side half of the allocator: everything that touches disk or bytes.
//!
//! - `canonical_json`: sorted-key compact JSON + atomic file writes
//! - `hasher`: SHA-256 digests and `RES:` / `RUN:` artifact IDs
//! - `datafile`: the JSON data file (players + roles) wire format
//! - `store`: `FileStore`, the file-backed registry + history sink
//! - `memory`: `MemoryStore`, the in-memory registry + history sink
//! - `manifest`, `loader`: offline input resolution and params loading

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for rota_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON (de)serialization errors.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Hashing / ID construction errors.
    #[error("hash error: {0}")]
    Hash(String),

    /// Manifest shape or resolution errors.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Content is well-formed JSON but violates a data-file invariant.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column, not a pointer.
        IoError::Json { pointer: format!("line {} column {}", e.line(), e.column()), msg: e.to_string() }
    }
}

impl From<IoError> for rota_core::CollabError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Json { .. } | IoError::Invalid(_) => rota_core::CollabError::Corrupt(e.to_string()),
            other => rota_core::CollabError::Unavailable(other.to_string()),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod datafile;
pub mod store;
pub mod memory;
pub mod manifest;
pub mod loader;

/// Returns true if `s` looks like a URL (any `<scheme>://`, or a bare
/// `http:` / `https:` / `file:` prefix). Case-insensitive.
#[inline]
pub fn looks_like_url(s: &str) -> bool {
    let t = s.trim().to_ascii_lowercase();
    t.contains("://") || t.starts_with("http:") || t.starts_with("https:") || t.starts_with("file:")
}

pub mod prelude {
    pub use crate::{looks_like_url, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{res_id_from_canonical, run_id_from_canonical, sha256_canonical, sha256_hex};
    pub use crate::loader::load_params;
    pub use crate::manifest::{load_manifest, ResolvedManifest};
    pub use crate::memory::MemoryStore;
    pub use crate::store::FileStore;
}
