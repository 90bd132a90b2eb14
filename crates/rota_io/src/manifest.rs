// crates/rota_io/src/manifest.rs
//
// Manifest: a small JSON file naming a run's inputs.
//
//   {"data_path": "clan.json", "params_path": "params.json",
//    "inputs_sha256": {"data_path": "<64 hex>"}}
//
// - Relative paths resolve against the manifest's directory.
// - Offline only: any `scheme://` path is rejected.
// - Digests (optional) are lowercase 64-hex over the raw file bytes, and may
//   only be given for inputs that are present.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hasher::{is_lower_hex_64, sha256_file};
use crate::{looks_like_url, IoError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub data_path: String,
    #[serde(default)]
    pub params_path: Option<String>,
    #[serde(default)]
    pub inputs_sha256: Option<InputDigests>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDigests {
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub params_path: Option<String>,
}

/// Manifest with paths joined under the base directory and checked to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub data: PathBuf,
    pub params: Option<PathBuf>,
}

// ---------- helpers ----------

fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn check_path(label: &str, s: &str) -> Result<(), IoError> {
    if s.trim().is_empty() {
        return Err(IoError::Manifest(format!("{label} must not be empty")));
    }
    if looks_like_url(s) {
        return Err(IoError::Manifest(format!("{label} must be a local path, got {s}")));
    }
    Ok(())
}

fn must_be_file(label: &str, p: &Path) -> Result<(), IoError> {
    let md = fs::metadata(p).map_err(|e| IoError::Manifest(format!("{label}: {} ({e})", p.display())))?;
    if !md.is_file() {
        return Err(IoError::Manifest(format!("{label} is not a file: {}", p.display())));
    }
    Ok(())
}

// ---------- validation & resolution ----------

/// Shape and offline checks. No I/O.
pub fn validate_manifest(man: &Manifest) -> Result<(), IoError> {
    check_path("data_path", &man.data_path)?;
    if let Some(p) = &man.params_path {
        check_path("params_path", p)?;
    }
    if let Some(d) = &man.inputs_sha256 {
        for (label, digest, present) in [
            ("data_path", &d.data_path, true),
            ("params_path", &d.params_path, man.params_path.is_some()),
        ] {
            let Some(h) = digest else { continue };
            if !present {
                return Err(IoError::Manifest(format!("digest supplied for missing input: {label}")));
            }
            if !is_lower_hex_64(h) {
                return Err(IoError::Manifest(format!("invalid sha256 for {label}: {h}")));
            }
        }
    }
    Ok(())
}

/// Join paths under `base_dir`, require them to be files, verify digests.
pub fn resolve_paths(base_dir: &Path, man: &Manifest) -> Result<ResolvedManifest, IoError> {
    let data = join_under(base_dir, &man.data_path);
    must_be_file("data_path", &data)?;
    let params = match &man.params_path {
        Some(p) => {
            let p = join_under(base_dir, p);
            must_be_file("params_path", &p)?;
            Some(p)
        }
        None => None,
    };

    if let Some(d) = &man.inputs_sha256 {
        verify_digest("data_path", &data, d.data_path.as_deref())?;
        if let Some(p) = &params {
            verify_digest("params_path", p, d.params_path.as_deref())?;
        }
    }

    Ok(ResolvedManifest { data, params })
}

fn verify_digest(label: &str, path: &Path, expected: Option<&str>) -> Result<(), IoError> {
    let Some(expected) = expected else { return Ok(()) };
    let actual = sha256_file(path)?;
    if actual != expected {
        return Err(IoError::Manifest(format!("sha256 mismatch for {label}: expected {expected}, got {actual}")));
    }
    Ok(())
}

/// Read, validate and resolve a manifest file.
pub fn load_manifest(path: &Path) -> Result<ResolvedManifest, IoError> {
    let bytes = fs::read(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let man: Manifest = serde_json::from_slice(&bytes)?;
    validate_manifest(&man)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_paths(base, &man)
}
