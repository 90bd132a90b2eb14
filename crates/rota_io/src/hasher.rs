//! crates/rota_io/src/hasher.rs
//!
//! Deterministic hashing and ID builders for run artifacts.
//!
//! - Use `sha256_canonical(..)` for JSON values/structs (goes through canonical_json).
//! - Use `sha256_hex(..)` / `sha256_file(..)` for raw bytes and files.
//! - IDs: `RES:<hex>` for results, `RUN:<timestamp>:<hex>` for run records.
//! - Hex digests are lowercase.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over a file's raw bytes.
pub fn sha256_file(path: &Path) -> Result<String, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::Hash(format!("{}: {e}", path.display())))?;
    Ok(sha256_hex(&bytes))
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// `RES:<hex>` for a result payload.
pub fn res_id_from_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    Ok(format!("RES:{}", sha256_canonical(value)?))
}

/// `RUN:<timestamp>:<hex>` for a run record payload.
///
/// `timestamp` must be RFC3339 UTC (`2026-10-15T18:00:00Z`); fractional seconds
/// and a `+00:00` suffix are normalized away.
pub fn run_id_from_canonical<T: Serialize + ?Sized>(timestamp: &str, value: &T) -> Result<String, IoError> {
    let ts = normalize_utc_seconds(timestamp)?;
    Ok(format!("RUN:{ts}:{}", sha256_canonical(value)?))
}

/// `true` for a lowercase 64-char hex digest.
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Normalize `YYYY-MM-DDTHH:MM:SS[.frac](Z|+00:00|-00:00)` to `YYYY-MM-DDTHH:MM:SSZ`.
pub fn normalize_utc_seconds(ts: &str) -> Result<String, IoError> {
    let bad = || IoError::Hash(format!("invalid timestamp (expected RFC3339 UTC): {ts}"));
    let b = ts.as_bytes();
    if b.len() < 20 || !ts.is_ascii() {
        return Err(bad());
    }

    let num = |r: std::ops::Range<usize>| -> Result<u32, IoError> {
        ts.get(r).and_then(|s| s.parse::<u32>().ok()).ok_or_else(bad)
    };
    for (i, sep) in [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':')] {
        if b[i] != sep {
            return Err(bad());
        }
    }
    let (y, m, d) = (num(0..4)?, num(5..7)?, num(8..10)?);
    let (hh, mm, ss) = (num(11..13)?, num(14..16)?, num(17..19)?);
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) || hh > 23 || mm > 59 || ss > 60 {
        return Err(bad());
    }

    let mut idx = 19;
    if b[idx] == b'.' {
        idx += 1;
        let start = idx;
        while idx < b.len() && b[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == start {
            return Err(bad());
        }
    }
    if !matches!(&ts[idx..], "Z" | "+00:00" | "-00:00") {
        return Err(bad());
    }

    Ok(format!("{y:04}-{m:02}-{d:02}T{hh:02}:{mm:02}:{ss:02}Z"))
}
