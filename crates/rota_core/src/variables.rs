//! Run parameters with safe defaults.
//!
//! Every field has a default so a missing or partial params file is valid.

use alloc::string::{String, ToString};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Date marker format used by the original data files (`15.10.26`).
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%y";

/// What to do with pool names the registry does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnknownPoolPolicy {
    /// Skip them (logged by the pipeline).
    #[default]
    Ignore,
    /// Fail the run before any computation.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Params {
    /// strftime pattern for the last-assigned marker written on increments.
    pub date_format: String,
    pub unknown_pool_policy: UnknownPoolPolicy,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            unknown_pool_policy: UnknownPoolPolicy::Ignore,
        }
    }
}

impl Params {
    /// Domain checks that serde cannot express.
    pub fn validate_domains(&self) -> Result<(), CoreError> {
        if self.date_format.trim().is_empty() {
            return Err(CoreError::DomainOutOfRange("date_format"));
        }
        Ok(())
    }
}
