//! rota_core: Core types, ordering keys, params and collaborator interfaces.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! workspace (`rota_algo`, `rota_io`, `rota_pipeline`, `rota_cli`).
//!
//! - Names: `RoleName`, `CandidateName` (validated free-text newtypes)
//! - Entities: `Candidate`, `Role`, `RoleHistory`
//! - Run shapes: `RoleRequest`, `Assignment`, `HistoryIncrement`
//! - Deterministic ordering keys: `RoleOrderKey`, `SelectionScore`
//! - Run parameters: `Params`
//! - Collaborator traits: registry reads and the history sink
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidName,
        InvalidSlotCount,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidName => write!(f, "invalid name"),
                CoreError::InvalidSlotCount => write!(f, "invalid slot count"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    #[cfg(feature = "std")]
    impl std::error::Error for CoreError {}
}

pub mod names {
    //! Name newtypes for roles and candidates.
    //!
    //! Names are free text (nicknames, in-game role labels), so the charset is
    //! open; we only reject empty names, surrounding whitespace, control
    //! characters and absurd lengths.

    use crate::errors::CoreError;
    use alloc::string::{String, ToString};
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    /// Upper bound on name length, in chars.
    pub const MAX_NAME_CHARS: usize = 128;

    fn is_name(s: &str) -> bool {
        let n = s.chars().count();
        (1..=MAX_NAME_CHARS).contains(&n) && s.trim() == s && !s.chars().any(char::is_control)
    }

    macro_rules! def_name {
        ($name:ident) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
            #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_name(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidName) }
                }
            }

            impl TryFrom<String> for $name {
                type Error = CoreError;
                fn try_from(s: String) -> Result<Self, Self::Error> {
                    if is_name(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidName) }
                }
            }

            impl From<$name> for String {
                fn from(n: $name) -> String { n.0 }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str { &self.0 }
            }
        };
    }

    def_name!(RoleName);
    def_name!(CandidateName);
}

pub mod entities;
pub mod request;
pub mod determinism;
pub mod variables;
pub mod collab;

pub use errors::CoreError;
pub use names::{CandidateName, RoleName};
pub use entities::{Candidate, Role, RoleHistory};
pub use request::{Assignment, HistoryIncrement, RoleRequest};
pub use determinism::{RoleOrderKey, RolePriority, SelectionScore, Tier};
pub use variables::{Params, UnknownPoolPolicy};
pub use collab::{CandidateRegistry, CollabError, HistorySink, RoleRegistry};
