//! JSON data file: the persisted registry of players and roles.
//!
//! Current shape (always written):
//! ```json
//! {"version":"1.0",
//!  "players":[{"nickname":"A","preferences":["Tank"],"role_assignments":{"Tank":[2,"15.10.26"]}}],
//!  "roles":[{"name":"Tank","priority":0}]}
//! ```
//! Accepted on load as well: a bare list of players (no roles, no version),
//! and history values that are a bare count. An empty date string means
//! "never dated".

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use rota_core::{Candidate, CandidateName, Role, RoleHistory, RoleName};

use crate::canonical_json::write_atomic;
use crate::IoError;

pub const DATA_FILE_VERSION: &str = "1.0";

/* ------------------------------- Wire types ------------------------------- */

/// History value: `[count, "date"]`, or a bare `count` in older files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireHistory {
    Dated(u32, String),
    Count(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePlayer {
    pub nickname: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub role_assignments: BTreeMap<String, WireHistory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRole {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDataFile {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub players: Vec<WirePlayer>,
    #[serde(default)]
    pub roles: Vec<WireRole>,
}

fn default_version() -> String {
    DATA_FILE_VERSION.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyDataFile {
    Current(WireDataFile),
    Legacy(Vec<WirePlayer>),
}

/* ------------------------------ Domain shape ------------------------------ */

/// Parsed, validated data file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFile {
    /// Keyed by name; the key always equals `candidate.name`.
    pub candidates: BTreeMap<CandidateName, Candidate>,
    pub roles: BTreeMap<RoleName, Role>,
    /// Player order as read from the file, then insertion order.
    player_order: Vec<CandidateName>,
}

impl DataFile {
    /// Insert or replace a candidate. A new name goes after every existing player.
    pub fn insert_candidate(&mut self, c: Candidate) -> Option<Candidate> {
        if !self.candidates.contains_key(&c.name) {
            self.player_order.push(c.name.clone());
        }
        self.candidates.insert(c.name.clone(), c)
    }

    /// Candidates in player order. Entries added straight to `candidates`
    /// come last, by name.
    pub fn candidates_in_order(&self) -> Vec<&Candidate> {
        let mut listed: BTreeSet<&CandidateName> = BTreeSet::new();
        let mut out: Vec<&Candidate> = Vec::with_capacity(self.candidates.len());
        for name in &self.player_order {
            if let Some(c) = self.candidates.get(name) {
                if listed.insert(&c.name) {
                    out.push(c);
                }
            }
        }
        for c in self.candidates.values() {
            if !listed.contains(&c.name) {
                out.push(c);
            }
        }
        out
    }

    /// Roles ordered by `(priority, name)`, the order a role list is shown in.
    pub fn roles_by_priority(&self) -> Vec<Role> {
        let mut v: Vec<Role> = self.roles.values().cloned().collect();
        v.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        v
    }

    pub fn to_wire(&self) -> WireDataFile {
        let players = self
            .candidates_in_order()
            .into_iter()
            .map(|c| WirePlayer {
                nickname: c.name.to_string(),
                preferences: c.preferences.iter().map(|r| r.to_string()).collect(),
                role_assignments: c
                    .history
                    .iter()
                    .map(|(role, h)| {
                        (role.to_string(), WireHistory::Dated(h.count, h.last_date.clone().unwrap_or_default()))
                    })
                    .collect(),
            })
            .collect();
        let roles = self
            .roles_by_priority()
            .into_iter()
            .map(|r| WireRole { name: r.name.to_string(), priority: r.priority })
            .collect();
        WireDataFile { version: DATA_FILE_VERSION.to_string(), players, roles }
    }

    pub fn from_wire(wire: WireDataFile) -> Result<Self, IoError> {
        let mut data = DataFile::default();
        for p in wire.players {
            let c = candidate_from_wire(p)?;
            if data.candidates.contains_key(&c.name) {
                return Err(IoError::Invalid(format!("duplicate nickname: {}", c.name)));
            }
            data.insert_candidate(c);
        }

        for r in wire.roles {
            let name = parse_role(&r.name)?;
            if data.roles.contains_key(&name) {
                return Err(IoError::Invalid(format!("duplicate role: {name}")));
            }
            data.roles.insert(name.clone(), Role::new(name, r.priority));
        }

        Ok(data)
    }
}

fn parse_role(s: &str) -> Result<RoleName, IoError> {
    s.parse().map_err(|_| IoError::Invalid(format!("invalid role name: {s:?}")))
}

fn candidate_from_wire(p: WirePlayer) -> Result<Candidate, IoError> {
    let name: CandidateName =
        p.nickname.parse().map_err(|_| IoError::Invalid(format!("invalid nickname: {:?}", p.nickname)))?;

    let prefs = p.preferences.iter().map(|s| parse_role(s)).collect::<Result<Vec<_>, _>>()?;
    let declared: BTreeSet<&String> = p.preferences.iter().collect();
    if declared.len() != p.preferences.len() {
        tracing::warn!(nickname = %name, "repeated preferences dropped");
    }

    let mut c = Candidate::new(name, prefs);
    for (role, h) in p.role_assignments {
        let role = parse_role(&role)?;
        let entry = match h {
            WireHistory::Dated(count, date) => {
                RoleHistory { count, last_date: if date.is_empty() { None } else { Some(date) } }
            }
            WireHistory::Count(count) => RoleHistory { count, last_date: None },
        };
        c.history.insert(role, entry);
    }
    Ok(c)
}

/* --------------------------------- Load / save --------------------------------- */

/// Parse data-file bytes (current or legacy shape).
pub fn parse_data_file(bytes: &[u8]) -> Result<DataFile, IoError> {
    match serde_json::from_slice::<AnyDataFile>(bytes) {
        Ok(AnyDataFile::Current(w)) => DataFile::from_wire(w),
        Ok(AnyDataFile::Legacy(players)) => {
            tracing::warn!(players = players.len(), "legacy data file (bare player list); no roles loaded");
            DataFile::from_wire(WireDataFile { version: default_version(), players, roles: Vec::new() })
        }
        // Untagged errors are uninformative; re-parse as the current shape for a precise message.
        Err(_) => {
            let w: WireDataFile = serde_json::from_slice(bytes)?;
            DataFile::from_wire(w)
        }
    }
}

pub fn load_data_file(path: &Path) -> Result<DataFile, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    parse_data_file(&bytes)
}

/// Write the data file (pretty JSON, current shape) atomically.
pub fn save_data_file(path: &Path, data: &DataFile) -> Result<(), IoError> {
    let mut bytes = serde_json::to_vec_pretty(&data.to_wire())?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rn(s: &str) -> RoleName { s.parse().unwrap() }
    fn cn(s: &str) -> CandidateName { s.parse().unwrap() }

    const CURRENT: &str = r#"{
        "version": "1.0",
        "players": [
            {"nickname": "A", "preferences": ["Tank", "Healer"], "role_assignments": {"Tank": [2, "01.10.26"]}},
            {"nickname": "B", "preferences": ["Tank"], "role_assignments": {"Tank": [0, ""]}}
        ],
        "roles": [{"name": "Tank", "priority": 1}, {"name": "Healer"}]
    }"#;

    #[test]
    fn current_shape_loads() {
        let d = parse_data_file(CURRENT.as_bytes()).unwrap();
        let a = &d.candidates[&cn("A")];
        assert_eq!(a.history_count(&rn("Tank")), 2);
        assert_eq!(a.history[&rn("Tank")].last_date.as_deref(), Some("01.10.26"));
        assert_eq!(d.candidates[&cn("B")].history[&rn("Tank")].last_date, None);
        let order: Vec<_> = d.roles_by_priority().into_iter().map(|r| (r.name.to_string(), r.priority)).collect();
        assert_eq!(order, vec![("Healer".to_string(), 0), ("Tank".to_string(), 1)]);
    }

    #[test]
    fn legacy_list_and_bare_counts_load() {
        let legacy = r#"[{"nickname": "C", "preferences": ["DPS"], "role_assignments": {"DPS": 4}}]"#;
        let d = parse_data_file(legacy.as_bytes()).unwrap();
        assert!(d.roles.is_empty());
        assert_eq!(d.candidates[&cn("C")].history_count(&rn("DPS")), 4);
    }

    #[test]
    fn duplicates_are_rejected() {
        let dup = r#"{"players": [{"nickname": "A"}, {"nickname": "A"}]}"#;
        assert!(matches!(parse_data_file(dup.as_bytes()), Err(IoError::Invalid(_))));
        let dup_role = r#"{"roles": [{"name": "Tank"}, {"name": "Tank", "priority": 3}]}"#;
        assert!(matches!(parse_data_file(dup_role.as_bytes()), Err(IoError::Invalid(_))));
    }

    #[test]
    fn save_keeps_player_order_from_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("clan.json");
        let src = r#"{"players": [{"nickname": "Zed"}, {"nickname": "Amy"}, {"nickname": "Mo"}]}"#;
        let mut d = parse_data_file(src.as_bytes()).unwrap();
        d.insert_candidate(Candidate::new(cn("Bo"), vec![rn("Tank")]));
        save_data_file(&p, &d).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&p).unwrap()).unwrap();
        let order: Vec<&str> =
            raw["players"].as_array().unwrap().iter().map(|v| v["nickname"].as_str().unwrap()).collect();
        assert_eq!(order, vec!["Zed", "Amy", "Mo", "Bo"]);
    }

    #[test]
    fn malformed_json_reports_position() {
        let err = parse_data_file(b"{\"players\": [").unwrap_err();
        assert!(matches!(err, IoError::Json { .. }), "{err}");
    }

    #[test]
    fn save_then_load_keeps_history_and_writes_current_shape() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("clan.json");
        let d = parse_data_file(CURRENT.as_bytes()).unwrap();
        save_data_file(&p, &d).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&p).unwrap()).unwrap();
        assert_eq!(raw["version"], "1.0");
        assert_eq!(raw["players"][1]["role_assignments"]["Tank"], serde_json::json!([0, ""]));
        assert_eq!(load_data_file(&p).unwrap(), d);
    }
}
