// crates/rota_cli/src/args.rs
//
// Offline CLI argument surface.
//
// - Exactly one of: --manifest  XOR  --data
// - --role NAME or NAME=SLOTS, repeatable; repeats add up
// - Pool: --pool NAME (repeatable) and/or --pool-file; at least one is required
//   for a run (the pool is always an explicit list, never the whole registry)
// - No networked paths (reject any scheme:// like http/https/file)

use std::path::{Path, PathBuf};

use clap::Parser;

use rota_core::{CandidateName, RoleName, RoleRequest};
use rota_io::looks_like_url;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "rota",
    version,
    disable_help_subcommand = true,
    about = "Fill roles from a pool of candidates, rotating by assignment history"
)]
pub struct Args {
    /// Manifest JSON naming the data file (and optionally the params file).
    #[arg(long, conflicts_with = "data")]
    pub manifest: Option<PathBuf>,

    /// Data file with players, preferences, history and roles.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Params JSON (overrides the manifest's params_path).
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Role to fill: NAME for one slot or NAME=SLOTS. Repeatable.
    #[arg(long = "role", value_name = "NAME[=SLOTS]", value_parser = parse_role_spec)]
    pub roles: Vec<RoleSpec>,

    /// Candidate available for this run. Repeatable.
    #[arg(long = "pool", value_name = "NAME")]
    pub pool: Vec<String>,

    /// File with one candidate name per line (`#` comments and blank lines ignored).
    #[arg(long)]
    pub pool_file: Option<PathBuf>,

    /// Date marker for history updates (default: today in params.date_format).
    #[arg(long)]
    pub date: Option<String>,

    /// Directory for result.json and run_record.json.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Load and check inputs only; no allocation, nothing written.
    #[arg(long)]
    pub validate_only: bool,

    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

/// One `--role` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: RoleName,
    pub slots: u32,
}

/// Errors surfaced by argument parsing/validation.
#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
    BadName(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            Missing(s) => write!(f, "missing required flag: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadName(s) => write!(f, "invalid name: {s:?}"),
        }
    }
}
impl std::error::Error for CliError {}

/// `NAME` or `NAME=SLOTS`.
pub fn parse_role_spec(s: &str) -> Result<RoleSpec, String> {
    let (name, slots) = match s.rsplit_once('=') {
        Some((n, k)) => {
            let k = k.trim().parse::<u32>().map_err(|_| format!("slot count must be a non-negative integer: {k:?}"))?;
            (n, k)
        }
        None => (s, 1),
    };
    let name: RoleName = name.parse().map_err(|_| format!("invalid role name: {name:?}"))?;
    Ok(RoleSpec { name, slots })
}

/// Sum the `--role` values into a request.
pub fn build_request(specs: &[RoleSpec]) -> RoleRequest {
    let mut req = RoleRequest::new();
    for s in specs {
        let prev = req.slots(&s.name);
        req.insert(s.name.clone(), prev.saturating_add(s.slots));
    }
    req
}

/// Parse `--pool-file` content.
pub fn parse_pool_lines(text: &str) -> Result<Vec<CandidateName>, CliError> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.parse().map_err(|_| CliError::BadName(l.to_string())))
        .collect()
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if looks_like_url(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn ensure_exists(p: &Path) -> Result<(), CliError> {
    if p.is_file() {
        Ok(())
    } else {
        Err(CliError::NotFound(p.display().to_string()))
    }
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        args.manifest.as_deref(),
        args.data.as_deref(),
        args.params.as_deref(),
        args.pool_file.as_deref(),
        args.out.as_deref(),
    ]
    .into_iter()
    .flatten()
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Mode, path and name checks on already-parsed arguments.
pub fn validate(args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    match (&args.manifest, &args.data) {
        (Some(m), None) => ensure_exists(m)?,
        (None, Some(d)) => ensure_exists(d)?,
        (None, None) => return Err(CliError::Missing("--data or --manifest")),
        (Some(_), Some(_)) => return Err(CliError::BadCombo("--data conflicts with --manifest")),
    }
    for p in [args.params.as_deref(), args.pool_file.as_deref()].into_iter().flatten() {
        ensure_exists(p)?;
    }

    if !args.validate_only {
        if args.roles.is_empty() {
            return Err(CliError::Missing("--role"));
        }
        if args.pool.is_empty() && args.pool_file.is_none() {
            return Err(CliError::Missing("--pool or --pool-file"));
        }
    }
    for n in &args.pool {
        n.parse::<CandidateName>().map_err(|_| CliError::BadName(n.clone()))?;
    }
    if let Some(d) = &args.date {
        if d.trim().is_empty() {
            return Err(CliError::BadCombo("--date must not be empty"));
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rn(s: &str) -> RoleName { s.parse().unwrap() }

    fn parse(argv: &[&str]) -> Result<Args, CliError> {
        let args = Args::try_parse_from(std::iter::once("rota").chain(argv.iter().copied())).unwrap();
        validate(args)
    }

    #[test]
    fn role_specs_parse_and_sum() {
        assert_eq!(parse_role_spec("Tank").unwrap(), RoleSpec { name: rn("Tank"), slots: 1 });
        assert_eq!(parse_role_spec("Main Tank=3").unwrap(), RoleSpec { name: rn("Main Tank"), slots: 3 });
        assert!(parse_role_spec("Tank=-1").is_err());
        assert!(parse_role_spec("=2").is_err());

        let req = build_request(&[
            parse_role_spec("Tank").unwrap(),
            parse_role_spec("Tank").unwrap(),
            parse_role_spec("Healer=0").unwrap(),
        ]);
        assert_eq!(req.slots(&rn("Tank")), 2);
        assert_eq!(req.slots(&rn("Healer")), 0);
        assert_eq!(req.len(), 2);
    }

    #[test]
    fn pool_file_skips_comments_and_blanks() {
        let names = parse_pool_lines("# tonight\nA\n\n  B  \n#C\n").unwrap();
        let got: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(got, vec!["A", "B"]);
        assert!(parse_pool_lines("A\n\u{7}bell\n").is_err());
    }

    #[test]
    fn data_or_manifest_is_required() {
        assert!(matches!(parse(&["--role", "Tank"]), Err(CliError::Missing(_))));
    }

    #[test]
    fn url_paths_are_rejected() {
        let r = parse(&["--data", "https://example.org/clan.json", "--role", "Tank"]);
        assert!(matches!(r, Err(CliError::NonLocalPath(_))));
        let r = parse(&["--data", "FILE:clan.json", "--validate-only"]);
        assert!(matches!(r, Err(CliError::NonLocalPath(_))));
    }

    #[test]
    fn roles_required_unless_validate_only() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("clan.json");
        std::fs::write(&data, "[]").unwrap();
        let d = data.to_str().unwrap();
        assert!(matches!(parse(&["--data", d]), Err(CliError::Missing("--role"))));
        assert!(matches!(parse(&["--data", d, "--role", "Tank"]), Err(CliError::Missing("--pool or --pool-file"))));
        assert!(parse(&["--data", d, "--role", "Tank", "--pool", "A"]).is_ok());
        assert!(parse(&["--data", d, "--validate-only"]).is_ok());
        assert!(matches!(parse(&["--data", d, "--role", "Tank", "--pool", " A"]), Err(CliError::BadName(_))));
    }
}
