// crates/rota_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, and the run path
// (load → pool → date → pipeline → print → artifacts).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    /// Assignment computed and reported, but the history write failed.
    pub const NOT_RECORDED: i32 = 6;
}

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use chrono::{Local, SecondsFormat, Utc};
use tracing_subscriber::EnvFilter;

use args::{build_request, parse_and_validate as parse_cli, parse_pool_lines, Args};
use rota_core::{CandidateName, Params};
use rota_io::canonical_json::write_canonical_file;
use rota_io::loader::{self, LoadedInputs};
use rota_io::IoError;
use rota_pipeline::{engine_identifiers, run_with_store, RunError, RunOptions, RunOutputs};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bad data/params/manifest content, bad run options, rejected pool
    Validation(String),
    /// Read/write/path failures
    Io(String),
    /// Result printed (and written) but history not recorded
    NotRecorded(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "{m}"),
            MainError::Io(m) => write!(f, "{m}"),
            MainError::NotRecorded(m) => write!(f, "history not recorded: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("rota: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_logging(args.quiet);

    let res = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match res {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("rota: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// stderr logging; `RUST_LOG` wins unless `--quiet`.
fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::NotRecorded(_) => NOT_RECORDED,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Manifest(m) => MainError::Validation(format!("manifest: {m}")),
        IoError::Invalid(m) => MainError::Validation(format!("data: {m}")),
        IoError::Hash(m) => MainError::Validation(format!("hash: {m}")),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
    }
}

fn map_run_err(e: RunError) -> MainError {
    match e {
        RunError::Options(m) | RunError::Snapshot(m) => MainError::Validation(m),
        RunError::Build(m) => MainError::Io(m),
        RunError::NotRecorded { reason, .. } => MainError::NotRecorded(reason.to_string()),
    }
}

fn load(args: &Args) -> Result<LoadedInputs, MainError> {
    let loaded = match (&args.manifest, &args.data) {
        (Some(m), _) => loader::load_inputs_from_manifest(m, args.params.as_deref()),
        (None, Some(d)) => loader::load_inputs(d, args.params.as_deref()),
        (None, None) => return Err(MainError::Validation("missing --data or --manifest".into())),
    };
    loaded.map_err(map_io_err)
}

/// Load + check inputs, no allocation, nothing written.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let loaded = load(args)?;
    pool_from_args(args)?;
    date_marker(args, &loaded.params)?;
    tracing::info!(
        candidates = loaded.store.data().candidates.len(),
        roles = loaded.store.data().roles.len(),
        "validate-only: inputs OK"
    );
    Ok(())
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let LoadedInputs { mut store, params } = load(args)?;
    let pool = pool_from_args(args)?;
    let request = build_request(&args.roles);

    let opts = RunOptions {
        date: date_marker(args, &params)?,
        timestamp_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        params,
        engine: engine_identifiers(),
    };

    match run_with_store(&mut store, &request, &pool, &opts) {
        Ok(outs) => {
            print_assignment(&outs);
            write_artifacts(args.out.as_deref(), &outs)
        }
        Err(RunError::NotRecorded { outputs, reason }) => {
            print_assignment(&outputs);
            write_artifacts(args.out.as_deref(), &outputs)?;
            Err(MainError::NotRecorded(reason.to_string()))
        }
        Err(e) => Err(map_run_err(e)),
    }
}

/// `--pool` followed by the `--pool-file` names.
fn pool_from_args(args: &Args) -> Result<Vec<CandidateName>, MainError> {
    let mut pool: Vec<CandidateName> = Vec::new();
    for n in &args.pool {
        pool.push(n.parse().map_err(|_| MainError::Validation(format!("invalid pool name: {n:?}")))?);
    }
    if let Some(p) = &args.pool_file {
        let text = std::fs::read_to_string(p).map_err(|e| MainError::Io(format!("{}: {e}", p.display())))?;
        pool.extend(parse_pool_lines(&text).map_err(|e| MainError::Validation(e.to_string()))?);
    }
    Ok(pool)
}

/// `--date`, or today's local date rendered with `params.date_format`.
fn date_marker(args: &Args, params: &Params) -> Result<String, MainError> {
    if let Some(d) = &args.date {
        return Ok(d.clone());
    }
    let mut s = String::new();
    write!(s, "{}", Local::now().format(&params.date_format))
        .map_err(|_| MainError::Validation(format!("invalid date_format: {:?}", params.date_format)))?;
    Ok(s)
}

/// `Role: a, b` per role in processing order; `Role: -` when nobody was left.
fn print_assignment(outs: &RunOutputs) {
    for role in &outs.result.order {
        let chosen = outs.assignment.get(role).unwrap_or(&[]);
        if chosen.is_empty() {
            println!("{role}: -");
        } else {
            let names: Vec<&str> = chosen.iter().map(|n| n.as_str()).collect();
            println!("{role}: {}", names.join(", "));
        }
    }
    for (role, missing) in &outs.result.unfilled {
        tracing::warn!(role = %role, missing = *missing, "role not fully filled");
    }
}

fn write_artifacts(out_dir: Option<&Path>, outs: &RunOutputs) -> Result<(), MainError> {
    let Some(dir) = out_dir else { return Ok(()) };
    std::fs::create_dir_all(dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", dir.display())))?;

    write_canonical_file(&dir.join("result.json"), &outs.result)
        .map_err(|e| MainError::Io(format!("write result.json: {e}")))?;
    write_canonical_file(&dir.join("run_record.json"), &outs.run_record)
        .map_err(|e| MainError::Io(format!("write run_record.json: {e}")))?;

    tracing::info!(dir = %dir.display(), result_id = %outs.result.id, "artifacts written");
    Ok(())
}
