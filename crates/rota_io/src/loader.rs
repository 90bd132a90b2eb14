//! Loader: params file and the combined "everything a run needs from disk".

use std::path::Path;

use rota_core::Params;

use crate::manifest::load_manifest;
use crate::store::FileStore;
use crate::IoError;

/// Read and domain-check a params file. Missing fields take their defaults.
pub fn load_params(path: &Path) -> Result<Params, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let params: Params = serde_json::from_slice(&bytes)?;
    params
        .validate_domains()
        .map_err(|e| IoError::Invalid(format!("params {}: {e}", path.display())))?;
    Ok(params)
}

/// Inputs for one run, opened and validated.
#[derive(Debug)]
pub struct LoadedInputs {
    pub store: FileStore,
    pub params: Params,
}

/// Open the data file and optional params file. An explicit `params_path`
/// wins over the one named by the manifest.
pub fn load_inputs(data_path: &Path, params_path: Option<&Path>) -> Result<LoadedInputs, IoError> {
    let store = FileStore::open(data_path)?;
    let params = match params_path {
        Some(p) => load_params(p)?,
        None => Params::default(),
    };
    Ok(LoadedInputs { store, params })
}

/// Same as [`load_inputs`], with paths taken from a manifest file.
pub fn load_inputs_from_manifest(manifest: &Path, params_override: Option<&Path>) -> Result<LoadedInputs, IoError> {
    let resolved = load_manifest(manifest)?;
    let params = params_override.map(Path::to_path_buf).or(resolved.params);
    load_inputs(&resolved.data, params.as_deref())
}
