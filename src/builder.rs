//! Scaffolding of a simulation environment from a request.
use log;
use std::fs;
use std::path::PathBuf;

use crate::components::{write_if_absent, ComponentLayout};
use crate::config::{SimulationConfig, CONFIG_DIR, NODE_SETS_FILE};
use crate::error::EnvError;
use crate::mechanisms::MechanismCompiler;
use crate::network::NetworkFiles;
use crate::request::EnvironmentBuildRequest;
use crate::templates;

/// The run script, inside the base directory.
pub const RUN_SCRIPT: &str = "run_bionet.py";

/// What a successful build left on disk.
#[derive(Debug, PartialEq, Clone)]
pub struct BuiltEnvironment {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub network_dir: PathBuf,
    pub components_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Files created by this build, the config file excluded.
    pub files_written: Vec<PathBuf>,
    pub mechanisms_compiled: bool,
}

/// Scaffold the environment described by `request`.
///
/// Directories and files already present are kept. The configuration file is only replaced
/// when `overwrite_config` is set. When mechanisms are to be compiled, `compiler` is run last,
/// once everything else is in place, so a failure leaves a usable environment behind.
///
/// # Examples
///
/// ```
/// use bionet_env::builder::build_env;
/// use bionet_env::mechanisms::Nrnivmodl;
/// use bionet_env::request::EnvironmentBuildRequest;
///
/// let dir = tempfile::tempdir().unwrap();
/// let request = EnvironmentBuildRequest {
///     base_dir: dir.path().join("sim"),
///     compile_mechanisms: false,
///     ..Default::default()
/// };
/// let env = build_env(&request, &Nrnivmodl::new()).unwrap();
/// assert!(env.config_path.is_file());
/// assert!(!env.mechanisms_compiled);
/// ```
pub fn build_env<C: MechanismCompiler + ?Sized>(
    request: &EnvironmentBuildRequest,
    compiler: &C,
) -> Result<BuiltEnvironment, EnvError> {
    request.validate()?;

    let config_path = request.config_path();
    if config_path.exists() && !request.overwrite_config {
        return Err(EnvError::ConfigExists(config_path));
    }

    log::info!("Building environment in {}", request.base_dir.display());
    fs::create_dir_all(&request.base_dir)?;

    let network_dir = request.network_path();
    let output_dir = request.output_path();
    let layout = ComponentLayout::new(request.components_path());
    fs::create_dir_all(&network_dir)?;
    fs::create_dir_all(&output_dir)?;
    layout.create()?;
    log::info!("Directory tree: done!");

    let mut files_written = Vec::new();
    if request.include_examples {
        files_written.extend(layout.write_examples()?);
    }

    let node_sets = request.base_dir.join(NODE_SETS_FILE);
    if write_if_absent(&node_sets, templates::NODE_SETS_JSON)? {
        files_written.push(node_sets);
    }
    let run_script = request.base_dir.join(RUN_SCRIPT);
    if write_if_absent(&run_script, &templates::make_run_script(&request.config_file))? {
        files_written.push(run_script);
    }

    let base_dir = if request.use_relative_paths {
        CONFIG_DIR.to_string()
    } else {
        fs::canonicalize(&request.base_dir)?.display().to_string()
    };
    let networks = NetworkFiles::discover(&network_dir, "$NETWORK_DIR")?;
    let config = SimulationConfig::from_request(request, &base_dir, networks);
    config.save_to(&config_path)?;
    log::info!("Configuration saved to {}", config_path.display());

    let mechanisms_compiled = if request.compile_mechanisms {
        compiler.compile(&layout.mechanisms_dir())?;
        true
    } else {
        false
    };

    Ok(BuiltEnvironment {
        base_dir: request.base_dir.clone(),
        config_path,
        network_dir,
        components_dir: layout.root().to_path_buf(),
        output_dir,
        files_written,
        mechanisms_compiled,
    })
}
