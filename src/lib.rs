//! This crate scaffolds simulation environments for biophysical networks simulated with NEURON.
//!
//! An environment is a directory holding everything a simulation run needs besides the network
//! itself: a SONATA configuration file (run parameters, stimuli, recorded traces), the
//! components (synaptic models, templates, NMODL mechanisms), a node sets file and a run script.
//!
//! # Building an Environment
//!
//! ```rust
//! use bionet_env::builder::build_env;
//! use bionet_env::config::SimulationConfig;
//! use bionet_env::mechanisms::Nrnivmodl;
//! use bionet_env::request::{CurrentClamp, EnvironmentBuildRequest};
//!
//! let dir = tempfile::tempdir().unwrap();
//!
//! // Run for 2000 ms at 0.1 ms intervals, with a step current from 500 ms to 1500 ms
//! let request = EnvironmentBuildRequest {
//!     base_dir: dir.path().join("sim_advanced_stim"),
//!     tstop: 2000.0,
//!     dt: 0.1,
//!     report_vars: vec!["v".into(), "cai".into()],
//!     current_clamp: Some(CurrentClamp::new(0.120, 500.0, 1000.0)),
//!     include_examples: true,
//!     compile_mechanisms: false,
//!     ..Default::default()
//! };
//!
//! let env = build_env(&request, &Nrnivmodl::new()).unwrap();
//! let config = SimulationConfig::load_from(&env.config_path).unwrap();
//! assert_eq!(config.run.tstop, 2000.0);
//! assert_eq!(config.reports.len(), 2);
//! ```
//!
//! # Compiling Mechanisms
//!
//! With `compile_mechanisms` set, `nrnivmodl modfiles` is run from `components/mechanisms`.
//! If it fails, the error tells how to run it by hand.

pub mod builder;
pub mod components;
pub mod config;
pub mod error;
pub mod mechanisms;
pub mod network;
pub mod request;
pub mod templates;
