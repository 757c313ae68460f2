//! The SONATA simulation configuration written at the root of the environment.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::components::{
    BIOPHYSICAL_TEMPLATES_DIR, MECHANISMS_DIR, MORPHOLOGIES_DIR, POINT_TEMPLATES_DIR,
    SYNAPTIC_MODELS_DIR,
};
use crate::error::EnvError;
use crate::network::NetworkFiles;
use crate::request::EnvironmentBuildRequest;

/// The manifest value of `$BASE_DIR` when paths are relative to the config file.
pub const CONFIG_DIR: &str = "${configdir}";
/// The simulator the configuration is written for.
pub const TARGET_SIMULATOR: &str = "NEURON";
/// The node sets file, inside the base directory.
pub const NODE_SETS_FILE: &str = "node_sets.json";

/// Path variables substituted by the simulator when the config is loaded.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "$BASE_DIR")]
    pub base_dir: String,
    #[serde(rename = "$OUTPUT_DIR")]
    pub output_dir: String,
    #[serde(rename = "$NETWORK_DIR")]
    pub network_dir: String,
    #[serde(rename = "$COMPONENTS_DIR")]
    pub components_dir: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunSection {
    pub tstop: f64,
    pub dt: f64,
    #[serde(rename = "dL")]
    pub dl: f64,
    pub spike_threshold: f64,
    pub nsteps_block: usize,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Conditions {
    pub celsius: f64,
    pub v_init: f64,
}

/// A stimulus, tagged by its `input_type`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "input_type")]
pub enum Input {
    #[serde(rename = "current_clamp")]
    CurrentClamp {
        module: String,
        node_set: String,
        amp: f64,
        delay: f64,
        duration: f64,
    },
    #[serde(rename = "spikes")]
    Spikes {
        module: String,
        node_set: String,
        input_file: String,
    },
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Output {
    pub log_file: String,
    pub output_dir: String,
    pub spikes_file: String,
}

/// A trace recorded on the soma of a node set.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Report {
    pub variable_name: String,
    pub cells: String,
    pub module: String,
    pub sections: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Components {
    pub morphologies_dir: String,
    pub synaptic_models_dir: String,
    pub mechanisms_dir: String,
    pub biophysical_neuron_models_dir: String,
    pub point_neuron_models_dir: String,
}

/// The whole configuration file.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub manifest: Manifest,
    pub target_simulator: String,
    pub run: RunSection,
    pub conditions: Conditions,
    /// Stimuli, the current clamp first then the spike inputs in request order.
    pub inputs: IndexMap<String, Input>,
    pub output: Output,
    /// Reports, in the order the variables were requested.
    pub reports: IndexMap<String, Report>,
    pub node_sets_file: String,
    pub components: Components,
    pub networks: NetworkFiles,
}

/// Refer to `dir` through `$BASE_DIR` unless it is absolute.
fn under_base_dir(dir: &Path) -> String {
    if dir.is_absolute() {
        dir.display().to_string()
    } else {
        format!("$BASE_DIR/{}", dir.display())
    }
}

fn under_components_dir(name: &str) -> String {
    format!("$COMPONENTS_DIR/{}", name)
}

impl SimulationConfig {
    /// Build the configuration of a request.
    /// `base_dir` is the value of `$BASE_DIR` in the manifest, see [`CONFIG_DIR`].
    pub fn from_request(
        request: &EnvironmentBuildRequest,
        base_dir: &str,
        networks: NetworkFiles,
    ) -> Self {
        let manifest = Manifest {
            base_dir: base_dir.to_string(),
            output_dir: under_base_dir(
                request
                    .output_dir
                    .as_deref()
                    .unwrap_or(Path::new("output")),
            ),
            network_dir: under_base_dir(&request.network_dir),
            components_dir: under_base_dir(
                request
                    .components_dir
                    .as_deref()
                    .unwrap_or(Path::new("components")),
            ),
        };

        let mut inputs = IndexMap::new();
        if let Some(clamp) = &request.current_clamp {
            inputs.insert(
                "current_clamp".to_string(),
                Input::CurrentClamp {
                    module: "IClamp".to_string(),
                    node_set: request.clamp_nodes.clone(),
                    amp: clamp.amp,
                    delay: clamp.delay,
                    duration: clamp.duration,
                },
            );
        }
        // Node sets are unique among spike inputs, see `EnvironmentBuildRequest::validate`.
        for spikes in request.spikes_inputs.iter() {
            let module = match spikes.input_file.extension().and_then(|ext| ext.to_str()) {
                Some("csv") => "csv",
                _ => "sonata",
            };
            inputs.insert(
                format!("{}_spikes", spikes.node_set),
                Input::Spikes {
                    module: module.to_string(),
                    node_set: spikes.node_set.clone(),
                    input_file: spikes.input_file.display().to_string(),
                },
            );
        }

        let reports = request
            .report_vars()
            .into_iter()
            .map(|var| {
                (
                    format!("{}_report", var.name()),
                    Report {
                        variable_name: var.name().to_string(),
                        cells: request.report_nodes.clone(),
                        module: "membrane_report".to_string(),
                        sections: "soma".to_string(),
                    },
                )
            })
            .collect();

        SimulationConfig {
            manifest,
            target_simulator: TARGET_SIMULATOR.to_string(),
            run: RunSection {
                tstop: request.tstop,
                dt: request.dt,
                dl: request.dl,
                spike_threshold: request.spike_threshold,
                nsteps_block: request.nsteps_block,
            },
            conditions: Conditions {
                celsius: request.celsius,
                v_init: request.v_init,
            },
            inputs,
            output: Output {
                log_file: "log.txt".to_string(),
                output_dir: "$OUTPUT_DIR".to_string(),
                spikes_file: "spikes.h5".to_string(),
            },
            reports,
            node_sets_file: format!("$BASE_DIR/{}", NODE_SETS_FILE),
            components: Components {
                morphologies_dir: under_components_dir(MORPHOLOGIES_DIR),
                synaptic_models_dir: under_components_dir(SYNAPTIC_MODELS_DIR),
                mechanisms_dir: under_components_dir(MECHANISMS_DIR),
                biophysical_neuron_models_dir: under_components_dir(BIOPHYSICAL_TEMPLATES_DIR),
                point_neuron_models_dir: under_components_dir(POINT_TEMPLATES_DIR),
            },
            networks,
        }
    }

    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), EnvError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a configuration from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, EnvError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
