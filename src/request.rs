//! The request record describing the environment to scaffold.
use derivative::Derivative;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::EnvError;

/// A quantity recorded over time on the soma of every reported cell.
/// Two variables are equal when they have the same name, whichever variant holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TraceVariable {
    /// Membrane potential, `v`.
    MembranePotential,
    /// Intracellular calcium concentration, `cai`.
    CalciumConcentration,
    /// Any other section variable known to the simulator, e.g., `ik` or `ina`.
    Other(String),
}

impl TraceVariable {
    /// The variable name as understood by the simulator.
    pub fn name(&self) -> &str {
        match self {
            TraceVariable::MembranePotential => "v",
            TraceVariable::CalciumConcentration => "cai",
            TraceVariable::Other(name) => name,
        }
    }
}

impl PartialEq for TraceVariable {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for TraceVariable {}

impl Hash for TraceVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl From<&str> for TraceVariable {
    fn from(name: &str) -> Self {
        match name {
            "v" => TraceVariable::MembranePotential,
            "cai" => TraceVariable::CalciumConcentration,
            other => TraceVariable::Other(other.to_string()),
        }
    }
}

impl From<String> for TraceVariable {
    fn from(name: String) -> Self {
        TraceVariable::from(name.as_str())
    }
}

impl From<TraceVariable> for String {
    fn from(var: TraceVariable) -> Self {
        var.name().to_string()
    }
}

impl fmt::Display for TraceVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A step current injected into every cell of a node set.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CurrentClamp {
    /// The amplitude of the step, in nA.
    pub amp: f64,
    /// The onset of the step, in ms.
    pub delay: f64,
    /// The duration of the step, in ms.
    pub duration: f64,
}

impl CurrentClamp {
    pub fn new(amp: f64, delay: f64, duration: f64) -> Self {
        CurrentClamp {
            amp,
            delay,
            duration,
        }
    }

    /// The time at which the step ends, in ms.
    pub fn end(&self) -> f64 {
        self.delay + self.duration
    }
}

/// Spike trains read from a file and fed into a population of virtual cells.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikesInput {
    /// The node set receiving the spikes.
    pub node_set: String,
    /// The spike file (SONATA h5 or csv).
    pub input_file: PathBuf,
}

/// Everything needed to scaffold a simulation environment.
///
/// The defaults reproduce a 2 s simulation at 0.1 ms resolution, recording membrane potential
/// and calcium traces, with a 0.12 nA step current from 500 ms to 1500 ms.
///
/// # Examples
///
/// ```
/// use bionet_env::request::{EnvironmentBuildRequest, TraceVariable};
///
/// let request = EnvironmentBuildRequest::default();
/// assert_eq!(request.tstop, 2000.0);
/// assert_eq!(request.dt, 0.1);
/// assert_eq!(
///     request.report_vars(),
///     vec![TraceVariable::MembranePotential, TraceVariable::CalciumConcentration]
/// );
/// assert!(request.validate().is_ok());
/// ```
#[derive(Derivative, Debug, PartialEq, Clone, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default)]
pub struct EnvironmentBuildRequest {
    /// Where the scripts and config files are saved.
    #[derivative(Default(value = "PathBuf::from(\"sim_advanced_stim\")"))]
    pub base_dir: PathBuf,
    /// Name of the main config file, inside the base directory.
    #[derivative(Default(value = "String::from(\"config.json\")"))]
    pub config_file: String,
    /// Directory containing the network files, relative to the base directory unless absolute.
    #[derivative(Default(value = "PathBuf::from(\"network\")"))]
    pub network_dir: PathBuf,
    /// Components directory, `<base_dir>/components` if unset.
    pub components_dir: Option<PathBuf>,
    /// Simulation output directory, `<base_dir>/output` if unset.
    pub output_dir: Option<PathBuf>,
    /// Simulation stop time, in ms.
    #[derivative(Default(value = "2000.0"))]
    pub tstop: f64,
    /// Simulation time step, in ms.
    #[derivative(Default(value = "0.1"))]
    pub dt: f64,
    /// Maximum length of a compartment, in um.
    #[derivative(Default(value = "20.0"))]
    pub dl: f64,
    /// Voltage threshold for spike detection, in mV.
    #[derivative(Default(value = "-15.0"))]
    pub spike_threshold: f64,
    /// Number of time steps between two writes of the recorded traces.
    #[derivative(Default(value = "5000"))]
    pub nsteps_block: usize,
    /// Initial membrane potential, in mV.
    #[derivative(Default(value = "-80.0"))]
    pub v_init: f64,
    /// Temperature, in degrees Celsius.
    #[derivative(Default(value = "34.0"))]
    pub celsius: f64,
    /// The variables recorded on the soma of the reported cells.
    #[derivative(Default(
        value = "vec![TraceVariable::MembranePotential, TraceVariable::CalciumConcentration]"
    ))]
    pub report_vars: Vec<TraceVariable>,
    /// The node set whose traces are recorded.
    #[derivative(Default(value = "String::from(\"all\")"))]
    pub report_nodes: String,
    /// The node set receiving the current clamp.
    #[derivative(Default(value = "String::from(\"all\")"))]
    pub clamp_nodes: String,
    /// The step current injected into the clamp node set, if any.
    #[derivative(Default(value = "Some(CurrentClamp::new(0.120, 500.0, 1000.0))"))]
    pub current_clamp: Option<CurrentClamp>,
    /// Spike inputs for virtual cells, at most one per node set.
    pub spikes_inputs: Vec<SpikesInput>,
    /// Copy the bundled example component files.
    #[derivative(Default(value = "true"))]
    pub include_examples: bool,
    /// Compile the NEURON mechanisms once the environment is in place.
    #[derivative(Default(value = "true"))]
    pub compile_mechanisms: bool,
    /// Write `${configdir}` as the base directory of the manifest instead of an absolute path.
    #[derivative(Default(value = "true"))]
    pub use_relative_paths: bool,
    /// Replace an existing configuration file.
    pub overwrite_config: bool,
}

impl EnvironmentBuildRequest {
    /// Load a request from a JSON file. Missing fields take their default values.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, EnvError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Check the request is consistent before anything is written to disk.
    pub fn validate(&self) -> Result<(), EnvError> {
        if !(self.tstop.is_finite() && self.tstop > 0.0) {
            return Err(EnvError::InvalidParameter(format!(
                "stop time must be positive, got {}",
                self.tstop
            )));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(EnvError::InvalidParameter(format!(
                "time step must be positive, got {}",
                self.dt
            )));
        }
        if self.dt > self.tstop {
            return Err(EnvError::InvalidParameter(format!(
                "time step {} exceeds stop time {}",
                self.dt, self.tstop
            )));
        }
        if !(self.dl.is_finite() && self.dl > 0.0) {
            return Err(EnvError::InvalidParameter(format!(
                "compartment length must be positive, got {}",
                self.dl
            )));
        }
        if self.nsteps_block == 0 {
            return Err(EnvError::InvalidParameter(
                "nsteps_block must be at least 1".to_string(),
            ));
        }
        if self.config_file.trim().is_empty() {
            return Err(EnvError::InvalidParameter(
                "config file name must not be empty".to_string(),
            ));
        }
        if self.report_vars.iter().any(|var| var.name().is_empty()) {
            return Err(EnvError::InvalidParameter(
                "recorded variable names must not be empty".to_string(),
            ));
        }
        if let Some(clamp) = &self.current_clamp {
            if !clamp.amp.is_finite() {
                return Err(EnvError::InvalidParameter(format!(
                    "current clamp amplitude must be finite, got {}",
                    clamp.amp
                )));
            }
            if !(clamp.delay.is_finite() && clamp.delay >= 0.0) {
                return Err(EnvError::InvalidParameter(format!(
                    "current clamp delay must be non-negative, got {}",
                    clamp.delay
                )));
            }
            if !(clamp.duration.is_finite() && clamp.duration > 0.0) {
                return Err(EnvError::InvalidParameter(format!(
                    "current clamp duration must be positive, got {}",
                    clamp.duration
                )));
            }
            if clamp.end() > self.tstop {
                return Err(EnvError::InvalidParameter(format!(
                    "current clamp ends at {} ms, after the stop time {} ms",
                    clamp.end(),
                    self.tstop
                )));
            }
            if self.clamp_nodes.trim().is_empty() {
                return Err(EnvError::InvalidParameter(
                    "current clamp node set must not be empty".to_string(),
                ));
            }
        }
        if let Some(node_set) = self
            .spikes_inputs
            .iter()
            .map(|spikes| spikes.node_set.as_str())
            .duplicates()
            .next()
        {
            return Err(EnvError::InvalidParameter(format!(
                "several spike inputs target the node set {}",
                node_set
            )));
        }
        Ok(())
    }

    /// The recorded variables, in the requested order and without duplicates.
    pub fn report_vars(&self) -> Vec<TraceVariable> {
        self.report_vars.iter().unique().cloned().collect()
    }

    /// The path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(&self.config_file)
    }

    /// The network directory, resolved against the base directory.
    pub fn network_path(&self) -> PathBuf {
        self.base_dir.join(&self.network_dir)
    }

    /// The components directory, resolved against the base directory.
    pub fn components_path(&self) -> PathBuf {
        match &self.components_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.join("components"),
        }
    }

    /// The output directory, resolved against the base directory.
    pub fn output_path(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.join("output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let request = EnvironmentBuildRequest::default();
        assert_eq!(request.base_dir, PathBuf::from("sim_advanced_stim"));
        assert_eq!(request.config_file, "config.json");
        assert_eq!(request.network_dir, PathBuf::from("network"));
        assert_eq!(request.tstop, 2000.0);
        assert_eq!(request.dt, 0.1);
        assert_eq!(request.current_clamp, Some(CurrentClamp::new(0.120, 500.0, 1000.0)));
        assert!(request.include_examples);
        assert!(request.compile_mechanisms);
        assert!(!request.overwrite_config);
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn test_report_vars_unique_in_order() {
        let request = EnvironmentBuildRequest {
            report_vars: vec!["cai".into(), "v".into(), "cai".into(), "ik".into(), "v".into()],
            ..Default::default()
        };
        assert_eq!(
            request.report_vars(),
            vec![
                TraceVariable::CalciumConcentration,
                TraceVariable::MembranePotential,
                TraceVariable::Other("ik".to_string())
            ]
        );
    }

    #[test]
    fn test_trace_variable_equality_by_name() {
        assert_eq!(TraceVariable::Other("v".to_string()), TraceVariable::MembranePotential);
        assert_eq!(
            TraceVariable::Other("cai".to_string()),
            TraceVariable::CalciumConcentration
        );
        assert_ne!(TraceVariable::Other("ik".to_string()), TraceVariable::MembranePotential);

        let request = EnvironmentBuildRequest {
            report_vars: vec![
                TraceVariable::MembranePotential,
                TraceVariable::Other("v".to_string()),
                TraceVariable::Other("cai".to_string()),
                TraceVariable::CalciumConcentration,
            ],
            ..Default::default()
        };
        let names: Vec<String> = request.report_vars().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["v", "cai"]);
    }

    #[test]
    fn test_validate_duplicate_spikes_node_set() {
        let spikes = |node_set: &str, file: &str| SpikesInput {
            node_set: node_set.to_string(),
            input_file: PathBuf::from(file),
        };
        let request = EnvironmentBuildRequest {
            spikes_inputs: vec![spikes("lgn", "lgn.h5"), spikes("tw", "tw.h5")],
            ..Default::default()
        };
        assert_eq!(request.validate(), Ok(()));

        let request = EnvironmentBuildRequest {
            spikes_inputs: vec![
                spikes("lgn", "lgn.h5"),
                spikes("tw", "tw.h5"),
                spikes("lgn", "lgn_bis.csv"),
            ],
            ..Default::default()
        };
        match request.validate() {
            Err(EnvError::InvalidParameter(msg)) => assert!(msg.contains("lgn")),
            other => panic!("Expected an invalid parameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_variable_serde() {
        let vars: Vec<TraceVariable> = serde_json::from_str(r#"["v", "cai", "ina"]"#).unwrap();
        assert_eq!(
            vars,
            vec![
                TraceVariable::MembranePotential,
                TraceVariable::CalciumConcentration,
                TraceVariable::Other("ina".to_string())
            ]
        );
        assert_eq!(serde_json::to_string(&vars).unwrap(), r#"["v","cai","ina"]"#);
    }

    #[test]
    fn test_validate_rejects_bad_times() {
        let request = EnvironmentBuildRequest {
            tstop: 0.0,
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(EnvError::InvalidParameter(_))));

        let request = EnvironmentBuildRequest {
            dt: -0.1,
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(EnvError::InvalidParameter(_))));

        let request = EnvironmentBuildRequest {
            dt: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(EnvError::InvalidParameter(_))));
    }

    #[test]
    fn test_validate_clamp_window() {
        // The clamp may end exactly at the stop time.
        let request = EnvironmentBuildRequest {
            tstop: 1500.0,
            ..Default::default()
        };
        assert_eq!(request.validate(), Ok(()));

        let request = EnvironmentBuildRequest {
            tstop: 1499.0,
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(EnvError::InvalidParameter(_))));

        let request = EnvironmentBuildRequest {
            current_clamp: Some(CurrentClamp::new(0.1, -1.0, 10.0)),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(EnvError::InvalidParameter(_))));

        let request = EnvironmentBuildRequest {
            tstop: 10.0,
            current_clamp: None,
            ..Default::default()
        };
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn test_resolved_paths() {
        let request = EnvironmentBuildRequest {
            base_dir: PathBuf::from("sim"),
            output_dir: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        assert_eq!(request.config_path(), PathBuf::from("sim/config.json"));
        assert_eq!(request.network_path(), PathBuf::from("sim/network"));
        assert_eq!(request.components_path(), PathBuf::from("sim/components"));
        assert_eq!(request.output_path(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_partial_json_request() {
        let request: EnvironmentBuildRequest =
            serde_json::from_str(r#"{"base_dir": "other", "tstop": 3000.0}"#).unwrap();
        assert_eq!(request.base_dir, PathBuf::from("other"));
        assert_eq!(request.tstop, 3000.0);
        assert_eq!(request.dt, 0.1);
        assert!(request.include_examples);
    }
}
