use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;
use std::process::ExitCode;

use bionet_env::builder::build_env;
use bionet_env::error::EnvError;
use bionet_env::mechanisms::{Nrnivmodl, NRNIVMODL};
use bionet_env::request::{CurrentClamp, EnvironmentBuildRequest, SpikesInput, TraceVariable};

/// Scaffold a BioNet simulation environment. Without arguments, builds `sim_advanced_stim`:
/// 2000 ms at 0.1 ms, recording `v` and `cai`, with a 0.12 nA step current from 500 ms to
/// 1500 ms. Every flag overrides the corresponding field of the request, loaded from `--request`
/// or the defaults above.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Load the request from a JSON file, missing fields take their default values
    #[arg(long)]
    request: Option<PathBuf>,
    /// Where the scripts and config files are saved [default: sim_advanced_stim]
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Name of the main config file [default: config.json]
    #[arg(long)]
    config_file: Option<String>,
    /// Directory containing the network files [default: network]
    #[arg(long)]
    network_dir: Option<PathBuf>,
    /// Components directory [default: <base-dir>/components]
    #[arg(long)]
    components_dir: Option<PathBuf>,
    /// Simulation output directory [default: <base-dir>/output]
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// The simulation stop time (ms) [default: 2000.0]
    #[arg(long)]
    tstop: Option<f64>,
    /// The simulation time step (ms) [default: 0.1]
    #[arg(long)]
    dt: Option<f64>,
    /// The maximum compartment length (um) [default: 20.0]
    #[arg(long)]
    dl: Option<f64>,
    /// The spike detection threshold (mV) [default: -15.0]
    #[arg(long, allow_negative_numbers = true)]
    spike_threshold: Option<f64>,
    /// The number of time steps between two writes of the traces [default: 5000]
    #[arg(long)]
    nsteps_block: Option<usize>,
    /// The initial membrane potential (mV) [default: -80.0]
    #[arg(long, allow_negative_numbers = true)]
    v_init: Option<f64>,
    /// The temperature (Celsius) [default: 34.0]
    #[arg(long, allow_negative_numbers = true)]
    celsius: Option<f64>,
    /// The recorded variables, e.g., v (membrane potential) or cai (calcium) [default: v,cai]
    #[arg(long, value_delimiter = ',')]
    report_vars: Option<Vec<String>>,
    /// The node set whose traces are recorded [default: all]
    #[arg(long)]
    report_nodes: Option<String>,
    /// The current clamp amplitude (nA) [default: 0.120]
    #[arg(long, allow_negative_numbers = true)]
    amp: Option<f64>,
    /// The current clamp onset (ms) [default: 500.0]
    #[arg(long)]
    delay: Option<f64>,
    /// The current clamp duration (ms) [default: 1000.0]
    #[arg(long)]
    duration: Option<f64>,
    /// The node set receiving the current clamp [default: all]
    #[arg(long)]
    clamp_nodes: Option<String>,
    /// Do not inject any current
    #[arg(long, conflicts_with_all = ["amp", "delay", "duration"])]
    no_clamp: bool,
    /// A spike input as <node_set>=<file>, can be repeated; replaces the inputs of the request
    #[arg(long, value_parser = parse_spikes_input)]
    spikes_input: Vec<SpikesInput>,
    /// Do not copy the example component files
    #[arg(long)]
    no_examples: bool,
    /// Do not compile the NEURON mechanisms
    #[arg(long)]
    no_compile: bool,
    /// Write the absolute base directory in the config manifest
    #[arg(long)]
    absolute_paths: bool,
    /// Replace an existing config file
    #[arg(long)]
    overwrite: bool,
    /// The mechanisms compiler
    #[arg(long, default_value = NRNIVMODL)]
    nrnivmodl: String,
    /// The log level, one of: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
    /// Also write the logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_spikes_input(arg: &str) -> Result<SpikesInput, String> {
    match arg.split_once('=') {
        Some((node_set, file)) if !node_set.is_empty() && !file.is_empty() => Ok(SpikesInput {
            node_set: node_set.to_string(),
            input_file: PathBuf::from(file),
        }),
        _ => Err(format!("expected <node_set>=<file>, got {}", arg)),
    }
}

impl Args {
    fn to_request(&self) -> Result<EnvironmentBuildRequest, EnvError> {
        let mut request = match &self.request {
            Some(path) => EnvironmentBuildRequest::load_from(path)?,
            None => EnvironmentBuildRequest::default(),
        };

        if let Some(base_dir) = &self.base_dir {
            request.base_dir = base_dir.clone();
        }
        if let Some(config_file) = &self.config_file {
            request.config_file = config_file.clone();
        }
        if let Some(network_dir) = &self.network_dir {
            request.network_dir = network_dir.clone();
        }
        if let Some(components_dir) = &self.components_dir {
            request.components_dir = Some(components_dir.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            request.output_dir = Some(output_dir.clone());
        }
        request.tstop = self.tstop.unwrap_or(request.tstop);
        request.dt = self.dt.unwrap_or(request.dt);
        request.dl = self.dl.unwrap_or(request.dl);
        request.spike_threshold = self.spike_threshold.unwrap_or(request.spike_threshold);
        request.nsteps_block = self.nsteps_block.unwrap_or(request.nsteps_block);
        request.v_init = self.v_init.unwrap_or(request.v_init);
        request.celsius = self.celsius.unwrap_or(request.celsius);
        if let Some(report_vars) = &self.report_vars {
            request.report_vars = report_vars
                .iter()
                .map(|name| TraceVariable::from(name.trim()))
                .collect();
        }
        if let Some(report_nodes) = &self.report_nodes {
            request.report_nodes = report_nodes.clone();
        }
        if let Some(clamp_nodes) = &self.clamp_nodes {
            request.clamp_nodes = clamp_nodes.clone();
        }

        if self.no_clamp {
            request.current_clamp = None;
        } else if self.amp.is_some() || self.delay.is_some() || self.duration.is_some() {
            let clamp = request
                .current_clamp
                .take()
                .unwrap_or_else(|| CurrentClamp::new(0.120, 500.0, 1000.0));
            request.current_clamp = Some(CurrentClamp::new(
                self.amp.unwrap_or(clamp.amp),
                self.delay.unwrap_or(clamp.delay),
                self.duration.unwrap_or(clamp.duration),
            ));
        }
        if !self.spikes_input.is_empty() {
            request.spikes_inputs = self.spikes_input.clone();
        }

        if self.no_examples {
            request.include_examples = false;
        }
        if self.no_compile {
            request.compile_mechanisms = false;
        }
        if self.absolute_paths {
            request.use_relative_paths = false;
        }
        if self.overwrite {
            request.overwrite_config = true;
        }
        Ok(request)
    }
}

fn init_logging(args: &Args) -> Result<(), EnvError> {
    let pattern = "{l} - {m}\n";
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let mut config =
        Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(log_path) = &args.log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .build(log_path)
            .map_err(|e| EnvError::IOError(e.to_string()))?;
        config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(args.log_level))
        .map_err(|e| EnvError::IOError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| EnvError::IOError(e.to_string()))?;
    Ok(())
}

fn run(args: &Args) -> Result<(), EnvError> {
    let request = args.to_request()?;
    log::debug!("{:?}", request);

    let env = build_env(&request, &Nrnivmodl::with_program(args.nrnivmodl.as_str()))?;
    log::info!(
        "Environment ready in {} ({} new file(s), config at {})",
        env.base_dir.display(),
        env.files_written.len(),
        env.config_path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The log level may hide it, the user still needs the message.
            log::error!("{}", e);
            if args.log_level < LevelFilter::Error {
                eprintln!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}
