//! Contents of the files dropped into a fresh environment.

/// The script running the simulation described by `config_file`.
pub fn make_run_script(config_file: &str) -> String {
    format!(
        r#""""Runs the biophysical network simulation described by the config file."""

import sys
from bmtk.simulator import bionet


def run(config_file):
    conf = bionet.Config.from_json(config_file, validate=True)
    conf.build_env()

    graph = bionet.BioNetwork.from_config(conf)
    sim = bionet.BioSimulator.from_config(conf, network=graph)
    sim.run()
    bionet.nrn.quit_execution()


if __name__ == '__main__':
    if len(sys.argv) > 1:
        run(sys.argv[-1])
    else:
        run('{}')
"#,
        config_file
    )
}

pub const NODE_SETS_JSON: &str = r#"{
  "biophysical_nodes": {
    "model_type": "biophysical"
  },
  "point_nodes": {
    "model_type": "point_process"
  }
}
"#;

pub const AMPA_EXC_TO_EXC_JSON: &str = r#"{
  "level_of_detail": "exp2syn",
  "tau1": 1.0,
  "tau2": 3.0,
  "erev": 0.0
}
"#;

pub const AMPA_EXC_TO_INH_JSON: &str = r#"{
  "level_of_detail": "exp2syn",
  "tau1": 0.1,
  "tau2": 0.5,
  "erev": 0.0
}
"#;

pub const GABA_INH_TO_EXC_JSON: &str = r#"{
  "level_of_detail": "exp2syn",
  "tau1": 2.7,
  "tau2": 15.0,
  "erev": -70.0
}
"#;

pub const GABA_INH_TO_INH_JSON: &str = r#"{
  "level_of_detail": "exp2syn",
  "tau1": 0.2,
  "tau2": 8.0,
  "erev": -70.0
}
"#;

pub const INTFIRE1_EXC_JSON: &str = r#"{
  "type": "NEURON_IntFire1",
  "tau": 0.024,
  "refrac": 0.003
}
"#;

pub const INTFIRE1_INH_JSON: &str = r#"{
  "type": "NEURON_IntFire1",
  "tau": 0.007,
  "refrac": 0.003
}
"#;

/// Submembrane calcium pool, needed to record `cai`.
pub const CA_DYNAMICS_MOD: &str = r#": Dynamics that track inside calcium concentration
: modified from Destexhe et al. 1994

NEURON {
    SUFFIX CaDynamics
    USEION ca READ ica WRITE cai
    RANGE decay, gamma, minCai, depth
}

UNITS {
    (mV) = (millivolt)
    (mA) = (milliamp)
    FARADAY = (faraday) (coulombs)
    (molar) = (1/liter)
    (mM) = (millimolar)
    (um) = (micron)
}

PARAMETER {
    gamma = 0.05 : percent of free calcium (not buffered)
    decay = 80 (ms) : rate of removal of calcium
    depth = 0.1 (um) : depth of shell
    minCai = 1e-4 (mM)
}

ASSIGNED { ica (mA/cm2) }

STATE {
    cai (mM)
}

BREAKPOINT { SOLVE states METHOD cnexp }

DERIVATIVE states {
    cai' = -(10000)*(ica*gamma/(2*FARADAY*depth)) - (cai - minCai)/decay
}
"#;

/// Hyperpolarization-activated cation current (Kole, Hallermann and Stuart, 2006).
pub const IH_MOD: &str = r#"NEURON {
    SUFFIX Ih
    NONSPECIFIC_CURRENT ihcn
    RANGE gbar, g, ihcn
}

UNITS {
    (S) = (siemens)
    (mV) = (millivolt)
    (mA) = (milliamp)
}

PARAMETER {
    gbar = 0.00001 (S/cm2)
    ehcn = -45.0 (mV)
}

ASSIGNED {
    v (mV)
    ihcn (mA/cm2)
    g (S/cm2)
    mInf
    mTau
    mAlpha
    mBeta
}

STATE {
    m
}

BREAKPOINT {
    SOLVE states METHOD cnexp
    g = gbar*m
    ihcn = g*(v-ehcn)
}

DERIVATIVE states {
    rates()
    m' = (mInf-m)/mTau
}

INITIAL {
    rates()
    m = mInf
}

PROCEDURE rates() {
    UNITSOFF
        if (v == -154.9) {
            v = v + 0.0001
        }
        mAlpha = 0.001*6.43*(v+154.9)/(exp((v+154.9)/11.9)-1)
        mBeta = 0.001*193*exp(v/33.1)
        mInf = mAlpha/(mAlpha + mBeta)
        mTau = 1/(mAlpha + mBeta)
    UNITSON
}
"#;
