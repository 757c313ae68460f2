//! Compilation of the NEURON mechanisms (NMODL files) of an environment.
use log;
use std::path::Path;
use std::process::Command;

use crate::components::MODFILES_DIR;
use crate::error::EnvError;

/// The NEURON tool compiling NMODL files into a loadable library.
pub const NRNIVMODL: &str = "nrnivmodl";

/// The command to run by hand when the compilation fails.
pub fn remediation_command(mechanisms_dir: &Path) -> String {
    format!(
        "cd {} && {} {}",
        mechanisms_dir.display(),
        NRNIVMODL,
        MODFILES_DIR
    )
}

/// Something able to compile the mechanisms of a `mechanisms` directory,
/// whose NMODL sources live in its `modfiles` subdirectory.
pub trait MechanismCompiler {
    fn compile(&self, mechanisms_dir: &Path) -> Result<(), EnvError>;
}

/// Compiles mechanisms by running `nrnivmodl modfiles` from the mechanisms directory.
#[derive(Debug, PartialEq, Clone)]
pub struct Nrnivmodl {
    program: String,
}

impl Nrnivmodl {
    pub fn new() -> Self {
        Nrnivmodl {
            program: NRNIVMODL.to_string(),
        }
    }

    /// Use another executable, e.g., an absolute path to `nrnivmodl`.
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Nrnivmodl {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for Nrnivmodl {
    fn default() -> Self {
        Self::new()
    }
}

impl MechanismCompiler for Nrnivmodl {
    fn compile(&self, mechanisms_dir: &Path) -> Result<(), EnvError> {
        log::info!(
            "Compiling mechanisms: {} {} in {}",
            self.program,
            MODFILES_DIR,
            mechanisms_dir.display()
        );

        let output = Command::new(&self.program)
            .arg(MODFILES_DIR)
            .current_dir(mechanisms_dir)
            .output()
            .map_err(|e| EnvError::MechanismCompilation {
                dir: mechanisms_dir.to_path_buf(),
                reason: format!("failed to execute {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            log::debug!("{}", String::from_utf8_lossy(&output.stdout));
            log::error!("{}", String::from_utf8_lossy(&output.stderr));
            return Err(EnvError::MechanismCompilation {
                dir: mechanisms_dir.to_path_buf(),
                reason: format!("{} exited with {}", self.program, output.status),
            });
        }

        log::info!("Mechanisms compiled successfully!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_remediation_command() {
        assert_eq!(
            remediation_command(&PathBuf::from("sim_advanced_stim/components/mechanisms")),
            "cd sim_advanced_stim/components/mechanisms && nrnivmodl modfiles"
        );
    }

    #[test]
    fn test_missing_program_fails() {
        let dir = tempdir().unwrap();
        let compiler = Nrnivmodl::with_program("this-program-does-not-exist-nrnivmodl");
        match compiler.compile(dir.path()) {
            Err(EnvError::MechanismCompilation { dir: failed_dir, reason }) => {
                assert_eq!(failed_dir, dir.path().to_path_buf());
                assert!(reason.contains("failed to execute"));
            }
            other => panic!("Expected a compilation error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_fails() {
        let dir = tempdir().unwrap();
        let compiler = Nrnivmodl::with_program("false");
        assert!(matches!(
            compiler.compile(dir.path()),
            Err(EnvError::MechanismCompilation { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_succeeds() {
        let dir = tempdir().unwrap();
        let compiler = Nrnivmodl::with_program("true");
        assert_eq!(compiler.compile(dir.path()), Ok(()));
    }
}
