//! Layout of the components directory and the example files shipped with the crate.
use log;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EnvError;
use crate::templates;

pub const MECHANISMS_DIR: &str = "mechanisms";
/// NMODL sources, inside the mechanisms directory.
pub const MODFILES_DIR: &str = "modfiles";
pub const SYNAPTIC_MODELS_DIR: &str = "synaptic_models";
pub const MORPHOLOGIES_DIR: &str = "morphologies";
pub const BIOPHYSICAL_TEMPLATES_DIR: &str = "biophysical_neuron_templates";
pub const POINT_TEMPLATES_DIR: &str = "point_neuron_templates";

/// An example component file, relative to the components directory.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ExampleFile {
    pub path: &'static str,
    pub contents: &'static str,
}

pub const EXAMPLE_FILES: [ExampleFile; 8] = [
    ExampleFile {
        path: "synaptic_models/AMPA_ExcToExc.json",
        contents: templates::AMPA_EXC_TO_EXC_JSON,
    },
    ExampleFile {
        path: "synaptic_models/AMPA_ExcToInh.json",
        contents: templates::AMPA_EXC_TO_INH_JSON,
    },
    ExampleFile {
        path: "synaptic_models/GABA_InhToExc.json",
        contents: templates::GABA_INH_TO_EXC_JSON,
    },
    ExampleFile {
        path: "synaptic_models/GABA_InhToInh.json",
        contents: templates::GABA_INH_TO_INH_JSON,
    },
    ExampleFile {
        path: "point_neuron_templates/IntFire1_exc_1.json",
        contents: templates::INTFIRE1_EXC_JSON,
    },
    ExampleFile {
        path: "point_neuron_templates/IntFire1_inh_1.json",
        contents: templates::INTFIRE1_INH_JSON,
    },
    ExampleFile {
        path: "mechanisms/modfiles/CaDynamics.mod",
        contents: templates::CA_DYNAMICS_MOD,
    },
    ExampleFile {
        path: "mechanisms/modfiles/Ih.mod",
        contents: templates::IH_MOD,
    },
];

/// The directories making up a components tree rooted at `root`.
#[derive(Debug, PartialEq, Clone)]
pub struct ComponentLayout {
    root: PathBuf,
}

impl ComponentLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        ComponentLayout {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory where `nrnivmodl` is run.
    pub fn mechanisms_dir(&self) -> PathBuf {
        self.root.join(MECHANISMS_DIR)
    }

    pub fn modfiles_dir(&self) -> PathBuf {
        self.mechanisms_dir().join(MODFILES_DIR)
    }

    pub fn synaptic_models_dir(&self) -> PathBuf {
        self.root.join(SYNAPTIC_MODELS_DIR)
    }

    pub fn morphologies_dir(&self) -> PathBuf {
        self.root.join(MORPHOLOGIES_DIR)
    }

    pub fn biophysical_templates_dir(&self) -> PathBuf {
        self.root.join(BIOPHYSICAL_TEMPLATES_DIR)
    }

    pub fn point_templates_dir(&self) -> PathBuf {
        self.root.join(POINT_TEMPLATES_DIR)
    }

    /// All leaf directories of the tree.
    pub fn dirs(&self) -> Vec<PathBuf> {
        vec![
            self.modfiles_dir(),
            self.synaptic_models_dir(),
            self.morphologies_dir(),
            self.biophysical_templates_dir(),
            self.point_templates_dir(),
        ]
    }

    /// Create the tree. Existing directories are left untouched.
    pub fn create(&self) -> Result<(), EnvError> {
        for dir in self.dirs() {
            fs::create_dir_all(&dir)?;
            log::debug!("Created directory {}", dir.display());
        }
        Ok(())
    }

    /// Copy the example component files into the tree, returning the files actually written.
    /// Files already present are kept as they are.
    pub fn write_examples(&self) -> Result<Vec<PathBuf>, EnvError> {
        let mut written = Vec::new();
        for example in EXAMPLE_FILES.iter() {
            let path = self.root.join(example.path);
            if write_if_absent(&path, example.contents)? {
                written.push(path);
            }
        }
        log::info!(
            "Copied {} example component file(s) into {}",
            written.len(),
            self.root.display()
        );
        Ok(written)
    }
}

/// Write `contents` to `path` unless the file exists. Returns whether the file was written.
pub fn write_if_absent<P: AsRef<Path>>(path: P, contents: &str) -> Result<bool, EnvError> {
    let path = path.as_ref();
    if path.exists() {
        log::warn!("Keeping existing file {}", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    log::debug!("Wrote {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_dirs() {
        let layout = ComponentLayout::new("sim/components");
        assert_eq!(
            layout.modfiles_dir(),
            PathBuf::from("sim/components/mechanisms/modfiles")
        );
        assert_eq!(
            layout.biophysical_templates_dir(),
            PathBuf::from("sim/components/biophysical_neuron_templates")
        );
        assert_eq!(layout.dirs().len(), 5);
    }

    #[test]
    fn test_example_files_land_in_layout() {
        let layout = ComponentLayout::new("components");
        for example in EXAMPLE_FILES.iter() {
            let path = layout.root().join(example.path);
            assert!(layout.dirs().iter().any(|dir| path.starts_with(dir)));
            assert!(!example.contents.is_empty());
        }
    }

    #[test]
    fn test_write_examples_keeps_existing() {
        let dir = tempdir().unwrap();
        let layout = ComponentLayout::new(dir.path());
        layout.create().unwrap();

        let custom = layout.modfiles_dir().join("Ih.mod");
        fs::write(&custom, "custom").unwrap();

        let written = layout.write_examples().unwrap();
        assert_eq!(written.len(), EXAMPLE_FILES.len() - 1);
        assert_eq!(fs::read_to_string(&custom).unwrap(), "custom");
        assert!(layout.modfiles_dir().join("CaDynamics.mod").is_file());

        // Nothing left to copy on a second pass.
        assert!(layout.write_examples().unwrap().is_empty());
    }

    #[test]
    fn test_synaptic_models_are_valid_json() {
        for example in EXAMPLE_FILES.iter().filter(|e| e.path.ends_with(".json")) {
            let value: serde_json::Value = serde_json::from_str(example.contents).unwrap();
            assert!(value.is_object());
        }
    }
}
