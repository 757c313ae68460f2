//! Discovery of the SONATA node and edge files of a network directory.
use log;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::EnvError;

const NODES_SUFFIX: &str = "_nodes.h5";
const NODE_TYPES_SUFFIX: &str = "_node_types.csv";
const EDGES_SUFFIX: &str = "_edges.h5";
const EDGE_TYPES_SUFFIX: &str = "_edge_types.csv";

/// A population of nodes, as referenced from the `networks` section of the config.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct NodesEntry {
    pub nodes_file: String,
    pub node_types_file: String,
}

/// A set of edges between two populations.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct EdgesEntry {
    pub edges_file: String,
    pub edge_types_file: String,
}

/// The node and edge files found in a network directory.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct NetworkFiles {
    pub nodes: Vec<NodesEntry>,
    pub edges: Vec<EdgesEntry>,
}

impl NetworkFiles {
    /// Scan `dir` (non-recursively) for `<name>_nodes.h5`/`<name>_node_types.csv` and
    /// `<name>_edges.h5`/`<name>_edge_types.csv` pairs.
    /// Paths in the returned entries are prefixed with `prefix`, e.g., `$NETWORK_DIR`.
    /// A missing directory yields no files, the network may be built after the environment.
    pub fn discover<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Self, EnvError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            log::debug!("No network directory at {}", dir.display());
            return Ok(NetworkFiles::default());
        }

        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();

        let mut network = NetworkFiles::default();
        for name in names.iter() {
            if let Some(pop) = name.strip_suffix(NODES_SUFFIX) {
                let types = format!("{}{}", pop, NODE_TYPES_SUFFIX);
                if names.contains(&types) {
                    network.nodes.push(NodesEntry {
                        nodes_file: format!("{}/{}", prefix, name),
                        node_types_file: format!("{}/{}", prefix, types),
                    });
                } else {
                    log::warn!("Skipping {}: no matching {} file", name, types);
                }
            } else if let Some(pop) = name.strip_suffix(EDGES_SUFFIX) {
                let types = format!("{}{}", pop, EDGE_TYPES_SUFFIX);
                if names.contains(&types) {
                    network.edges.push(EdgesEntry {
                        edges_file: format!("{}/{}", prefix, name),
                        edge_types_file: format!("{}/{}", prefix, types),
                    });
                } else {
                    log::warn!("Skipping {}: no matching {} file", name, types);
                }
            }
        }

        log::info!(
            "Found {} node population(s) and {} edge set(s) in {}",
            network.nodes.len(),
            network.edges.len(),
            dir.display()
        );
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempdir().unwrap();
        let network = NetworkFiles::discover(dir.path().join("network"), "$NETWORK_DIR").unwrap();
        assert_eq!(network, NetworkFiles::default());
    }

    #[test]
    fn test_discover_pairs() {
        let dir = tempdir().unwrap();
        for name in [
            "v1_nodes.h5",
            "v1_node_types.csv",
            "lgn_nodes.h5",
            "lgn_node_types.csv",
            "lgn_v1_edges.h5",
            "lgn_v1_edge_types.csv",
            "orphan_nodes.h5",
            "notes.txt",
        ] {
            File::create(dir.path().join(name)).unwrap();
        }

        let network = NetworkFiles::discover(dir.path(), "$NETWORK_DIR").unwrap();
        assert_eq!(
            network.nodes,
            vec![
                NodesEntry {
                    nodes_file: "$NETWORK_DIR/lgn_nodes.h5".to_string(),
                    node_types_file: "$NETWORK_DIR/lgn_node_types.csv".to_string(),
                },
                NodesEntry {
                    nodes_file: "$NETWORK_DIR/v1_nodes.h5".to_string(),
                    node_types_file: "$NETWORK_DIR/v1_node_types.csv".to_string(),
                },
            ]
        );
        assert_eq!(
            network.edges,
            vec![EdgesEntry {
                edges_file: "$NETWORK_DIR/lgn_v1_edges.h5".to_string(),
                edge_types_file: "$NETWORK_DIR/lgn_v1_edge_types.csv".to_string(),
            }]
        );
    }
}
