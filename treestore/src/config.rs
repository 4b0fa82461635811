use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::EngineError;
use crate::node::Node;
use crate::path::TreeLimits;

#[derive(Parser, Debug)]
#[command(name = "treestore-engine", about = "In-memory file tree store over JSON-RPC 2.0 / NDJSON stdio")]
pub struct CliArgs {
    /// JSON snapshot (`{"name", "type", "children"}`) to load as the initial tree.
    /// Starts from an empty `root` folder when omitted.
    #[arg(long, env = "TREESTORE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TREESTORE_LOG_LEVEL")]
    pub log_level: String,

    /// Maximum length of a file or folder name, in bytes
    #[arg(long, default_value = "255")]
    pub max_name_length: usize,

    /// Maximum number of levels below the root
    #[arg(long, default_value = "32")]
    pub max_depth: usize,

    /// Maximum number of nodes, root included
    #[arg(long, default_value = "10000")]
    pub max_node_count: usize,
}

impl CliArgs {
    pub fn limits(&self) -> TreeLimits {
        TreeLimits {
            max_name_length: self.max_name_length,
            max_depth: self.max_depth,
            max_node_count: self.max_node_count,
        }
    }
}

/// Read a snapshot document from disk. Structural validation happens when the
/// store takes it over.
pub fn load_snapshot(path: &Path) -> Result<Node, EngineError> {
    let text = fs::read_to_string(path)
        .map_err(|e| EngineError::Snapshot(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| EngineError::Snapshot(format!("{}: {}", path.display(), e)))
}
