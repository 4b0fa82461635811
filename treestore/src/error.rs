use thiserror::Error;

/// Failures of a single tree operation. Every variant is recoverable: the tree
/// is left untouched and the caller may retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Parent folder \"{0}\" not found")]
    ParentNotFound(String),
    #[error("Source folder \"{0}\" not found")]
    SourceParentNotFound(String),
    #[error("\"{name}\" not found in \"{parent}\"")]
    ItemNotFound { name: String, parent: String },
    #[error("\"{name}\" not found in source folder \"{parent}\"")]
    SourceItemNotFound { name: String, parent: String },
    #[error("Target folder \"{0}\" not found")]
    TargetNotFound(String),
    #[error("\"{0}\" is not a folder")]
    TargetNotAFolder(String),
    #[error("\"{name}\" already exists in \"{parent}\"")]
    NameConflict { name: String, parent: String },
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Cannot move \"{name}\" into itself or one of its descendants (\"{target}\")")]
    CyclicMove { name: String, target: String },
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),
}

impl TreeError {
    pub fn code(&self) -> &str {
        match self {
            Self::ParentNotFound(_) => "TREE_PARENT_NOT_FOUND",
            Self::SourceParentNotFound(_) => "TREE_SOURCE_PARENT_NOT_FOUND",
            Self::ItemNotFound { .. } => "TREE_ITEM_NOT_FOUND",
            Self::SourceItemNotFound { .. } => "TREE_SOURCE_ITEM_NOT_FOUND",
            Self::TargetNotFound(_) => "TREE_TARGET_NOT_FOUND",
            Self::TargetNotAFolder(_) => "TREE_TARGET_NOT_FOLDER",
            Self::NameConflict { .. } => "TREE_NAME_CONFLICT",
            Self::InvalidName(_) => "TREE_INVALID_NAME",
            Self::CyclicMove { .. } => "TREE_CYCLIC_MOVE",
            Self::LimitExceeded(_) => "TREE_LIMIT_EXCEEDED",
            Self::InvalidSnapshot(_) => "TREE_INVALID_SNAPSHOT",
            Self::InvalidQuery(_) => "TREE_INVALID_QUERY",
        }
    }

    pub fn to_json_rpc_error(&self) -> serde_json::Value {
        serde_json::json!({
            "treeCode": self.code(),
            "message": self.to_string(),
        })
    }
}

/// Process-level failures of the engine binary (transport and request decoding).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Snapshot error: {0}")]
    Snapshot(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Return a machine-readable error code string for this error variant.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidParams(_) => "ENGINE_INVALID_PARAMS",
            Self::Snapshot(_) => "ENGINE_SNAPSHOT_ERROR",
            Self::Tree(e) => e.code(),
            Self::Io(_) => "ENGINE_IO_ERROR",
            Self::Json(_) => "ENGINE_JSON_ERROR",
        }
    }
}
