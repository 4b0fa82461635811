use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeKind};
use crate::path::parse_path;
use crate::search::{SearchHit, SearchMode};

// ── JSON-RPC 2.0 error codes ────────────────────────────────────────────────

pub const INTERNAL_ERROR: i32 = -32603;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const TREE_ERROR: i32 = -32000;

// ── Incoming request ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

// ── Paths ───────────────────────────────────────────────────────────────────

/// A folder path as sent by clients: either a segment array or a
/// `Docs/sub` style string. Missing or null means the root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum PathParam {
    #[default]
    Root,
    Segments(Vec<String>),
    Text(String),
}

impl PathParam {
    pub fn into_segments(self) -> Vec<String> {
        match self {
            Self::Root => Vec::new(),
            Self::Segments(segments) => segments,
            Self::Text(text) => parse_path(&text),
        }
    }
}

// ── Params ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStructureParams {
    pub structure: Node,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFileParams {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemParams {
    #[serde(default)]
    pub path: Option<PathParam>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameItemParams {
    #[serde(default)]
    pub path: Option<PathParam>,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemParams {
    #[serde(default)]
    pub path: Option<PathParam>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemParams {
    #[serde(default)]
    pub source_path: Option<PathParam>,
    pub source_name: String,
    #[serde(default)]
    pub target_path: Option<PathParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryParams {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformSearchParams {
    pub query: String,
    #[serde(default)]
    pub mode: Option<SearchMode>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    #[serde(default)]
    pub path: Option<PathParam>,
}

// ── Result types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedResult<'a> {
    pub name: Option<&'a str>,
    pub node: Option<&'a Node>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStateResult<'a> {
    pub query: &'a str,
    pub results: &'a [SearchHit],
}
