// ---------------------------------------------------------------------------
// Tree nodes and the snapshot document format
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::path::{validate_name, TreeLimits};

/// Name given to the root of a freshly created tree.
pub const ROOT_NAME: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	File,
	Folder,
}

impl NodeKind {
	pub fn as_str(&self) -> &str {
		match self {
			Self::File => "file",
			Self::Folder => "folder",
		}
	}
}

/// A file or folder. Folders may carry `children: None`, which is treated
/// exactly like an empty list until the first child is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub children: Option<Vec<Node>>,
}

impl Node {
	pub fn file(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: NodeKind::File,
			children: None,
		}
	}

	pub fn folder(name: impl Into<String>, children: Vec<Node>) -> Self {
		Self {
			name: name.into(),
			kind: NodeKind::Folder,
			children: Some(children),
		}
	}

	/// An empty root folder.
	pub fn root() -> Self {
		Self::folder(ROOT_NAME, Vec::new())
	}

	/// A fresh node as produced by create: folders get an empty child list,
	/// files get none.
	pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
		match kind {
			NodeKind::File => Self::file(name),
			NodeKind::Folder => Self::folder(name, Vec::new()),
		}
	}

	pub fn is_folder(&self) -> bool {
		self.kind == NodeKind::Folder
	}

	/// Children in stored order; empty for files and unmaterialised folders.
	pub fn children(&self) -> &[Node] {
		self.children.as_deref().unwrap_or(&[])
	}

	pub fn child(&self, name: &str) -> Option<&Node> {
		self.children().iter().find(|c| c.name == name)
	}

	pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
		self.children
			.as_mut()
			.and_then(|children| children.iter_mut().find(|c| c.name == name))
	}

	pub fn child_index(&self, name: &str) -> Option<usize> {
		self.children().iter().position(|c| c.name == name)
	}

	pub fn has_child(&self, name: &str) -> bool {
		self.child(name).is_some()
	}

	/// Number of nodes in this subtree, including `self`.
	pub fn subtree_size(&self) -> usize {
		1 + self.children().iter().map(Node::subtree_size).sum::<usize>()
	}

	/// Number of levels in this subtree; a leaf has height 1.
	pub fn height(&self) -> usize {
		1 + self.children().iter().map(Node::height).max().unwrap_or(0)
	}

	/// Check that a snapshot received from outside satisfies the tree
	/// invariants and the configured limits.
	pub fn validate_snapshot(&self, limits: &TreeLimits) -> Result<(), TreeError> {
		if !self.is_folder() {
			return Err(TreeError::InvalidSnapshot(format!(
				"root \"{}\" must be a folder",
				self.name
			)));
		}
		let root_name = validate_name(&self.name, limits)
			.map_err(|e| TreeError::InvalidSnapshot(format!("{} (root)", e)))?;
		if root_name != self.name {
			return Err(TreeError::InvalidSnapshot(format!(
				"root name \"{}\" has surrounding whitespace",
				self.name
			)));
		}
		let levels = self.height() - 1;
		if levels > limits.max_depth {
			return Err(TreeError::LimitExceeded(format!(
				"snapshot depth {} exceeds max depth ({})",
				levels, limits.max_depth
			)));
		}
		let count = self.subtree_size();
		if count > limits.max_node_count {
			return Err(TreeError::LimitExceeded(format!(
				"snapshot has {} nodes, max node count is {}",
				count, limits.max_node_count
			)));
		}
		self.validate_children(&self.name, limits)
	}

	fn validate_children(&self, label: &str, limits: &TreeLimits) -> Result<(), TreeError> {
		let mut seen = HashSet::new();
		for child in self.children() {
			let trimmed = validate_name(&child.name, limits).map_err(|e| {
				TreeError::InvalidSnapshot(format!("{} (in \"{}\")", e, label))
			})?;
			if trimmed != child.name {
				return Err(TreeError::InvalidSnapshot(format!(
					"name \"{}\" in \"{}\" has surrounding whitespace",
					child.name, label
				)));
			}
			if !seen.insert(child.name.as_str()) {
				return Err(TreeError::InvalidSnapshot(format!(
					"duplicate name \"{}\" in \"{}\"",
					child.name, label
				)));
			}
			match child.kind {
				NodeKind::File if !child.children().is_empty() => {
					return Err(TreeError::InvalidSnapshot(format!(
						"file \"{}\" cannot have children",
						child.name
					)));
				}
				NodeKind::File => {}
				NodeKind::Folder => child.validate_children(&child.name, limits)?,
			}
		}
		Ok(())
	}

	/// Drop empty child lists that a loader may have attached to files.
	pub(crate) fn normalize(&mut self) {
		if self.kind == NodeKind::File {
			self.children = None;
			return;
		}
		if let Some(children) = self.children.as_mut() {
			for child in children {
				child.normalize();
			}
		}
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
