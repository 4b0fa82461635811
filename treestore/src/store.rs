// ---------------------------------------------------------------------------
// TreeStore — owned file tree with path-addressed mutations
// ---------------------------------------------------------------------------
//
// Every mutation either applies completely or leaves the tree exactly as it
// was. Failures are returned to the caller and also recorded in a single
// last-error slot that only `clear_error` empties.
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::error::TreeError;
use crate::node::{Node, NodeKind};
use crate::path::{
	display_path, folder_label, is_same_or_descendant, resolve, resolve_mut,
	resolve_parent_and_child_mut, validate_name, Missing, TreeLimits,
};
use crate::search::{search_hits, search_nodes, SearchHit, SearchOptions, Walk};

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

/// A successful mutation, queued for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreeEvent {
	#[serde(rename_all = "camelCase")]
	Created {
		path: Vec<String>,
		name: String,
		#[serde(rename = "type")]
		node_kind: NodeKind,
	},
	#[serde(rename_all = "camelCase")]
	Renamed {
		path: Vec<String>,
		old_name: String,
		new_name: String,
	},
	#[serde(rename_all = "camelCase")]
	Deleted {
		path: Vec<String>,
		name: String,
		removed: usize,
	},
	#[serde(rename_all = "camelCase")]
	Moved {
		source_path: Vec<String>,
		name: String,
		target_path: Vec<String>,
	},
	#[serde(rename_all = "camelCase")]
	StructureReplaced { node_count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeMetrics {
	pub node_count: usize,
	pub file_count: usize,
	pub folder_count: usize,
	/// Levels below the root; 0 for an empty tree.
	pub max_depth: usize,
}

// ---------------------------------------------------------------------------
// TreeStore
// ---------------------------------------------------------------------------

pub struct TreeStore {
	root: Node,
	limits: TreeLimits,
	node_count: usize,
	selected_file: Option<String>,
	last_error: Option<TreeError>,
	search_query: String,
	search_results: Vec<SearchHit>,
	pending_events: Vec<TreeEvent>,
}

impl Default for TreeStore {
	fn default() -> Self {
		Self::new(TreeLimits::default())
	}
}

impl TreeStore {
	// -- Constructor ------------------------------------------------------

	/// A store holding an empty `root` folder.
	pub fn new(limits: TreeLimits) -> Self {
		Self {
			root: Node::root(),
			limits,
			node_count: 1,
			selected_file: None,
			last_error: None,
			search_query: String::new(),
			search_results: Vec::new(),
			pending_events: Vec::new(),
		}
	}

	/// A store initialised from a snapshot.
	pub fn with_structure(structure: Node, limits: TreeLimits) -> Result<Self, TreeError> {
		let mut store = Self::new(limits);
		store.replace_structure(structure)?;
		store.pending_events.clear();
		Ok(store)
	}

	// -- Helpers (private) ------------------------------------------------

	/// Record a failure in the last-error slot and hand it back.
	fn record<T>(&mut self, result: Result<T, TreeError>) -> Result<T, TreeError> {
		if let Err(ref e) = result {
			tracing::warn!(code = e.code(), "{}", e);
			self.last_error = Some(e.clone());
		}
		result
	}

	fn replace_structure(&mut self, mut structure: Node) -> Result<(), TreeError> {
		structure.validate_snapshot(&self.limits)?;
		structure.normalize();
		self.node_count = structure.subtree_size();
		self.root = structure;
		self.pending_events.push(TreeEvent::StructureReplaced {
			node_count: self.node_count,
		});
		Ok(())
	}

	fn check_node_limit(limits: &TreeLimits, node_count: usize, additional: usize) -> Result<(), TreeError> {
		if node_count + additional > limits.max_node_count {
			return Err(TreeError::LimitExceeded(format!(
				"maximum node count exceeded ({})",
				limits.max_node_count
			)));
		}
		Ok(())
	}

	fn check_depth(limits: &TreeLimits, deepest_level: usize) -> Result<(), TreeError> {
		if deepest_level > limits.max_depth {
			return Err(TreeError::LimitExceeded(format!(
				"maximum depth exceeded ({})",
				limits.max_depth
			)));
		}
		Ok(())
	}

	// -- Mutations --------------------------------------------------------

	/// Replace the whole tree. The snapshot is validated first; on failure
	/// the current tree stays in place.
	pub fn set_structure(&mut self, structure: Node) -> Result<(), TreeError> {
		let result = self.replace_structure(structure);
		self.record(result)
	}

	/// Append a new file or folder to the folder at `path`.
	pub fn create(&mut self, path: &[String], name: &str, kind: NodeKind) -> Result<(), TreeError> {
		let result = self.try_create(path, name, kind);
		self.record(result)
	}

	fn try_create(&mut self, path: &[String], name: &str, kind: NodeKind) -> Result<(), TreeError> {
		let name = validate_name(name, &self.limits)?.to_string();

		let parent = resolve_mut(&mut self.root, path)
			.filter(|node| node.is_folder())
			.ok_or_else(|| TreeError::ParentNotFound(display_path(path)))?;
		if parent.has_child(&name) {
			return Err(TreeError::NameConflict {
				name,
				parent: folder_label(path).to_string(),
			});
		}
		Self::check_node_limit(&self.limits, self.node_count, 1)?;
		Self::check_depth(&self.limits, path.len() + 1)?;

		let children = parent.children.get_or_insert_with(Vec::new);
		children.push(Node::new(name.clone(), kind));
		self.node_count += 1;

		tracing::debug!(path = %display_path(path), name = %name, kind = kind.as_str(), "created");
		self.pending_events.push(TreeEvent::Created {
			path: path.to_vec(),
			name,
			node_kind: kind,
		});
		Ok(())
	}

	/// Rename the child `old_name` of the folder at `path` in place.
	pub fn rename(&mut self, path: &[String], old_name: &str, new_name: &str) -> Result<(), TreeError> {
		let result = self.try_rename(path, old_name, new_name);
		self.record(result)
	}

	fn try_rename(&mut self, path: &[String], old_name: &str, new_name: &str) -> Result<(), TreeError> {
		let old_name = old_name.trim();
		if old_name.is_empty() {
			return Err(TreeError::InvalidName(
				"current name cannot be empty".to_string(),
			));
		}
		let new_name = validate_name(new_name, &self.limits)?;
		if new_name == old_name {
			return Err(TreeError::InvalidName(format!(
				"new name must differ from \"{}\"",
				old_name
			)));
		}
		let parent = folder_label(path).to_string();

		// A missing path, a file, or a folder that never had a child list all
		// count as "parent not found".
		let (children, index) = resolve_parent_and_child_mut(&mut self.root, path, old_name)
			.map_err(|missing| match missing {
				Missing::Parent => TreeError::ParentNotFound(display_path(path)),
				Missing::Child => TreeError::ItemNotFound {
					name: old_name.to_string(),
					parent: parent.clone(),
				},
			})?;

		if children.iter().any(|c| c.name == new_name) {
			return Err(TreeError::NameConflict {
				name: new_name.to_string(),
				parent,
			});
		}

		children[index].name = new_name.to_string();

		tracing::debug!(path = %display_path(path), old_name, new_name, "renamed");
		self.pending_events.push(TreeEvent::Renamed {
			path: path.to_vec(),
			old_name: old_name.to_string(),
			new_name: new_name.to_string(),
		});
		Ok(())
	}

	/// Remove the child `name` of the folder at `path`, with its whole subtree.
	pub fn delete(&mut self, path: &[String], name: &str) -> Result<(), TreeError> {
		let result = self.try_delete(path, name);
		self.record(result)
	}

	fn try_delete(&mut self, path: &[String], name: &str) -> Result<(), TreeError> {
		let name = name.trim();
		let (children, index) = resolve_parent_and_child_mut(&mut self.root, path, name)
			.map_err(|missing| match missing {
				Missing::Parent => TreeError::ParentNotFound(display_path(path)),
				Missing::Child => TreeError::ItemNotFound {
					name: name.to_string(),
					parent: folder_label(path).to_string(),
				},
			})?;

		let removed = children.remove(index).subtree_size();
		self.node_count -= removed;

		tracing::debug!(path = %display_path(path), name, removed, "deleted");
		self.pending_events.push(TreeEvent::Deleted {
			path: path.to_vec(),
			name: name.to_string(),
			removed,
		});
		Ok(())
	}

	/// Move the child `source_name` of the folder at `source_path` into the
	/// folder at `target_path`. Unlike the other operations, `target_path`
	/// names the destination folder itself.
	pub fn move_item(
		&mut self,
		source_path: &[String],
		source_name: &str,
		target_path: &[String],
	) -> Result<(), TreeError> {
		let result = self.try_move(source_path, source_name, target_path);
		self.record(result)
	}

	fn try_move(
		&mut self,
		source_path: &[String],
		source_name: &str,
		target_path: &[String],
	) -> Result<(), TreeError> {
		let source_name = source_name.trim();
		let (source_children, index) =
			resolve_parent_and_child_mut(&mut self.root, source_path, source_name).map_err(
				|missing| match missing {
					Missing::Parent => TreeError::SourceParentNotFound(display_path(source_path)),
					Missing::Child => TreeError::SourceItemNotFound {
						name: source_name.to_string(),
						parent: folder_label(source_path).to_string(),
					},
				},
			)?;

		let mut item_path = source_path.to_vec();
		item_path.push(source_name.to_string());
		if is_same_or_descendant(target_path, &item_path) {
			return Err(TreeError::CyclicMove {
				name: source_name.to_string(),
				target: display_path(target_path),
			});
		}
		if target_path == source_path {
			return Err(TreeError::NameConflict {
				name: source_name.to_string(),
				parent: folder_label(target_path).to_string(),
			});
		}

		let item = source_children.remove(index);

		match Self::attach(&mut self.root, target_path, item, &self.limits) {
			Ok(()) => {
				tracing::debug!(
					source = %display_path(source_path),
					name = source_name,
					target = %display_path(target_path),
					"moved"
				);
				self.pending_events.push(TreeEvent::Moved {
					source_path: source_path.to_vec(),
					name: source_name.to_string(),
					target_path: target_path.to_vec(),
				});
				Ok(())
			}
			Err((err, item)) => {
				Self::reinsert(&mut self.root, source_path, index, item);
				Err(err)
			}
		}
	}

	/// Append a detached item to the folder at `target_path`. On failure the
	/// item is handed back so the caller can restore it.
	fn attach(
		root: &mut Node,
		target_path: &[String],
		item: Node,
		limits: &TreeLimits,
	) -> Result<(), (TreeError, Node)> {
		let Some(target) = resolve_mut(root, target_path) else {
			return Err((TreeError::TargetNotFound(display_path(target_path)), item));
		};
		if !target.is_folder() {
			let err = TreeError::TargetNotAFolder(target.name.clone());
			return Err((err, item));
		}
		if target.has_child(&item.name) {
			let err = TreeError::NameConflict {
				name: item.name.clone(),
				parent: target.name.clone(),
			};
			return Err((err, item));
		}
		if let Err(err) = Self::check_depth(limits, target_path.len() + item.height()) {
			return Err((err, item));
		}

		target.children.get_or_insert_with(Vec::new).push(item);
		Ok(())
	}

	/// Put a detached item back at its original position.
	fn reinsert(root: &mut Node, source_path: &[String], index: usize, item: Node) {
		// The source path cannot run through the detached item (cyclic moves
		// are rejected before detaching), so it still resolves here.
		match resolve_mut(root, source_path).and_then(|node| node.children.as_mut()) {
			Some(children) => {
				let index = index.min(children.len());
				children.insert(index, item);
			}
			None => tracing::error!(
				source = %display_path(source_path),
				name = %item.name,
				"failed to restore detached item"
			),
		}
	}

	// -- Selection --------------------------------------------------------

	/// Remember the file being viewed. Only the name is kept.
	pub fn select_file(&mut self, name: impl Into<String>) {
		self.selected_file = Some(name.into());
	}

	pub fn selected_file(&self) -> Option<&str> {
		self.selected_file.as_deref()
	}

	/// The first file in pre-order whose current name matches the selection.
	/// `None` once the selected file has been renamed or deleted.
	pub fn selected_node(&self) -> Option<&Node> {
		let name = self.selected_file.as_deref()?;
		Walk::new(&self.root)
			.map(|(_, node)| node)
			.find(|node| node.kind == NodeKind::File && node.name == name)
	}

	// -- Search -----------------------------------------------------------

	pub fn set_search_query(&mut self, query: impl Into<String>) {
		self.search_query = query.into();
	}

	/// Update the query and recompute the results with default options.
	pub fn perform_search(&mut self, query: &str) -> &[SearchHit] {
		self.search_query = query.to_string();
		self.search_results = search_hits(&self.root, query);
		tracing::debug!(query, hits = self.search_results.len(), "search");
		&self.search_results
	}

	/// Update the query and recompute the results. An invalid regex is
	/// recorded as the last error and leaves the previous results in place.
	pub fn perform_search_with(
		&mut self,
		query: &str,
		options: &SearchOptions,
	) -> Result<&[SearchHit], TreeError> {
		self.search_query = query.to_string();
		let result = search_nodes(&self.root, query, options);
		let hits = self.record(result)?;
		tracing::debug!(query, hits = hits.len(), "search");
		self.search_results = hits;
		Ok(&self.search_results)
	}

	pub fn search_query(&self) -> &str {
		&self.search_query
	}

	pub fn search_results(&self) -> &[SearchHit] {
		&self.search_results
	}

	// -- Errors -----------------------------------------------------------

	pub fn last_error(&self) -> Option<&TreeError> {
		self.last_error.as_ref()
	}

	pub fn clear_error(&mut self) {
		self.last_error = None;
	}

	// -- Inspection -------------------------------------------------------

	pub fn structure(&self) -> &Node {
		&self.root
	}

	pub fn metrics(&self) -> TreeMetrics {
		let mut file_count = 0;
		let mut folder_count = 0;
		for (_, node) in Walk::new(&self.root) {
			match node.kind {
				NodeKind::File => file_count += 1,
				NodeKind::Folder => folder_count += 1,
			}
		}
		TreeMetrics {
			node_count: self.node_count,
			file_count,
			folder_count,
			max_depth: self.root.height() - 1,
		}
	}

	/// Box-drawing listing of the folder at `path`, children in stored order.
	pub fn render(&self, path: &[String]) -> Result<String, TreeError> {
		let node = resolve(&self.root, path)
			.ok_or_else(|| TreeError::ParentNotFound(display_path(path)))?;
		if !node.is_folder() {
			return Err(TreeError::TargetNotAFolder(node.name.clone()));
		}

		let mut lines = vec![format!("{}/", node.name)];
		Self::render_children(node, "", &mut lines);
		Ok(lines.join("\n"))
	}

	fn render_children(node: &Node, prefix: &str, lines: &mut Vec<String>) {
		let children = node.children();
		for (i, child) in children.iter().enumerate() {
			let is_last = i == children.len() - 1;
			let connector = if is_last {
				"\u{2514}\u{2500}\u{2500} "
			} else {
				"\u{251C}\u{2500}\u{2500} "
			};
			let child_prefix = if is_last { "    " } else { "\u{2502}   " };

			if child.is_folder() {
				lines.push(format!("{}{}{}/", prefix, connector, child.name));
				Self::render_children(child, &format!("{}{}", prefix, child_prefix), lines);
			} else {
				lines.push(format!("{}{}{}", prefix, connector, child.name));
			}
		}
	}

	// -- Events -----------------------------------------------------------

	pub fn drain_events(&mut self) -> Vec<TreeEvent> {
		std::mem::take(&mut self.pending_events)
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
