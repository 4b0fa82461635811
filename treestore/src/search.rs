use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::{Node, NodeKind};

/// How the query is matched against node names. On the wire the mode is
/// `"substring"` or `"regex"`; anything else is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
	#[default]
	Substring,
	Regex,
}

/// Configuration for a name search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
	pub mode: SearchMode,
	/// Stop after this many hits. `None` collects every match.
	pub max_results: Option<usize>,
}

/// A node matched by a search, detached from the tree so it survives later
/// mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
	/// Path of the folder holding the hit; empty for the root and its children.
	pub path: Vec<String>,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// 0 for the root, 1 for its children, and so on.
	pub depth: usize,
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Lazy depth-first pre-order traversal: the root first, then each child's
/// subtree in stored order. Yields each node with the path of its parent.
/// Cloning a fresh walk restarts it.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
	root: Option<&'a Node>,
	stack: Vec<(Vec<String>, &'a Node)>,
}

impl<'a> Walk<'a> {
	pub fn new(root: &'a Node) -> Self {
		Self {
			root: Some(root),
			stack: Vec::new(),
		}
	}

	fn push_children(&mut self, path: Vec<String>, node: &'a Node) {
		// Reversed so the first child is popped first.
		for child in node.children().iter().rev() {
			self.stack.push((path.clone(), child));
		}
	}
}

impl<'a> Iterator for Walk<'a> {
	type Item = (Vec<String>, &'a Node);

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(root) = self.root.take() {
			self.push_children(Vec::new(), root);
			return Some((Vec::new(), root));
		}

		let (path, node) = self.stack.pop()?;
		if !node.children().is_empty() {
			let mut child_path = path.clone();
			child_path.push(node.name.clone());
			self.push_children(child_path, node);
		}
		Some((path, node))
	}
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

enum Matcher {
	Substring(String),
	Regex(Regex),
}

impl Matcher {
	fn new(query: &str, mode: SearchMode) -> Result<Self, TreeError> {
		match mode {
			SearchMode::Substring => Ok(Self::substring(query)),
			SearchMode::Regex => RegexBuilder::new(query)
				.case_insensitive(true)
				.build()
				.map(Self::Regex)
				.map_err(|e| TreeError::InvalidQuery(e.to_string())),
		}
	}

	fn substring(query: &str) -> Self {
		Self::Substring(query.to_lowercase())
	}

	fn is_match(&self, name: &str) -> bool {
		match self {
			Self::Substring(needle) => name.to_lowercase().contains(needle.as_str()),
			Self::Regex(re) => re.is_match(name),
		}
	}
}

/// Every node whose name contains `query`, case-insensitively, in discovery
/// order. A blank query matches nothing.
pub fn search<'a>(root: &'a Node, query: &str) -> Vec<&'a Node> {
	if query.trim().is_empty() {
		return Vec::new();
	}
	let matcher = Matcher::substring(query);
	Walk::new(root)
		.map(|(_, node)| node)
		.filter(|node| matcher.is_match(&node.name))
		.collect()
}

/// Owned hits for a plain substring search with no limit. Unlike
/// [`search_nodes`] this cannot fail.
pub fn search_hits(root: &Node, query: &str) -> Vec<SearchHit> {
	if query.trim().is_empty() {
		return Vec::new();
	}
	collect_hits(root, &Matcher::substring(query), usize::MAX)
}

/// Search with options, producing owned hits. A blank query yields no hits
/// in every mode.
pub fn search_nodes(
	root: &Node,
	query: &str,
	options: &SearchOptions,
) -> Result<Vec<SearchHit>, TreeError> {
	if query.trim().is_empty() {
		return Ok(Vec::new());
	}
	let matcher = Matcher::new(query, options.mode)?;
	let limit = options.max_results.unwrap_or(usize::MAX);
	Ok(collect_hits(root, &matcher, limit))
}

fn collect_hits(root: &Node, matcher: &Matcher, limit: usize) -> Vec<SearchHit> {
	Walk::new(root)
		.enumerate()
		.filter(|(_, (_, node))| matcher.is_match(&node.name))
		.map(|(index, (path, node))| SearchHit {
			depth: if index == 0 { 0 } else { path.len() + 1 },
			path,
			name: node.name.clone(),
			kind: node.kind,
		})
		.take(limit)
		.collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
