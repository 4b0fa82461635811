use crate::error::TreeError;
use crate::node::Node;

// ── Constants ───────────────────────────────────────────────────────────────

pub const SEPARATOR: char = '/';

/// Label used in messages for the empty path.
pub const ROOT_LABEL: &str = "root";

// ── Limits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TreeLimits {
    pub max_name_length: usize,
    /// Maximum number of levels below the root.
    pub max_depth: usize,
    /// Maximum number of nodes, root included.
    pub max_node_count: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_name_length: 255,
            max_depth: 32,
            max_node_count: 10_000,
        }
    }
}

// ── Names ───────────────────────────────────────────────────────────────────

/// Validate an item name and return it with surrounding whitespace removed.
pub fn validate_name<'a>(name: &'a str, limits: &TreeLimits) -> Result<&'a str, TreeError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidName("name cannot be empty".to_string()));
    }
    if trimmed.contains(SEPARATOR) {
        return Err(TreeError::InvalidName(format!(
            "\"{}\" cannot contain '{}'",
            trimmed, SEPARATOR
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(TreeError::InvalidName(format!(
            "\"{}\" contains control characters",
            trimmed.escape_debug()
        )));
    }
    if trimmed.len() > limits.max_name_length {
        return Err(TreeError::InvalidName(format!(
            "name exceeds max name length ({})",
            limits.max_name_length
        )));
    }
    Ok(trimmed)
}

// ── Path text ───────────────────────────────────────────────────────────────

/// Split a `Docs/sub` style path into segments. Blank segments are dropped, so
/// `""`, `"/"` and `" / "` all name the root.
pub fn parse_path(text: &str) -> Vec<String> {
    text.split(SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a path for messages: `Docs/sub`, or `root` for the empty path.
pub fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        ROOT_LABEL.to_string()
    } else {
        path.join("/")
    }
}

/// The folder a path names, for messages: its last segment, or `root`.
pub fn folder_label(path: &[String]) -> &str {
    path.last().map(String::as_str).unwrap_or(ROOT_LABEL)
}

/// True if `candidate` is `ancestor` itself or lies anywhere beneath it.
pub fn is_same_or_descendant(candidate: &[String], ancestor: &[String]) -> bool {
    candidate.starts_with(ancestor)
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Walk from `root` by exact child name. The empty path is the root itself.
pub fn resolve<'a>(root: &'a Node, path: &[String]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, segment| node.child(segment))
}

/// Mutable counterpart of [`resolve`], borrowing exclusively along the path.
pub fn resolve_mut<'a>(root: &'a mut Node, path: &[String]) -> Option<&'a mut Node> {
    let mut current = root;
    for segment in path {
        current = current.child_mut(segment)?;
    }
    Some(current)
}

/// Resolve `path` to a parent folder and find `name` among its direct
/// children. Fails when the parent is missing, has no child list, or the
/// child is absent.
pub fn resolve_parent_and_child<'a>(
    root: &'a Node,
    path: &[String],
    name: &str,
) -> Option<(&'a Node, &'a Node)> {
    let parent = resolve(root, path)?;
    let children = parent.children.as_ref()?;
    let child = children.iter().find(|c| c.name == name)?;
    Some((parent, child))
}

/// Which half of a parent/child lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Parent,
    Child,
}

/// Mutable counterpart of [`resolve_parent_and_child`]: the parent's child
/// list and the position of `name` in it, so the caller can edit or detach
/// the child in place.
pub fn resolve_parent_and_child_mut<'a>(
    root: &'a mut Node,
    path: &[String],
    name: &str,
) -> Result<(&'a mut Vec<Node>, usize), Missing> {
    let parent = resolve_mut(root, path).ok_or(Missing::Parent)?;
    let index = parent.child_index(name);
    let children = parent.children.as_mut().ok_or(Missing::Parent)?;
    let index = index.ok_or(Missing::Child)?;
    Ok((children, index))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ROOT_NAME;

    fn p(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Node {
        Node::folder(
            ROOT_NAME,
            vec![
                Node::folder(
                    "Docs",
                    vec![Node::file("a.txt"), Node::folder("sub", vec![])],
                ),
                Node::file("notes.md"),
            ],
        )
    }

    // ── validate_name ───────────────────────────────────────────────────

    #[test]
    fn validate_name_trims() {
        let limits = TreeLimits::default();
        assert_eq!(validate_name("  a.txt ", &limits).unwrap(), "a.txt");
    }

    #[test]
    fn validate_name_rejects_blank() {
        let limits = TreeLimits::default();
        assert!(matches!(
            validate_name("   ", &limits),
            Err(TreeError::InvalidName(_))
        ));
    }

    #[test]
    fn validate_name_rejects_separator() {
        let limits = TreeLimits::default();
        assert!(validate_name("a/b", &limits).is_err());
    }

    #[test]
    fn validate_name_rejects_control_chars() {
        let limits = TreeLimits::default();
        assert!(validate_name("a\u{1}b", &limits).is_err());
    }

    #[test]
    fn validate_name_too_long() {
        let limits = TreeLimits {
            max_name_length: 4,
            ..TreeLimits::default()
        };
        assert!(validate_name("abcde", &limits).is_err());
        assert!(validate_name("abcd", &limits).is_ok());
    }

    // ── parse_path / display_path ───────────────────────────────────────

    #[test]
    fn parse_path_drops_blank_segments() {
        assert_eq!(parse_path("Docs//sub/"), p(&["Docs", "sub"]));
        assert_eq!(parse_path(" Docs / sub "), p(&["Docs", "sub"]));
        assert!(parse_path("").is_empty());
        assert!(parse_path("/").is_empty());
    }

    #[test]
    fn display_root_and_nested() {
        assert_eq!(display_path(&[]), "root");
        assert_eq!(display_path(&p(&["Docs", "sub"])), "Docs/sub");
        assert_eq!(folder_label(&[]), "root");
        assert_eq!(folder_label(&p(&["Docs", "sub"])), "sub");
    }

    #[test]
    fn descendant_check() {
        assert!(is_same_or_descendant(&p(&["a"]), &p(&["a"])));
        assert!(is_same_or_descendant(&p(&["a", "b"]), &p(&["a"])));
        assert!(!is_same_or_descendant(&p(&["ab"]), &p(&["a"])));
        assert!(!is_same_or_descendant(&p(&[]), &p(&["a"])));
    }

    // ── resolve ─────────────────────────────────────────────────────────

    #[test]
    fn resolve_empty_path_is_root() {
        let tree = sample();
        assert_eq!(resolve(&tree, &[]).unwrap().name, ROOT_NAME);
    }

    #[test]
    fn resolve_nested() {
        let tree = sample();
        assert_eq!(resolve(&tree, &p(&["Docs", "sub"])).unwrap().name, "sub");
    }

    #[test]
    fn resolve_missing_segment() {
        let tree = sample();
        assert!(resolve(&tree, &p(&["Docs", "nope"])).is_none());
        assert!(resolve(&tree, &p(&["nope", "sub"])).is_none());
    }

    #[test]
    fn resolve_through_file_fails() {
        let tree = sample();
        assert!(resolve(&tree, &p(&["notes.md", "x"])).is_none());
    }

    #[test]
    fn resolve_mut_allows_in_place_edit() {
        let mut tree = sample();
        resolve_mut(&mut tree, &p(&["Docs", "sub"])).unwrap().name = "renamed".into();
        assert!(resolve(&tree, &p(&["Docs", "renamed"])).is_some());
    }

    #[test]
    fn parent_and_child() {
        let tree = sample();
        let (parent, child) = resolve_parent_and_child(&tree, &p(&["Docs"]), "a.txt").unwrap();
        assert_eq!(parent.name, "Docs");
        assert_eq!(child.name, "a.txt");
        assert!(resolve_parent_and_child(&tree, &p(&["Docs"]), "zzz").is_none());
        assert!(resolve_parent_and_child(&tree, &p(&["notes.md"]), "a.txt").is_none());
    }

    #[test]
    fn parent_and_child_mut_reports_which_part_is_missing() {
        let mut tree = sample();
        let (children, index) =
            resolve_parent_and_child_mut(&mut tree, &p(&["Docs"]), "a.txt").unwrap();
        children[index].name = "b.txt".to_string();
        assert!(resolve(&tree, &p(&["Docs", "b.txt"])).is_some());

        assert_eq!(
            resolve_parent_and_child_mut(&mut tree, &p(&["Docs"]), "zzz").unwrap_err(),
            Missing::Child
        );
        assert_eq!(
            resolve_parent_and_child_mut(&mut tree, &p(&["nope"]), "a.txt").unwrap_err(),
            Missing::Parent
        );
        assert_eq!(
            resolve_parent_and_child_mut(&mut tree, &p(&["notes.md"]), "a.txt").unwrap_err(),
            Missing::Parent
        );
    }
}
