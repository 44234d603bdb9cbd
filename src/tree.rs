use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::source::ItemRef;

/// The reserved prefix denoting the repository root in TFVC path syntax.
pub const ROOT_MARKER: &str = "$";

/// The normalized path of the root node.
pub const ROOT_PATH: &str = "$/";

/// Normalize a repository path so it begins with the root marker
/// followed by a slash. `$/Proj/a`, `$Proj/a` and `Proj/a` all map to
/// `$/Proj/a`; an empty path maps to the root itself.
pub fn normalize_path(raw: &str) -> String {
    let rest = raw.strip_prefix(ROOT_MARKER).unwrap_or(raw);
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        ROOT_PATH.to_string()
    } else {
        format!("{}{}", ROOT_PATH, rest)
    }
}

/// The folder containing `path` (normalized, with trailing slash).
/// The root is its own parent.
pub fn parent_folder(path: &str) -> String {
    let normalized = normalize_path(path);
    let trimmed = normalized.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) if idx + 1 > ROOT_PATH.len() => normalized[..idx + 1].to_string(),
        _ => ROOT_PATH.to_string(),
    }
}

/// A node in the label item tree.
///
/// The tree is a derived view: it is rebuilt from the flat item
/// collection whenever that collection changes and never patched
/// incrementally. Folder paths carry a trailing slash; children are
/// keyed by path segment, so equal segment names under one parent
/// always resolve to the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub is_folder: bool,
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// The root node every tree hangs off.
    pub fn root() -> Self {
        Self {
            name: ROOT_MARKER.to_string(),
            path: ROOT_PATH.to_string(),
            is_folder: true,
            children: BTreeMap::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Children in display order: folders before files, then
    /// lexicographic by full path.
    pub fn sorted_children(&self) -> Vec<&TreeNode> {
        let mut children: Vec<&TreeNode> = self.children.values().collect();
        children.sort_by(|a, b| b.is_folder.cmp(&a.is_folder).then_with(|| a.path.cmp(&b.path)));
        children
    }

    /// Find a descendant node by its normalized path. A trailing slash
    /// on `path` is optional.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let normalized = normalize_path(path);
        let target = normalized.trim_end_matches('/');
        if target == ROOT_MARKER {
            return Some(self);
        }

        let mut cursor = self;
        for segment in target[ROOT_PATH.len()..].split('/') {
            cursor = cursor.children.get(segment)?;
        }
        Some(cursor)
    }

    /// Total number of nodes in this subtree, the root included.
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Build the item tree for one label from its flat item collection.
///
/// Every item resolves to exactly one descendant node and every path
/// prefix of an item resolves to an ancestor node: intermediate folders
/// are synthesized even when no item names them, because a file path
/// implies its containing folders exist. Intermediate segments are
/// always folders; the terminal segment carries the item's own flag,
/// last writer wins for duplicate paths. Input order does not affect
/// the result.
pub fn build_tree(items: &[ItemRef]) -> TreeNode {
    let mut root = TreeNode::root();
    for item in items {
        insert_item(&mut root, item);
    }
    root
}

fn insert_item(root: &mut TreeNode, item: &ItemRef) {
    let normalized = normalize_path(&item.path);
    let segments: Vec<&str> = normalized[ROOT_PATH.len()..]
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let mut cursor = root;
    let mut prefix = String::from(ROOT_PATH);
    let last_index = segments.len().saturating_sub(1);
    for (index, segment) in segments.iter().enumerate() {
        let terminal = index == last_index;
        let is_folder = !terminal || item.is_folder;

        prefix.push_str(segment);
        let node_path = if is_folder {
            format!("{}/", prefix)
        } else {
            prefix.clone()
        };
        prefix.push('/');

        let child = cursor
            .children
            .entry(segment.to_string())
            .or_insert_with(|| TreeNode {
                name: segment.to_string(),
                path: node_path.clone(),
                is_folder,
                children: BTreeMap::new(),
            });
        if terminal {
            child.is_folder = item.is_folder;
            child.path = node_path;
        }
        cursor = child;
    }
}

/// Direct children of `folder`, computed by a flat scan of the item
/// collection, without requiring a materialized tree.
///
/// An item exactly one segment below the folder is listed with its own
/// flag; a deeper item contributes its first remaining segment as an
/// implied subfolder. An unknown folder yields an empty list, never an
/// error. Ordering: folders before files, then lexicographic by path.
pub fn direct_children(items: &[ItemRef], folder: &str) -> Vec<ItemRef> {
    let mut prefix = normalize_path(folder);
    if !prefix.ends_with('/') {
        prefix.push('/');
    }

    let mut children: BTreeMap<String, ItemRef> = BTreeMap::new();
    for item in items {
        let normalized = normalize_path(&item.path);
        let rest = match normalized.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.trim_end_matches('/'),
            None => continue,
        };
        // Server-side escape quirks surface as backslashes; skip them.
        if rest.is_empty() || rest.contains('\\') {
            continue;
        }

        match rest.split_once('/') {
            None => {
                children.insert(
                    rest.to_string(),
                    ItemRef {
                        path: normalized.clone(),
                        is_folder: item.is_folder,
                    },
                );
            }
            Some((first, _)) => {
                children.entry(first.to_string()).or_insert_with(|| ItemRef {
                    path: format!("{}{}", prefix, first),
                    is_folder: true,
                });
            }
        }
    }

    let mut children: Vec<ItemRef> = children.into_values().collect();
    children.sort_by(|a, b| b.is_folder.cmp(&a.is_folder).then_with(|| a.path.cmp(&b.path)));
    children
}

/// Selection and expansion state for the item tree pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTreeState {
    pub selected: String,
    pub expanded: BTreeSet<String>,
}

impl Default for LabelTreeState {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTreeState {
    /// Fresh state: root selected, root expanded.
    pub fn new() -> Self {
        let mut expanded = BTreeSet::new();
        expanded.insert(ROOT_PATH.to_string());
        Self {
            selected: ROOT_PATH.to_string(),
            expanded,
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// The folder whose contents the browse pane shows: the selected
    /// node itself when it is a folder, otherwise its parent.
    pub fn browse_folder(&self) -> String {
        if self.selected.ends_with('/') {
            self.selected.clone()
        } else {
            parent_folder(&self.selected)
        }
    }

    /// Flattened view of the tree respecting expansion state, with the
    /// display depth of every visible node.
    pub fn visible_nodes<'a>(&self, root: &'a TreeNode) -> Vec<(&'a TreeNode, usize)> {
        let mut visible = Vec::new();
        self.collect_visible(root, 0, &mut visible);
        visible
    }

    fn collect_visible<'a>(
        &self,
        node: &'a TreeNode,
        depth: usize,
        visible: &mut Vec<(&'a TreeNode, usize)>,
    ) {
        visible.push((node, depth));
        if node.is_folder && self.is_expanded(&node.path) {
            for child in node.sorted_children() {
                self.collect_visible(child, depth + 1, visible);
            }
        }
    }

    fn selected_position(&self, visible: &[(&TreeNode, usize)]) -> Option<usize> {
        visible.iter().position(|(node, _)| node.path == self.selected)
    }

    /// Index of the selected node within the visible flattening, for
    /// driving the list widget.
    pub fn selected_index(&self, root: &TreeNode) -> Option<usize> {
        self.selected_position(&self.visible_nodes(root))
    }

    pub fn navigate_up(&mut self, root: &TreeNode) -> bool {
        let visible = self.visible_nodes(root);
        match self.selected_position(&visible) {
            Some(position) if position > 0 => {
                self.selected = visible[position - 1].0.path.clone();
                true
            }
            Some(_) => false,
            None => self.select_first(&visible),
        }
    }

    pub fn navigate_down(&mut self, root: &TreeNode) -> bool {
        let visible = self.visible_nodes(root);
        match self.selected_position(&visible) {
            Some(position) if position + 1 < visible.len() => {
                self.selected = visible[position + 1].0.path.clone();
                true
            }
            Some(_) => false,
            None => self.select_first(&visible),
        }
    }

    fn select_first(&mut self, visible: &[(&TreeNode, usize)]) -> bool {
        if let Some((node, _)) = visible.first() {
            self.selected = node.path.clone();
            true
        } else {
            false
        }
    }

    pub fn expand_selected(&mut self, root: &TreeNode) -> bool {
        match root.find(&self.selected) {
            Some(node) if node.is_folder && !self.is_expanded(&node.path) => {
                self.expanded.insert(node.path.clone());
                true
            }
            _ => false,
        }
    }

    pub fn collapse_selected(&mut self, root: &TreeNode) -> bool {
        match root.find(&self.selected) {
            Some(node) if node.is_folder && self.is_expanded(&node.path) => {
                self.expanded.remove(&node.path);
                true
            }
            _ => false,
        }
    }

    pub fn toggle_selected(&mut self, root: &TreeNode) -> bool {
        match root.find(&self.selected) {
            Some(node) if node.is_folder => {
                if !self.expanded.remove(&node.path) {
                    self.expanded.insert(node.path.clone());
                }
                true
            }
            _ => false,
        }
    }

    /// Reset the selection to the root if the selected path no longer
    /// resolves (the tree was rebuilt from fresh items).
    pub fn ensure_valid(&mut self, root: &TreeNode) {
        if root.find(&self.selected).is_none() {
            self.selected = ROOT_PATH.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("$/Proj/a.txt"), "$/Proj/a.txt");
        assert_eq!(normalize_path("$Proj/a.txt"), "$/Proj/a.txt");
        assert_eq!(normalize_path("Proj/a.txt"), "$/Proj/a.txt");
        assert_eq!(normalize_path("$/"), "$/");
        assert_eq!(normalize_path("$"), "$/");
        assert_eq!(normalize_path(""), "$/");
    }

    #[test]
    fn test_parent_folder() {
        assert_eq!(parent_folder("$/A/x.txt"), "$/A/");
        assert_eq!(parent_folder("$/A/B/"), "$/A/");
        assert_eq!(parent_folder("$/A"), "$/");
        assert_eq!(parent_folder("$/"), "$/");
    }

    #[test]
    fn test_build_tree_synthesizes_intermediate_folders() {
        let items = vec![
            ItemRef::file("$/A/x.txt"),
            ItemRef::file("$/A/B/y.txt"),
        ];
        let root = build_tree(&items);

        let a = root.find("$/A").expect("folder A");
        assert!(a.is_folder);
        assert_eq!(a.path, "$/A/");

        let b = root.find("$/A/B").expect("synthesized folder B");
        assert!(b.is_folder);
        assert_eq!(b.path, "$/A/B/");

        let x = root.find("$/A/x.txt").expect("file x");
        assert!(!x.is_folder);
        assert_eq!(x.path, "$/A/x.txt");

        let y = root.find("$/A/B/y.txt").expect("file y");
        assert!(!y.is_folder);
    }

    #[test]
    fn test_build_tree_child_ordering() {
        let items = vec![
            ItemRef::file("$/A/x.txt"),
            ItemRef::file("$/A/B/y.txt"),
        ];
        let root = build_tree(&items);
        let a = root.find("$/A/").unwrap();

        let names: Vec<&str> = a.sorted_children().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["B", "x.txt"]);
    }

    #[test]
    fn test_build_tree_terminal_flag_wins() {
        // The folder item arrives after the node was synthesized as an
        // intermediate; the terminal flag must still come from the item.
        let items = vec![
            ItemRef::file("$/A/B/y.txt"),
            ItemRef::folder("$/A/B"),
        ];
        let root = build_tree(&items);
        let b = root.find("$/A/B").unwrap();
        assert!(b.is_folder);
        assert!(b.children.contains_key("y.txt"));

        // Duplicate paths: last writer wins on the terminal flag.
        let items = vec![ItemRef::folder("$/A/n"), ItemRef::file("$/A/n")];
        let root = build_tree(&items);
        assert!(!root.find("$/A/n").unwrap().is_folder);
    }

    #[test]
    fn test_build_tree_order_independent() {
        let forward = vec![
            ItemRef::folder("$/P"),
            ItemRef::folder("$/P/src"),
            ItemRef::file("$/P/src/main.rs"),
            ItemRef::file("$/P/README.md"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(build_tree(&forward), build_tree(&reversed));
    }

    #[test]
    fn test_build_tree_skips_empty_paths() {
        let items = vec![ItemRef::file(""), ItemRef::folder("$/")];
        let root = build_tree(&items);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_direct_children_includes_implied_folders() {
        let items = vec![
            ItemRef::file("$/A/x.txt"),
            ItemRef::file("$/A/B/y.txt"),
        ];
        let children = direct_children(&items, "$/A/");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].path, "$/A/B");
        assert!(children[0].is_folder);
        assert_eq!(children[1].path, "$/A/x.txt");
        assert!(!children[1].is_folder);
    }

    #[test]
    fn test_direct_children_unknown_folder_is_empty() {
        let items = vec![ItemRef::file("$/A/x.txt")];
        assert!(direct_children(&items, "$/Nope/").is_empty());
        assert!(direct_children(&[], "$/").is_empty());
    }

    #[test]
    fn test_direct_children_trailing_slash_optional() {
        let items = vec![ItemRef::file("$/A/x.txt")];
        assert_eq!(direct_children(&items, "$/A"), direct_children(&items, "$/A/"));
    }

    #[test]
    fn test_tree_state_navigation() {
        let items = vec![
            ItemRef::file("$/A/x.txt"),
            ItemRef::file("$/A/B/y.txt"),
        ];
        let root = build_tree(&items);
        let mut state = LabelTreeState::new();

        // Only root and its child A are visible until A is expanded.
        assert_eq!(state.visible_nodes(&root).len(), 2);

        assert!(state.navigate_down(&root));
        assert_eq!(state.selected, "$/A/");

        assert!(state.expand_selected(&root));
        let visible: Vec<String> = state
            .visible_nodes(&root)
            .iter()
            .map(|(n, _)| n.path.clone())
            .collect();
        assert_eq!(visible, vec!["$/", "$/A/", "$/A/B/", "$/A/x.txt"]);

        assert!(state.navigate_down(&root));
        assert_eq!(state.selected, "$/A/B/");
        assert!(state.navigate_down(&root));
        assert_eq!(state.selected, "$/A/x.txt");
        assert!(!state.navigate_down(&root));

        // A file selection browses its parent folder.
        assert_eq!(state.browse_folder(), "$/A/");

        assert!(state.navigate_up(&root));
        assert!(state.navigate_up(&root));
        assert_eq!(state.selected, "$/A/");
        assert!(state.collapse_selected(&root));
        assert_eq!(state.visible_nodes(&root).len(), 2);
    }

    #[test]
    fn test_tree_state_reset_after_rebuild() {
        let root = build_tree(&[ItemRef::file("$/A/x.txt")]);
        let mut state = LabelTreeState::new();
        state.selected = "$/A/x.txt".to_string();

        let rebuilt = build_tree(&[ItemRef::file("$/C/z.txt")]);
        state.ensure_valid(&rebuilt);
        assert_eq!(state.selected, ROOT_PATH);

        state.selected = "$/A/x.txt".to_string();
        state.ensure_valid(&root);
        assert_eq!(state.selected, "$/A/x.txt");
    }
}
