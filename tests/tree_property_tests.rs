use proptest::prelude::*;

use tfvc_labels::source::ItemRef;
use tfvc_labels::tree::{build_tree, TreeNode};

fn item_strategy() -> impl Strategy<Value = (Vec<String>, bool)> {
    (
        prop::collection::vec("[a-z]{1,6}", 1..5),
        any::<bool>(),
    )
}

fn to_item_refs(raw: &[(Vec<String>, bool)]) -> Vec<ItemRef> {
    raw.iter()
        .map(|(segments, is_folder)| ItemRef {
            path: format!("$/{}", segments.join("/")),
            is_folder: *is_folder,
        })
        .collect()
}

fn check_children_sorted(node: &TreeNode) -> bool {
    let children = node.sorted_children();
    let folders_first = children
        .windows(2)
        .all(|pair| pair[0].is_folder || !pair[1].is_folder);
    let lexicographic_within_kind = children
        .windows(2)
        .all(|pair| pair[0].is_folder != pair[1].is_folder || pair[0].path <= pair[1].path);
    folders_first
        && lexicographic_within_kind
        && node.children.values().all(check_children_sorted)
}

proptest! {
    /// Every item path and every ancestor prefix of it resolves to a
    /// node in the built tree.
    #[test]
    fn every_item_and_ancestor_resolves(raw in prop::collection::vec(item_strategy(), 0..30)) {
        let items = to_item_refs(&raw);
        let root = build_tree(&items);

        for (segments, _) in &raw {
            for prefix_len in 1..=segments.len() {
                let prefix = format!("$/{}", segments[..prefix_len].join("/"));
                prop_assert!(
                    root.find(&prefix).is_some(),
                    "prefix {} must resolve",
                    prefix
                );
            }
        }
    }

    /// Rebuilding from the same collection yields a structurally
    /// identical tree.
    #[test]
    fn rebuild_is_idempotent(raw in prop::collection::vec(item_strategy(), 0..30)) {
        let items = to_item_refs(&raw);
        prop_assert_eq!(build_tree(&items), build_tree(&items));
    }

    /// Display ordering holds at every node: folders before files,
    /// lexicographic by full path within each kind.
    #[test]
    fn children_sorted_at_every_node(raw in prop::collection::vec(item_strategy(), 0..30)) {
        let items = to_item_refs(&raw);
        prop_assert!(check_children_sorted(&build_tree(&items)));
    }

    /// The node count never exceeds the total number of path segments
    /// plus the root: shared prefixes collapse into shared nodes.
    #[test]
    fn shared_prefixes_share_nodes(raw in prop::collection::vec(item_strategy(), 0..30)) {
        let items = to_item_refs(&raw);
        let segment_total: usize = raw.iter().map(|(segments, _)| segments.len()).sum();
        prop_assert!(build_tree(&items).node_count() <= segment_total + 1);
    }
}
