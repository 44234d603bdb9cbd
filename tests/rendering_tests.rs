use tfvc_labels::app::PanelFocus;
use tfvc_labels::labels::LabelFilter;
use tfvc_labels::screenshot::render_config;
use tfvc_labels::source::ItemRef;
use tfvc_labels::test_config::{DetailConfig, TestConfig};
use tfvc_labels::tree::LabelTreeState;

fn render(config: &TestConfig) -> String {
    render_config(config, 110, 32).expect("rendering should succeed")
}

#[test]
fn test_labels_view_shows_rows_and_metadata() {
    let screen = render(&TestConfig::default());

    assert!(screen.contains("TFVC Labels — Fabrikam"));
    assert!(screen.contains("Sprint-18-Web"));
    assert!(screen.contains("Sprint-18-Core"));
    assert!(screen.contains("#42"));
    assert!(screen.contains("Amara Diop"));
    assert!(screen.contains("Loaded 3 labels"));
}

#[test]
fn test_labels_view_marks_background_loading() {
    let mut config = TestConfig::default();
    config.loaded_all = false;
    config.loaded_count = 120;
    config.status_message = "Loaded 100 labels, fetching the rest…".to_string();

    let screen = render(&config);
    assert!(screen.contains("loading…"));
    assert!(screen.contains("120 labels loaded…"));
}

#[test]
fn test_labels_view_shows_deferred_filter_indicator() {
    let mut config = TestConfig::default();
    config.loaded_all = false;
    config.pending_filter = Some(LabelFilter {
        name: "rc".to_string(),
        owner_id: None,
    });

    let screen = render(&config);
    assert!(screen.contains("filter queued until load completes…"));
    // The deferred filter is not applied: all rows still visible.
    assert!(screen.contains("Sprint-18-Web"));
    assert!(screen.contains("Nightly-0601"));
}

#[test]
fn test_labels_view_empty_filter_result() {
    let mut config = TestConfig::default();
    config.filter = LabelFilter {
        name: "no-such-label".to_string(),
        owner_id: None,
    };

    let screen = render(&config);
    assert!(screen.contains("No labels match the current filter"));
}

#[test]
fn test_fatal_load_error_screen() {
    let mut config = TestConfig::default();
    config.labels.clear();
    config.load_error = Some("label listing unavailable".to_string());

    let screen = render(&config);
    assert!(screen.contains("Failed to load labels"));
    assert!(screen.contains("label listing unavailable"));
    assert!(screen.contains("Press R to retry or q to quit"));
}

fn detail_config(items: Option<Vec<ItemRef>>, error: Option<String>) -> TestConfig {
    let mut config = TestConfig::default();
    config.detail = Some(DetailConfig {
        label: config.labels[0].clone(),
        items,
        error,
        tree_state: LabelTreeState::new(),
        focus: PanelFocus::Tree,
        selected_content_index: None,
    });
    config
}

#[test]
fn test_detail_view_loading_state() {
    let screen = render(&detail_config(None, None));

    assert!(screen.contains("Label: Sprint-18-Web"));
    assert!(screen.contains("Loading label items…"));
}

#[test]
fn test_detail_view_error_state() {
    let screen = render(&detail_config(
        None,
        Some("item listing unavailable".to_string()),
    ));

    assert!(screen.contains("Failed to load items: item listing unavailable"));
    // No eternal spinner next door either.
    assert!(screen.contains("Item listing failed"));
}

#[test]
fn test_detail_view_tree_and_contents() {
    let items = vec![
        ItemRef::file("$/A/x.txt"),
        ItemRef::file("$/A/B/y.txt"),
    ];
    let screen = render(&detail_config(Some(items), None));

    // Root is expanded by default; A is collapsed below it.
    assert!(screen.contains("▼ $"));
    assert!(screen.contains("▶ A"));
    // Root contents: the one implied top-level folder.
    assert!(screen.contains("Contents: $/"));
    assert!(screen.contains("A/"));
}

#[test]
fn test_detail_view_empty_folder_contents() {
    let mut config = TestConfig::default();
    let mut tree_state = LabelTreeState::new();
    tree_state.selected = "$/Empty/".to_string();
    config.detail = Some(DetailConfig {
        label: config.labels[0].clone(),
        items: Some(vec![ItemRef::folder("$/Empty")]),
        error: None,
        tree_state,
        focus: PanelFocus::Contents,
        selected_content_index: None,
    });

    let screen = render(&config);
    assert!(screen.contains("Contents: $/Empty/"));
    assert!(screen.contains("(empty)"));
}
