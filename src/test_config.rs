use serde::{Deserialize, Serialize};

use crate::app::{App, PanelFocus};
use crate::labels::{LabelFilter, SortDirection, SortKey};
use crate::source::{IdentityRef, ItemRef, LabelRef};
use crate::tree::LabelTreeState;

/// A serializable snapshot of the application state, used by the
/// headless subcommands (`screenshot`, `execute`, `save-state`) and the
/// test suite to reproduce exact UI states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    pub project_name: String,
    pub labels: Vec<LabelRef>,
    pub loaded_count: usize,
    pub loaded_all: bool,
    pub filter: LabelFilter,
    pub pending_filter: Option<LabelFilter>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub selected_label_index: Option<usize>,
    pub filter_active: bool,
    pub filter_input: String,
    pub detail: Option<DetailConfig>,
    pub status_message: String,
    pub is_loading: bool,
    pub load_error: Option<String>,
}

/// Snapshot of the drill-down view for one label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailConfig {
    pub label: LabelRef,
    pub items: Option<Vec<ItemRef>>,
    pub error: Option<String>,
    pub tree_state: LabelTreeState,
    pub focus: PanelFocus,
    pub selected_content_index: Option<usize>,
}

impl Default for TestConfig {
    fn default() -> Self {
        let amara = IdentityRef::new("7f3c", "Amara Diop", "amara@fabrikam.example");
        let jonas = IdentityRef::new("91e0", "Jonas Weber", "jonas@fabrikam.example");

        let labels = vec![
            LabelRef {
                id: 41,
                name: "Sprint-18-Web".to_string(),
                description: Some("Web tier at sprint 18 close".to_string()),
                owner: amara,
                modified_date: chrono::DateTime::from_timestamp(1_717_200_000, 0)
                    .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC),
            },
            LabelRef {
                id: 42,
                name: "Sprint-18-Core".to_string(),
                description: None,
                owner: jonas.clone(),
                modified_date: chrono::DateTime::from_timestamp(1_717_286_400, 0)
                    .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC),
            },
            LabelRef {
                id: 45,
                name: "Nightly-0601".to_string(),
                description: None,
                owner: jonas,
                modified_date: chrono::DateTime::from_timestamp(1_717_225_200, 0)
                    .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC),
            },
        ];

        Self {
            project_name: "Fabrikam".to_string(),
            loaded_count: labels.len(),
            labels,
            loaded_all: true,
            filter: LabelFilter::default(),
            pending_filter: None,
            sort_key: SortKey::ModifiedDate,
            sort_direction: SortDirection::Descending,
            selected_label_index: Some(0),
            filter_active: false,
            filter_input: String::new(),
            detail: None,
            status_message: "Loaded 3 labels".to_string(),
            is_loading: false,
            load_error: None,
        }
    }
}

impl TestConfig {
    pub fn load_from_file(path: &str) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TestConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn from_app(app: &App) -> Self {
        TestConfig {
            project_name: app.project_name.clone(),
            labels: app.labels.all.clone(),
            loaded_count: app.labels.loaded_count,
            loaded_all: app.labels.loaded_all,
            filter: app.labels.filter.clone(),
            pending_filter: app.labels.pending_filter.clone(),
            sort_key: app.labels.sort_key,
            sort_direction: app.labels.sort_direction,
            selected_label_index: app.labels.list_state.selected(),
            filter_active: app.filter_active,
            filter_input: app.filter_input.clone(),
            detail: app.detail.as_ref().map(|detail| DetailConfig {
                label: detail.label.clone(),
                items: detail.items.clone(),
                error: detail.error.clone(),
                tree_state: detail.tree_state.clone(),
                focus: detail.focus,
                selected_content_index: detail.contents_state.selected(),
            }),
            status_message: app.status_message.clone(),
            is_loading: app.is_loading,
            load_error: app.load_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_json_round_trip() {
        let config = TestConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: TestConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.labels.len(), config.labels.len());
        assert_eq!(parsed.sort_key, config.sort_key);
        assert_eq!(parsed.selected_label_index, config.selected_label_index);
    }
}
