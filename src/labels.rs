use ratatui::widgets::ListState;
use serde::{Deserialize, Serialize};

use crate::source::{IdentityRef, LabelRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Id,
    ModifiedDate,
}

impl SortKey {
    pub fn toggled(self) -> Self {
        match self {
            SortKey::Id => SortKey::ModifiedDate,
            SortKey::ModifiedDate => SortKey::Id,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::ModifiedDate => "modified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// User-requested row predicates: case-insensitive substring on the
/// label name, exact identity-id equality on the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    pub name: String,
    pub owner_id: Option<String>,
}

impl LabelFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.owner_id.is_none()
    }

    pub fn matches(&self, label: &LabelRef) -> bool {
        if !self.name.is_empty()
            && !label.name.to_lowercase().contains(&self.name.to_lowercase())
        {
            return false;
        }
        match &self.owner_id {
            Some(owner_id) => &label.owner.id == owner_id,
            None => true,
        }
    }
}

/// The label list pane: the (possibly still growing) source collection,
/// the load state, the filter/sort coordination and the list selection.
///
/// Filter changes that arrive while the background load is still
/// running are recorded but not applied: the displayed rows keep the
/// previous filter until the full set lands, at which point the
/// last-requested values take effect atomically. This keeps "this is
/// everything matching my filter" true at the cost of immediacy. Sort
/// changes are not deferred.
#[derive(Debug)]
pub struct LabelsState {
    pub all: Vec<LabelRef>,
    pub visible: Vec<LabelRef>,
    pub loaded_count: usize,
    pub loaded_all: bool,
    pub filter: LabelFilter,
    pub pending_filter: Option<LabelFilter>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub list_state: ListState,
}

impl Default for LabelsState {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelsState {
    pub fn new() -> Self {
        Self {
            all: Vec::new(),
            visible: Vec::new(),
            loaded_count: 0,
            loaded_all: false,
            filter: LabelFilter::default(),
            pending_filter: None,
            sort_key: SortKey::ModifiedDate,
            sort_direction: SortDirection::Descending,
            list_state: ListState::default(),
        }
    }

    /// Absorb the fast first page. The full set is still loading.
    pub fn set_first_page(&mut self, labels: Vec<LabelRef>) {
        self.loaded_count = self.loaded_count.max(labels.len());
        self.all = labels;
        self.refresh_visible();
    }

    /// Observe background-load progress; the count only ever grows.
    pub fn note_progress(&mut self, loaded: usize) {
        self.loaded_count = self.loaded_count.max(loaded);
    }

    /// Absorb the complete set. Flips `loaded_all` (at most once per
    /// fetch session) and applies any deferred filter atomically.
    pub fn set_complete(&mut self, labels: Vec<LabelRef>) {
        self.loaded_count = self.loaded_count.max(labels.len());
        self.all = labels;
        if !self.loaded_all {
            self.loaded_all = true;
            if let Some(pending) = self.pending_filter.take() {
                self.filter = pending;
            }
        }
        self.refresh_visible();
    }

    /// Record a filter change. Applies immediately once the set is
    /// complete; defers (last write wins, no queue) while it is not.
    pub fn request_filter(&mut self, filter: LabelFilter) {
        if self.loaded_all {
            self.filter = filter;
            self.refresh_visible();
        } else {
            self.pending_filter = Some(filter);
        }
    }

    /// The filter values the user last asked for, applied or not.
    pub fn requested_filter(&self) -> &LabelFilter {
        self.pending_filter.as_ref().unwrap_or(&self.filter)
    }

    pub fn filter_pending(&self) -> bool {
        self.pending_filter.is_some()
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
        self.refresh_visible();
    }

    pub fn toggle_sort_key(&mut self) {
        self.sort_key = self.sort_key.toggled();
        self.refresh_visible();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort_direction = self.sort_direction.toggled();
        self.refresh_visible();
    }

    /// Recompute the displayed rows from the source collection, the
    /// applied filter and the sort order. Stable: ties keep source
    /// order.
    pub fn refresh_visible(&mut self) {
        let mut rows: Vec<LabelRef> = self
            .all
            .iter()
            .filter(|label| self.filter.matches(label))
            .cloned()
            .collect();

        match (self.sort_key, self.sort_direction) {
            (SortKey::Id, SortDirection::Ascending) => {
                rows.sort_by(|a, b| a.id.cmp(&b.id));
            }
            (SortKey::Id, SortDirection::Descending) => {
                rows.sort_by(|a, b| b.id.cmp(&a.id));
            }
            (SortKey::ModifiedDate, SortDirection::Ascending) => {
                rows.sort_by(|a, b| a.modified_date.cmp(&b.modified_date));
            }
            (SortKey::ModifiedDate, SortDirection::Descending) => {
                rows.sort_by(|a, b| b.modified_date.cmp(&a.modified_date));
            }
        }

        self.visible = rows;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.visible.is_empty() {
            self.list_state.select(None);
        } else {
            let selected = self.list_state.selected().unwrap_or(0);
            self.list_state
                .select(Some(selected.min(self.visible.len() - 1)));
        }
    }

    pub fn selected_label(&self) -> Option<&LabelRef> {
        self.list_state
            .selected()
            .and_then(|index| self.visible.get(index))
    }

    pub fn navigate_up(&mut self) -> bool {
        match self.list_state.selected() {
            Some(selected) if selected > 0 => {
                self.list_state.select(Some(selected - 1));
                true
            }
            None if !self.visible.is_empty() => {
                self.list_state.select(Some(0));
                true
            }
            _ => false,
        }
    }

    pub fn navigate_down(&mut self) -> bool {
        match self.list_state.selected() {
            Some(selected) if selected + 1 < self.visible.len() => {
                self.list_state.select(Some(selected + 1));
                true
            }
            None if !self.visible.is_empty() => {
                self.list_state.select(Some(0));
                true
            }
            _ => false,
        }
    }

    /// Unique owners across the loaded labels, first-seen order. Feeds
    /// the owner filter options.
    pub fn owner_options(&self) -> Vec<IdentityRef> {
        let mut options: Vec<IdentityRef> = Vec::new();
        for label in &self.all {
            if !options.iter().any(|owner| owner.id == label.owner.id) {
                options.push(label.owner.clone());
            }
        }
        options
    }
}
