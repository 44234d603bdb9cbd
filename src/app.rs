use ratatui::widgets::ListState;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::async_task::Task;
use crate::command::Command;
use crate::config::Config;
use crate::labels::{LabelFilter, LabelsState};
use crate::source::{ItemRef, LabelRef};
use crate::tree::{self, LabelTreeState, TreeNode};

/// Which pane of the detail view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelFocus {
    Tree,
    Contents,
}

impl PanelFocus {
    pub fn toggled(self) -> Self {
        match self {
            PanelFocus::Tree => PanelFocus::Contents,
            PanelFocus::Contents => PanelFocus::Tree,
        }
    }
}

/// The drill-down view for one selected label: its item collection,
/// the derived tree and the navigation state over both panes.
///
/// `items` stays `None` until the fetch lands; `error` is the surfaced
/// failure state so the pane never shows an eternal spinner. The
/// cancellation token belongs to the in-flight item fetch; it is
/// cancelled when the view closes or another label supersedes this one.
pub struct DetailState {
    pub label: LabelRef,
    pub items: Option<Vec<ItemRef>>,
    pub error: Option<String>,
    pub tree: TreeNode,
    pub tree_state: LabelTreeState,
    pub focus: PanelFocus,
    pub contents_state: ListState,
    pub cancellation_token: CancellationToken,
}

impl DetailState {
    pub fn new(label: LabelRef) -> Self {
        Self {
            label,
            items: None,
            error: None,
            tree: TreeNode::root(),
            tree_state: LabelTreeState::new(),
            focus: PanelFocus::Tree,
            contents_state: ListState::default(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Absorb the fetched items: rebuild the tree from scratch (the
    /// tree is a derived view, never patched) and reset stale state.
    pub fn set_items(&mut self, items: Vec<ItemRef>) {
        self.tree = tree::build_tree(&items);
        self.tree_state.ensure_valid(&self.tree);
        self.items = Some(items);
        self.error = None;
        self.contents_state = ListState::default();
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Direct children of the browsed folder, recomputed from the flat
    /// item collection on demand.
    pub fn contents(&self) -> Vec<ItemRef> {
        match &self.items {
            Some(items) => tree::direct_children(items, &self.tree_state.browse_folder()),
            None => Vec::new(),
        }
    }

    pub fn contents_up(&mut self) -> bool {
        match self.contents_state.selected() {
            Some(selected) if selected > 0 => {
                self.contents_state.select(Some(selected - 1));
                true
            }
            None if !self.contents().is_empty() => {
                self.contents_state.select(Some(0));
                true
            }
            _ => false,
        }
    }

    pub fn contents_down(&mut self) -> bool {
        let len = self.contents().len();
        match self.contents_state.selected() {
            Some(selected) if selected + 1 < len => {
                self.contents_state.select(Some(selected + 1));
                true
            }
            None if len > 0 => {
                self.contents_state.select(Some(0));
                true
            }
            _ => false,
        }
    }
}

pub struct App {
    pub labels: LabelsState,
    pub detail: Option<DetailState>,

    /// Name-filter entry mode ('/' in the list view).
    pub filter_active: bool,
    pub filter_input: String,

    pub status_message: String,
    pub is_loading: bool,
    pub load_error: Option<String>,
    pub should_quit: bool,

    /// Fetch-session stamp. Results carrying an older stamp belong to a
    /// superseded fetch and are discarded at apply time.
    pub session: u64,

    pub project_name: String,
    pub config: Config,
}

impl App {
    pub fn new(project_name: &str) -> Self {
        Self {
            labels: LabelsState::new(),
            detail: None,
            filter_active: false,
            filter_input: String::new(),
            status_message: "Ready".to_string(),
            is_loading: false,
            load_error: None,
            should_quit: false,
            session: 0,
            project_name: project_name.to_string(),
            config: Config::default(),
        }
    }

    /// Start a fresh fetch session (initial load or manual refresh).
    /// Everything loaded so far is superseded; user filter and sort
    /// preferences survive.
    pub fn begin_session(&mut self) -> Task {
        self.session += 1;
        self.is_loading = true;
        self.load_error = None;
        self.labels.all.clear();
        self.labels.visible.clear();
        self.labels.loaded_count = 0;
        self.labels.loaded_all = false;
        self.status_message = "Loading labels…".to_string();
        Task::LoadFirstPage {
            session: self.session,
        }
    }

    /// Apply a state-transition command. Returns the fetch tasks the
    /// transition asks for; the interactive loop dispatches them, the
    /// headless executor drops them.
    pub fn apply(&mut self, command: Command) -> Vec<Task> {
        let mut tasks = Vec::new();
        self.apply_into(command, &mut tasks);
        tasks
    }

    fn apply_into(&mut self, command: Command, tasks: &mut Vec<Task>) {
        match command {
            Command::Quit => {
                self.should_quit = true;
            }
            Command::Refresh => {
                tasks.push(self.begin_session());
            }
            Command::Back => {
                if self.filter_active {
                    self.filter_active = false;
                } else if let Some(detail) = self.detail.take() {
                    detail.cancellation_token.cancel();
                    self.status_message = "Back to labels".to_string();
                }
            }
            Command::NextPanel | Command::PreviousPanel => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.focus = detail.focus.toggled();
                }
            }

            Command::LabelsUp => {
                if self.detail.is_none() {
                    self.labels.navigate_up();
                }
            }
            Command::LabelsDown => {
                if self.detail.is_none() {
                    self.labels.navigate_down();
                }
            }
            Command::OpenLabel => {
                if self.detail.is_none() {
                    if let Some(task) = self.open_selected_label() {
                        tasks.push(task);
                    }
                }
            }
            Command::StartFilter => {
                if self.detail.is_none() {
                    self.filter_active = true;
                    self.filter_input = self.labels.requested_filter().name.clone();
                }
            }
            Command::EndFilter => {
                self.filter_active = false;
            }
            Command::FilterInput(ch) => {
                if self.filter_active {
                    self.filter_input.push(ch);
                    self.push_name_filter();
                }
            }
            Command::FilterBackspace => {
                if self.filter_active {
                    self.filter_input.pop();
                    self.push_name_filter();
                }
            }
            Command::CycleOwnerFilter => {
                if self.detail.is_none() {
                    self.cycle_owner_filter();
                }
            }
            Command::ToggleSortKey => {
                if self.detail.is_none() {
                    self.labels.toggle_sort_key();
                    self.status_message = format!(
                        "Sorted by {} {}",
                        self.labels.sort_key.label(),
                        self.labels.sort_direction.arrow()
                    );
                }
            }
            Command::ToggleSortDirection => {
                if self.detail.is_none() {
                    self.labels.toggle_sort_direction();
                    self.status_message = format!(
                        "Sorted by {} {}",
                        self.labels.sort_key.label(),
                        self.labels.sort_direction.arrow()
                    );
                }
            }

            Command::TreeUp => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.tree_state.navigate_up(&detail.tree);
                }
            }
            Command::TreeDown => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.tree_state.navigate_down(&detail.tree);
                }
            }
            Command::ExpandNode => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.tree_state.expand_selected(&detail.tree);
                }
            }
            Command::CollapseNode => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.tree_state.collapse_selected(&detail.tree);
                }
            }
            Command::ToggleNode => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.tree_state.toggle_selected(&detail.tree);
                }
            }
            Command::ContentsUp => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.contents_up();
                }
            }
            Command::ContentsDown => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.contents_down();
                }
            }

            Command::Sequence(commands) => {
                for command in commands {
                    self.apply_into(command, tasks);
                }
            }
        }
    }

    /// Open the detail view for the selected label and request its
    /// items. A previous in-flight item fetch is cancelled: the latest
    /// selection wins.
    fn open_selected_label(&mut self) -> Option<Task> {
        let label = self.labels.selected_label()?.clone();
        if let Some(previous) = self.detail.take() {
            previous.cancellation_token.cancel();
        }

        let detail = DetailState::new(label.clone());
        let task = Task::LoadLabelItems {
            label_id: label.id,
            cancellation_token: detail.cancellation_token.clone(),
        };
        self.status_message = format!("Loading items for '{}'…", label.name);
        self.detail = Some(detail);
        Some(task)
    }

    /// Rebuild an App from a state snapshot, for the headless
    /// subcommands and rendering tests.
    pub fn from_test_config(config: &crate::test_config::TestConfig) -> Self {
        let mut app = Self::new(&config.project_name);
        app.labels.all = config.labels.clone();
        app.labels.loaded_count = config.loaded_count;
        app.labels.loaded_all = config.loaded_all;
        app.labels.filter = config.filter.clone();
        app.labels.pending_filter = config.pending_filter.clone();
        app.labels.sort_key = config.sort_key;
        app.labels.sort_direction = config.sort_direction;
        app.labels.refresh_visible();
        app.labels.list_state.select(
            config
                .selected_label_index
                .filter(|index| *index < app.labels.visible.len()),
        );

        app.filter_active = config.filter_active;
        app.filter_input = config.filter_input.clone();
        app.status_message = config.status_message.clone();
        app.is_loading = config.is_loading;
        app.load_error = config.load_error.clone();

        if let Some(detail_config) = &config.detail {
            let mut detail = DetailState::new(detail_config.label.clone());
            if let Some(items) = &detail_config.items {
                detail.set_items(items.clone());
            }
            detail.error = detail_config.error.clone();
            detail.tree_state = detail_config.tree_state.clone();
            detail.tree_state.ensure_valid(&detail.tree);
            detail.focus = detail_config.focus;
            detail.contents_state.select(
                detail_config
                    .selected_content_index
                    .filter(|index| *index < detail.contents().len()),
            );
            app.detail = Some(detail);
        }

        app
    }

    fn push_name_filter(&mut self) {
        let filter = LabelFilter {
            name: self.filter_input.clone(),
            owner_id: self.labels.requested_filter().owner_id.clone(),
        };
        self.labels.request_filter(filter);
    }

    /// Step the owner filter through none → each known owner → none.
    fn cycle_owner_filter(&mut self) {
        let options = self.labels.owner_options();
        let current = self.labels.requested_filter().owner_id.clone();
        let next = match current {
            None => options.first().map(|owner| owner.id.clone()),
            Some(current) => {
                let position = options.iter().position(|owner| owner.id == current);
                match position {
                    Some(index) if index + 1 < options.len() => {
                        Some(options[index + 1].id.clone())
                    }
                    _ => None,
                }
            }
        };

        self.status_message = match next
            .as_ref()
            .and_then(|id| options.iter().find(|owner| &owner.id == id))
        {
            Some(owner) => format!("Owner filter: {}", owner.label()),
            None => "Owner filter cleared".to_string(),
        };

        let filter = LabelFilter {
            name: self.labels.requested_filter().name.clone(),
            owner_id: next,
        };
        self.labels.request_filter(filter);
    }
}
