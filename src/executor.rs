use crate::app::App;
use crate::command::Command;
use crate::test_config::TestConfig;

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub config: TestConfig,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

/// Executes commands against state snapshots.
///
/// The snapshot is rebuilt into an App, the command runs through the
/// same state-transition code the interactive loop uses, and the
/// resulting state is snapshotted back. Fetch tasks the transition
/// requests are dropped; there is no worker in headless mode, so a
/// command like `open_label` leaves the detail view in its loading
/// state.
pub struct Executor;

impl Executor {
    /// Execute a command against a configuration and return the resulting state
    pub fn execute(config: &TestConfig, command: Command) -> ExecutionResult {
        let mut app = App::from_test_config(config);
        let status_before = app.status_message.clone();

        let _dropped_tasks = app.apply(command);

        let status_message = if app.status_message != status_before {
            Some(app.status_message.clone())
        } else {
            None
        };

        ExecutionResult {
            config: TestConfig::from_app(&app),
            status_message,
            should_quit: app.should_quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{SortDirection, SortKey};

    #[test]
    fn test_execute_quit() {
        let config = TestConfig::default();
        let result = Executor::execute(&config, Command::Quit);
        assert!(result.should_quit);
    }

    #[test]
    fn test_execute_navigation() {
        let config = TestConfig::default();
        assert_eq!(config.selected_label_index, Some(0));

        let result = Executor::execute(&config, Command::LabelsDown);
        assert_eq!(result.config.selected_label_index, Some(1));
        assert!(!result.should_quit);

        let result = Executor::execute(&result.config, Command::LabelsUp);
        assert_eq!(result.config.selected_label_index, Some(0));
    }

    #[test]
    fn test_execute_open_label_enters_loading_detail() {
        let config = TestConfig::default();
        let result = Executor::execute(&config, Command::OpenLabel);

        let detail = result.config.detail.expect("detail view open");
        // Sorted by modified date descending: Sprint-18-Core is newest.
        assert_eq!(detail.label.name, "Sprint-18-Core");
        assert!(detail.items.is_none());

        let result = Executor::execute(
            &Executor::execute(&config, Command::OpenLabel).config,
            Command::Back,
        );
        assert!(result.config.detail.is_none());
    }

    #[test]
    fn test_execute_sort_toggles() {
        let config = TestConfig::default();
        assert_eq!(config.sort_key, SortKey::ModifiedDate);

        let result = Executor::execute(&config, Command::ToggleSortKey);
        assert_eq!(result.config.sort_key, SortKey::Id);
        assert!(result.status_message.is_some());

        let result = Executor::execute(&result.config, Command::ToggleSortDirection);
        assert_eq!(result.config.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_execute_filter_sequence() {
        let config = TestConfig::default();
        let result = Executor::execute(
            &config,
            Command::Sequence(vec![
                Command::StartFilter,
                Command::FilterInput('s'),
                Command::FilterInput('p'),
                Command::EndFilter,
            ]),
        );

        // The snapshot is fully loaded, so the filter applied directly.
        assert_eq!(result.config.filter.name, "sp");
        assert!(result.config.pending_filter.is_none());
    }
}
