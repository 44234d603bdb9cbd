// Library module containing testable functions from main.rs

use std::fs;

use crate::app::App;
use crate::async_task::{Task, TaskResult};
use crate::command::Command;
use crate::error::Result;
use crate::executor::Executor;
use crate::test_config::TestConfig;

/// Fold a worker result into the application state.
///
/// Every arm guards against stale completions: label results carry the
/// fetch-session stamp and are discarded when a refresh superseded
/// them; item results are discarded unless they belong to the label the
/// detail view currently shows. Returns a follow-up task when the
/// result calls for one (the first page chains into the full load).
pub fn handle_task_result(app: &mut App, result: TaskResult) -> Option<Task> {
    match result {
        TaskResult::FirstPageLoaded { session, labels } => {
            if session != app.session {
                log::debug!("first page for superseded session {} ignored", session);
                return None;
            }
            app.is_loading = false;
            let count = labels.len();
            app.labels.set_first_page(labels);
            app.status_message = format!("Loaded {} labels, fetching the rest…", count);
            Some(Task::LoadAllLabels { session })
        }
        TaskResult::FirstPageFailed { session, message } => {
            if session != app.session {
                return None;
            }
            app.is_loading = false;
            log::error!("initial label load failed: {}", message);
            app.load_error = Some(message);
            None
        }
        TaskResult::LabelsProgress { session, loaded } => {
            if session == app.session {
                app.labels.note_progress(loaded);
            }
            None
        }
        TaskResult::AllLabelsLoaded { session, labels } => {
            if session != app.session {
                log::debug!("full label set for superseded session {} ignored", session);
                return None;
            }
            let count = labels.len();
            app.labels.set_complete(labels);
            app.status_message = format!("Loaded {} labels", count);
            None
        }
        TaskResult::AllLabelsFailed { session, message } => {
            if session == app.session {
                // Non-fatal: the first page stays on screen and
                // loaded_all stays false for this session.
                log::warn!("background label load failed: {}", message);
                app.status_message =
                    "Background load failed; showing partial results".to_string();
            }
            None
        }
        TaskResult::ItemsLoaded { label_id, items } => {
            match app.detail.as_mut() {
                Some(detail) if detail.label.id == label_id => {
                    let count = items.len();
                    detail.set_items(items);
                    app.status_message = format!("Loaded {} items", count);
                }
                _ => {
                    log::debug!("item result for superseded label {} ignored", label_id);
                }
            }
            None
        }
        TaskResult::ItemsFailed { label_id, message } => {
            match app.detail.as_mut() {
                Some(detail) if detail.label.id == label_id => {
                    log::warn!("item load for label {} failed: {}", label_id, message);
                    detail.set_error(message);
                }
                _ => {
                    log::debug!("item failure for superseded label {} ignored", label_id);
                }
            }
            None
        }
    }
}

pub fn execute_command(
    config_path: &str,
    command_str: &str,
    output_path: Option<&str>,
    generate_screenshot: bool,
    width: u16,
    height: u16,
) -> Result<()> {
    // Load the configuration
    let config = TestConfig::load_from_file(config_path)?;

    // Parse the command
    let command = Command::from_string(command_str)
        .map_err(crate::error::TfvcLabelsError::Generic)?;

    // Execute the command
    let result = Executor::execute(&config, command);

    // Convert result to JSON
    let result_json = serde_json::to_string_pretty(&result.config)?;

    // Output the result
    match output_path {
        Some(path) => {
            fs::write(path, &result_json)?;
            println!("Result saved to: {}", path);
        }
        None => {
            println!("{}", result_json);
        }
    }

    // Show execution summary
    if let Some(status) = result.status_message {
        eprintln!("Status: {}", status);
    }
    if result.should_quit {
        eprintln!("Command resulted in quit");
    }

    // Generate screenshot if requested
    if generate_screenshot {
        let screenshot_path = output_path
            .map(|p| format!("{}.screenshot.txt", p.trim_end_matches(".json")))
            .unwrap_or_else(|| "command_result_screenshot.txt".to_string());

        let screenshot = crate::screenshot::render_config(&result.config, width, height)?;
        fs::write(&screenshot_path, screenshot)?;
        eprintln!("Screenshot saved to: {}", screenshot_path);
    }

    Ok(())
}

/// Fetch the full label set from the given source and dump the
/// resulting application state as a JSON snapshot.
pub async fn save_current_state(
    source: &dyn crate::source::LabelSource,
    paging: crate::config::PagingConfig,
    project_name: &str,
    output_path: Option<&str>,
) -> Result<()> {
    let mut app = App::new(project_name);
    app.session = 1;

    let first = crate::async_task::fetch_first_page(source, paging.first_page).await?;
    app.labels.set_first_page(first);

    match crate::async_task::fetch_all_labels(source, paging.labels_batch, |_| {}).await {
        Ok(labels) => {
            let count = labels.len();
            app.labels.set_complete(labels);
            app.status_message = format!("Loaded {} labels", count);
        }
        Err(e) => {
            log::warn!("background label load failed: {}", e);
            app.status_message = "Background load failed; showing partial results".to_string();
        }
    }

    let config = TestConfig::from_app(&app);
    let config_json = serde_json::to_string_pretty(&config)?;

    match output_path {
        Some(path) => {
            fs::write(path, &config_json)?;
            println!("Current state saved to: {}", path);
        }
        None => {
            println!("{}", config_json);
        }
    }

    Ok(())
}
