use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, PanelFocus};
use crate::async_task::Task;
use crate::command::Command;
use crate::config::KeybindingConfig;

/// Translate a terminal event into a state command and apply it.
/// Returns the fetch tasks the transition requested; the caller
/// dispatches them to the worker.
pub fn handle_event(event: Event, app: &mut App) -> Vec<Task> {
    match map_event(app, &event) {
        Some(command) => app.apply(command),
        None => Vec::new(),
    }
}

pub fn map_event(app: &App, event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(app, key),
        _ => None,
    }
}

fn map_key(app: &App, key: &KeyEvent) -> Option<Command> {
    // Filter entry mode captures printable keys before any binding.
    if app.filter_active {
        return match key.code {
            KeyCode::Char(ch) => Some(Command::FilterInput(ch)),
            KeyCode::Backspace => Some(Command::FilterBackspace),
            KeyCode::Enter | KeyCode::Esc => Some(Command::EndFilter),
            _ => None,
        };
    }

    let keys = &app.config.keybindings;
    match key.code {
        KeyCode::Char(ch) if ch == keys.quit => Some(Command::Quit),
        KeyCode::Char(ch) if ch == keys.refresh => Some(Command::Refresh),
        KeyCode::Tab => Some(Command::NextPanel),
        KeyCode::BackTab => Some(Command::PreviousPanel),
        KeyCode::Esc => {
            if app.detail.is_some() {
                Some(Command::Back)
            } else {
                None
            }
        }
        _ => {
            if app.detail.is_some() {
                map_detail_key(app, key, keys)
            } else {
                map_labels_key(key, keys)
            }
        }
    }
}

fn map_labels_key(key: &KeyEvent, keys: &KeybindingConfig) -> Option<Command> {
    match key.code {
        KeyCode::Up => Some(Command::LabelsUp),
        KeyCode::Down => Some(Command::LabelsDown),
        KeyCode::Enter => Some(Command::OpenLabel),
        KeyCode::Char(ch) if ch == keys.filter => Some(Command::StartFilter),
        KeyCode::Char(ch) if ch == keys.owner_filter => Some(Command::CycleOwnerFilter),
        KeyCode::Char(ch) if ch == keys.sort_key => Some(Command::ToggleSortKey),
        KeyCode::Char(ch) if ch == keys.sort_direction => Some(Command::ToggleSortDirection),
        _ => None,
    }
}

fn map_detail_key(app: &App, key: &KeyEvent, keys: &KeybindingConfig) -> Option<Command> {
    let tree_focused = app
        .detail
        .as_ref()
        .map(|detail| detail.focus == PanelFocus::Tree)
        .unwrap_or(true);

    match key.code {
        KeyCode::Up => Some(if tree_focused {
            Command::TreeUp
        } else {
            Command::ContentsUp
        }),
        KeyCode::Down => Some(if tree_focused {
            Command::TreeDown
        } else {
            Command::ContentsDown
        }),
        KeyCode::Right => Some(Command::ExpandNode),
        KeyCode::Left => Some(Command::CollapseNode),
        KeyCode::Enter => Some(Command::ToggleNode),
        KeyCode::Char(ch) if ch == keys.back => Some(Command::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_labels_view_bindings() {
        let app = App::new("Fabrikam");
        assert_eq!(map_event(&app, &key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(map_event(&app, &key(KeyCode::Up)), Some(Command::LabelsUp));
        assert_eq!(map_event(&app, &key(KeyCode::Enter)), Some(Command::OpenLabel));
        assert_eq!(
            map_event(&app, &key(KeyCode::Char('/'))),
            Some(Command::StartFilter)
        );
        assert_eq!(
            map_event(&app, &key(KeyCode::Char('o'))),
            Some(Command::CycleOwnerFilter)
        );
        // Esc in the list view with no detail open maps to nothing.
        assert_eq!(map_event(&app, &key(KeyCode::Esc)), None);
    }

    #[test]
    fn test_filter_mode_captures_bound_keys() {
        let mut app = App::new("Fabrikam");
        app.filter_active = true;

        assert_eq!(
            map_event(&app, &key(KeyCode::Char('q'))),
            Some(Command::FilterInput('q'))
        );
        assert_eq!(
            map_event(&app, &key(KeyCode::Backspace)),
            Some(Command::FilterBackspace)
        );
        assert_eq!(map_event(&app, &key(KeyCode::Esc)), Some(Command::EndFilter));
    }

    #[test]
    fn test_detail_view_bindings_follow_focus() {
        use crate::source::{IdentityRef, LabelRef};

        let mut app = App::new("Fabrikam");
        app.labels.set_complete(vec![LabelRef {
            id: 1,
            name: "L".to_string(),
            description: None,
            owner: IdentityRef::new("o", "O", "o@x"),
            modified_date: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        }]);
        app.apply(Command::OpenLabel);

        assert_eq!(map_event(&app, &key(KeyCode::Up)), Some(Command::TreeUp));
        assert_eq!(map_event(&app, &key(KeyCode::Right)), Some(Command::ExpandNode));
        assert_eq!(map_event(&app, &key(KeyCode::Esc)), Some(Command::Back));

        app.apply(Command::NextPanel);
        assert_eq!(map_event(&app, &key(KeyCode::Up)), Some(Command::ContentsUp));
        assert_eq!(map_event(&app, &key(KeyCode::Down)), Some(Command::ContentsDown));
    }
}
