use serde::{Deserialize, Serialize};

/// Represents all possible user commands that can be executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Global commands
    Quit,
    Refresh,
    NextPanel,
    PreviousPanel,
    Back,

    // Label list commands
    LabelsUp,
    LabelsDown,
    OpenLabel,
    StartFilter,
    EndFilter,
    FilterInput(char),
    FilterBackspace,
    CycleOwnerFilter,
    ToggleSortKey,
    ToggleSortDirection,

    // Label detail commands
    TreeUp,
    TreeDown,
    ExpandNode,
    CollapseNode,
    ToggleNode,
    ContentsUp,
    ContentsDown,

    // Multi-step commands for automation
    Sequence(Vec<Command>),
}

impl Command {
    /// Parse a command from a string representation
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quit" | "q" => Ok(Command::Quit),
            "refresh" => Ok(Command::Refresh),
            "next_panel" | "tab" => Ok(Command::NextPanel),
            "previous_panel" | "shift_tab" => Ok(Command::PreviousPanel),
            "back" | "escape" => Ok(Command::Back),

            "labels_up" | "up" => Ok(Command::LabelsUp),
            "labels_down" | "down" => Ok(Command::LabelsDown),
            "open_label" | "enter" => Ok(Command::OpenLabel),
            "start_filter" | "/" => Ok(Command::StartFilter),
            "end_filter" => Ok(Command::EndFilter),
            "filter_backspace" | "backspace" => Ok(Command::FilterBackspace),
            "cycle_owner" => Ok(Command::CycleOwnerFilter),
            "toggle_sort" => Ok(Command::ToggleSortKey),
            "toggle_direction" => Ok(Command::ToggleSortDirection),

            "tree_up" => Ok(Command::TreeUp),
            "tree_down" => Ok(Command::TreeDown),
            "expand" | "right" => Ok(Command::ExpandNode),
            "collapse" | "left" => Ok(Command::CollapseNode),
            "toggle_node" => Ok(Command::ToggleNode),
            "contents_up" => Ok(Command::ContentsUp),
            "contents_down" => Ok(Command::ContentsDown),

            _ => {
                if let Some(char_str) = s.strip_prefix("filter:") {
                    if let Some(ch) = char_str.chars().next() {
                        return Ok(Command::FilterInput(ch));
                    }
                }

                if s.starts_with("sequence:[") && s.ends_with(']') {
                    let inner = &s["sequence:[".len()..s.len() - 1];
                    if inner.is_empty() {
                        return Ok(Command::Sequence(vec![]));
                    }

                    let mut commands = Vec::new();
                    for cmd_str in inner.split(',') {
                        let cmd_str = cmd_str.trim();
                        match Command::from_string(cmd_str) {
                            Ok(cmd) => commands.push(cmd),
                            Err(e) => {
                                return Err(format!(
                                    "Invalid command in sequence '{}': {}",
                                    cmd_str, e
                                ))
                            }
                        }
                    }

                    return Ok(Command::Sequence(commands));
                }

                Err(format!("Unknown command: {}", s))
            }
        }
    }

    /// Convert command to string representation
    pub fn as_string(&self) -> String {
        match self {
            Command::Quit => "quit".to_string(),
            Command::Refresh => "refresh".to_string(),
            Command::NextPanel => "next_panel".to_string(),
            Command::PreviousPanel => "previous_panel".to_string(),
            Command::Back => "back".to_string(),

            Command::LabelsUp => "labels_up".to_string(),
            Command::LabelsDown => "labels_down".to_string(),
            Command::OpenLabel => "open_label".to_string(),
            Command::StartFilter => "start_filter".to_string(),
            Command::EndFilter => "end_filter".to_string(),
            Command::FilterInput(ch) => format!("filter:{}", ch),
            Command::FilterBackspace => "filter_backspace".to_string(),
            Command::CycleOwnerFilter => "cycle_owner".to_string(),
            Command::ToggleSortKey => "toggle_sort".to_string(),
            Command::ToggleSortDirection => "toggle_direction".to_string(),

            Command::TreeUp => "tree_up".to_string(),
            Command::TreeDown => "tree_down".to_string(),
            Command::ExpandNode => "expand".to_string(),
            Command::CollapseNode => "collapse".to_string(),
            Command::ToggleNode => "toggle_node".to_string(),
            Command::ContentsUp => "contents_up".to_string(),
            Command::ContentsDown => "contents_down".to_string(),

            Command::Sequence(commands) => {
                format!(
                    "sequence:[{}]",
                    commands
                        .iter()
                        .map(|c| c.as_string())
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::from_string("open_label").unwrap(), Command::OpenLabel);
        assert_eq!(Command::from_string("enter").unwrap(), Command::OpenLabel);
        assert_eq!(Command::from_string("up").unwrap(), Command::LabelsUp);
        assert_eq!(Command::from_string("filter:a").unwrap(), Command::FilterInput('a'));
        assert_eq!(
            Command::from_string("sequence:[down,enter]").unwrap(),
            Command::Sequence(vec![Command::LabelsDown, Command::OpenLabel])
        );

        assert!(Command::from_string("invalid").is_err());
        assert!(Command::from_string("").is_err());
        assert!(Command::from_string("down,up,quit").is_err());
    }

    #[test]
    fn test_command_round_trip() {
        let commands = vec![
            Command::Quit,
            Command::CycleOwnerFilter,
            Command::FilterInput('x'),
            Command::Sequence(vec![Command::TreeDown, Command::ExpandNode]),
        ];
        for command in commands {
            assert_eq!(Command::from_string(&command.as_string()).unwrap(), command);
        }
    }
}
