use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DetailState, PanelFocus};
use crate::source::ItemRef;
use crate::tree::TreeNode;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    if let Some(message) = &app.load_error {
        draw_load_error(frame, app, message, chunks[0]);
    } else if let Some(detail) = &app.detail {
        draw_detail(frame, app, detail, chunks[0]);
    } else {
        draw_labels(frame, app, chunks[0]);
    }

    draw_status_bar(frame, app, chunks[1]);
}

/// Blocking error screen for a failed initial load. Nothing else is
/// useful to show.
fn draw_load_error(frame: &mut Frame, app: &App, message: &str, area: Rect) {
    let block = Block::default()
        .title(format!(" TFVC Labels — {} ", app.project_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.config.colors.error));

    let paragraph = Paragraph::new(vec![
        Line::raw(""),
        Line::styled(
            "Failed to load labels",
            Style::default()
                .fg(app.config.colors.error)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled("Press R to retry or q to quit", Style::default()),
    ])
    .block(block)
    .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn draw_labels(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_filter_bar(frame, app, chunks[0]);
    draw_label_list(frame, app, chunks[1]);
}

fn draw_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let requested = app.labels.requested_filter();

    let name_text = if app.filter_active {
        format!("{}▏", app.filter_input)
    } else if requested.name.is_empty() {
        "(none)".to_string()
    } else {
        requested.name.clone()
    };

    let owner_text = match &requested.owner_id {
        Some(owner_id) => app
            .labels
            .owner_options()
            .iter()
            .find(|owner| &owner.id == owner_id)
            .map(|owner| owner.label().to_string())
            .unwrap_or_else(|| owner_id.clone()),
        None => "(any)".to_string(),
    };

    let mut spans = vec![
        Span::raw("Filter: "),
        Span::styled(name_text, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  Owner: "),
        Span::styled(owner_text, Style::default().fg(app.config.colors.owner)),
        Span::raw("  Sort: "),
        Span::raw(format!(
            "{} {}",
            app.labels.sort_key.label(),
            app.labels.sort_direction.arrow()
        )),
    ];
    if app.labels.filter_pending() {
        spans.push(Span::styled(
            "  filter queued until load completes…",
            Style::default().fg(app.config.colors.date),
        ));
    }

    let block = Block::default()
        .title(format!(" TFVC Labels — {} ", app.project_name))
        .borders(Borders::ALL)
        .border_style(if app.filter_active {
            Style::default().fg(app.config.colors.active_border)
        } else {
            Style::default()
        });

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_label_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Labels ({}{}) ",
        app.labels.visible.len(),
        if app.labels.loaded_all { "" } else { ", loading…" }
    ));

    if app.is_loading {
        let paragraph = Paragraph::new("Loading labels…")
            .block(block)
            .style(Style::default().fg(ratatui::style::Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    if app.labels.visible.is_empty() {
        let paragraph = Paragraph::new("No labels match the current filter")
            .block(block)
            .style(Style::default().fg(ratatui::style::Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    let colors = &app.config.colors;
    let items: Vec<ListItem> = app
        .labels
        .visible
        .iter()
        .map(|label| {
            let date = label.modified_date.format("%Y-%m-%d %H:%M").to_string();
            let mut spans = vec![
                Span::styled(
                    label.name.clone(),
                    Style::default()
                        .fg(colors.label_name)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(format!("#{}", label.id), Style::default().fg(colors.label_id)),
                Span::raw(" "),
                Span::styled(label.owner.label().to_string(), Style::default().fg(colors.owner)),
                Span::raw(" "),
                Span::styled(date, Style::default().fg(colors.date)),
            ];
            if app.config.layout.show_descriptions {
                if let Some(description) = &label.description {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(
                        description.clone(),
                        Style::default().fg(ratatui::style::Color::Gray),
                    ));
                }
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(colors.selected_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut list_state = app.labels.list_state.clone();
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_detail(frame: &mut Frame, app: &App, detail: &DetailState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_detail_header(frame, app, detail, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(app.config.layout.tree_panel_width),
            Constraint::Percentage(100 - app.config.layout.tree_panel_width),
        ])
        .split(chunks[1]);

    draw_tree_pane(frame, app, detail, panes[0]);
    draw_contents_pane(frame, app, detail, panes[1]);
}

fn draw_detail_header(frame: &mut Frame, app: &App, detail: &DetailState, area: Rect) {
    let label = &detail.label;
    let line = Line::from(vec![
        Span::styled(format!("#{}", label.id), Style::default().fg(app.config.colors.label_id)),
        Span::raw("  "),
        Span::styled(
            label.owner.label().to_string(),
            Style::default().fg(app.config.colors.owner),
        ),
        Span::raw("  "),
        Span::raw(label.description.clone().unwrap_or_default()),
    ]);

    let block = Block::default()
        .title(format!(" Label: {} ", label.name))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tree_pane(frame: &mut Frame, app: &App, detail: &DetailState, area: Rect) {
    let is_active = detail.focus == PanelFocus::Tree;
    let border_style = if is_active {
        Style::default().fg(app.config.colors.active_border)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(" Folders ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if let Some(message) = &detail.error {
        let paragraph = Paragraph::new(format!("Failed to load items: {}", message))
            .block(block)
            .style(Style::default().fg(app.config.colors.error))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    if detail.items.is_none() {
        let paragraph = Paragraph::new("Loading label items…")
            .block(block)
            .style(Style::default().fg(ratatui::style::Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible = detail.tree_state.visible_nodes(&detail.tree);
    let items: Vec<ListItem> = visible
        .iter()
        .map(|(node, depth)| ListItem::new(tree_row(app, detail, node, *depth)))
        .collect();

    let list = List::new(items).block(block).highlight_symbol("");

    let mut list_state = ListState::default();
    list_state.select(detail.tree_state.selected_index(&detail.tree));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn tree_row<'a>(app: &App, detail: &DetailState, node: &'a TreeNode, depth: usize) -> Line<'a> {
    let indent = " ".repeat(depth * 2);
    let display = if node.is_folder {
        let expand_char = if detail.tree_state.is_expanded(&node.path) {
            "▼"
        } else {
            "▶"
        };
        format!("{}{} {}", indent, expand_char, node.name)
    } else {
        format!("{}  {}", indent, node.name)
    };

    let is_selected = node.path == detail.tree_state.selected;
    let style = if is_selected {
        Style::default()
            .fg(app.config.colors.selected_fg)
            .bg(app.config.colors.selected_bg)
            .add_modifier(Modifier::BOLD)
    } else if node.is_folder {
        Style::default()
            .fg(app.config.colors.folder)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.config.colors.file)
    };

    Line::from(vec![Span::styled(display, style)])
}

fn draw_contents_pane(frame: &mut Frame, app: &App, detail: &DetailState, area: Rect) {
    let is_active = detail.focus == PanelFocus::Contents;
    let border_style = if is_active {
        Style::default().fg(app.config.colors.active_border)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(format!(" Contents: {} ", detail.tree_state.browse_folder()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if detail.items.is_none() {
        let message = if detail.error.is_some() {
            "Item listing failed"
        } else {
            "Loading…"
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(ratatui::style::Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    let contents = detail.contents();
    if contents.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(ratatui::style::Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = contents.iter().map(|item| contents_row(app, item)).collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(app.config.colors.selected_bg)
                .fg(app.config.colors.selected_fg),
        )
        .highlight_symbol(">> ");

    let mut list_state = detail.contents_state.clone();
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn contents_row(app: &App, item: &ItemRef) -> ListItem<'static> {
    let name = item
        .path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(&item.path)
        .to_string();

    let line = if item.is_folder {
        Line::from(Span::styled(
            format!("{}/", name),
            Style::default()
                .fg(app.config.colors.folder)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(name, Style::default().fg(app.config.colors.file)))
    };

    ListItem::new(line)
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = if app.is_loading {
        format!("Loading… | {}", app.status_message)
    } else if !app.labels.loaded_all && app.load_error.is_none() {
        format!("{} labels loaded… | {}", app.labels.loaded_count, app.status_message)
    } else {
        app.status_message.clone()
    };

    let help_text = if app.filter_active {
        "Type to filter | Backspace: Delete | Enter/Esc: Done"
    } else if app.detail.is_some() {
        "Tab: Switch pane | ↑↓: Navigate | →←: Expand/Collapse | Esc: Back | q: Quit"
    } else {
        "↑↓: Navigate | Enter: Open | /: Filter | o: Owner | s/d: Sort | R: Refresh | q: Quit"
    };

    let status_line = Line::from(vec![
        Span::styled(status_text, Style::default().fg(app.config.colors.status_bar_fg)),
        Span::raw(" | "),
        Span::styled(help_text, Style::default().fg(ratatui::style::Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(app.config.colors.status_bar_bg));

    frame.render_widget(paragraph, area);
}
