use ratatui::style::Color;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub colors: ColorConfig,
    pub layout: LayoutConfig,
    pub paging: PagingConfig,
    pub keybindings: KeybindingConfig,
}

#[derive(Debug, Clone)]
pub struct ColorConfig {
    pub active_border: Color,
    pub inactive_border: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub label_name: Color,
    pub label_id: Color,
    pub owner: Color,
    pub date: Color,
    pub folder: Color,
    pub file: Color,
    pub error: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub tree_panel_width: u16,
    pub show_descriptions: bool,
}

/// Page sizes for the two-phase label load and the per-label item
/// fetch: a small fast first page, larger batches for the background
/// sweep.
#[derive(Debug, Clone, Copy)]
pub struct PagingConfig {
    pub first_page: usize,
    pub labels_batch: usize,
    pub items_batch: usize,
}

#[derive(Debug, Clone)]
pub struct KeybindingConfig {
    pub quit: char,
    pub filter: char,
    pub owner_filter: char,
    pub sort_key: char,
    pub sort_direction: char,
    pub refresh: char,
    pub back: char,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active_border: Color::Yellow,
            inactive_border: Color::White,
            selected_bg: Color::White,
            selected_fg: Color::Black,
            label_name: Color::Reset,
            label_id: Color::Yellow,
            owner: Color::Green,
            date: Color::Blue,
            folder: Color::Blue,
            file: Color::Reset,
            error: Color::Red,
            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tree_panel_width: 40,
            show_descriptions: true,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            first_page: 100,
            labels_batch: 500,
            items_batch: 200,
        }
    }
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: 'q',
            filter: '/',
            owner_filter: 'o',
            sort_key: 's',
            sort_direction: 'd',
            refresh: 'R',
            back: 'b',
        }
    }
}
