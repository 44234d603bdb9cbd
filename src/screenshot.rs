use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::fs;

use crate::{app::App, error::Result, test_config::TestConfig, ui};

/// Render a state snapshot to plain text at the given dimensions.
pub fn render_config(config: &TestConfig, width: u16, height: u16) -> Result<String> {
    let app = App::from_test_config(config);

    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;

    terminal.draw(|frame| {
        ui::draw(frame, &app);
    })?;

    let buffer = terminal.backend().buffer().clone();
    Ok(buffer_to_string(&buffer))
}

pub fn generate_screenshot(
    config_path: &str,
    output_path: Option<&str>,
    width: u16,
    height: u16,
) -> Result<()> {
    let config = TestConfig::load_from_file(config_path)?;
    let screenshot = render_config(&config, width, height)?;

    match output_path {
        Some(path) => {
            fs::write(path, screenshot)?;
            println!("Screenshot saved to: {}", path);
        }
        None => {
            print!("{}", screenshot);
        }
    }

    Ok(())
}

pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();

    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            let cell = &buffer[(x, y)];
            let sym = cell.symbol();

            // Use a space for empty cells to make output more readable
            if sym.is_empty() {
                result.push(' ');
            } else {
                result.push_str(sym);
            }
        }
        result.push('\n');
    }

    result
}
