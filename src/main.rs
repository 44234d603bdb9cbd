use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use tfvc_labels::app::App;
use tfvc_labels::async_task::{self, Task, TaskResult};
use tfvc_labels::cli::{Cli, Commands};
use tfvc_labels::config::PagingConfig;
use tfvc_labels::error::Result;
use tfvc_labels::source::{self, InMemoryLabelSource, LabelSource};
use tfvc_labels::{event, main_lib, screenshot, ui};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger only if TFVC_LABELS_LOG environment variable is set;
    // the TUI owns the terminal, so logs go to a file.
    if let Ok(log_file) = std::env::var("TFVC_LABELS_LOG") {
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_file)?,
            )))
            .filter_level(log::LevelFilter::Debug)
            .init();

        log::info!("tfvc-labels starting up");
    }

    let cli = Cli::parse();

    match cli.command {
        None => run_interactive(None, "Fabrikam", 150).await,
        Some(Commands::Run {
            data,
            project,
            latency_ms,
        }) => run_interactive(data.as_deref(), &project, latency_ms).await,
        Some(Commands::Screenshot {
            config,
            output,
            width,
            height,
        }) => screenshot::generate_screenshot(&config, output.as_deref(), width, height),
        Some(Commands::Execute {
            config,
            command,
            output,
            screenshot,
            width,
            height,
        }) => main_lib::execute_command(
            &config,
            &command,
            output.as_deref(),
            screenshot,
            width,
            height,
        ),
        Some(Commands::SaveState {
            data,
            project,
            output,
        }) => {
            let source = build_source(data.as_deref(), 0)?;
            main_lib::save_current_state(
                source.as_ref(),
                PagingConfig::default(),
                &project,
                output.as_deref(),
            )
            .await
        }
    }
}

fn build_source(data: Option<&str>, latency_ms: u64) -> Result<Arc<dyn LabelSource>> {
    let source = match data {
        Some(path) => InMemoryLabelSource::from_json_file(path)?,
        None => source::demo_source(),
    };
    let source = if latency_ms > 0 {
        source.with_latency(Duration::from_millis(latency_ms))
    } else {
        source
    };
    Ok(Arc::new(source))
}

async fn run_interactive(data: Option<&str>, project: &str, latency_ms: u64) -> Result<()> {
    let source = build_source(data, latency_ms)?;

    // Initialize application state
    let mut app = App::new(project);
    let paging = app.config.paging;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup async task channels
    let (task_sender, task_receiver) = mpsc::channel::<Task>(32);
    let (result_sender, mut result_receiver) = mpsc::channel::<TaskResult>(32);

    // Start background worker
    let worker_handle = tokio::spawn(async_task::run_worker(
        task_receiver,
        result_sender,
        source,
        paging,
    ));

    // Kick off the first fetch session
    let initial = app.begin_session();
    log::info!("queueing initial label load");
    if let Err(e) = task_sender.send(initial).await {
        log::error!("failed to queue initial load: {}", e);
        app.load_error = Some(format!("Failed to queue initial load: {}", e));
    }

    // Main application loop
    let tick_rate = Duration::from_millis(250);
    loop {
        // Draw UI
        terminal.draw(|f| ui::draw(f, &app))?;

        // Handle events with timeout
        if crossterm::event::poll(tick_rate)? {
            let terminal_event = crossterm::event::read()?;
            for task in event::handle_event(terminal_event, &mut app) {
                if let Err(e) = task_sender.try_send(task) {
                    log::error!("failed to queue task: {}", e);
                    app.status_message = format!("Failed to queue request: {}", e);
                }
            }
        }

        // Handle async task results
        while let Ok(result) = result_receiver.try_recv() {
            if let Some(follow_up) = main_lib::handle_task_result(&mut app, result) {
                if let Err(e) = task_sender.try_send(follow_up) {
                    log::error!("failed to queue follow-up task: {}", e);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Cleanup
    worker_handle.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
