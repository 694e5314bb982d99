mod actions;
mod api;
mod app;
mod background;
mod config;
mod links;
mod messaging;
mod stations;
mod ui;

use anyhow::{Context, Result};
use app::PlayerController;
use clap::Parser;
use config::{Cli, Options};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use links::{Navigator, SystemNavigator};
use log::info;
use messaging::Messenger;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let options = Options::from_cli(&cli)?;

    // Set up panic handler to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let cancel = CancellationToken::new();
    let (messenger, worker) = background::spawn(api::SomaFMClient::new()?, cancel.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut controller = PlayerController::new(messenger, SystemNavigator, options);
    let res = run_app(&mut terminal, &mut controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    cancel.cancel();
    let _ = worker.await;
    info!("panel closed");

    res
}

/// Stderr shares the screen with the panel, so only errors go there by default.
fn default_filter(log_file: Option<&Path>) -> &'static str {
    if log_file.is_some() {
        "debug"
    } else {
        "error"
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or(default_filter(log_file));
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn run_app<M, N>(terminal: &mut Tui, controller: &mut PlayerController<M, N>) -> Result<()>
where
    M: Messenger + Clone + 'static,
    N: Navigator,
{
    // Draw the empty panel before the station list arrives.
    terminal.draw(|f| ui::render_ui(f, &controller.panel))?;
    controller.initialize().await;

    loop {
        controller.poll_deferred();

        terminal.draw(|f| ui::render_ui(f, &controller.panel))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if controller.handle_key_event(key.code).await {
                        break; // Quit was requested
                    }
                }
                Ok(_) => {} // Resize redraws on the next pass
                Err(_) => {}
            }
        }

        // Let the background player and detached lookups make progress.
        tokio::task::yield_now().await;
    }

    Ok(())
}
