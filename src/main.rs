use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::PathBuf, sync::Arc};
use todoboard::{
    config::Config, logging, notifier::ToastQueue,
    ui::{install_panic_hook, run_app}, HttpGateway, TodoBoard,
};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "todoboard", version, about = "Terminal client for a todo API")]
struct Cli {
    /// Base URL of the todo API
    #[arg(long, env = "TODOBOARD_API_URL")]
    api_url: Option<String>,

    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file;
    }

    logging::init(&config.log_path()?)?;
    info!("Starting todoboard against {}", config.api_url);

    // Gateway calls run on the runtime's workers; the UI loop stays on this thread.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let _guard = runtime.enter();

    let gateway = Arc::new(HttpGateway::with_timeout(
        config.api_url.clone(),
        config.timeout(),
    )?);
    let toasts = Arc::new(ToastQueue::default());
    let mut board = TodoBoard::new(gateway, toasts.clone());

    install_panic_hook();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut board, &toasts, config.tick());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("UI error: {}", err);
        eprintln!("{:?}", err);
    }
    info!("todoboard exited");
    Ok(())
}
