mod app;
mod client;
mod ingest;
mod layout;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use glossa_config::Config;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::File,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    sync::Arc,
    time::Duration,
};

use app::{App, Source};
use client::CompletionClient;

#[derive(Debug, Parser)]
#[command(name = "glossa", version, about = "Read a generated text token by token")]
struct Args {
    /// Topic of the text to generate; asked for interactively when omitted
    topic: Option<String>,

    /// Stream a recorded response from FILE instead of calling the model
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Bytes per read when replaying
    #[arg(long, default_value_t = 24)]
    chunk_size: usize,

    /// Pause before each replayed read, in milliseconds
    #[arg(long, default_value_t = 40)]
    delay_ms: u64,

    /// Write the response of each completed generation to FILE
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Model name, overriding the config file
    #[arg(long)]
    model: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file; defaults to glossa.log in the temp directory
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone())?;
    log::info!("glossa starting up");

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    log::info!("Config path: {}", config_path.display());

    let mut config = match Config::load_from_path(&config_path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::info!("No config file found, using defaults");
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if let Some(model) = args.model {
        config.model = model;
    }

    let replaying = args.replay.is_some();
    let source = match args.replay {
        Some(path) => Source::Replay {
            path,
            chunk_size: args.chunk_size,
            delay: Duration::from_millis(args.delay_ms),
        },
        None => {
            let api_key = match config.api_key() {
                Ok(key) => key,
                Err(e) => {
                    eprintln!("Error: {e}");
                    eprintln!("Or replay a recorded response with --replay <FILE>");
                    process::exit(1);
                }
            };
            Source::Api(Arc::new(CompletionClient::new(&config, api_key)?))
        }
    };

    let mut app = App::new(source, args.record);
    match args.topic.filter(|topic| !topic.trim().is_empty()) {
        Some(topic) => app.start_generation(topic.trim().to_string())?,
        None if replaying => app.start_generation("replay".to_string())?,
        None => {}
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file.
    let path = log_file.unwrap_or_else(|| std::env::temp_dir().join("glossa.log"));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.drain_events();
        terminal.draw(|f| ui::ui(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll so that streamed progress shows up without input.
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key)?,
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }
    }
}
