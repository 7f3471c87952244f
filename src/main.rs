// todolist - A terminal to-do list with a username login gate
// Entry point for the application

mod app;
mod config;
mod error;
mod event;
mod models;
mod session;
mod storage;
mod store;
mod ui;

use clap::Parser;
use config::{Cli, Config};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::{self, OpenOptions};
use std::io;
use storage::FileStorage;

fn init_logging(config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    // Logs go to a file; stderr belongs to the terminal UI
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());
    init_logging(&config)?;
    info!("starting with data directory {}", config.data_dir.display());

    // Initialize the terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run the app
    let mut app = app::App::new(FileStorage::new(config.data_dir.clone()), config.initial_user.clone());
    let result = app.run(&mut terminal);

    // Cleanup and restore terminal on exit
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors that occurred during app execution
    if let Err(err) = result {
        log::error!("app exited with error: {err:?}");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
