// Config - Command line and environment settings

use crate::storage::FileStorage;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "todolist")]
#[command(about = "A terminal to-do list with per-user task files")]
pub struct Cli {
    /// Directory holding the `<username>_tasks.json` files
    #[arg(long, env = "TODOLIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Prefill the login field
    #[arg(long)]
    pub user: Option<String>,

    /// Where log output goes (defaults to `<data-dir>/todolist.log`)
    #[arg(long, env = "TODOLIST_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub initial_user: Option<String>,
    pub log_level: LevelFilter,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let data_dir = cli.data_dir.unwrap_or_else(FileStorage::default_data_dir);
        let log_file = cli
            .log_file
            .unwrap_or_else(|| data_dir.join("todolist.log"));

        Self {
            data_dir,
            log_file,
            initial_user: cli.user,
            log_level: if cli.debug { LevelFilter::Debug } else { LevelFilter::Info },
        }
    }
}
