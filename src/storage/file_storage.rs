// File storage - JSON-based persistence for one user's tasks

use crate::error::PersistenceError;
use crate::models::Task;
use chrono::Local;
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of reading a user's task file.
///
/// `warning` is set when the file existed but could not be used; the tasks are
/// then empty and the session starts fresh.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub tasks: Vec<Task>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path_for(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("{username}_tasks.json"))
    }

    pub fn load(&self, username: &str) -> LoadOutcome {
        let path = self.path_for(username);

        let problem = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Task>>(&bytes) {
                Ok(tasks) => {
                    info!("loaded {} tasks for {username}", tasks.len());
                    return LoadOutcome { tasks, warning: None };
                }
                Err(err) => err.to_string(),
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no task file at {}, starting empty", path.display());
                return LoadOutcome::default();
            }
            Err(err) => err.to_string(),
        };

        // Move the file out of the way so the next save cannot replace it
        warn!("task file {} is unreadable: {problem}", path.display());
        let warning = match self.set_aside(&path) {
            Ok(backup) => format!(
                "Task file was unreadable ({problem}); moved to {}",
                backup.display()
            ),
            Err(rename_err) => {
                error!("could not move {} aside: {rename_err}", path.display());
                format!("Task file was unreadable ({problem}) and could not be moved aside: {rename_err}")
            }
        };
        LoadOutcome {
            tasks: Vec::new(),
            warning: Some(warning),
        }
    }

    pub fn save(&self, username: &str, tasks: &[Task]) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| PersistenceError::CreateDir {
            path: self.data_dir.clone(),
            source,
        })?;

        let path = self.path_for(username);
        let json = serde_json::to_string_pretty(tasks).map_err(|source| PersistenceError::Encode {
            path: path.clone(),
            source,
        })?;

        // Write next to the target and rename over it so a crash never leaves half a file
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|source| PersistenceError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| PersistenceError::Rename {
            path: path.clone(),
            source,
        })?;

        debug!("saved {} tasks to {}", tasks.len(), path.display());
        Ok(())
    }

    fn set_aside(&self, path: &Path) -> io::Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let mut attempt = 0;
        let backup = loop {
            let suffix = match attempt {
                0 => format!(".corrupt-{stamp}"),
                n => format!(".corrupt-{stamp}-{n}"),
            };
            let mut candidate = path.as_os_str().to_owned();
            candidate.push(suffix);
            let candidate = PathBuf::from(candidate);
            // rename replaces an existing target, so never reuse a backup name
            if !candidate.exists() {
                break candidate;
            }
            attempt += 1;
        };
        fs::rename(path, &backup)?;
        Ok(backup)
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todolist")
    }
}
