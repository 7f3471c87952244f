// Session - Login gate and the per-user task operations the UI drives

use crate::error::{TaskError, ValidationError};
use crate::models::{Task, TaskDraft};
use crate::storage::FileStorage;
use crate::store::{Completion, TaskCounts, TaskStore};
use chrono::NaiveDate;
use log::{error, info};

/// Trims the username and checks it is non-empty and alphanumeric.
pub fn validate_username(input: &str) -> Result<String, ValidationError> {
    let username = input.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if !username.chars().all(char::is_alphanumeric) {
        return Err(ValidationError::InvalidUsername);
    }
    Ok(username.to_string())
}

/// Opens a session for `username`, loading its task file.
///
/// There is no password: the username only decides which file is used.
pub fn login(storage: FileStorage, username: &str) -> Result<Session, ValidationError> {
    let username = validate_username(username)?;
    let outcome = storage.load(&username);
    info!("logged in as {username}");

    Ok(Session {
        username,
        storage,
        store: TaskStore::new(outcome.tasks),
        selected: None,
        load_warning: outcome.warning,
    })
}

/// One logged-in user's tasks plus the current selection.
///
/// Every mutation is written to disk before the call returns.
#[derive(Debug)]
pub struct Session {
    username: String,
    storage: FileStorage,
    store: TaskStore,
    selected: Option<usize>,
    load_warning: Option<String>,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn list(&self) -> &[Task] {
        self.store.list()
    }

    pub fn counts(&self) -> TaskCounts {
        self.store.counts()
    }

    pub fn overdue(&self, today: NaiveDate) -> usize {
        self.store.overdue(today)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|i| self.store.get(i))
    }

    pub fn select(&mut self, index: Option<usize>) -> Result<(), TaskError> {
        match index {
            Some(i) if i >= self.store.len() => Err(TaskError::NoSelection),
            _ => {
                self.selected = index;
                Ok(())
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Appends a new pending task and clears the selection. Returns its position.
    pub fn add(&mut self, draft: &TaskDraft) -> Result<usize, TaskError> {
        let fields = draft.validate()?;
        let index = self.store.add(fields);
        self.selected = None;
        self.flush()?;
        Ok(index)
    }

    pub fn update(&mut self, draft: &TaskDraft) -> Result<(), TaskError> {
        let index = self.selected.ok_or(TaskError::NoSelection)?;
        let fields = draft.validate()?;
        self.store.update(index, fields)?;
        self.flush()
    }

    /// Removes the selected task if `confirm` agrees.
    ///
    /// Returns `Ok(None)` when the caller declined.
    pub fn delete<F>(&mut self, confirm: F) -> Result<Option<Task>, TaskError>
    where
        F: FnOnce(&Task) -> bool,
    {
        let index = self.selected.ok_or(TaskError::NoSelection)?;
        let task = self.store.get(index).ok_or(TaskError::NoSelection)?;
        if !confirm(task) {
            return Ok(None);
        }

        let removed = self.store.remove(index)?;
        self.selected = None;
        self.flush()?;
        Ok(Some(removed))
    }

    pub fn mark_completed(&mut self) -> Result<Completion, TaskError> {
        let index = self.selected.ok_or(TaskError::NoSelection)?;
        let completion = self.store.mark_completed(index)?;
        if completion == Completion::Marked {
            self.flush()?;
        }
        Ok(completion)
    }

    fn flush(&self) -> Result<(), TaskError> {
        self.storage
            .save(&self.username, self.store.list())
            .map_err(|err| {
                error!("saving tasks for {} failed: {err}", self.username);
                TaskError::from(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, Status};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn open(dir: &TempDir, user: &str) -> Session {
        login(FileStorage::new(dir.path().to_path_buf()), user).unwrap()
    }

    fn draft(name: &str) -> TaskDraft {
        TaskDraft::new(name, Priority::Low, "", Category::Personal)
    }

    #[test]
    fn login_accepts_alphanumeric_usernames() {
        assert_eq!(validate_username("alice1"), Ok("alice1".to_string()));
        assert_eq!(validate_username("  alice1  "), Ok("alice1".to_string()));
    }

    #[test]
    fn login_rejects_empty_and_symbols() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());
        assert_eq!(login(storage.clone(), "").unwrap_err(), ValidationError::EmptyUsername);
        assert_eq!(login(storage.clone(), "   ").unwrap_err(), ValidationError::EmptyUsername);
        assert_eq!(login(storage.clone(), "al ice").unwrap_err(), ValidationError::InvalidUsername);
        assert_eq!(login(storage, "alice!").unwrap_err(), ValidationError::InvalidUsername);
    }

    #[test]
    fn added_task_survives_restart_as_pending() {
        let dir = tempdir().unwrap();
        let mut session = open(&dir, "alice");
        let input = TaskDraft::new("Dentist", Priority::High, "2024-02-29", Category::Health);
        session.add(&input).unwrap();
        drop(session);

        let session = open(&dir, "alice");
        let expected = Task::new(input.validate().unwrap());
        assert_eq!(session.list(), [expected]);
        assert_eq!(session.list()[0].status, Status::Pending);
    }

    #[test]
    fn users_have_separate_files() {
        let dir = tempdir().unwrap();
        let mut alice = open(&dir, "alice");
        alice.add(&draft("hers")).unwrap();

        let bob = open(&dir, "bob");
        assert!(bob.list().is_empty());
        assert!(dir.path().join("alice_tasks.json").exists());
        assert!(!dir.path().join("bob_tasks.json").exists());
    }

    #[test]
    fn invalid_draft_changes_nothing() {
        let dir = tempdir().unwrap();
        let mut session = open(&dir, "alice");
        let err = session.add(&draft("  ")).unwrap_err();
        assert!(matches!(err, TaskError::Validation(ValidationError::EmptyName)));
        assert!(session.list().is_empty());
        assert!(!dir.path().join("alice_tasks.json").exists());
    }

    #[test]
    fn operations_without_selection_fail_and_leave_file_alone() {
        let dir = tempdir().unwrap();
        let mut session = open(&dir, "alice");
        session.add(&draft("a")).unwrap();
        let path = dir.path().join("alice_tasks.json");
        let before = fs::read_to_string(&path).unwrap();

        assert!(matches!(session.update(&draft("b")), Err(TaskError::NoSelection)));
        assert!(matches!(session.delete(|_| true), Err(TaskError::NoSelection)));
        assert!(matches!(session.mark_completed(), Err(TaskError::NoSelection)));
        assert!(matches!(session.select(Some(5)), Err(TaskError::NoSelection)));

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn update_replaces_editable_fields_and_persists() {
        let dir = tempdir().unwrap();
        let mut session = open(&dir, "alice");
        session.add(&draft("a")).unwrap();
        session.add(&draft("b")).unwrap();
        session.select(Some(1)).unwrap();
        session.mark_completed().unwrap();

        let edit = TaskDraft::new("b edited", Priority::High, "2025-01-01", Category::Study);
        session.update(&edit).unwrap();
        assert_eq!(session.selected(), Some(1));

        let reloaded = open(&dir, "alice");
        let task = &reloaded.list()[1];
        assert_eq!(task.name, "b edited");
        assert_eq!(task.category, Category::Study);
        assert_eq!(task.status, Status::Completed);
        assert_eq!(reloaded.list()[0].name, "a");
    }

    #[test]
    fn delete_respects_confirmation_and_clears_selection() {
        let dir = tempdir().unwrap();
        let mut session = open(&dir, "alice");
        for name in ["a", "b", "c"] {
            session.add(&draft(name)).unwrap();
        }
        session.select(Some(1)).unwrap();

        let mut asked = None;
        let declined = session
            .delete(|task| {
                asked = Some(task.name.clone());
                false
            })
            .unwrap();
        assert!(declined.is_none());
        assert_eq!(asked.as_deref(), Some("b"));
        assert_eq!(session.list().len(), 3);
        assert_eq!(session.selected(), Some(1));

        let removed = session.delete(|_| true).unwrap().unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(session.selected(), None);

        let reloaded = open(&dir, "alice");
        let names: Vec<_> = reloaded.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn mark_completed_twice_reports_already_completed() {
        let dir = tempdir().unwrap();
        let mut session = open(&dir, "alice");
        session.add(&draft("a")).unwrap();
        session.select(Some(0)).unwrap();

        assert_eq!(session.mark_completed().unwrap(), Completion::Marked);
        assert_eq!(session.mark_completed().unwrap(), Completion::AlreadyCompleted);
        assert_eq!(
            session.counts(),
            TaskCounts {
                total: 1,
                pending: 0,
                completed: 1
            }
        );
    }

    #[test]
    fn corrupt_file_yields_empty_session_with_warning() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alice_tasks.json"), "{not json").unwrap();

        let session = open(&dir, "alice");
        assert!(session.list().is_empty());
        assert!(session.load_warning().is_some());
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "").unwrap();
        let mut session = login(FileStorage::new(blocker), "alice").unwrap();

        let err = session.add(&draft("a")).unwrap_err();
        assert!(err.is_persistence());
    }
}
