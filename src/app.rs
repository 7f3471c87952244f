// App module - Main application state and key handling
// Owns the login gate, the active session and everything the screens need:
// - Current screen and input mode
// - Task form contents
// - Confirmation panels
// - Status bar message

use crate::error::TaskError;
use crate::event;
use crate::models::{TaskDraft, task::format_due_date};
use crate::session::{self, Session};
use crate::storage::FileStorage;
use crate::store::Completion;
use chrono::{Datelike, Local, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Login,
    Normal,
    EditingName,
    EditingPriority,
    EditingDate,
    EditingCategory,
    DeletePanel,
    LogoutPanel,
}

impl InputMode {
    fn next_field(&self) -> Self {
        match self {
            InputMode::EditingName => InputMode::EditingPriority,
            InputMode::EditingPriority => InputMode::EditingDate,
            InputMode::EditingDate => InputMode::EditingCategory,
            InputMode::EditingCategory => InputMode::EditingName,
            other => *other,
        }
    }

    fn previous_field(&self) -> Self {
        match self {
            InputMode::EditingName => InputMode::EditingCategory,
            InputMode::EditingPriority => InputMode::EditingName,
            InputMode::EditingDate => InputMode::EditingPriority,
            InputMode::EditingCategory => InputMode::EditingDate,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    List,
    Calendar,
    Task,
}

impl Panel {
    pub fn next(&self) -> Self {
        match self {
            Panel::List => Panel::Calendar,
            Panel::Calendar => Panel::Task,
            Panel::Task => Panel::List,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tab {
    Tasks,
    Stats,
}

impl Tab {
    pub fn next(&self) -> Self {
        match self {
            Tab::Tasks => Tab::Stats,
            Tab::Stats => Tab::Tasks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub current_date: NaiveDate,
    pub session: Option<Session>,
    pub login_input: String,
    pub login_error: Option<String>,
    pub show_task_form: bool,
    pub editing_existing: bool,
    pub draft: TaskDraft,
    pub form_error: Option<String>,
    pub show_delete_panel: bool,
    pub delete_panel_yes_selected: bool,
    pub show_logout_panel: bool,
    pub logout_panel_yes_selected: bool,
    pub input_mode: InputMode,
    pub focused_panel: Panel,
    pub selected_tab: Tab,
    pub selected_calendar_date: Option<NaiveDate>,
    pub status: StatusMessage,
    storage: FileStorage,
}

impl App {
    pub fn new(storage: FileStorage, initial_user: Option<String>) -> Self {
        Self {
            should_quit: false,
            current_date: Local::now().date_naive(),
            session: None,
            login_input: initial_user.unwrap_or_default(),
            login_error: None,
            show_task_form: false,
            editing_existing: false,
            draft: TaskDraft::default(),
            form_error: None,
            show_delete_panel: false,
            delete_panel_yes_selected: true,
            show_logout_panel: false,
            logout_panel_yes_selected: true,
            input_mode: InputMode::Login,
            focused_panel: Panel::List,
            selected_tab: Tab::Tasks,
            selected_calendar_date: None,
            status: StatusMessage::new(MessageKind::Info, "Ready"),
            storage,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        loop {
            terminal.draw(|frame| crate::ui::render(frame, self))?;

            if let Some(key) = event::next_key(Duration::from_millis(100))? {
                self.handle_key_event(key);
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn set_status(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.status = StatusMessage::new(kind, text);
    }

    fn report(&mut self, err: &TaskError) {
        if err.is_persistence() {
            warn!("{err}");
        }
        self.set_status(MessageKind::Error, err.to_string());
    }

    // Login gate

    pub fn submit_login(&mut self) {
        match session::login(self.storage.clone(), &self.login_input) {
            Ok(session) => {
                match session.load_warning() {
                    Some(warning) => self.set_status(MessageKind::Error, warning.to_string()),
                    None => self.set_status(
                        MessageKind::Info,
                        format!("Welcome, {}!", session.username()),
                    ),
                }
                self.session = Some(session);
                self.login_error = None;
                self.input_mode = InputMode::Normal;
                self.focused_panel = Panel::List;
                self.selected_tab = Tab::Tasks;
            }
            Err(err) => {
                self.login_error = Some(err.to_string());
            }
        }
    }

    pub fn open_logout_panel(&mut self) {
        self.show_logout_panel = true;
        self.logout_panel_yes_selected = true;
        self.input_mode = InputMode::LogoutPanel;
    }

    pub fn close_logout_panel(&mut self) {
        self.show_logout_panel = false;
        self.input_mode = InputMode::Normal;
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("logged out {}", session.username());
        }
        self.show_logout_panel = false;
        self.login_input.clear();
        self.login_error = None;
        self.input_mode = InputMode::Login;
        self.set_status(MessageKind::Info, "Ready");
    }

    // Navigation

    pub fn next_panel(&mut self) {
        self.focused_panel = self.focused_panel.next();

        if self.focused_panel == Panel::Calendar && self.selected_calendar_date.is_none() {
            self.selected_calendar_date = Some(Local::now().date_naive());
        }
    }

    pub fn next_tab(&mut self) {
        self.selected_tab = self.selected_tab.next();
    }

    fn select(&mut self, index: Option<usize>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.select(index).is_ok()
            && let Some(task) = session.selected_task()
        {
            let text = format!("Selected: {}", task.name);
            self.set_status(MessageKind::Info, text);
        }
    }

    pub fn select_previous_task(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.store().is_empty() {
            return;
        }
        let len = session.store().len();
        let index = match session.selected() {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        };
        self.select(Some(index));
    }

    pub fn select_next_task(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.store().is_empty() {
            return;
        }
        let len = session.store().len();
        let index = match session.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.select(Some(index));
    }

    pub fn clear_selection(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear_selection();
        }
        self.set_status(MessageKind::Info, "Form cleared");
    }

    fn shift_calendar_selection(&mut self, days: i64) {
        match self.selected_calendar_date {
            Some(date) => {
                self.selected_calendar_date = Some(date + chrono::Duration::days(days));
                self.update_calendar_view();
            }
            None => self.selected_calendar_date = Some(Local::now().date_naive()),
        }
    }

    /// Keeps the selected day inside the three visible months.
    fn update_calendar_view(&mut self) {
        let Some(selected) = self.selected_calendar_date else {
            return;
        };
        let first_of_month = self.current_date.with_day(1).unwrap_or(self.current_date);
        let first_visible = first_of_month - Months::new(1);
        let after_visible = first_of_month + Months::new(2);

        if selected < first_visible {
            self.current_date = first_of_month - Months::new(1);
        } else if selected >= after_visible {
            self.current_date = first_of_month + Months::new(1);
        }
    }

    pub fn reset_calendar_to_today(&mut self) {
        let today = Local::now().date_naive();
        self.current_date = today;
        self.selected_calendar_date = Some(today);
    }

    // Task form

    pub fn open_new_task_form(&mut self, due_date: Option<NaiveDate>) {
        if self.session.is_none() {
            return;
        }
        self.show_task_form = true;
        self.editing_existing = false;
        self.draft = TaskDraft {
            due_date: format_due_date(due_date),
            ..TaskDraft::default()
        };
        self.form_error = None;
        self.input_mode = InputMode::EditingName;
    }

    pub fn open_edit_task_form(&mut self) {
        let Some(task) = self.session.as_ref().and_then(|s| s.selected_task()) else {
            self.report(&TaskError::NoSelection);
            return;
        };
        self.draft = TaskDraft::from_task(task);
        self.show_task_form = true;
        self.editing_existing = true;
        self.form_error = None;
        self.input_mode = InputMode::EditingName;
    }

    pub fn close_task_form(&mut self) {
        self.show_task_form = false;
        self.editing_existing = false;
        self.draft = TaskDraft::default();
        self.form_error = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn save_task(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let result = if self.editing_existing {
            session.update(&self.draft).map(|_| "updated")
        } else {
            session.add(&self.draft).map(|_| "added")
        };

        match result {
            Ok(verb) => {
                let text = format!("Task '{}' {verb} successfully", self.draft.name.trim());
                self.close_task_form();
                self.set_status(MessageKind::Success, text);
            }
            Err(TaskError::Validation(err)) => {
                // Keep the form open so the input can be fixed
                self.form_error = Some(err.to_string());
            }
            Err(err) => {
                self.close_task_form();
                self.report(&err);
            }
        }
    }

    // Completion

    pub fn mark_task_completed(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.mark_completed() {
            Ok(Completion::Marked) => {
                let name = session
                    .selected_task()
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                self.set_status(MessageKind::Success, format!("Task '{name}' marked as completed"));
            }
            Ok(Completion::AlreadyCompleted) => {
                self.set_status(MessageKind::Info, "This task is already completed");
            }
            Err(err) => self.report(&err),
        }
    }

    // Deletion

    pub fn open_delete_panel(&mut self) {
        if self.session.as_ref().and_then(|s| s.selected_task()).is_none() {
            self.report(&TaskError::NoSelection);
            return;
        }
        self.show_delete_panel = true;
        self.delete_panel_yes_selected = true;
        self.input_mode = InputMode::DeletePanel;
    }

    pub fn close_delete_panel(&mut self) {
        self.show_delete_panel = false;
        self.delete_panel_yes_selected = true;
        self.input_mode = InputMode::Normal;
    }

    pub fn confirm_delete(&mut self) {
        let confirmed = self.delete_panel_yes_selected;
        self.close_delete_panel();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.delete(|_| confirmed) {
            Ok(Some(task)) => {
                self.set_status(MessageKind::Success, format!("Task '{}' deleted successfully", task.name));
            }
            Ok(None) => self.set_status(MessageKind::Info, "Delete cancelled"),
            Err(err) => self.report(&err),
        }
    }

    // Key handling

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Login => match key.code {
                KeyCode::Char(c) => {
                    self.login_input.push(c);
                    self.login_error = None;
                }
                KeyCode::Backspace => {
                    self.login_input.pop();
                }
                KeyCode::Enter => self.submit_login(),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::EditingName => match key.code {
                KeyCode::Char(c) => self.draft.name.push(c),
                KeyCode::Backspace => {
                    self.draft.name.pop();
                }
                _ => self.handle_form_key(key),
            },
            InputMode::EditingDate => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => self.draft.due_date.push(c),
                KeyCode::Backspace => {
                    self.draft.due_date.pop();
                }
                _ => self.handle_form_key(key),
            },
            InputMode::EditingPriority => match key.code {
                KeyCode::Left => self.draft.priority = self.draft.priority.previous(),
                KeyCode::Right => self.draft.priority = self.draft.priority.next(),
                _ => self.handle_form_key(key),
            },
            InputMode::EditingCategory => match key.code {
                KeyCode::Left => self.draft.category = self.draft.category.previous(),
                KeyCode::Right => self.draft.category = self.draft.category.next(),
                _ => self.handle_form_key(key),
            },
            InputMode::DeletePanel => match key.code {
                KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                    self.delete_panel_yes_selected = !self.delete_panel_yes_selected;
                }
                KeyCode::Enter => self.confirm_delete(),
                KeyCode::Esc => self.close_delete_panel(),
                _ => {}
            },
            InputMode::LogoutPanel => match key.code {
                KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                    self.logout_panel_yes_selected = !self.logout_panel_yes_selected;
                }
                KeyCode::Enter => {
                    if self.logout_panel_yes_selected {
                        self.logout();
                    } else {
                        self.close_logout_panel();
                    }
                }
                KeyCode::Esc => self.close_logout_panel(),
                _ => {}
            },
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.input_mode = self.input_mode.next_field(),
            KeyCode::BackTab => self.input_mode = self.input_mode.previous_field(),
            KeyCode::Enter => self.save_task(),
            KeyCode::Esc => self.close_task_form(),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('+') => self.open_new_task_form(None),
            KeyCode::Char('L') => self.open_logout_panel(),
            KeyCode::Tab => self.next_panel(),
            KeyCode::Esc => self.clear_selection(),
            KeyCode::Left | KeyCode::Right if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.next_tab();
            }
            KeyCode::Left if self.focused_panel == Panel::Calendar => self.shift_calendar_selection(-1),
            KeyCode::Right if self.focused_panel == Panel::Calendar => self.shift_calendar_selection(1),
            KeyCode::Up => match self.focused_panel {
                Panel::List => self.select_previous_task(),
                Panel::Calendar => self.shift_calendar_selection(-7),
                Panel::Task => {}
            },
            KeyCode::Down => match self.focused_panel {
                Panel::List => self.select_next_task(),
                Panel::Calendar => self.shift_calendar_selection(7),
                Panel::Task => {}
            },
            KeyCode::Enter => match self.focused_panel {
                Panel::Calendar => self.open_new_task_form(self.selected_calendar_date),
                _ => self.open_edit_task_form(),
            },
            KeyCode::Char('c') => self.mark_task_completed(),
            KeyCode::Char('-') => self.open_delete_panel(),
            KeyCode::Char('t') if self.focused_panel == Panel::Calendar => {
                self.reset_calendar_to_today();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, Status};
    use crossterm::event::KeyEventKind;
    use tempfile::{TempDir, tempdir};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    fn logged_in(dir: &TempDir) -> App {
        let mut app = App::new(FileStorage::new(dir.path().to_path_buf()), Some("alice".to_string()));
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        app
    }

    fn add_task(app: &mut App, name: &str) {
        app.handle_key_event(key(KeyCode::Char('+')));
        type_text(app, name);
        app.handle_key_event(key(KeyCode::Enter));
    }

    fn session(app: &App) -> &Session {
        app.session.as_ref().unwrap()
    }

    #[test]
    fn login_rejects_invalid_names_inline() {
        let dir = tempdir().unwrap();
        let mut app = App::new(FileStorage::new(dir.path().to_path_buf()), None);
        type_text(&mut app, "al ice");
        app.handle_key_event(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Login);
        assert!(app.session.is_none());
        assert_eq!(
            app.login_error.as_deref(),
            Some("Username must contain only letters and numbers")
        );
    }

    #[test]
    fn form_fields_build_and_save_a_task() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);

        app.handle_key_event(key(KeyCode::Char('+')));
        type_text(&mut app, "Essay");
        app.handle_key_event(key(KeyCode::Tab));
        app.handle_key_event(key(KeyCode::Right));
        app.handle_key_event(key(KeyCode::Tab));
        type_text(&mut app, "2024-x02-29");
        app.handle_key_event(key(KeyCode::Tab));
        app.handle_key_event(key(KeyCode::Right));
        app.handle_key_event(key(KeyCode::Enter));

        assert!(!app.show_task_form);
        assert_eq!(app.status.kind, MessageKind::Success);
        let task = &session(&app).list()[0];
        assert_eq!(task.name, "Essay");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(format_due_date(task.due_date), "2024-02-29");
        assert_eq!(task.category, Category::Study);
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        app.handle_key_event(key(KeyCode::Char('+')));
        app.handle_key_event(key(KeyCode::Enter));

        assert!(app.show_task_form);
        assert_eq!(app.form_error.as_deref(), Some("Task name is required"));
        assert!(session(&app).list().is_empty());
    }

    #[test]
    fn actions_without_selection_report_error() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        add_task(&mut app, "a");

        app.handle_key_event(key(KeyCode::Char('c')));
        assert_eq!(app.status.kind, MessageKind::Error);
        app.handle_key_event(key(KeyCode::Char('-')));
        assert!(!app.show_delete_panel);
        assert_eq!(session(&app).list()[0].status, Status::Pending);
    }

    #[test]
    fn complete_then_complete_again_is_informational() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        add_task(&mut app, "a");
        app.handle_key_event(key(KeyCode::Down));
        assert_eq!(app.status.text, "Selected: a");

        app.handle_key_event(key(KeyCode::Char('c')));
        assert_eq!(app.status.kind, MessageKind::Success);
        app.handle_key_event(key(KeyCode::Char('c')));
        assert_eq!(app.status.kind, MessageKind::Info);
        assert_eq!(app.status.text, "This task is already completed");
    }

    #[test]
    fn c_key_completes_and_d_does_nothing() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        add_task(&mut app, "a");
        app.handle_key_event(key(KeyCode::Down));

        app.handle_key_event(key(KeyCode::Char('d')));
        assert_eq!(session(&app).list()[0].status, Status::Pending);
        app.handle_key_event(key(KeyCode::Char('c')));
        assert_eq!(session(&app).list()[0].status, Status::Completed);
    }

    #[test]
    fn edit_prefills_form_and_updates_in_place() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        add_task(&mut app, "a");
        add_task(&mut app, "b");
        app.handle_key_event(key(KeyCode::Up));
        assert_eq!(session(&app).selected(), Some(1));

        app.handle_key_event(key(KeyCode::Enter));
        assert!(app.editing_existing);
        assert_eq!(app.draft.name, "b");
        type_text(&mut app, "2");
        app.handle_key_event(key(KeyCode::Enter));

        let names: Vec<_> = session(&app).list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["a", "b2"]);
    }

    #[test]
    fn delete_panel_no_keeps_task_and_yes_removes_it() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        add_task(&mut app, "a");
        app.handle_key_event(key(KeyCode::Down));

        app.handle_key_event(key(KeyCode::Char('-')));
        assert!(app.show_delete_panel);
        app.handle_key_event(key(KeyCode::Right));
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(session(&app).list().len(), 1);
        assert_eq!(app.status.text, "Delete cancelled");

        app.handle_key_event(key(KeyCode::Char('-')));
        app.handle_key_event(key(KeyCode::Enter));
        assert!(session(&app).list().is_empty());
        assert_eq!(session(&app).selected(), None);
    }

    #[test]
    fn logout_returns_to_login_and_other_user_starts_empty() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        add_task(&mut app, "mine");

        app.handle_key_event(key(KeyCode::Char('L')));
        app.handle_key_event(key(KeyCode::Enter));
        assert!(app.session.is_none());
        assert_eq!(app.input_mode, InputMode::Login);

        type_text(&mut app, "bob");
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(session(&app).username(), "bob");
        assert!(session(&app).list().is_empty());
    }

    #[test]
    fn calendar_enter_prefills_due_date() {
        let dir = tempdir().unwrap();
        let mut app = logged_in(&dir);
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.focused_panel, Panel::Calendar);
        let selected = app.selected_calendar_date.unwrap();

        app.handle_key_event(KeyEvent {
            kind: KeyEventKind::Press,
            ..key(KeyCode::Enter)
        });
        assert!(app.show_task_form);
        assert_eq!(app.draft.due_date, format_due_date(Some(selected)));
    }
}
