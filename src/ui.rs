// UI module - Rendering logic for the TUI
// Draws the login gate or the logged-in screens from App state; never mutates it.

use crate::app::{App, InputMode, MessageKind, Panel, Tab};
use crate::models::{Category, Priority, Task};
use crate::session::Session;
use chrono::{Datelike, Local, Months, NaiveDate};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
        calendar::{CalendarEventStore, Monthly},
    },
};
use time::{Date, Month};
use tui_big_text::{BigText, PixelSize};

/// Helper function to get border style based on whether a panel is focused
fn get_border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn render(frame: &mut Frame, app: &App) {
    let Some(session) = app.session.as_ref() else {
        render_login(frame, app);
        return;
    };

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content area
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_tabs(frame, app, session, main_layout[0]);

    match app.selected_tab {
        Tab::Tasks => render_tasks_tab(frame, app, session, main_layout[1]),
        Tab::Stats => render_stats_tab(frame, session, main_layout[1]),
    }

    render_status_bar(frame, app, session, main_layout[2]);
    render_footer(frame, main_layout[3]);

    if app.show_task_form {
        render_task_form(frame, app);
    }

    if app.show_delete_panel
        && let Some(task) = session.selected_task()
    {
        let body = vec![
            Line::from(Span::styled(format!("Delete '{}'?", task.name), bold())),
            Line::from(task.display_string()),
        ];
        render_confirm_panel(frame, "Confirm Delete", body, app.delete_panel_yes_selected);
    }

    if app.show_logout_panel {
        let body = vec![Line::from(Span::styled(
            format!("Log out {}?", session.username()),
            bold(),
        ))];
        render_confirm_panel(frame, "Logout", body, app.logout_panel_yes_selected);
    }
}

fn render_login(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("To-Do List Login")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Prompt
            Constraint::Length(3), // Input
            Constraint::Length(2), // Error
            Constraint::Min(0),
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

    frame.render_widget(Paragraph::new("Username:").style(bold()), chunks[0]);

    let input = Paragraph::new(app.login_input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(input, chunks[1]);

    if let Some(error) = &app.login_error {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(error, chunks[2]);
    }

    let instructions = Paragraph::new("Enter: Login | Esc: Quit")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[4]);

    let cursor_x = chunks[1].x + 1 + app.login_input.chars().count() as u16;
    if cursor_x < (chunks[1].x + chunks[1].width).saturating_sub(1) {
        frame.set_cursor_position((cursor_x, chunks[1].y + 1));
    }
}

fn render_tabs(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let selected_index = match app.selected_tab {
        Tab::Tasks => 0,
        Tab::Stats => 1,
    };

    let tabs = Tabs::new(vec!["Tasks", "Stats"])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Welcome, {}!", session.username())),
        )
        .select(selected_index)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

/// Completed tasks are green, pending high-priority red, other overdue tasks yellow.
fn task_style(task: &Task, today: NaiveDate) -> Style {
    if task.is_completed() {
        Style::default().fg(Color::Green)
    } else if task.priority == Priority::High {
        Style::default().fg(Color::Red)
    } else if task.is_overdue(today) {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_tasks_tab(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let main_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let right_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_columns[1]);

    let today = Local::now().date_naive();
    let task_items: Vec<ListItem> = session
        .list()
        .iter()
        .enumerate()
        .map(|(i, task)| {
            ListItem::new(format!("{}. {}", i + 1, task.display_string())).style(task_style(task, today))
        })
        .collect();

    let task_list = List::new(task_items)
        .block(
            Block::default()
                .title("Tasks")
                .borders(Borders::ALL)
                .border_style(get_border_style(app.focused_panel == Panel::List)),
        )
        .highlight_style(bold().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    let mut list_state = ListState::default();
    list_state.select(session.selected());

    frame.render_stateful_widget(task_list, main_columns[0], &mut list_state);
    render_calendar(frame, app, session, right_sections[0]);
    render_task_details(frame, app, session, right_sections[1]);
}

fn render_stats_tab(frame: &mut Frame, session: &Session, area: Rect) {
    let today = Local::now().date_naive();
    let counts = session.counts();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let top_panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    let overdue = session.overdue(today);
    let panels = [
        ("Total", counts.total, Color::Cyan),
        ("Pending", counts.pending, Color::Yellow),
        ("Completed", counts.completed, Color::Green),
        ("Overdue", overdue, if overdue > 0 { Color::Red } else { Color::Cyan }),
    ];

    for ((title, count, color), panel_area) in panels.into_iter().zip(top_panels.iter()) {
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(*panel_area);
        frame.render_widget(block, *panel_area);

        let big_text = BigText::builder()
            .pixel_size(PixelSize::Full)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .lines(vec![count.to_string().into()])
            .centered()
            .build();

        let vertical_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(50),
                Constraint::Percentage(25),
            ])
            .split(inner);

        frame.render_widget(big_text, vertical_layout[1]);
    }

    let category_counts: Vec<(&str, u64)> = Category::ALL
        .iter()
        .map(|c| (c.as_str(), session.store().count_in(*c) as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title("By Category")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(category_counts.as_slice())
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Yellow))
        .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));

    frame.render_widget(chart, rows[1]);
}

fn render_calendar(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let block = Block::default()
        .title("Calendar")
        .borders(Borders::ALL)
        .border_style(get_border_style(app.focused_panel == Panel::Calendar));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let calendar_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(inner_area);

    let mut events = CalendarEventStore::default();
    let today = Local::now().date_naive();

    for task in session.list() {
        let Some(due) = task.due_date.and_then(chrono_to_time_date) else {
            continue;
        };
        let style = if task.is_overdue(today) {
            Style::default().bg(Color::Red).fg(Color::White).add_modifier(Modifier::BOLD)
        } else if task.is_completed() {
            Style::default().bg(Color::Green).fg(Color::Black)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        };
        events.add(due, style);
    }

    // Today overrides due dates; the selected day overrides both while the calendar has focus
    if let Some(today) = chrono_to_time_date(today) {
        events.add(today, Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD));
    }
    if app.focused_panel == Panel::Calendar
        && let Some(selected) = app.selected_calendar_date.and_then(chrono_to_time_date)
    {
        events.add(selected, Style::default().bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD));
    }

    let first_of_month = app.current_date.with_day(1).unwrap_or(app.current_date);
    let months = [
        first_of_month - Months::new(1),
        app.current_date,
        first_of_month + Months::new(1),
    ];

    for (i, (month, column)) in months.iter().zip(calendar_columns.iter()).enumerate() {
        let Some(display_date) = chrono_to_time_date(*month) else {
            continue;
        };
        let header_style = if i == 1 { bold() } else { Style::default() };
        let mut calendar = Monthly::new(display_date, events.clone())
            .show_month_header(header_style)
            .show_weekdays_header(Style::default());
        if i == 1 {
            calendar = calendar.show_surrounding(Style::default().fg(Color::DarkGray));
        }
        frame.render_widget(calendar, *column);
    }
}

fn chrono_to_time_date(date: NaiveDate) -> Option<Date> {
    let month = Month::try_from(date.month() as u8).ok()?;
    Date::from_calendar_date(date.year(), month, date.day() as u8).ok()
}

fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), bold()),
        Span::raw(value),
    ])
}

fn render_task_details(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let block = Block::default()
        .title("Task")
        .borders(Borders::ALL)
        .border_style(get_border_style(app.focused_panel == Panel::Task));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let Some(task) = session.selected_task() else {
        let empty_text = Paragraph::new("No task selected")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty_text, inner_area);
        return;
    };

    let due = match task.due_date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "Not set".to_string(),
    };
    let status_style = if task.is_completed() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let status_text = if task.is_completed() { "✓ Completed" } else { "○ Pending" };

    let lines = vec![
        field_line("Name", task.name.clone()),
        Line::from(""),
        field_line("Priority", task.priority.to_string()),
        field_line("Due Date", due),
        field_line("Category", task.category.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Status: ", status_style),
            Span::styled(status_text, status_style),
        ]),
    ];

    let details = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(details, inner_area.inner(ratatui::layout::Margin::new(1, 1)));
}

fn render_task_form(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, popup_area);

    let title = if app.editing_existing { "Update Task" } else { "Add Task" };
    let popup_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    let inner_area = popup_block.inner(popup_area);
    frame.render_widget(popup_block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Name
            Constraint::Length(2), // Priority
            Constraint::Length(2), // Due date
            Constraint::Length(2), // Category
            Constraint::Length(2), // Error
            Constraint::Min(0),
            Constraint::Length(1), // Instructions
        ])
        .split(inner_area);

    let field_style = |mode: InputMode| {
        if app.input_mode == mode {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let name_label = "Task Name: ";
    let date_label = "Due Date (YYYY-MM-DD): ";
    let fields = [
        (format!("{name_label}{}", app.draft.name), InputMode::EditingName),
        (format!("Priority: < {} >", app.draft.priority), InputMode::EditingPriority),
        (format!("{date_label}{}", app.draft.due_date), InputMode::EditingDate),
        (format!("Category: < {} >", app.draft.category), InputMode::EditingCategory),
    ];
    for (i, (text, mode)) in fields.into_iter().enumerate() {
        frame.render_widget(Paragraph::new(text).style(field_style(mode)), chunks[i]);
    }

    if let Some(error) = &app.form_error {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(error, chunks[4]);
    }

    let instructions = Paragraph::new("Tab/Shift+Tab: Field | ←/→: Choose | Enter: Save | Esc: Cancel")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[6]);

    let cursor = match app.input_mode {
        InputMode::EditingName => Some((chunks[0], name_label.len() + app.draft.name.chars().count())),
        InputMode::EditingDate => Some((chunks[2], date_label.len() + app.draft.due_date.len())),
        _ => None,
    };
    if let Some((area, offset)) = cursor {
        let cursor_x = area.x + offset as u16;
        if cursor_x < area.x + area.width {
            frame.set_cursor_position((cursor_x, area.y));
        }
    }
}

fn render_confirm_panel(frame: &mut Frame, title: &str, body: Vec<Line>, yes_selected: bool) {
    let popup_area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, popup_area);

    let popup_block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    let inner_area = popup_block.inner(popup_area);
    frame.render_widget(popup_block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(2),    // Body
            Constraint::Length(3), // Buttons
            Constraint::Length(1), // Instructions
        ])
        .split(inner_area);

    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), chunks[0]);

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let yes_style = if yes_selected {
        Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let no_style = if !yes_selected {
        Style::default().bg(Color::Red).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };
    frame.render_widget(
        Paragraph::new("[ Yes ]").style(yes_style).alignment(Alignment::Center),
        button_chunks[0],
    );
    frame.render_widget(
        Paragraph::new("[ No ]").style(no_style).alignment(Alignment::Center),
        button_chunks[1],
    );

    let instructions = Paragraph::new("Tab/Left/Right: Switch buttons | Enter: Confirm | Esc: Cancel")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[2]);
}

fn render_status_bar(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(42)])
        .split(area);

    let message_style = match app.status.kind {
        MessageKind::Info => Style::default(),
        MessageKind::Success => Style::default().fg(Color::Green),
        MessageKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    frame.render_widget(
        Paragraph::new(format!(" {}", app.status.text)).style(message_style),
        columns[0],
    );

    let counts = session.counts();
    let counts_text = format!(
        "Total: {} | Pending: {} | Completed: {} ",
        counts.total, counts.pending, counts.completed
    );
    frame.render_widget(
        Paragraph::new(counts_text).alignment(Alignment::Right),
        columns[1],
    );
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let keys = [
        (" + ", ": add  "),
        ("enter ", ": edit  "),
        ("c ", ": complete  "),
        ("- ", ": delete  "),
        ("esc ", ": clear  "),
        ("tab ", ": panels  "),
        ("shift+←/→ ", ": tabs  "),
        ("L ", ": logout  "),
        ("q ", ": quit"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| [Span::styled(*key, key_style), Span::raw(*action)])
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
