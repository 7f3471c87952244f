// Task model - Represents a single to-do item and the form input that builds one

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 2] = [Priority::High, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Low => "Low",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Priority::High => Priority::Low,
            Priority::Low => Priority::High,
        }
    }

    pub fn previous(&self) -> Self {
        self.next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    Work,
    #[default]
    Personal,
    Study,
    Shopping,
    Health,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Study,
        Category::Shopping,
        Category::Health,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Study => "Study",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Pending, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }
}

macro_rules! text_enum {
    ($ty:ty, $err:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ValidationError::$err(s.to_string()))
            }
        }
    };
}

text_enum!(Priority, UnknownPriority);
text_enum!(Category, UnknownCategory);
text_enum!(Status, UnknownStatus);

/// Parses a due date typed by the user.
///
/// Empty input (after trimming) means "no due date". Anything else must be
/// exactly `YYYY-MM-DD` and name a real calendar day.
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // chrono accepts short years and single-digit months, so check the shape first
    let bytes = trimmed.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ValidationError::InvalidDate(trimmed.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

pub fn format_due_date(due_date: Option<NaiveDate>) -> String {
    due_date
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// `due_date` is stored as `""` or `"YYYY-MM-DD"`.
mod due_date_text {
    use super::{format_due_date, parse_due_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_due_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_due_date(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub priority: Priority,
    #[serde(with = "due_date_text")]
    pub due_date: Option<NaiveDate>,
    pub category: Category,
    pub status: Status,
}

/// The four user-editable fields, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub name: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category: Category,
}

impl Task {
    /// New tasks always start out pending.
    pub fn new(fields: TaskFields) -> Self {
        Self {
            name: fields.name,
            priority: fields.priority,
            due_date: fields.due_date,
            category: fields.category,
            status: Status::Pending,
        }
    }

    pub fn apply(&mut self, fields: TaskFields) {
        self.name = fields.name;
        self.priority = fields.priority;
        self.due_date = fields.due_date;
        self.category = fields.category;
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|d| d < today)
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} | {} | {} | {} | {}",
            self.name,
            self.priority,
            format_due_date(self.due_date),
            self.category,
            self.status
        )
    }
}

/// Raw form input for a task, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub priority: Priority,
    pub due_date: String,
    pub category: Category,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, priority: Priority, due_date: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            priority,
            due_date: due_date.into(),
            category,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            priority: task.priority,
            due_date: format_due_date(task.due_date),
            category: task.category,
        }
    }

    pub fn validate(&self) -> Result<TaskFields, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let due_date = parse_due_date(&self.due_date)?;

        Ok(TaskFields {
            name: name.to_string(),
            priority: self.priority,
            due_date,
            category: self.category,
        })
    }
}
