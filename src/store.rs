// Task store - The in-memory, insertion-ordered task list

use crate::error::TaskError;
use crate::models::{Category, Status, Task, TaskFields};
use chrono::NaiveDate;

/// Outcome of marking a task completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Marked,
    AlreadyCompleted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

/// Tasks in insertion order. A task's position is its identity.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn add(&mut self, fields: TaskFields) -> usize {
        self.tasks.push(Task::new(fields));
        self.tasks.len() - 1
    }

    pub fn update(&mut self, index: usize, fields: TaskFields) -> Result<(), TaskError> {
        let task = self.tasks.get_mut(index).ok_or(TaskError::NoSelection)?;
        task.apply(fields);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Task, TaskError> {
        if index >= self.tasks.len() {
            return Err(TaskError::NoSelection);
        }
        Ok(self.tasks.remove(index))
    }

    pub fn mark_completed(&mut self, index: usize) -> Result<Completion, TaskError> {
        let task = self.tasks.get_mut(index).ok_or(TaskError::NoSelection)?;
        if task.is_completed() {
            return Ok(Completion::AlreadyCompleted);
        }
        task.status = Status::Completed;
        Ok(Completion::Marked)
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|t| t.is_completed()).count();
        TaskCounts {
            total: self.tasks.len(),
            pending: self.tasks.len() - completed,
            completed,
        }
    }

    pub fn overdue(&self, today: NaiveDate) -> usize {
        self.tasks.iter().filter(|t| t.is_overdue(today)).count()
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.tasks.iter().filter(|t| t.category == category).count()
    }
}
