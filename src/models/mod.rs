// Models module - Data structures for tasks

pub mod task;

pub use task::{Category, Priority, Status, Task, TaskDraft, TaskFields};
