// Event module - Reads keyboard input from the terminal

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Waits up to `timeout` for a key press.
///
/// Release and repeat events are dropped so each key acts once on every platform.
pub fn next_key(timeout: Duration) -> anyhow::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}
