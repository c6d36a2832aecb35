//! Captured mouse events and the append-only event log.
//!
//! `EventLog` is the buffer a capture session writes into from the hook
//! callback's execution context. The hook proc runs on the OS dispatch
//! thread, so the buffer lives behind a `Mutex` inside an `Arc`; cloning an
//! `EventLog` yields another handle to the same buffer. Appends happen only
//! while a session is active, snapshot reads only after it stops, but the
//! lock makes any overlap safe without UI-thread cooperation.

use std::sync::{Arc, Mutex, PoisonError};

/// A mouse button observed by the hook or synthesized during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// One captured button transition. Immutable once created; the insertion
/// order of events in the log IS the recorded gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub button: MouseButton,
    /// True for a press, false for a release.
    pub is_down: bool,
    /// Absolute virtual-desktop coordinates at the moment of the transition.
    pub x: i32,
    pub y: i32,
}

/// Ordered, append-only buffer of captured events.
///
/// Duplicates are allowed (a double click is two down/up pairs at the same
/// point); no reordering, coalescing, or deduplication ever happens.
/// Cleared at the start of each capture session; there is no persistence
/// across sessions or process restarts.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<MouseEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one event. Never rejects, never filters.
    ///
    /// Called from the hook callback, which must not panic across the FFI
    /// boundary, so a poisoned lock is recovered rather than unwrapped.
    pub fn append(&self, event: MouseEvent) {
        self.lock().push(event);
    }

    /// Drops all entries. Called at the start of a new capture session.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Full ordered copy of the log for replay. Non-mutating; safe to call
    /// repeatedly.
    pub fn snapshot(&self) -> Vec<MouseEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MouseEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(button: MouseButton, is_down: bool, x: i32, y: i32) -> MouseEvent {
        MouseEvent {
            button,
            is_down,
            x,
            y,
        }
    }

    /// Every appended event comes back from snapshot() in delivery order,
    /// coordinates and down/up flags intact.
    #[test]
    fn snapshot_preserves_order_and_fields() {
        let log = EventLog::new();
        let events = [
            ev(MouseButton::Right, true, 300, -20),
            ev(MouseButton::Left, true, 10, 10),
            ev(MouseButton::Left, false, 10, 10),
            ev(MouseButton::Right, false, 300, -20),
            ev(MouseButton::Middle, true, 0, 0),
        ];
        for e in events {
            log.append(e);
        }
        assert_eq!(log.snapshot(), events);
    }

    /// Duplicate entries are kept as-is: a double click is two identical
    /// down/up pairs.
    #[test]
    fn duplicates_are_not_coalesced() {
        let log = EventLog::new();
        let down = ev(MouseButton::Left, true, 42, 42);
        let up = ev(MouseButton::Left, false, 42, 42);
        for e in [down, up, down, up] {
            log.append(e);
        }
        assert_eq!(log.snapshot(), vec![down, up, down, up]);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn clear_drops_everything() {
        let log = EventLog::new();
        log.append(ev(MouseButton::Left, true, 1, 2));
        log.clear();
        assert!(log.is_empty());
        assert!(log.snapshot().is_empty());
    }

    /// Clones share the underlying buffer: appends through the session's
    /// handle are visible through the host's handle.
    #[test]
    fn clones_share_the_buffer() {
        let log = EventLog::new();
        let session_handle = log.clone();
        session_handle.append(ev(MouseButton::Middle, false, 7, 8));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn snapshot_is_repeatable() {
        let log = EventLog::new();
        log.append(ev(MouseButton::Left, true, 5, 5));
        assert_eq!(log.snapshot(), log.snapshot());
        assert_eq!(log.len(), 1);
    }
}
