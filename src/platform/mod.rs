//! Platform abstraction layer.
//!
//! Defines the `EventCapture` and `PointerInjector` traits the engine is
//! written against. The Windows backend lives in the child module; on other
//! hosts the factory functions fail at runtime so the pure-logic modules
//! (and their tests) still build everywhere.

#[cfg(target_os = "windows")]
mod windows;

use crate::error::EngineError;
use crate::event::{EventLog, MouseButton};

/// A capture session over a process-wide input hook.
///
/// At most one session may be active at a time -- the hook is global OS
/// state. Implementations reject a second `start` rather than silently
/// restarting.
pub trait EventCapture {
    /// Clears `log`, installs the hook, and begins appending every button
    /// transition observed anywhere on the desktop until `stop`.
    ///
    /// On failure no session is started, the log stays cleared but empty,
    /// and a retry is possible without manual cleanup.
    fn start(&mut self, log: EventLog) -> Result<(), EngineError>;

    /// Removes the hook unconditionally. Idempotent: stopping a session
    /// that never started (or stopping twice) is a no-op, never an error.
    /// Removal failure is logged and the handle discarded.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Synthesizes pointer input as if generated by physical hardware.
///
/// The replayer issues one `move_to` + `button` pair per recorded event so
/// down/up pairs land on their original coordinates even if the real cursor
/// moved in between.
pub trait PointerInjector {
    /// Current pointer position, read before replay so it can be restored.
    fn cursor_position(&mut self) -> Result<(i32, i32), EngineError>;

    /// Moves the synthetic cursor to absolute virtual-desktop coordinates.
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), EngineError>;

    /// Injects a press or release of `button` at the current position.
    fn button(&mut self, button: MouseButton, is_down: bool) -> Result<(), EngineError>;
}

/// Returns the mouse capture backend for this host.
#[cfg(target_os = "windows")]
pub fn create_event_capture() -> Result<Box<dyn EventCapture>, EngineError> {
    Ok(Box::new(windows::MouseCapture::new()))
}

/// Returns the pointer injection backend for this host.
#[cfg(target_os = "windows")]
pub fn create_pointer_injector() -> Result<Box<dyn PointerInjector>, EngineError> {
    Ok(Box::new(windows::SendInputInjector::new()))
}

#[cfg(not(target_os = "windows"))]
pub fn create_event_capture() -> Result<Box<dyn EventCapture>, EngineError> {
    Err(EngineError::Unsupported(
        "global mouse capture requires Windows (WH_MOUSE_LL)",
    ))
}

#[cfg(not(target_os = "windows"))]
pub fn create_pointer_injector() -> Result<Box<dyn PointerInjector>, EngineError> {
    Err(EngineError::Unsupported(
        "pointer injection requires Windows (SendInput)",
    ))
}
