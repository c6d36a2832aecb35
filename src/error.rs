//! Engine error taxonomy.
//!
//! Lifecycle errors (`HookInstall`, `CaptureActive`, `Unsupported`) surface
//! to the host so it can alert the user. `Injection` is reported per event
//! during replay and never aborts the remaining sequence. Hook *removal*
//! failure is deliberately not a variant: the handle is discarded either
//! way and the failure is only logged.

use thiserror::Error;

/// Errors produced by the capture/replay engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The OS refused to install the low-level mouse hook. Recoverable:
    /// no session is started and a later retry needs no cleanup.
    #[error("failed to install mouse hook: {0}")]
    HookInstall(String),

    /// One synthetic input call failed during replay. Best-effort policy:
    /// logged and counted, replay continues with the next event.
    #[error("input injection failed (os error {0})")]
    Injection(u32),

    /// A capture session is already active. The single global hook admits
    /// one session at a time; a second start is rejected, never a restart.
    #[error("a capture session is already active")]
    CaptureActive,

    /// The host platform has no capture/injection backend.
    #[error("unsupported platform: {0}")]
    Unsupported(&'static str),
}
