//! Windows mouse capture via WH_MOUSE_LL (low-level mouse hook).
//!
//! `MouseCapture` implements `EventCapture`. `start()` spawns a background
//! thread that installs the hook and runs a `GetMessageW` loop (required for
//! low-level hooks to deliver events). `stop()` uninstalls the hook, posts
//! `WM_QUIT` to exit the message loop, then joins the thread.
//!
//! No special permissions are required on Windows for WH_MOUSE_LL.
//!
//! Log storage: `WH_MOUSE_LL` hook procs receive no `user_info` pointer, so
//! the session's `EventLog` handle is stored in a process-global `Mutex`.
//! The occupied/empty state of that slot doubles as the single-session
//! guard: a second `start()` while it is occupied is rejected.
//!
//! The hook proc runs in the OS dispatch context and stalls every other
//! process's mouse input while it executes. It only matches the message,
//! appends to the log, and forwards via `CallNextHookEx` -- no blocking
//! work, and nothing in it can panic across the FFI boundary.

use std::ptr;
use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use windows_sys::Win32::Foundation::{GetLastError, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx,
    HC_ACTION, HHOOK, MSG, MSLLHOOKSTRUCT, WH_MOUSE_LL, WM_LBUTTONDOWN, WM_LBUTTONUP,
    WM_MBUTTONDOWN, WM_MBUTTONUP, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
};

use crate::error::EngineError;
use crate::event::{EventLog, MouseButton, MouseEvent};
use crate::platform::EventCapture;

// ---------------------------------------------------------------------------
// Process-global log slot
// ---------------------------------------------------------------------------

/// The active session's log handle, or `None` when no session is active.
///
/// `WH_MOUSE_LL` hook procs have no `user_info` parameter, so the handle
/// must live in a global. Occupancy enforces the one-session invariant.
static CAPTURE_LOG: Mutex<Option<EventLog>> = Mutex::new(None);

/// The hook proc must not panic into the OS, so a poisoned slot is
/// recovered instead of unwrapped.
fn log_slot() -> MutexGuard<'static, Option<EventLog>> {
    CAPTURE_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Windows mouse capture backend using `WH_MOUSE_LL`.
pub struct MouseCapture {
    /// Handle returned by `SetWindowsHookExW`; used to unhook in `stop()`. Stored as isize for Send.
    hook: Option<isize>,
    /// Thread ID of the background message-loop thread; used for `PostThreadMessageW`.
    thread_id: u32,
    thread: Option<JoinHandle<()>>,
}

impl MouseCapture {
    pub fn new() -> Self {
        Self {
            hook: None,
            thread_id: 0,
            thread: None,
        }
    }
}

// ---------------------------------------------------------------------------
// EventCapture trait impl
// ---------------------------------------------------------------------------

impl EventCapture for MouseCapture {
    fn start(&mut self, log: EventLog) -> Result<(), EngineError> {
        // Claim the global slot before the hook is installed. Occupied
        // means another session holds the hook: reject, never restart --
        // and never touch the running session's log.
        {
            let mut slot = log_slot();
            if slot.is_some() {
                return Err(EngineError::CaptureActive);
            }
            // A new session always begins with an empty log, even if the
            // previous recording was never replayed.
            log.clear();
            *slot = Some(log);
        }

        // Channel: background thread sends (hook_handle, thread_id) after setup. isize for Send.
        let (info_tx, info_rx) = mpsc::channel::<Result<(isize, u32), EngineError>>();

        let thread = thread::spawn(move || {
            // Install hook on this thread; the GetMessageW loop below keeps it alive.
            let hook = unsafe {
                SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), ptr::null_mut(), 0)
            };

            if hook.is_null() {
                let code = unsafe { GetLastError() };
                let _ = info_tx.send(Err(EngineError::HookInstall(format!("os error {code}"))));
                return;
            }

            let thread_id = unsafe { GetCurrentThreadId() };
            let _ = info_tx.send(Ok((hook as isize, thread_id)));

            log::info!("capture: WH_MOUSE_LL hook active");

            // Message loop: required for WH_MOUSE_LL to deliver events.
            // Returns 0 on WM_QUIT, -1 on error; both exit the loop.
            unsafe {
                let mut msg: MSG = std::mem::zeroed();
                while GetMessageW(&mut msg, ptr::null_mut(), 0, 0) > 0 {}
            }

            log::info!("capture: message loop exited");
        });

        match info_rx.recv() {
            Ok(Ok((hook, thread_id))) => {
                self.hook = Some(hook);
                self.thread_id = thread_id;
                self.thread = Some(thread);
                Ok(())
            }
            Ok(Err(e)) => {
                // Installation failed: release the slot so a retry needs no
                // manual cleanup. The thread has already exited.
                *log_slot() = None;
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                *log_slot() = None;
                let _ = thread.join();
                Err(EngineError::HookInstall(
                    "hook thread exited before reporting status".into(),
                ))
            }
        }
    }

    fn stop(&mut self) {
        // Unhook first so no further callbacks fire after this returns.
        // A failed removal is logged only; the handle is discarded either
        // way and a leaked hook is an accepted degraded state.
        if let Some(hook) = self.hook.take() {
            let removed = unsafe { UnhookWindowsHookEx(hook as HHOOK) };
            if removed == 0 {
                let code = unsafe { GetLastError() };
                log::warn!("capture: UnhookWindowsHookEx failed (os error {code})");
            }
        }

        // Release the log slot while certain no more hook_proc calls are in
        // flight. The log itself stays with the caller, frozen for read.
        *log_slot() = None;

        // Signal the message loop to exit.
        if self.thread_id != 0 {
            unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, 0, 0) };
            self.thread_id = 0;
        }

        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }

    fn is_active(&self) -> bool {
        self.hook.is_some()
    }
}

impl Drop for MouseCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Hook procedure
// ---------------------------------------------------------------------------

/// Low-level mouse hook proc, called on the background message-loop thread.
///
/// Button transitions are appended to the active session's log with the
/// absolute virtual-desktop coordinates from `MSLLHOOKSTRUCT`. Moves and
/// wheel messages are not part of the recorded gesture and pass through.
///
/// Every path forwards the message with `CallNextHookEx`: a low-level hook
/// that swallows messages breaks mouse input for every other application on
/// the machine while it is installed.
unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        return CallNextHookEx(ptr::null_mut(), n_code, w_param, l_param);
    }

    let ms = &*(l_param as *const MSLLHOOKSTRUCT);

    let transition = match w_param as u32 {
        WM_LBUTTONDOWN => Some((MouseButton::Left, true)),
        WM_LBUTTONUP => Some((MouseButton::Left, false)),
        WM_MBUTTONDOWN => Some((MouseButton::Middle, true)),
        WM_MBUTTONUP => Some((MouseButton::Middle, false)),
        WM_RBUTTONDOWN => Some((MouseButton::Right, true)),
        WM_RBUTTONUP => Some((MouseButton::Right, false)),
        _ => None,
    };

    if let Some((button, is_down)) = transition {
        if let Some(log) = log_slot().as_ref() {
            log.append(MouseEvent {
                button,
                is_down,
                x: ms.pt.x,
                y: ms.pt.y,
            });
            log::debug!(
                "capture: {:?} {} at {},{}",
                button,
                if is_down { "down" } else { "up" },
                ms.pt.x,
                ms.pt.y
            );
        }
    }

    CallNextHookEx(ptr::null_mut(), n_code, w_param, l_param)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_produces_idle_state() {
        let capture = MouseCapture::new();
        assert!(capture.hook.is_none());
        assert_eq!(capture.thread_id, 0);
        assert!(capture.thread.is_none());
        assert!(!capture.is_active());
    }

    /// Stopping a capture that was never started must be a no-op: no panic,
    /// no error, and stopping twice changes nothing.
    #[test]
    fn stop_on_unstarted_capture_is_noop() {
        let mut capture = MouseCapture::new();
        capture.stop();
        capture.stop();
        assert!(!capture.is_active());
    }
}
