//! Windows pointer injection via SendInput.
//!
//! `SendInputInjector` implements `PointerInjector`. Injection is
//! synchronous: `SendInput` returns after the event is queued, so no
//! background thread is needed. Moves use absolute coordinates normalized
//! to the 0..65535 virtual-desktop range, which lands replayed clicks on
//! their original pixels across multi-monitor layouts.

use windows_sys::Win32::Foundation::{GetLastError, POINT};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE,
    MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK, MOUSEINPUT,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

use crate::error::EngineError;
use crate::event::MouseButton;
use crate::platform::PointerInjector;

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Injects pointer events via SendInput on Windows.
///
/// Stateless: each call builds one `INPUT` record and submits it
/// synchronously.
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        SendInputInjector
    }
}

// ---------------------------------------------------------------------------
// PointerInjector trait impl
// ---------------------------------------------------------------------------

impl PointerInjector for SendInputInjector {
    fn cursor_position(&mut self) -> Result<(i32, i32), EngineError> {
        let mut pt = POINT { x: 0, y: 0 };
        let ok = unsafe { GetCursorPos(&mut pt) };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            return Err(EngineError::Injection(code));
        }
        Ok((pt.x, pt.y))
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), EngineError> {
        let (dx, dy) = normalize_to_virtual_desktop(x, y);
        send_mouse_input(MOUSEINPUT {
            dx,
            dy,
            mouseData: 0,
            dwFlags: MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK,
            time: 0,
            dwExtraInfo: 0,
        })
    }

    fn button(&mut self, button: MouseButton, is_down: bool) -> Result<(), EngineError> {
        send_mouse_input(MOUSEINPUT {
            dx: 0,
            dy: 0,
            mouseData: 0,
            dwFlags: button_flags(button, is_down),
            time: 0,
            dwExtraInfo: 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Maps a button transition to its `MOUSEEVENTF_*` flag.
fn button_flags(button: MouseButton, is_down: bool) -> u32 {
    match (button, is_down) {
        (MouseButton::Left, true) => MOUSEEVENTF_LEFTDOWN,
        (MouseButton::Left, false) => MOUSEEVENTF_LEFTUP,
        (MouseButton::Middle, true) => MOUSEEVENTF_MIDDLEDOWN,
        (MouseButton::Middle, false) => MOUSEEVENTF_MIDDLEUP,
        (MouseButton::Right, true) => MOUSEEVENTF_RIGHTDOWN,
        (MouseButton::Right, false) => MOUSEEVENTF_RIGHTUP,
    }
}

/// Converts absolute screen pixels to the 0..65535 coordinate space that
/// `MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK` expects. The virtual
/// desktop can start at negative coordinates (monitor left of primary), so
/// the origin offset matters.
fn normalize_to_virtual_desktop(x: i32, y: i32) -> (i32, i32) {
    let (vx, vy, vw, vh) = unsafe {
        (
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN).max(1),
            GetSystemMetrics(SM_CYVIRTUALSCREEN).max(1),
        )
    };
    let nx = ((x - vx) as i64 * 65535 / vw as i64) as i32;
    let ny = ((y - vy) as i64 * 65535 / vh as i64) as i32;
    (nx, ny)
}

fn send_mouse_input(mi: MOUSEINPUT) -> Result<(), EngineError> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 { mi },
    };

    let sent = unsafe { SendInput(1, &input, std::mem::size_of::<INPUT>() as i32) };

    if sent == 0 {
        let code = unsafe { GetLastError() };
        return Err(EngineError::Injection(code));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Down and up must map to distinct flags for every button; replay
    /// depends on each transition being individually distinguishable.
    #[test]
    fn button_flags_distinguish_transitions() {
        for button in [MouseButton::Left, MouseButton::Middle, MouseButton::Right] {
            assert_ne!(button_flags(button, true), button_flags(button, false));
        }
        assert_eq!(button_flags(MouseButton::Left, true), MOUSEEVENTF_LEFTDOWN);
        assert_eq!(button_flags(MouseButton::Right, false), MOUSEEVENTF_RIGHTUP);
    }
}
