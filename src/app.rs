//! The engine's UI-facing surface: record, stop, play.
//!
//! `App` wires the event log, the capture backend, and the injector together
//! behind the three calls a Record/Stop/Play surface makes. The backends are
//! boxed trait objects so tests can substitute fakes for the OS-level pieces.
//!
//! Replay is only offered once capture is structurally stopped -- a play
//! request while recording is rejected, so synthesized events can never be
//! re-captured by a still-installed hook.

use crate::error::EngineError;
use crate::event::EventLog;
use crate::platform::{self, EventCapture, PointerInjector};
use crate::replay::{ReplayOutcome, Replayer};

pub struct App {
    log: EventLog,
    capture: Box<dyn EventCapture>,
    injector: Box<dyn PointerInjector>,
}

impl App {
    pub fn new(capture: Box<dyn EventCapture>, injector: Box<dyn PointerInjector>) -> Self {
        Self {
            log: EventLog::new(),
            capture,
            injector,
        }
    }

    /// Builds an `App` over this host's capture and injection backends.
    pub fn with_platform_backends() -> Result<Self, EngineError> {
        Ok(Self::new(
            platform::create_event_capture()?,
            platform::create_pointer_injector()?,
        ))
    }

    /// Record pressed: clears the log and starts a capture session.
    ///
    /// A press while already recording is rejected with `CaptureActive`.
    /// On failure the app stays in the not-recording state; the caller
    /// surfaces the error and leaves the Record control armed for a retry.
    pub fn on_record_pressed(&mut self) -> Result<(), EngineError> {
        if self.capture.is_active() {
            return Err(EngineError::CaptureActive);
        }
        self.capture.start(self.log.clone())?;
        log::info!("recording started");
        Ok(())
    }

    /// Stop pressed: removes the hook and freezes the log for read.
    /// Idempotent; pressing Stop with no active recording does nothing.
    pub fn on_stop_pressed(&mut self) {
        self.capture.stop();
        log::info!("recording stopped, {} events captured", self.log.len());
    }

    /// Play pressed: replays the recorded gesture and restores the cursor.
    /// Rejected while a recording is active.
    pub fn on_play_pressed(&mut self) -> Result<ReplayOutcome, EngineError> {
        if self.capture.is_active() {
            return Err(EngineError::CaptureActive);
        }
        Replayer::run(&self.log.snapshot(), self.injector.as_mut())
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_active()
    }

    /// Number of events currently in the log, for host display.
    pub fn recorded_events(&self) -> usize {
        self.log.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseButton, MouseEvent};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeState {
        active: bool,
        fail_next_start: bool,
        stops: usize,
        /// The log handle handed over by the last successful start, kept so
        /// tests can append events as the hook callback would.
        session_log: Option<EventLog>,
    }

    /// In-memory stand-in for the hook backend. Clones share state, so a
    /// test can keep a handle while the `App` owns the boxed copy.
    #[derive(Clone, Default)]
    struct FakeCapture(Arc<Mutex<FakeState>>);

    impl FakeCapture {
        fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
            self.0.lock().unwrap()
        }

        fn deliver(&self, event: MouseEvent) {
            let state = self.state();
            state
                .session_log
                .as_ref()
                .expect("no active session")
                .append(event);
        }
    }

    impl EventCapture for FakeCapture {
        fn start(&mut self, log: EventLog) -> Result<(), EngineError> {
            let mut state = self.state();
            if state.active {
                return Err(EngineError::CaptureActive);
            }
            log.clear();
            if state.fail_next_start {
                state.fail_next_start = false;
                return Err(EngineError::HookInstall("os error 5".into()));
            }
            state.active = true;
            state.session_log = Some(log);
            Ok(())
        }

        fn stop(&mut self) {
            let mut state = self.state();
            state.active = false;
            state.session_log = None;
            state.stops += 1;
        }

        fn is_active(&self) -> bool {
            self.state().active
        }
    }

    /// Injector that accepts everything; `moves` lets tests check the
    /// cursor-restore call happened.
    #[derive(Clone, Default)]
    struct AcceptingInjector {
        moves: Arc<Mutex<Vec<(i32, i32)>>>,
    }

    impl PointerInjector for AcceptingInjector {
        fn cursor_position(&mut self) -> Result<(i32, i32), EngineError> {
            Ok((111, 222))
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<(), EngineError> {
            self.moves.lock().unwrap().push((x, y));
            Ok(())
        }

        fn button(&mut self, _button: MouseButton, _is_down: bool) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn ev(is_down: bool, x: i32, y: i32) -> MouseEvent {
        MouseEvent {
            button: MouseButton::Left,
            is_down,
            x,
            y,
        }
    }

    fn app_with_fakes() -> (App, FakeCapture, AcceptingInjector) {
        let capture = FakeCapture::default();
        let injector = AcceptingInjector::default();
        let app = App::new(Box::new(capture.clone()), Box::new(injector.clone()));
        (app, capture, injector)
    }

    #[test]
    fn record_stop_play_round_trip() {
        let (mut app, capture, injector) = app_with_fakes();

        app.on_record_pressed().unwrap();
        assert!(app.is_recording());
        capture.deliver(ev(true, 10, 10));
        capture.deliver(ev(false, 10, 10));
        // Stop-button click, recorded like any other transition.
        capture.deliver(ev(true, 500, 500));
        capture.deliver(ev(false, 500, 500));

        app.on_stop_pressed();
        assert!(!app.is_recording());
        assert_eq!(app.recorded_events(), 4);

        let outcome = app.on_play_pressed().unwrap();
        assert_eq!(outcome.injected, 2);
        assert_eq!(outcome.failed, 0);
        // Last move is the cursor restore.
        assert_eq!(injector.moves.lock().unwrap().last(), Some(&(111, 222)));
    }

    #[test]
    fn record_while_recording_is_rejected() {
        let (mut app, _capture, _injector) = app_with_fakes();
        app.on_record_pressed().unwrap();
        assert!(matches!(
            app.on_record_pressed(),
            Err(EngineError::CaptureActive)
        ));
        // The rejected press must not have disturbed the running session.
        assert!(app.is_recording());
    }

    #[test]
    fn play_while_recording_is_rejected() {
        let (mut app, _capture, _injector) = app_with_fakes();
        app.on_record_pressed().unwrap();
        assert!(matches!(
            app.on_play_pressed(),
            Err(EngineError::CaptureActive)
        ));
    }

    /// A new recording discards the previous one, even when it was never
    /// replayed.
    #[test]
    fn record_clears_prior_undrained_log() {
        let (mut app, capture, _injector) = app_with_fakes();

        app.on_record_pressed().unwrap();
        capture.deliver(ev(true, 1, 1));
        capture.deliver(ev(false, 1, 1));
        app.on_stop_pressed();
        assert_eq!(app.recorded_events(), 2);

        app.on_record_pressed().unwrap();
        assert_eq!(app.recorded_events(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut app, capture, _injector) = app_with_fakes();
        app.on_record_pressed().unwrap();
        app.on_stop_pressed();
        app.on_stop_pressed();
        assert!(!app.is_recording());
        assert_eq!(capture.state().stops, 2);
    }

    /// A failed hook installation leaves a cleared-but-empty log and the
    /// not-recording state; an immediate retry succeeds with no cleanup.
    #[test]
    fn failed_start_allows_retry() {
        let (mut app, capture, _injector) = app_with_fakes();

        app.on_record_pressed().unwrap();
        capture.deliver(ev(true, 3, 3));
        app.on_stop_pressed();

        capture.state().fail_next_start = true;
        assert!(matches!(
            app.on_record_pressed(),
            Err(EngineError::HookInstall(_))
        ));
        assert!(!app.is_recording());
        assert_eq!(app.recorded_events(), 0);

        app.on_record_pressed().unwrap();
        assert!(app.is_recording());
    }

    /// Playing an empty log injects nothing but still restores the cursor.
    #[test]
    fn play_with_nothing_recorded_restores_cursor() {
        let (mut app, _capture, injector) = app_with_fakes();
        let outcome = app.on_play_pressed().unwrap();
        assert_eq!(outcome.injected, 0);
        assert_eq!(*injector.moves.lock().unwrap(), vec![(111, 222)]);
    }
}
