//! Replay of a captured event log as synthetic pointer input.
//!
//! The replayer consumes a finished snapshot: for each entry, in capture
//! order, it moves the synthetic cursor to the entry's coordinates and then
//! injects the press or release. Afterwards the pointer is restored to the
//! resting position read before replay began, so the Play control is back
//! under the cursor.
//!
//! The last two entries of the snapshot are the down/up pair of the click
//! that hit the Stop control itself; they are not part of the gesture and
//! are excluded. A snapshot with fewer than two entries injects nothing.

use crate::error::EngineError;
use crate::event::MouseEvent;
use crate::platform::PointerInjector;

/// Trailing entries excluded from replay: the stop-command click's own
/// down/up pair.
pub const STOP_CLICK_EVENTS: usize = 2;

/// What a replay run actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayOutcome {
    /// Events fully injected (move + button both succeeded).
    pub injected: usize,
    /// Events where an injection call failed; replay continued past them.
    pub failed: usize,
}

pub struct Replayer;

impl Replayer {
    /// Replays `events` through `injector`, synchronously.
    ///
    /// Injection failures are best-effort: logged, counted, and skipped --
    /// one refused event never aborts the rest of the sequence. The cursor
    /// is restored to its resting position on every path. The only fatal
    /// error is failing to read the resting position before anything is
    /// injected.
    pub fn run(
        events: &[MouseEvent],
        injector: &mut dyn PointerInjector,
    ) -> Result<ReplayOutcome, EngineError> {
        // Resting position first, so it can be restored even when there is
        // nothing to replay.
        let (rest_x, rest_y) = injector.cursor_position()?;

        let body = &events[..events.len().saturating_sub(STOP_CLICK_EVENTS)];
        log::info!(
            "replay: {} recorded, {} to inject",
            events.len(),
            body.len()
        );

        let mut outcome = ReplayOutcome::default();

        for event in body {
            // Position-then-button as one distinguishable pair, so down/up
            // land on their original coordinates even if the real cursor
            // moved between them.
            let result = injector
                .move_to(event.x, event.y)
                .and_then(|_| injector.button(event.button, event.is_down));

            match result {
                Ok(()) => outcome.injected += 1,
                Err(e) => {
                    outcome.failed += 1;
                    log::warn!(
                        "replay: injection failed at {},{} ({e}); continuing",
                        event.x,
                        event.y
                    );
                }
            }
        }

        if let Err(e) = injector.move_to(rest_x, rest_y) {
            log::warn!("replay: failed to restore cursor to {rest_x},{rest_y} ({e})");
        }

        log::info!(
            "replay: done, {} injected, {} failed",
            outcome.injected,
            outcome.failed
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
