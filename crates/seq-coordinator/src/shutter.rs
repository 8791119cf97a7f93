//! Shutter configuration transitions.
//!
//! [`ShutterScheduler`] diffs the current and requested [`ShutterSet`],
//! finds the earliest time the whole transition is legal, and emits the
//! open/close commands. When any shutter in the diff is still inside its
//! dwell window, the entire transition is delayed to the worst-case bound
//! rather than commanding an illegal state; shutters outside the diff never
//! constrain the transition.

use tracing::debug;

use seq_core::{DeviceSink, ResourceId, SeqError, SeqResult, ShutterSet, TimingConstants};

use crate::ledger::TimedResourceLedger;

/// Computes conflict-free shutter transitions against the ledger.
#[derive(Debug, Clone, Copy)]
pub struct ShutterScheduler<'a> {
    timing: &'a TimingConstants,
}

impl<'a> ShutterScheduler<'a> {
    /// A scheduler using the given timing constants.
    pub fn new(timing: &'a TimingConstants) -> ShutterScheduler<'a> {
        ShutterScheduler { timing }
    }

    /// Transition from `current` to `requested`, no earlier than `t`.
    ///
    /// Emits `Close` commands `shutter_turn_off_latency` before the
    /// transition time so closing shutters are fully shut by `new_t`, and
    /// `Open` commands at `new_t` itself. The ledger is updated with the
    /// actual command times. Returns `new_t`, the time the requested
    /// configuration takes effect; callers must hold dependent beam gates
    /// off until then.
    ///
    /// `switch(S, S, t)` is a no-op returning `t` with no events.
    ///
    /// # Errors
    ///
    /// [`SeqError::ConflictingShutterRequest`] if a shutter appears in both
    /// halves of the diff (impossible for diffs built from bit operations).
    pub fn switch(
        &self,
        ledger: &mut TimedResourceLedger,
        current: ShutterSet,
        requested: ShutterSet,
        t: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        let to_open = requested - current;
        let to_close = current - requested;

        if to_open.is_empty() && to_close.is_empty() {
            return Ok(t);
        }

        let conflict = to_open.intersect(to_close);
        if let Some(shutter) = conflict.iter().next() {
            return Err(SeqError::ConflictingShutterRequest { shutter });
        }

        // The worst per-shutter bound delays the whole transition; shutters
        // outside the diff are ignored even if near a constraint boundary.
        let mut new_t = t;
        for shutter in to_open.iter() {
            new_t = new_t.max(ledger.earliest_legal_open(shutter, t, self.timing));
        }
        for shutter in to_close.iter() {
            new_t = new_t.max(ledger.earliest_legal_close(shutter, t, self.timing));
        }

        if new_t > t {
            debug!(
                requested_t = t,
                new_t,
                to_open = %to_open,
                to_close = %to_close,
                "Shutter transition delayed by dwell constraints"
            );
        }

        // Closing shutters start moving early so they are fully shut by new_t.
        let close_cmd_t = new_t - self.timing.shutter_turn_off_latency;
        for shutter in to_close.iter() {
            sink.close(ResourceId::Shutter(shutter), close_cmd_t);
            ledger.record_close(shutter, close_cmd_t);
        }
        for shutter in to_open.iter() {
            sink.open(ResourceId::Shutter(shutter), new_t);
            ledger.record_open(shutter, new_t);
        }

        Ok(new_t)
    }
}
