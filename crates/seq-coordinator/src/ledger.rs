//! Per-shutter transition history.
//!
//! The ledger remembers the last open and last close command time of every
//! shutter and answers two questions: how long a shutter has been in its
//! state as of some time, and the earliest time it may legally transition
//! again. Absence of history is the base case: a shutter that has never
//! been commanded is always legal to move.

use seq_core::{Shutter, TimingConstants};

/// Last-transition timestamps for every shutter, keyed by [`Shutter`].
///
/// Typed fixed-size arrays indexed by [`Shutter::index`] replace the
/// positional parallel arrays of older sequencers, so an entry can never be
/// attributed to the wrong shutter.
#[derive(Debug, Clone, Default)]
pub struct TimedResourceLedger {
    last_open: [Option<f64>; Shutter::COUNT],
    last_close: [Option<f64>; Shutter::COUNT],
}

impl TimedResourceLedger {
    /// A ledger with no recorded history.
    pub fn new() -> TimedResourceLedger {
        TimedResourceLedger::default()
    }

    /// Record an open command at `t`. Unconditionally overwrites.
    pub fn record_open(&mut self, shutter: Shutter, t: f64) {
        self.last_open[shutter.index()] = Some(t);
    }

    /// Record a close command at `t`. Unconditionally overwrites.
    pub fn record_close(&mut self, shutter: Shutter, t: f64) {
        self.last_close[shutter.index()] = Some(t);
    }

    /// Time of the last open command, if any.
    pub fn last_open_t(&self, shutter: Shutter) -> Option<f64> {
        self.last_open[shutter.index()]
    }

    /// Time of the last close command, if any.
    pub fn last_close_t(&self, shutter: Shutter) -> Option<f64> {
        self.last_close[shutter.index()]
    }

    /// Earliest time `shutter` may legally be commanded open, not before
    /// `from_t`.
    ///
    /// The closed-state dwell constraint applies only if a close was ever
    /// recorded.
    pub fn earliest_legal_open(
        &self,
        shutter: Shutter,
        from_t: f64,
        timing: &TimingConstants,
    ) -> f64 {
        match self.last_close_t(shutter) {
            Some(closed_at) => from_t.max(closed_at + timing.min_dwell_closed),
            None => from_t,
        }
    }

    /// Earliest time `shutter` may legally be commanded closed, not before
    /// `from_t`.
    pub fn earliest_legal_close(
        &self,
        shutter: Shutter,
        from_t: f64,
        timing: &TimingConstants,
    ) -> f64 {
        match self.last_open_t(shutter) {
            Some(opened_at) => from_t.max(opened_at + timing.min_dwell_open),
            None => from_t,
        }
    }

    /// How long the shutter has been open as of `t`, if its last command
    /// was an open.
    pub fn open_duration(&self, shutter: Shutter, t: f64) -> Option<f64> {
        let opened_at = self.last_open_t(shutter)?;
        if self.last_close_t(shutter).is_some_and(|c| c > opened_at) {
            return None;
        }
        Some(t - opened_at)
    }

    /// How long the shutter has been closed as of `t`, if its last command
    /// was a close.
    pub fn closed_duration(&self, shutter: Shutter, t: f64) -> Option<f64> {
        let closed_at = self.last_close_t(shutter)?;
        if self.last_open_t(shutter).is_some_and(|o| o > closed_at) {
            return None;
        }
        Some(t - closed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConstants {
        TimingConstants::default()
    }

    #[test]
    fn test_no_history_is_always_legal() {
        let ledger = TimedResourceLedger::new();
        assert_eq!(
            ledger.earliest_legal_open(Shutter::Ta, 2e-3, &timing()),
            2e-3
        );
        assert_eq!(
            ledger.earliest_legal_close(Shutter::Ta, 2e-3, &timing()),
            2e-3
        );
    }

    #[test]
    fn test_close_dwell_delays_reopen() {
        let mut ledger = TimedResourceLedger::new();
        ledger.record_close(Shutter::Repump, 10e-3);
        let t = timing();
        // Request before the dwell has elapsed: pushed to close + dwell.
        assert_eq!(
            ledger.earliest_legal_open(Shutter::Repump, 11e-3, &t),
            10e-3 + t.min_dwell_closed
        );
        // Request long after: unconstrained.
        assert_eq!(ledger.earliest_legal_open(Shutter::Repump, 1.0, &t), 1.0);
    }

    #[test]
    fn test_open_dwell_delays_close() {
        let mut ledger = TimedResourceLedger::new();
        ledger.record_open(Shutter::Ta, 0.0);
        let t = timing();
        assert_eq!(
            ledger.earliest_legal_close(Shutter::Ta, 1e-3, &t),
            t.min_dwell_open
        );
    }

    #[test]
    fn test_record_overwrites() {
        let mut ledger = TimedResourceLedger::new();
        ledger.record_open(Shutter::MotZ, 0.0);
        ledger.record_open(Shutter::MotZ, 50e-3);
        assert_eq!(ledger.last_open_t(Shutter::MotZ), Some(50e-3));
    }

    #[test]
    fn test_state_durations() {
        let mut ledger = TimedResourceLedger::new();
        assert_eq!(ledger.open_duration(Shutter::ImgXy, 1.0), None);

        ledger.record_open(Shutter::ImgXy, 10e-3);
        assert_eq!(ledger.open_duration(Shutter::ImgXy, 15e-3), Some(5e-3));
        assert_eq!(ledger.closed_duration(Shutter::ImgXy, 15e-3), None);

        ledger.record_close(Shutter::ImgXy, 20e-3);
        assert_eq!(ledger.open_duration(Shutter::ImgXy, 25e-3), None);
        assert_eq!(ledger.closed_duration(Shutter::ImgXy, 25e-3), Some(5e-3));
    }
}
