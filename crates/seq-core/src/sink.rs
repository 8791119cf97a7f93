//! The abstract device backend the coordinator emits through.
//!
//! The coordinator never touches hardware: it writes timed commands into a
//! [`DeviceSink`], and an external compiler turns the accumulated timeline
//! into device-specific instruction streams later. [`RecordingSink`] is the
//! standard implementation: it appends every command to a [`Timeline`],
//! which is both the production hand-off path and the observation point for
//! tests.

use crate::event::{Action, Event, Timeline};
use crate::resource::ResourceId;

/// Receiver of timed hardware commands.
///
/// Implementations must not reorder commands; the coordinator guarantees
/// non-decreasing per-resource timestamps and the sink records them as
/// given. All writes are fire-and-forget.
pub trait DeviceSink {
    /// Digital transition of `resource` to the open/asserted state at `t`.
    fn open(&mut self, resource: ResourceId, t: f64);

    /// Digital transition of `resource` to the closed/deasserted state at `t`.
    fn close(&mut self, resource: ResourceId, t: f64);

    /// Hold the analog output of `channel` at `value` from `t`.
    fn set_constant(&mut self, channel: ResourceId, t: f64, value: f64);

    /// Linear analog ramp on `channel` starting at `t`.
    ///
    /// Returns the duration consumed, so callers can chain ramp end times.
    fn ramp(
        &mut self,
        channel: ResourceId,
        t: f64,
        duration: f64,
        initial: f64,
        target: f64,
        samplerate: f64,
    ) -> f64;
}

/// A [`DeviceSink`] that records every command into a [`Timeline`].
#[derive(Debug, Default)]
pub struct RecordingSink {
    timeline: Timeline,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    /// The timeline recorded so far.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Consume the sink, yielding the compiled timeline.
    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }
}

impl DeviceSink for RecordingSink {
    fn open(&mut self, resource: ResourceId, t: f64) {
        self.timeline.push(Event {
            t,
            resource,
            action: Action::Open,
        });
    }

    fn close(&mut self, resource: ResourceId, t: f64) {
        self.timeline.push(Event {
            t,
            resource,
            action: Action::Close,
        });
    }

    fn set_constant(&mut self, channel: ResourceId, t: f64, value: f64) {
        self.timeline.push(Event {
            t,
            resource: channel,
            action: Action::SetConstant { value },
        });
    }

    fn ramp(
        &mut self,
        channel: ResourceId,
        t: f64,
        duration: f64,
        initial: f64,
        target: f64,
        samplerate: f64,
    ) -> f64 {
        self.timeline.push(Event {
            t,
            resource: channel,
            action: Action::RampTo {
                initial,
                target,
                duration,
                samplerate,
            },
        });
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{CoilAxis, Shutter};

    #[test]
    fn test_recording_sink_records_in_emission_order() {
        let mut sink = RecordingSink::new();
        sink.open(ResourceId::Shutter(Shutter::Ta), 1e-3);
        sink.close(ResourceId::Shutter(Shutter::Ta), 5e-3);
        let timeline = sink.into_timeline();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.events()[0].action, Action::Open);
        assert_eq!(timeline.events()[1].t, 5e-3);
    }

    #[test]
    fn test_ramp_returns_duration_for_chaining() {
        let mut sink = RecordingSink::new();
        let consumed = sink.ramp(
            ResourceId::CoilCurrent(CoilAxis::X),
            0.0,
            4e-3,
            0.0,
            0.2,
            1e5,
        );
        assert_eq!(consumed, 4e-3);
        assert_eq!(sink.timeline().len(), 1);
    }
}
