//! Bias-field coil ramps and polarity-flip sequencing.
//!
//! Each of the three bias axes is driven by a bipolar supply. Reversing the
//! current direction is not a plain ramp: the supply must pass through a
//! small same-signed marker voltage, have its feedback loop disabled while
//! the polarity relay settles, and only then ramp to the far-side target.
//! [`CoilPolarityScheduler`] emits that 3-phase sequence time-shifted
//! *earlier* than the nominal request time, so axes that do and don't need
//! a flip all land on target at the same instant.
//!
//! Per-axis phase sequence on a flip:
//! `Stable(sign)` -> `RampToMarker` -> `FeedbackDisabled` -> `RampToTarget`
//! -> `Stable(new sign)`. Axes are independent; they share no hardware.

use tracing::debug;

use seq_core::{CoilAxis, DeviceSink, ResourceId, SeqError, SeqResult, TimingConstants};

/// Present drive state of one coil axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoilAxisState {
    /// Present current-set voltage; sign is the field polarity.
    pub voltage: f64,
}

impl CoilAxisState {
    /// An axis holding the given voltage.
    pub fn at(voltage: f64) -> CoilAxisState {
        CoilAxisState { voltage }
    }
}

/// Schedules direct ramps and polarity flips on the bias axes.
#[derive(Debug, Clone, Copy)]
pub struct CoilPolarityScheduler<'a> {
    timing: &'a TimingConstants,
}

impl<'a> CoilPolarityScheduler<'a> {
    /// A scheduler using the given timing constants.
    pub fn new(timing: &'a TimingConstants) -> CoilPolarityScheduler<'a> {
        CoilPolarityScheduler { timing }
    }

    /// Ramp one axis to `target`, nominally starting at `t`.
    ///
    /// - Target equal to the present voltage: no events, returns `t`.
    /// - Same sign (or presently at zero, or ramping to zero): one direct
    ///   ramp over `dur`, completing at `t + dur`.
    /// - Sign flip: the 3-phase sequence starts at
    ///   `t - coil_flip_duration` and completes at `t + dur`, in sync with
    ///   direct ramps requested at the same `t`. The early start is the
    ///   caller's slack to provide; nothing here checks for collisions with
    ///   an immediately preceding event on the same axis.
    ///
    /// Ramps shorter than the analog card can program are stretched to
    /// `vco_ramp_min_duration` (per half-ramp on a flip), lengthening the
    /// returned completion time accordingly.
    ///
    /// # Errors
    ///
    /// [`SeqError::InvalidDuration`] if `dur` is negative.
    pub fn ramp_axis(
        &self,
        state: &mut CoilAxisState,
        axis: CoilAxis,
        target: f64,
        t: f64,
        dur: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        if !dur.is_finite() || dur < 0.0 {
            return Err(SeqError::InvalidDuration {
                context: "coil ramp",
                value: dur,
            });
        }

        let current = state.voltage;
        if target == current {
            return Ok(t);
        }

        let channel = ResourceId::CoilCurrent(axis);
        let samplerate = self.timing.analog_samplerate;

        if current * target >= 0.0 {
            // No polarity reversal involved.
            let dur = dur.max(self.timing.vco_ramp_min_duration);
            sink.ramp(channel, t, dur, current, target, samplerate);
            state.voltage = target;
            return Ok(t + dur);
        }

        // Sign flip: both half-ramps must be programmable.
        let dur = dur.max(2.0 * self.timing.vco_ramp_min_duration);
        let half = dur / 2.0;
        let t_start = t - self.timing.coil_flip_duration;
        let marker = self.timing.coil_marker_voltage.copysign(current);

        debug!(
            axis = %axis,
            current,
            target,
            t_start,
            "Bias coil polarity flip"
        );

        // Phase 1: approach the marker voltage on the old polarity.
        sink.ramp(channel, t_start, half, current, marker, samplerate);
        let t_marker = t_start + half;

        // Phase 2: feedback loop off while the supply crosses zero.
        sink.open(ResourceId::CoilFeedback(axis), t_marker);
        sink.set_constant(channel, t_marker, marker);
        sink.close(
            ResourceId::CoilFeedback(axis),
            t_marker + self.timing.coil_feedback_disable_duration,
        );

        // Phase 3: ramp out to the far-side target.
        sink.ramp(
            channel,
            t_marker + self.timing.coil_flip_duration,
            half,
            marker,
            target,
            samplerate,
        );

        state.voltage = target;
        Ok(t + dur)
    }

    /// Ramp all three axes toward `targets`, nominally starting at `t`.
    ///
    /// Returns the latest completion time across the axes; callers must
    /// wait for the slowest axis before using the field.
    pub fn ramp_all(
        &self,
        states: &mut [CoilAxisState; CoilAxis::COUNT],
        targets: [f64; CoilAxis::COUNT],
        t: f64,
        dur: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        let mut done_t = t;
        for axis in CoilAxis::ALL {
            let axis_done =
                self.ramp_axis(&mut states[axis.index()], axis, targets[axis.index()], t, dur, sink)?;
            done_t = done_t.max(axis_done);
        }
        Ok(done_t)
    }
}
