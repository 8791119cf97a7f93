//! Single-pulse compilation.
//!
//! A pulse is the basic unit of the shot layer: put the light path in a
//! requested shutter configuration, turn the beam gates on at the right
//! drive, hold, and turn them off again. [`PulseCompiler`] orchestrates the
//! shutter switch, the defensive gate re-zeroing around the switch, the
//! gate on/off commands, and the optional full close with gate parking
//! afterwards.

use tracing::debug;

use seq_core::{
    DeviceSink, GateChannel, GatePowers, ResourceId, SeqError, SeqResult, ShutterSet,
    TimingConstants,
};

use crate::ledger::TimedResourceLedger;
use crate::shutter::ShutterScheduler;

/// One beam pulse request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseRequest {
    /// Nominal start time.
    pub t: f64,
    /// Hold duration of the gates; must be non-negative.
    pub dur: f64,
    /// Shutter configuration the pulse needs.
    pub shutters: ShutterSet,
    /// Requested gate drive per channel; channels at 0.0 stay dark.
    pub powers: GatePowers,
    /// Close every shutter after the pulse and park the gates.
    pub close_all_after: bool,
}

impl PulseRequest {
    /// A pulse with `close_all_after` disabled.
    pub fn new(t: f64, dur: f64, shutters: ShutterSet, powers: GatePowers) -> PulseRequest {
        PulseRequest {
            t,
            dur,
            shutters,
            powers,
            close_all_after: false,
        }
    }

    /// Close all shutters once the pulse ends.
    pub fn then_close_all(mut self) -> PulseRequest {
        self.close_all_after = true;
        self
    }
}

/// Times produced by compiling one pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseOutcome {
    /// Completion time: gate-off time, or the post-close parking time when
    /// `close_all_after` was set.
    pub end_t: f64,
    /// Absolute time the gates actually turned on. Callers align secondary
    /// events (camera exposures) to this, not to the requested start.
    pub gate_on_t: f64,
}

/// Compiles pulses against the shutter ledger and gate state.
#[derive(Debug, Clone, Copy)]
pub struct PulseCompiler<'a> {
    timing: &'a TimingConstants,
    gate_full: GatePowers,
}

impl<'a> PulseCompiler<'a> {
    /// A compiler using the given timing constants and full-drive levels.
    pub fn new(timing: &'a TimingConstants, gate_full: GatePowers) -> PulseCompiler<'a> {
        PulseCompiler { timing, gate_full }
    }

    /// Compile one pulse.
    ///
    /// The gates turn off at `gate_on_t + dur` unconditionally, whether or
    /// not the shutters close afterwards: holding shutters open between
    /// pulses must never leave light on.
    ///
    /// # Errors
    ///
    /// [`SeqError::InvalidDuration`] if `req.dur` is negative.
    pub fn compile(
        &self,
        ledger: &mut TimedResourceLedger,
        current: &mut ShutterSet,
        gate_levels: &mut GatePowers,
        req: &PulseRequest,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<PulseOutcome> {
        if !req.dur.is_finite() || req.dur < 0.0 {
            return Err(SeqError::InvalidDuration {
                context: "pulse",
                value: req.dur,
            });
        }

        let scheduler = ShutterScheduler::new(self.timing);
        let mut t = req.t;

        if req.shutters != *current {
            let new_t = scheduler.switch(ledger, *current, req.shutters, t, sink)?;
            // Re-zero every gate while the optical path is mid-transition;
            // a path that is neither old nor new must not leak light.
            let off_t = new_t - self.timing.shutter_turn_on_latency;
            for channel in GateChannel::ALL {
                gate_off(sink, gate_levels, channel, off_t);
            }
            *current = req.shutters;
            t = new_t;
        }

        let gate_on_t = t;
        for (channel, power) in req.powers.channels() {
            if power != 0.0 {
                gate_on(sink, gate_levels, channel, t, power);
            }
        }

        let end_t = t + req.dur;
        for channel in GateChannel::ALL {
            gate_off(sink, gate_levels, channel, end_t);
        }

        debug!(
            requested_t = req.t,
            gate_on_t,
            end_t,
            shutters = %req.shutters,
            close_all_after = req.close_all_after,
            "Pulse compiled"
        );

        if req.close_all_after {
            let park_t = self.park(
                ledger,
                current,
                gate_levels,
                end_t + self.timing.shutter_turn_off_latency,
                sink,
            )?;
            return Ok(PulseOutcome {
                end_t: park_t,
                gate_on_t,
            });
        }

        Ok(PulseOutcome { end_t, gate_on_t })
    }

    /// Close every shutter and park the gates at full drive.
    ///
    /// With all light blocked mechanically, the primed AOMs only reduce the
    /// switching latency of the next pulse. Returns the time the closed
    /// configuration takes effect.
    pub fn park(
        &self,
        ledger: &mut TimedResourceLedger,
        current: &mut ShutterSet,
        gate_levels: &mut GatePowers,
        t: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        let scheduler = ShutterScheduler::new(self.timing);
        let new_t = scheduler.switch(ledger, *current, ShutterSet::EMPTY, t, sink)?;
        *current = ShutterSet::EMPTY;
        for channel in GateChannel::ALL {
            gate_on(sink, gate_levels, channel, new_t, self.gate_full.get(channel));
        }
        Ok(new_t)
    }
}

fn gate_off(
    sink: &mut dyn DeviceSink,
    gate_levels: &mut GatePowers,
    channel: GateChannel,
    t: f64,
) {
    sink.close(ResourceId::Gate(channel), t);
    sink.set_constant(ResourceId::Gate(channel), t, 0.0);
    gate_levels.set(channel, 0.0);
}

fn gate_on(
    sink: &mut dyn DeviceSink,
    gate_levels: &mut GatePowers,
    channel: GateChannel,
    t: f64,
    power: f64,
) {
    sink.open(ResourceId::Gate(channel), t);
    sink.set_constant(ResourceId::Gate(channel), t, power);
    gate_levels.set(channel, power);
}
