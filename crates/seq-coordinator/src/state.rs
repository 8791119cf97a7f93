//! The explicit mutable state threaded through every scheduling call.
//!
//! One [`CoordinatorState`] exists per shot. It owns the timing constants,
//! the shutter ledger, the present shutter configuration, the present gate
//! drive levels, and the present coil voltages; every method mutates it,
//! writes events into the caller's sink, and returns the next legal
//! timestamp. The state is discarded once the compiled timeline is handed
//! to the external player.

use seq_core::{
    CoilAxis, DeviceSink, GateChannel, GatePowers, SeqResult, SequencerConfig, ShutterSet,
    TimingConstants,
};

use crate::coil::{CoilAxisState, CoilPolarityScheduler};
use crate::ledger::TimedResourceLedger;
use crate::pulse::{PulseCompiler, PulseOutcome, PulseRequest};
use crate::shutter::ShutterScheduler;

/// Compile-time state of one shot.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    timing: TimingConstants,
    gate_full: GatePowers,
    current_shutters: ShutterSet,
    ledger: TimedResourceLedger,
    gate_levels: GatePowers,
    coils: [CoilAxisState; CoilAxis::COUNT],
}

impl CoordinatorState {
    /// Fresh state: all shutters closed, gates off, coils at zero, no
    /// transition history.
    pub fn new(config: &SequencerConfig) -> CoordinatorState {
        CoordinatorState {
            timing: config.timing,
            gate_full: config.gate_full,
            current_shutters: ShutterSet::EMPTY,
            ledger: TimedResourceLedger::new(),
            gate_levels: GatePowers::OFF,
            coils: [CoilAxisState::default(); CoilAxis::COUNT],
        }
    }

    /// The timing constants this shot was compiled against.
    pub fn timing(&self) -> &TimingConstants {
        &self.timing
    }

    /// The present shutter configuration.
    pub fn current_shutters(&self) -> ShutterSet {
        self.current_shutters
    }

    /// The present drive level of one gate channel.
    pub fn gate_level(&self, channel: GateChannel) -> f64 {
        self.gate_levels.get(channel)
    }

    /// The present voltage of one coil axis.
    pub fn coil_voltage(&self, axis: CoilAxis) -> f64 {
        self.coils[axis.index()].voltage
    }

    /// The shutter transition ledger.
    pub fn ledger(&self) -> &TimedResourceLedger {
        &self.ledger
    }

    /// Switch to `requested` no earlier than `t`; see
    /// [`ShutterScheduler::switch`].
    pub fn switch_shutters(
        &mut self,
        requested: ShutterSet,
        t: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        let new_t = ShutterScheduler::new(&self.timing).switch(
            &mut self.ledger,
            self.current_shutters,
            requested,
            t,
            sink,
        )?;
        self.current_shutters = requested;
        Ok(new_t)
    }

    /// Compile one beam pulse; see [`PulseCompiler::compile`].
    pub fn pulse(&mut self, req: &PulseRequest, sink: &mut dyn DeviceSink) -> SeqResult<PulseOutcome> {
        PulseCompiler::new(&self.timing, self.gate_full).compile(
            &mut self.ledger,
            &mut self.current_shutters,
            &mut self.gate_levels,
            req,
            sink,
        )
    }

    /// Close every shutter and park the gates at full drive; see
    /// [`PulseCompiler::park`].
    pub fn park(&mut self, t: f64, sink: &mut dyn DeviceSink) -> SeqResult<f64> {
        PulseCompiler::new(&self.timing, self.gate_full).park(
            &mut self.ledger,
            &mut self.current_shutters,
            &mut self.gate_levels,
            t,
            sink,
        )
    }

    /// Ramp one bias axis; see [`CoilPolarityScheduler::ramp_axis`].
    pub fn ramp_coil_axis(
        &mut self,
        axis: CoilAxis,
        target: f64,
        t: f64,
        dur: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        CoilPolarityScheduler::new(&self.timing).ramp_axis(
            &mut self.coils[axis.index()],
            axis,
            target,
            t,
            dur,
            sink,
        )
    }

    /// Ramp all three bias axes to `targets`, landing in sync; returns the
    /// slowest axis's completion time.
    pub fn set_bias_field(
        &mut self,
        targets: [f64; CoilAxis::COUNT],
        t: f64,
        dur: f64,
        sink: &mut dyn DeviceSink,
    ) -> SeqResult<f64> {
        CoilPolarityScheduler::new(&self.timing).ramp_all(&mut self.coils, targets, t, dur, sink)
    }
}
