//! `seq-bin`
//!
//! Library half of the `atomseq` CLI: builds the demonstration shot the
//! binary compiles and exports. The shot is deliberately thin glue over
//! [`seq_coordinator`]; real deployments replace it with their own shot
//! scripts.

use seq_coordinator::{CoordinatorState, PulseRequest};
use seq_core::{GatePowers, RecordingSink, SeqResult, SequencerConfig, ShutterSet, Timeline};
use tracing::info;

/// Compile a representative shot: MOT load, bias-field polarity flip,
/// imaging pulse through `imaging`, full close with gate parking.
///
/// Returns the ordered event timeline for the external player.
pub fn compile_demo_shot(config: &SequencerConfig, imaging: ShutterSet) -> SeqResult<Timeline> {
    let mut state = CoordinatorState::new(config);
    let mut sink = RecordingSink::new();

    // Load the MOT with everything on; bring the quadrupole bias up while
    // the light is on.
    let load = state.pulse(
        &PulseRequest::new(10e-3, 100e-3, ShutterSet::MOT_FULL, GatePowers::full()),
        &mut sink,
    )?;
    state.set_bias_field(
        [0.12, -0.05, 0.2],
        15e-3,
        config.timing.coil_ramp_duration,
        &mut sink,
    )?;

    // Flip the vertical bias for imaging; the in-plane axes hold. The
    // flip is scheduled to leave its early-start slack after the load.
    let field_done = state.set_bias_field(
        [0.12, -0.05, -0.2],
        load.end_t + config.timing.coil_flip_duration + 5e-3,
        config.timing.coil_ramp_duration,
        &mut sink,
    )?;

    // Short absorption-imaging pulse, then leave the machine parked.
    let image = state.pulse(
        &PulseRequest::new(field_done + 5e-3, 50e-6, imaging, GatePowers::full())
            .then_close_all(),
        &mut sink,
    )?;

    let timeline = sink.into_timeline();
    info!(
        events = timeline.len(),
        gate_on_t = image.gate_on_t,
        end_t = image.end_t,
        "Demo shot compiled"
    );
    Ok(timeline)
}
