//! End-to-end properties of compiled timelines.
//!
//! These tests drive a full [`CoordinatorState`] through realistic shot
//! fragments and check the global guarantees the external player relies
//! on: dwell constraints between transitions, per-resource monotonic event
//! times, unconditional gate-off at pulse end, and flip-free no-op ramps.

use seq_coordinator::{CoordinatorState, PulseRequest};
use seq_core::{
    Action, CoilAxis, Event, GateChannel, GatePowers, RecordingSink, ResourceId, SequencerConfig,
    Shutter, ShutterSet, Timeline,
};

fn compile_demo_fragment() -> (CoordinatorState, Timeline) {
    let config = SequencerConfig::default();
    let mut state = CoordinatorState::new(&config);
    let mut sink = RecordingSink::new();

    // MOT load, a second hold pulse on the same path, an imaging pulse on
    // the other path, then optical pumping with a full close, with a bias
    // flip in between.
    let load = state
        .pulse(
            &PulseRequest::new(10e-3, 30e-3, ShutterSet::MOT_FULL, GatePowers::full()),
            &mut sink,
        )
        .unwrap();
    let hold = state
        .pulse(
            &PulseRequest::new(
                load.end_t + 2e-3,
                10e-3,
                ShutterSet::MOT_FULL,
                GatePowers::new(0.4, 0.7),
            ),
            &mut sink,
        )
        .unwrap();
    let field_done = state
        .set_bias_field([0.2, -0.15, 0.1], hold.end_t + 15e-3, 4e-3, &mut sink)
        .unwrap();
    let image = state
        .pulse(
            &PulseRequest::new(field_done + 5e-3, 1e-3, ShutterSet::IMG_FULL, GatePowers::full()),
            &mut sink,
        )
        .unwrap();
    state
        .pulse(
            &PulseRequest::new(
                image.end_t + 10e-3,
                2e-3,
                ShutterSet::OPTICAL_PUMPING_FULL,
                GatePowers::new(0.8, 0.0),
            )
            .then_close_all(),
            &mut sink,
        )
        .unwrap();

    (state, sink.into_timeline())
}

fn shutter_transitions(timeline: &Timeline, shutter: Shutter) -> Vec<Event> {
    timeline
        .events_for(ResourceId::Shutter(shutter))
        .into_iter()
        .copied()
        .collect()
}

#[test]
fn dwell_invariant_holds_for_every_shutter() {
    let config = SequencerConfig::default();
    let (_, timeline) = compile_demo_fragment();

    for shutter in Shutter::ALL {
        let transitions = shutter_transitions(&timeline, shutter);
        for pair in transitions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match (a.action, b.action) {
                (Action::Close, Action::Open) => {
                    assert!(
                        b.t - a.t >= config.timing.min_dwell_closed - 1e-12,
                        "{shutter}: reopened {} s after close",
                        b.t - a.t
                    );
                }
                (Action::Open, Action::Close) => {
                    // Close commands are issued turn_off_latency early; the
                    // dwell bound applies to the transition effect time.
                    assert!(
                        b.t + config.timing.shutter_turn_off_latency - a.t
                            >= config.timing.min_dwell_open - 1e-12,
                        "{shutter}: closed {} s after open",
                        b.t - a.t
                    );
                }
                (a_act, b_act) => {
                    panic!("{shutter}: unexpected transition pair {a_act:?} -> {b_act:?}")
                }
            }
        }
    }
}

#[test]
fn per_resource_event_times_are_monotonic() {
    let (_, timeline) = compile_demo_fragment();

    let mut resources: Vec<ResourceId> = Vec::new();
    resources.extend(Shutter::ALL.map(ResourceId::Shutter));
    resources.extend(GateChannel::ALL.map(ResourceId::Gate));
    resources.extend(CoilAxis::ALL.map(ResourceId::CoilCurrent));
    resources.extend(CoilAxis::ALL.map(ResourceId::CoilFeedback));

    for resource in resources {
        let events = timeline.events_for(resource);
        for pair in events.windows(2) {
            assert!(
                pair[1].t >= pair[0].t,
                "{resource}: event at {} precedes earlier event at {}",
                pair[1].t,
                pair[0].t
            );
        }
    }
}

#[test]
fn gates_are_off_at_every_pulse_end() {
    let config = SequencerConfig::default();
    let mut state = CoordinatorState::new(&config);
    let mut sink = RecordingSink::new();

    let outcome = state
        .pulse(
            &PulseRequest::new(5e-3, 8e-3, ShutterSet::MOT_FULL, GatePowers::full()),
            &mut sink,
        )
        .unwrap();

    // Both channels end in the off action at end_t even though the
    // shutters stay open for the next pulse.
    let timeline = sink.timeline();
    for channel in GateChannel::ALL {
        let last_two: Vec<Action> = timeline
            .events_for(ResourceId::Gate(channel))
            .into_iter()
            .rev()
            .take(2)
            .map(|e| e.action)
            .collect();
        assert!(last_two.contains(&Action::Close));
        assert!(last_two.contains(&Action::SetConstant { value: 0.0 }));
        assert_eq!(state.gate_level(channel), 0.0);
    }
    assert_eq!(timeline.last_time_for(ResourceId::Gate(GateChannel::Ta)), Some(outcome.end_t));
    assert_eq!(state.current_shutters(), ShutterSet::MOT_FULL);
}

#[test]
fn noop_switch_and_noop_ramp_emit_nothing() {
    let config = SequencerConfig::default();
    let mut state = CoordinatorState::new(&config);
    let mut sink = RecordingSink::new();

    state
        .switch_shutters(ShutterSet::MOT_FULL, 0.0, &mut sink)
        .unwrap();
    state
        .ramp_coil_axis(CoilAxis::X, 0.25, 20e-3, 4e-3, &mut sink)
        .unwrap();
    let len_before = sink.timeline().len();

    // Idempotent re-requests: same shutter set, same coil target.
    let t1 = state
        .switch_shutters(ShutterSet::MOT_FULL, 30e-3, &mut sink)
        .unwrap();
    let t2 = state
        .ramp_coil_axis(CoilAxis::X, 0.25, 30e-3, 4e-3, &mut sink)
        .unwrap();

    assert_eq!(t1, 30e-3);
    assert_eq!(t2, 30e-3);
    assert_eq!(sink.timeline().len(), len_before);
}

#[test]
fn close_all_leaves_the_apparatus_parked() {
    let (state, timeline) = compile_demo_fragment();

    assert_eq!(state.current_shutters(), ShutterSet::EMPTY);
    for channel in GateChannel::ALL {
        // Parked at full drive behind closed shutters.
        assert_eq!(state.gate_level(channel), 1.0);
        let last = timeline
            .events_for(ResourceId::Gate(channel))
            .last()
            .map(|e| e.action);
        assert_eq!(last, Some(Action::SetConstant { value: 1.0 }));
    }
}

#[test]
fn bias_flip_lands_in_sync_with_direct_ramps() {
    let config = SequencerConfig::default();
    let mut state = CoordinatorState::new(&config);
    let mut sink = RecordingSink::new();

    // Establish a field, then flip one axis while another moves directly.
    state
        .set_bias_field([0.2, 0.1, 0.0], 20e-3, 4e-3, &mut sink)
        .unwrap();
    let done = state
        .set_bias_field([-0.2, 0.3, 0.0], 60e-3, 4e-3, &mut sink)
        .unwrap();

    assert!((done - 64e-3).abs() < 1e-12);
    assert_eq!(state.coil_voltage(CoilAxis::X), -0.2);
    assert_eq!(state.coil_voltage(CoilAxis::Y), 0.3);

    // The flip on X began before the nominal start to land in sync. The
    // first event on the axis is the initial direct ramp; the flip's
    // marker ramp follows it.
    let timeline = sink.into_timeline();
    let x_events = timeline.events_for(ResourceId::CoilCurrent(CoilAxis::X));
    assert_eq!(x_events.len(), 4);
    let flip_start = x_events[1].t;
    assert!((flip_start - (60e-3 - config.timing.coil_flip_duration)).abs() < 1e-12);
    // Exactly one feedback-disable pulse on X, none on Y.
    assert_eq!(
        timeline
            .events_for(ResourceId::CoilFeedback(CoilAxis::X))
            .len(),
        2
    );
    assert!(timeline
        .events_for(ResourceId::CoilFeedback(CoilAxis::Y))
        .is_empty());
}

#[test]
fn compiled_timeline_serializes_for_the_player() {
    let (_, timeline) = compile_demo_fragment();
    let json = serde_json::to_string(&timeline).unwrap();
    let restored: Timeline = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, timeline);
}
