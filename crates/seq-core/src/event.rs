//! Timed hardware events and the compiled timeline.
//!
//! The coordinator's output unit is an [`Event`]: an action on one resource
//! at one absolute time. Events accumulate append-only into a [`Timeline`],
//! in non-decreasing but not strictly monotonic per-resource time order
//! (two shutters opening at the same instant is legal). The timeline is the
//! in-memory hand-off to the external player; nothing here talks to
//! hardware.

use serde::{Deserialize, Serialize};

use crate::resource::ResourceId;

/// What happens to a resource at an event's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Digital transition to the open/asserted state.
    Open,
    /// Digital transition to the closed/deasserted state.
    Close,
    /// Hold an analog output at a constant value.
    SetConstant {
        /// Output value, in the channel's native units (volts).
        value: f64,
    },
    /// Linear analog ramp.
    RampTo {
        /// Value at the start of the ramp.
        initial: f64,
        /// Value at the end of the ramp.
        target: f64,
        /// Ramp duration in seconds.
        duration: f64,
        /// Output sample rate in samples per second.
        samplerate: f64,
    },
}

/// One timed hardware command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Absolute time in seconds from the start of the shot.
    pub t: f64,
    /// The hardware path the action applies to.
    pub resource: ResourceId,
    /// The action taken at `t`.
    pub action: Action,
}

/// Append-only ordered list of compiled events.
///
/// A timeline is immutable once compiled; the only mutation is appending
/// during compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Timeline {
        Timeline::default()
    }

    /// Append one event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// All events, in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events touching one resource, in emission order.
    pub fn events_for(&self, resource: ResourceId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.resource == resource)
            .collect()
    }

    /// Timestamp of the last event on `resource`, if any.
    pub fn last_time_for(&self, resource: ResourceId) -> Option<f64> {
        self.events_for(resource).last().map(|e| e.t)
    }

    /// Latest timestamp across all events, if any.
    pub fn end_time(&self) -> Option<f64> {
        if self.events.is_empty() {
            return None;
        }
        Some(
            self.events
                .iter()
                .map(|e| e.t)
                .fold(f64::NEG_INFINITY, f64::max),
        )
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
