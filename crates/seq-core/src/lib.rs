//! `seq-core`
//!
//! Core types and traits for the atomseq hardware-timing coordinator.
//!
//! This crate provides the shared vocabulary for timeline compilation:
//! resource identifiers for the optical and magnetic hardware paths, the
//! [`ShutterSet`] bitset over the optical paths, timed [`Event`]s and the
//! append-only [`Timeline`] they accumulate into, the [`DeviceSink`] trait
//! the coordinator emits through, and the [`TimingConstants`] describing the
//! fixed physical properties of the apparatus.
//!
//! ## Key Types
//!
//! - [`ResourceId`]: identity of a timed hardware path (shutter, beam gate,
//!   coil current channel, coil feedback line)
//! - [`ShutterSet`]: immutable bitset of open optical paths, with named
//!   composite configurations (`MOT_FULL`, `IMG_FULL`, ...)
//! - [`Event`] / [`Timeline`]: the compiled output handed to the external
//!   player
//! - [`DeviceSink`]: the abstract device backend the coordinator writes to
//! - [`SeqError`]: self-contained error type for timeline compilation

pub mod config;
pub mod error;
pub mod event;
pub mod resource;
pub mod shutter_set;
pub mod sink;

pub use config::{GatePowers, SequencerConfig, TimingConstants};
pub use error::{SeqError, SeqResult};
pub use event::{Action, Event, Timeline};
pub use resource::{CoilAxis, GateChannel, ResourceId, Shutter};
pub use shutter_set::ShutterSet;
pub use sink::{DeviceSink, RecordingSink};
