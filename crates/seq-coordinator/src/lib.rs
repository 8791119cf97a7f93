//! `seq-coordinator`
//!
//! The timed-resource coordination layer: turns high-level pulse and
//! bias-field requests into a conflict-free schedule of absolute-time
//! hardware events, respecting minimum shutter dwell times, shutter
//! transition latency, and safe bipolar coil polarity-flip sequencing.
//!
//! The entire coordinator operates on a single logical compile-time cursor:
//! every scheduling call mutates the [`CoordinatorState`], writes events
//! into a [`seq_core::DeviceSink`], and returns the next legal timestamp.
//! Nothing blocks and nothing executes; the compiled timeline is played
//! back on real hardware later by an external player.
//!
//! ## Components
//!
//! - [`TimedResourceLedger`]: per-shutter last-open/last-close history and
//!   the earliest legal transition times it implies
//! - [`ShutterScheduler`]: diffs shutter configurations and emits delayed,
//!   conflict-free open/close transitions
//! - [`PulseCompiler`]: compiles one beam pulse (shutter switch, gate
//!   re-zeroing, power-on, hold, power-off, optional full close + park)
//! - [`CoilPolarityScheduler`]: direct ramps and 3-phase polarity flips on
//!   the bias-field axes
//! - [`CoordinatorState`]: the explicit mutable state threaded through
//!   every call

pub mod coil;
pub mod ledger;
pub mod pulse;
pub mod shutter;
pub mod state;

pub use coil::{CoilAxisState, CoilPolarityScheduler};
pub use ledger::TimedResourceLedger;
pub use pulse::{PulseCompiler, PulseOutcome, PulseRequest};
pub use shutter::ShutterScheduler;
pub use state::CoordinatorState;
