//! Error types for timeline compilation.
//!
//! Every error here is a local precondition violation discovered
//! synchronously at the call that introduces it. There is no transient
//! failure class in this domain: the coordinator is pure computation, so
//! nothing is retryable. Callers at the shot-script layer propagate these
//! as fatal configuration errors that abort compilation.

use thiserror::Error;

use crate::resource::Shutter;

/// Convenience alias for results using the sequencer error type.
pub type SeqResult<T> = std::result::Result<T, SeqError>;

/// Primary error type for timeline compilation.
#[derive(Error, Debug)]
pub enum SeqError {
    /// Configuration file loading or parsing failed.
    ///
    /// Wraps `figment::Error` from the TOML/env configuration pipeline.
    /// Permanent; fix the configuration file and recompile.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration values parsed but failed semantic validation
    /// (e.g. a negative dwell time).
    ///
    /// Permanent; fix the offending value.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// I/O failure while reading or writing configuration or timelines.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pulse or ramp was requested with a negative duration.
    ///
    /// Durations are lengths of physical time; zero is legal (an
    /// instantaneous pulse compiles to gate-on and gate-off at the same
    /// timestamp), negative is not.
    #[error("Invalid duration {value} s for {context}: durations must be non-negative")]
    InvalidDuration {
        /// What the duration was for ("pulse", "coil ramp", ...).
        context: &'static str,
        /// The offending value in seconds.
        value: f64,
    },

    /// A shutter was requested both open and closed in the same transition.
    ///
    /// Structurally impossible when diffs are built from [`crate::ShutterSet`]
    /// bit operations, but checked in case composite sets are built from
    /// raw bits.
    #[error("Shutter '{shutter}' requested both open and closed in one transition")]
    ConflictingShutterRequest {
        /// The doubly-requested shutter.
        shutter: Shutter,
    },

    /// An operation named a resource that is not on the apparatus.
    #[error("Unknown resource '{name}'")]
    UnconfiguredResource {
        /// The unrecognized resource name.
        name: String,
    },
}
