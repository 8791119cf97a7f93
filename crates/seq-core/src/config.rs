//! Sequencer configuration: timing constants and gate drive levels.
//!
//! [`TimingConstants`] are fixed physical properties of the hardware
//! (shutter dwell and latency, coil flip sequencing). They are loaded once
//! per run from a TOML file, optionally overridden from the environment,
//! validated, and immutable afterwards. There are no module-level globals:
//! the loaded config is passed explicitly to the coordinator at
//! construction.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SeqError, SeqResult};
use crate::resource::GateChannel;

/// Environment variable prefix for config overrides, e.g.
/// `ATOMSEQ_TIMING__MIN_DWELL_OPEN=4e-3`.
pub const ENV_PREFIX: &str = "ATOMSEQ_";

/// Per-channel beam gate drive levels, in volts of AOM drive.
///
/// Doubles as the "requested power" payload of a pulse and as the
/// configured full-drive parking levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePowers {
    /// TA AOM drive level.
    pub ta: f64,
    /// Repump AOM drive level.
    pub repump: f64,
}

impl Default for GatePowers {
    /// Nominal full drive; unconfigured channels park at full.
    fn default() -> GatePowers {
        GatePowers::full()
    }
}

impl GatePowers {
    /// All channels off.
    pub const OFF: GatePowers = GatePowers {
        ta: 0.0,
        repump: 0.0,
    };

    /// Both channels at the given levels.
    pub const fn new(ta: f64, repump: f64) -> GatePowers {
        GatePowers { ta, repump }
    }

    /// Nominal full drive on both channels.
    pub fn full() -> GatePowers {
        GatePowers::new(1.0, 1.0)
    }

    /// Drive level of one channel.
    pub fn get(self, channel: GateChannel) -> f64 {
        match channel {
            GateChannel::Ta => self.ta,
            GateChannel::Repump => self.repump,
        }
    }

    /// Set the drive level of one channel.
    pub fn set(&mut self, channel: GateChannel, level: f64) {
        match channel {
            GateChannel::Ta => self.ta = level,
            GateChannel::Repump => self.repump = level,
        }
    }

    /// Iterate `(channel, level)` pairs in channel index order.
    pub fn channels(self) -> impl Iterator<Item = (GateChannel, f64)> {
        GateChannel::ALL.into_iter().map(move |ch| (ch, self.get(ch)))
    }
}

/// Fixed physical timing properties of the apparatus.
///
/// All durations are seconds. Defaults match the bench-measured values of
/// the reference apparatus; deployments override them from `timing.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConstants {
    /// Minimum time a shutter must stay open before it may close.
    pub min_dwell_open: f64,
    /// Minimum time a shutter must stay closed before it may reopen.
    pub min_dwell_closed: f64,
    /// Mechanical delay between the open command and full transmission.
    pub shutter_turn_on_latency: f64,
    /// Mechanical delay between the close command and full extinction.
    pub shutter_turn_off_latency: f64,
    /// Shortest ramp the analog output card can program.
    pub vco_ramp_min_duration: f64,
    /// Nominal bias-coil ramp duration when the caller does not choose one.
    pub coil_ramp_duration: f64,
    /// Length of the marker-voltage hold during a polarity flip.
    pub coil_flip_duration: f64,
    /// Width of the feedback-disable pulse asserted during a flip.
    pub coil_feedback_disable_duration: f64,
    /// Magnitude of the same-signed marker voltage a flip passes through.
    pub coil_marker_voltage: f64,
    /// Sample rate used for analog ramps, in samples per second.
    pub analog_samplerate: f64,
}

impl Default for TimingConstants {
    fn default() -> TimingConstants {
        TimingConstants {
            min_dwell_open: 3.6e-3,
            min_dwell_closed: 3.6e-3,
            shutter_turn_on_latency: 1.96e-3,
            shutter_turn_off_latency: 1.98e-3,
            vco_ramp_min_duration: 1.2e-4,
            coil_ramp_duration: 4e-3,
            coil_flip_duration: 10e-3,
            coil_feedback_disable_duration: 5e-3,
            coil_marker_voltage: 0.03,
            analog_samplerate: 1e5,
        }
    }
}

impl TimingConstants {
    /// Check the constants for semantic validity.
    ///
    /// Returns a list of issues; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let durations = [
            ("min_dwell_open", self.min_dwell_open),
            ("min_dwell_closed", self.min_dwell_closed),
            ("shutter_turn_on_latency", self.shutter_turn_on_latency),
            ("shutter_turn_off_latency", self.shutter_turn_off_latency),
            ("vco_ramp_min_duration", self.vco_ramp_min_duration),
            ("coil_ramp_duration", self.coil_ramp_duration),
            ("coil_flip_duration", self.coil_flip_duration),
            (
                "coil_feedback_disable_duration",
                self.coil_feedback_disable_duration,
            ),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                issues.push(format!("{name} must be a non-negative duration, got {value}"));
            }
        }
        if !self.coil_marker_voltage.is_finite() || self.coil_marker_voltage <= 0.0 {
            issues.push(format!(
                "coil_marker_voltage must be positive, got {}",
                self.coil_marker_voltage
            ));
        }
        if !self.analog_samplerate.is_finite() || self.analog_samplerate <= 0.0 {
            issues.push(format!(
                "analog_samplerate must be positive, got {}",
                self.analog_samplerate
            ));
        }
        if self.coil_feedback_disable_duration > self.coil_flip_duration {
            issues.push(format!(
                "coil_feedback_disable_duration ({}) must not exceed coil_flip_duration ({})",
                self.coil_feedback_disable_duration, self.coil_flip_duration
            ));
        }
        issues
    }
}

/// Whole-file sequencer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Physical timing properties.
    pub timing: TimingConstants,
    /// Full-drive parking levels per beam gate.
    pub gate_full: GatePowers,
}

impl Default for SequencerConfig {
    fn default() -> SequencerConfig {
        SequencerConfig {
            timing: TimingConstants::default(),
            gate_full: GatePowers::full(),
        }
    }
}

impl SequencerConfig {
    /// Load configuration from a TOML file, with `ATOMSEQ_*` environment
    /// overrides layered on top, then validate.
    ///
    /// # Errors
    ///
    /// - [`SeqError::Config`] if the file cannot be parsed
    /// - [`SeqError::Configuration`] if values fail semantic validation
    pub fn load(path: &Path) -> SeqResult<SequencerConfig> {
        debug!("Loading sequencer config from: {}", path.display());
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let config: SequencerConfig = figment.extract()?;
        config.validated()
    }

    /// Validate, returning the config itself on success.
    pub fn validated(self) -> SeqResult<SequencerConfig> {
        let issues = self.timing.validate();
        if !issues.is_empty() {
            return Err(SeqError::Configuration(issues.join("; ")));
        }
        info!(
            min_dwell_open = self.timing.min_dwell_open,
            coil_flip_duration = self.timing.coil_flip_duration,
            "Sequencer config loaded"
        );
        Ok(self)
    }

    /// Render the default configuration as a TOML template.
    pub fn default_toml() -> SeqResult<String> {
        toml::to_string_pretty(&SequencerConfig::default())
            .map_err(|e| SeqError::Configuration(e.to_string()))
    }
}
