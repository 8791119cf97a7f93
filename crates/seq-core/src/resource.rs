//! Identifiers for the timed hardware paths of the apparatus.
//!
//! Every schedulable path has a stable, closed identity: the seven optical
//! shutters, the two fast beam gates (AOMs), and the three bias-coil axes
//! with their companion feedback-disable lines. The ledger and schedulers
//! index typed fixed-size arrays by these enums rather than matching
//! positions in parallel arrays.

use serde::{Deserialize, Serialize};

use crate::error::{SeqError, SeqResult};

/// An optical shutter path.
///
/// Shutters are slow mechanical beam blockers with finite open/close
/// transition latency and a minimum dwell time in each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shutter {
    /// Tapered-amplifier beam shutter.
    Ta,
    /// Repump beam shutter.
    Repump,
    /// MOT in-plane beams.
    MotXy,
    /// MOT vertical beam.
    MotZ,
    /// In-plane imaging beam.
    ImgXy,
    /// Vertical imaging beam.
    ImgZ,
    /// Optical pumping beam.
    OpticalPumping,
}

impl Shutter {
    /// Number of shutter paths on the apparatus.
    pub const COUNT: usize = 7;

    /// All shutters, in ledger index order.
    pub const ALL: [Shutter; Shutter::COUNT] = [
        Shutter::Ta,
        Shutter::Repump,
        Shutter::MotXy,
        Shutter::MotZ,
        Shutter::ImgXy,
        Shutter::ImgZ,
        Shutter::OpticalPumping,
    ];

    /// Ledger/bitset index of this shutter.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name, matching the serde representation.
    pub const fn name(self) -> &'static str {
        match self {
            Shutter::Ta => "ta",
            Shutter::Repump => "repump",
            Shutter::MotXy => "mot_xy",
            Shutter::MotZ => "mot_z",
            Shutter::ImgXy => "img_xy",
            Shutter::ImgZ => "img_z",
            Shutter::OpticalPumping => "optical_pumping",
        }
    }

    /// Look up a shutter by its stable name.
    ///
    /// # Errors
    ///
    /// Returns [`SeqError::UnconfiguredResource`] if the name does not match
    /// any shutter on the apparatus.
    pub fn from_name(name: &str) -> SeqResult<Shutter> {
        Shutter::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| SeqError::UnconfiguredResource {
                name: name.to_string(),
            })
    }
}

impl std::fmt::Display for Shutter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A fast beam gate (AOM amplitude channel).
///
/// Gates are orders of magnitude faster than shutters and carry both a
/// digital enable and an analog drive level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateChannel {
    /// Tapered-amplifier AOM.
    Ta,
    /// Repump AOM.
    Repump,
}

impl GateChannel {
    /// Number of gate channels.
    pub const COUNT: usize = 2;

    /// All gate channels, in index order.
    pub const ALL: [GateChannel; GateChannel::COUNT] = [GateChannel::Ta, GateChannel::Repump];

    /// Array index of this channel.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            GateChannel::Ta => "ta",
            GateChannel::Repump => "repump",
        }
    }
}

impl std::fmt::Display for GateChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A bias-field coil axis.
///
/// Each axis is driven by a bipolar supply with an analog current-set
/// channel and a companion digital line that disables the current feedback
/// loop during polarity flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoilAxis {
    /// East-west bias coil pair.
    X,
    /// North-south bias coil pair.
    Y,
    /// Vertical bias coil pair.
    Z,
}

impl CoilAxis {
    /// Number of bias-field axes.
    pub const COUNT: usize = 3;

    /// All axes, in index order.
    pub const ALL: [CoilAxis; CoilAxis::COUNT] = [CoilAxis::X, CoilAxis::Y, CoilAxis::Z];

    /// Array index of this axis.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            CoilAxis::X => "x",
            CoilAxis::Y => "y",
            CoilAxis::Z => "z",
        }
    }
}

impl std::fmt::Display for CoilAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identity of a timed hardware path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceId {
    /// A mechanical shutter.
    Shutter(Shutter),
    /// A beam gate (digital enable + analog drive on one channel).
    Gate(GateChannel),
    /// The analog current-set channel of a coil axis.
    CoilCurrent(CoilAxis),
    /// The digital feedback-disable line of a coil axis.
    CoilFeedback(CoilAxis),
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Shutter(s) => write!(f, "{}_shutter", s),
            ResourceId::Gate(g) => write!(f, "{}_aom", g),
            ResourceId::CoilCurrent(a) => write!(f, "{}_coil", a),
            ResourceId::CoilFeedback(a) => write!(f, "{}_coil_feedback", a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutter_indices_match_all_order() {
        for (i, s) in Shutter::ALL.into_iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn test_shutter_from_name_roundtrip() {
        for s in Shutter::ALL {
            assert_eq!(Shutter::from_name(s.name()).unwrap(), s);
        }
    }

    #[test]
    fn test_shutter_from_name_unknown() {
        let err = Shutter::from_name("zeeman_slower").unwrap_err();
        assert!(err.to_string().contains("zeeman_slower"));
    }

    #[test]
    fn test_resource_display() {
        assert_eq!(
            ResourceId::Shutter(Shutter::OpticalPumping).to_string(),
            "optical_pumping_shutter"
        );
        assert_eq!(ResourceId::Gate(GateChannel::Ta).to_string(), "ta_aom");
        assert_eq!(
            ResourceId::CoilFeedback(CoilAxis::Z).to_string(),
            "z_coil_feedback"
        );
    }
}
