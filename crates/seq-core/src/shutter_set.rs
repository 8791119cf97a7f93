//! Bitset of open optical paths.
//!
//! [`ShutterSet`] replaces ad-hoc lists of shutter names with an immutable
//! `u8`-backed bitset, one bit per [`Shutter`]. Composite configurations
//! used by the shot layer (`MOT_FULL`, `IMG_FULL`, ...) are derived
//! constants built from the primitive bits, not separate states.

use serde::{Deserialize, Serialize};

use crate::error::{SeqError, SeqResult};
use crate::resource::Shutter;

/// An immutable set of optical shutter paths.
///
/// Equality is bitwise; all operations are pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShutterSet(u8);

impl ShutterSet {
    /// No shutters open.
    pub const EMPTY: ShutterSet = ShutterSet(0);

    /// TA beam path only.
    pub const TA: ShutterSet = ShutterSet::single(Shutter::Ta);
    /// Repump beam path only.
    pub const REPUMP: ShutterSet = ShutterSet::single(Shutter::Repump);
    /// MOT in-plane beams only.
    pub const MOT_XY: ShutterSet = ShutterSet::single(Shutter::MotXy);
    /// MOT vertical beam only.
    pub const MOT_Z: ShutterSet = ShutterSet::single(Shutter::MotZ);
    /// In-plane imaging beam only.
    pub const IMG_XY: ShutterSet = ShutterSet::single(Shutter::ImgXy);
    /// Vertical imaging beam only.
    pub const IMG_Z: ShutterSet = ShutterSet::single(Shutter::ImgZ);
    /// Optical pumping beam only.
    pub const OPTICAL_PUMPING: ShutterSet = ShutterSet::single(Shutter::OpticalPumping);

    /// Light-generation paths shared by every downstream configuration.
    pub const UPSTREAM: ShutterSet = ShutterSet::TA.union(ShutterSet::REPUMP);
    /// Full MOT: upstream light plus both MOT beam paths.
    pub const MOT_FULL: ShutterSet = ShutterSet::UPSTREAM
        .union(ShutterSet::MOT_XY)
        .union(ShutterSet::MOT_Z);
    /// MOT beam paths without the upstream light.
    pub const MOT_BEAMS: ShutterSet = ShutterSet::MOT_XY.union(ShutterSet::MOT_Z);
    /// Full imaging: upstream light plus both imaging paths.
    pub const IMG_FULL: ShutterSet = ShutterSet::UPSTREAM
        .union(ShutterSet::IMG_XY)
        .union(ShutterSet::IMG_Z);
    /// Imaging paths without the upstream light.
    pub const IMG_BEAMS: ShutterSet = ShutterSet::IMG_XY.union(ShutterSet::IMG_Z);
    /// Optical pumping with upstream light.
    pub const OPTICAL_PUMPING_FULL: ShutterSet =
        ShutterSet::UPSTREAM.union(ShutterSet::OPTICAL_PUMPING);
    /// Every shutter on the apparatus.
    pub const ALL: ShutterSet = ShutterSet::MOT_FULL
        .union(ShutterSet::IMG_BEAMS)
        .union(ShutterSet::OPTICAL_PUMPING);

    /// The set containing exactly one shutter.
    pub const fn single(shutter: Shutter) -> ShutterSet {
        ShutterSet(1 << shutter.index())
    }

    /// Raw bit pattern, one bit per [`Shutter::index`].
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build a set from a raw bit pattern.
    ///
    /// Returns `None` if bits beyond the known shutters are set.
    pub const fn from_bits(bits: u8) -> Option<ShutterSet> {
        if bits & ShutterSet::ALL.0 == bits {
            Some(ShutterSet(bits))
        } else {
            None
        }
    }

    /// Shutters present in either set.
    pub const fn union(self, other: ShutterSet) -> ShutterSet {
        ShutterSet(self.0 | other.0)
    }

    /// Shutters present in both sets.
    pub const fn intersect(self, other: ShutterSet) -> ShutterSet {
        ShutterSet(self.0 & other.0)
    }

    /// Shutters present in exactly one of the two sets.
    pub const fn symmetric_difference(self, other: ShutterSet) -> ShutterSet {
        ShutterSet(self.0 ^ other.0)
    }

    /// Shutters present in `self` but not in `other`.
    pub const fn difference(self, other: ShutterSet) -> ShutterSet {
        ShutterSet(self.0 & !other.0)
    }

    /// Whether `shutter` is in the set.
    pub const fn contains(self, shutter: Shutter) -> bool {
        self.0 & (1 << shutter.index()) != 0
    }

    /// Whether every shutter of `other` is in `self`.
    pub const fn contains_all(self, other: ShutterSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of shutters in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the shutters in the set, in index order.
    pub fn iter(self) -> impl Iterator<Item = Shutter> {
        Shutter::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    /// Parse a comma-separated list of shutter names, e.g. `"ta,repump,mot_xy"`.
    ///
    /// An empty string parses to [`ShutterSet::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns [`SeqError::UnconfiguredResource`] on any unknown name.
    pub fn parse_list(list: &str) -> SeqResult<ShutterSet> {
        let mut set = ShutterSet::EMPTY;
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            set = set.union(ShutterSet::single(Shutter::from_name(name)?));
        }
        Ok(set)
    }
}

impl std::ops::BitOr for ShutterSet {
    type Output = ShutterSet;
    fn bitor(self, rhs: ShutterSet) -> ShutterSet {
        self.union(rhs)
    }
}

impl std::ops::BitAnd for ShutterSet {
    type Output = ShutterSet;
    fn bitand(self, rhs: ShutterSet) -> ShutterSet {
        self.intersect(rhs)
    }
}

impl std::ops::BitXor for ShutterSet {
    type Output = ShutterSet;
    fn bitxor(self, rhs: ShutterSet) -> ShutterSet {
        self.symmetric_difference(rhs)
    }
}

impl std::ops::Not for ShutterSet {
    type Output = ShutterSet;
    fn not(self) -> ShutterSet {
        // Complement within the known shutters only.
        ShutterSet(!self.0 & ShutterSet::ALL.0)
    }
}

impl std::ops::Sub for ShutterSet {
    type Output = ShutterSet;
    fn sub(self, rhs: ShutterSet) -> ShutterSet {
        self.difference(rhs)
    }
}

impl FromIterator<Shutter> for ShutterSet {
    fn from_iter<I: IntoIterator<Item = Shutter>>(iter: I) -> ShutterSet {
        iter.into_iter()
            .fold(ShutterSet::EMPTY, |set, s| set.union(ShutterSet::single(s)))
    }
}

impl std::fmt::Display for ShutterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        let names: Vec<&str> = self.iter().map(Shutter::name).collect();
        write!(f, "{{{}}}", names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty() {
        assert!(ShutterSet::EMPTY.is_empty());
        assert_eq!(ShutterSet::EMPTY.len(), 0);
        assert_eq!(ShutterSet::EMPTY.iter().count(), 0);
    }

    #[test]
    fn test_composites_are_derived() {
        assert_eq!(
            ShutterSet::MOT_FULL,
            ShutterSet::TA | ShutterSet::REPUMP | ShutterSet::MOT_XY | ShutterSet::MOT_Z
        );
        assert_eq!(ShutterSet::MOT_FULL.len(), 4);
        assert!(ShutterSet::MOT_FULL.contains_all(ShutterSet::UPSTREAM));
        assert!(!ShutterSet::MOT_FULL.contains(Shutter::ImgXy));
    }

    #[test]
    fn test_diff_against_current_configuration() {
        // The scheduler's diff: to_open = requested - current, to_close = current - requested.
        let current = ShutterSet::MOT_FULL;
        let requested = ShutterSet::IMG_FULL;
        let to_open = requested - current;
        let to_close = current - requested;
        assert_eq!(to_open, ShutterSet::IMG_BEAMS);
        assert_eq!(to_close, ShutterSet::MOT_BEAMS);
        assert!(to_open.intersect(to_close).is_empty());
    }

    #[test]
    fn test_symmetric_difference() {
        let a = ShutterSet::MOT_FULL;
        let b = ShutterSet::IMG_FULL;
        assert_eq!(a ^ b, ShutterSet::MOT_BEAMS | ShutterSet::IMG_BEAMS);
    }

    #[test]
    fn test_not_stays_within_known_shutters() {
        let open = !ShutterSet::EMPTY;
        assert_eq!(open, ShutterSet::ALL);
        assert_eq!(!ShutterSet::ALL, ShutterSet::EMPTY);
    }

    #[test]
    fn test_from_bits_rejects_unknown_bits() {
        assert_eq!(ShutterSet::from_bits(0b1000_0000), None);
        assert_eq!(
            ShutterSet::from_bits(ShutterSet::MOT_FULL.bits()),
            Some(ShutterSet::MOT_FULL)
        );
    }

    #[test]
    fn test_iter_matches_contains() {
        let set = ShutterSet::IMG_FULL;
        let via_iter: HashSet<Shutter> = set.iter().collect();
        for s in Shutter::ALL {
            assert_eq!(via_iter.contains(&s), set.contains(s));
        }
        let rebuilt: ShutterSet = set.iter().collect();
        assert_eq!(rebuilt, set);
    }

    #[test]
    fn test_parse_list() {
        let set = ShutterSet::parse_list("ta, repump,mot_xy,mot_z").unwrap();
        assert_eq!(set, ShutterSet::MOT_FULL);
        assert_eq!(ShutterSet::parse_list("").unwrap(), ShutterSet::EMPTY);
        assert!(ShutterSet::parse_list("ta,unknown").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ShutterSet::EMPTY.to_string(), "{}");
        assert_eq!(ShutterSet::UPSTREAM.to_string(), "{ta|repump}");
    }
}
