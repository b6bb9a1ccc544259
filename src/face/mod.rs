//! Face identification for primitive and composite solids.
//!
//! A primitive face is one bit in a mask. A composite face is the face
//! identifier of the child that owns it, prefixed by the child selector
//! (0 for the first child, 1 for the second).

mod intercept;
mod parse;

pub use intercept::{EdgeProximity, FaceInterceptInfo};

use serde::{Deserialize, Serialize};

/// Face bit mask matching every face.
pub const FACE_BITS_ANY: u32 = u32::MAX;

/// Face bit mask matching no face.
pub const FACE_BITS_NONE: u32 = 0;

/// Child selector inside a face identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Part {
    /// Wildcard selector.
    Any,
    Index(u32),
}

impl Part {
    fn matches(self, candidate: Part) -> bool {
        match (self, candidate) {
            (Part::Any, _) => true,
            (Part::Index(a), Part::Index(b)) => a == b,
            (Part::Index(_), Part::Any) => false,
        }
    }
}

/// Identifies one face, or a pattern of faces, of a solid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceIdentifier {
    parts: Vec<Part>,
    bits: u32,
}

impl Default for FaceIdentifier {
    fn default() -> Self {
        Self::none()
    }
}

impl FaceIdentifier {
    /// The identifier matching no face.
    #[must_use]
    pub fn none() -> Self {
        Self {
            parts: Vec::new(),
            bits: FACE_BITS_NONE,
        }
    }

    /// The identifier matching every face.
    #[must_use]
    pub fn any() -> Self {
        Self::from_bits(FACE_BITS_ANY)
    }

    /// A primitive face mask.
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Self {
            parts: Vec::new(),
            bits,
        }
    }

    /// Builds an identifier from explicit parts and bits.
    #[must_use]
    pub fn with_parts(parts: Vec<Part>, bits: u32) -> Self {
        if bits == FACE_BITS_NONE {
            return Self::none();
        }
        Self { parts, bits }
    }

    /// Prefixes `child` with the child selector `part`.
    ///
    /// A NONE child stays NONE.
    #[must_use]
    pub fn nested(part: u32, child: FaceIdentifier) -> Self {
        Self::prefixed(Part::Index(part), child)
    }

    /// Prefixes `child` with a wildcard child selector.
    #[must_use]
    pub fn with_any_part(child: FaceIdentifier) -> Self {
        Self::prefixed(Part::Any, child)
    }

    fn prefixed(part: Part, child: FaceIdentifier) -> Self {
        if child.is_none() {
            return Self::none();
        }
        let mut parts = Vec::with_capacity(child.parts.len() + 1);
        parts.push(part);
        parts.extend(child.parts);
        Self {
            parts,
            bits: child.bits,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.bits == FACE_BITS_NONE
    }

    /// Whether this identifier matches every face, at any depth.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.bits == FACE_BITS_ANY && self.parts.iter().all(|p| *p == Part::Any)
    }

    /// Whether this identifier names exactly one face.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.bits.count_ones() == 1 && self.parts.iter().all(|p| matches!(p, Part::Index(_)))
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Whether the mask contains `bit`.
    #[must_use]
    pub fn has_bit(&self, bit: u32) -> bool {
        self.bits & bit != 0
    }

    /// Whether the pattern `self` matches the identifier `candidate`.
    ///
    /// NONE matches only NONE. Parts are compared pairwise, a pattern
    /// shorter than the candidate matches only when its bits are
    /// [`FACE_BITS_ANY`], and bits match when the pattern is
    /// [`FACE_BITS_ANY`] or both masks share a bit.
    #[must_use]
    pub fn matches(&self, candidate: &FaceIdentifier) -> bool {
        if self.is_none() || candidate.is_none() {
            return self.is_none() && candidate.is_none();
        }
        if self.parts.len() > candidate.parts.len() {
            return false;
        }
        let parts_match = self
            .parts
            .iter()
            .zip(&candidate.parts)
            .all(|(p, c)| p.matches(*c));
        if !parts_match {
            return false;
        }
        if self.parts.len() < candidate.parts.len() {
            return self.bits == FACE_BITS_ANY;
        }
        self.bits == FACE_BITS_ANY || self.bits & candidate.bits != 0
    }

    /// Splits into the first child selector and the remaining identifier.
    #[must_use]
    pub fn split_first(&self) -> Option<(Part, FaceIdentifier)> {
        let (first, rest) = self.parts.split_first()?;
        Some((
            *first,
            FaceIdentifier {
                parts: rest.to_vec(),
                bits: self.bits,
            },
        ))
    }

    /// The mask to forward to child `part` when this identifier is used as a
    /// pattern on a composite, or `None` when no face of that child can match.
    #[must_use]
    pub fn child_mask(&self, part: u32) -> Option<FaceIdentifier> {
        if self.is_none() {
            return None;
        }
        match self.split_first() {
            None if self.bits == FACE_BITS_ANY => Some(FaceIdentifier::any()),
            None => None,
            Some((first, rest)) if first.matches(Part::Index(part)) => Some(rest),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_matches_only_none() {
        let none = FaceIdentifier::none();
        assert!(none.matches(&FaceIdentifier::none()));
        assert!(!none.matches(&FaceIdentifier::from_bits(1)));
        assert!(!FaceIdentifier::any().matches(&none));
    }

    #[test]
    fn any_matches_every_face() {
        let any = FaceIdentifier::any();
        assert!(any.matches(&FaceIdentifier::from_bits(4)));
        assert!(any.matches(&FaceIdentifier::nested(1, FaceIdentifier::from_bits(2))));
        assert!(any.is_any());
        assert!(!any.is_unique());
    }

    #[test]
    fn bits_share_a_bit() {
        let mask = FaceIdentifier::from_bits(0b0110);
        assert!(mask.matches(&FaceIdentifier::from_bits(0b0010)));
        assert!(!mask.matches(&FaceIdentifier::from_bits(0b1000)));
    }

    #[test]
    fn parts_are_compared_pairwise() {
        let face = FaceIdentifier::nested(0, FaceIdentifier::nested(1, FaceIdentifier::from_bits(8)));
        let pattern = FaceIdentifier::nested(0, FaceIdentifier::with_any_part(FaceIdentifier::from_bits(8)));
        assert!(pattern.matches(&face));
        let wrong = FaceIdentifier::nested(1, FaceIdentifier::with_any_part(FaceIdentifier::from_bits(8)));
        assert!(!wrong.matches(&face));
    }

    #[test]
    fn shorter_pattern_needs_any_bits() {
        let face = FaceIdentifier::nested(0, FaceIdentifier::nested(1, FaceIdentifier::from_bits(8)));
        let shallow_any = FaceIdentifier::nested(0, FaceIdentifier::any());
        let shallow_bits = FaceIdentifier::nested(0, FaceIdentifier::from_bits(8));
        assert!(shallow_any.matches(&face));
        assert!(!shallow_bits.matches(&face));
        assert!(!face.matches(&shallow_bits));
    }

    #[test]
    fn nesting_none_stays_none() {
        assert!(FaceIdentifier::nested(0, FaceIdentifier::none()).is_none());
    }

    #[test]
    fn uniqueness() {
        assert!(FaceIdentifier::from_bits(16).is_unique());
        assert!(!FaceIdentifier::from_bits(3).is_unique());
        assert!(FaceIdentifier::nested(1, FaceIdentifier::from_bits(2)).is_unique());
        assert!(!FaceIdentifier::with_any_part(FaceIdentifier::from_bits(2)).is_unique());
    }

    #[test]
    fn child_mask_forwarding() {
        let any = FaceIdentifier::any();
        assert_eq!(any.child_mask(0), Some(FaceIdentifier::any()));
        let second_top = FaceIdentifier::nested(1, FaceIdentifier::from_bits(32));
        assert_eq!(second_top.child_mask(0), None);
        assert_eq!(second_top.child_mask(1), Some(FaceIdentifier::from_bits(32)));
        let wild = FaceIdentifier::with_any_part(FaceIdentifier::from_bits(1));
        assert_eq!(wild.child_mask(0), Some(FaceIdentifier::from_bits(1)));
        assert_eq!(FaceIdentifier::from_bits(1).child_mask(0), None);
    }

    #[test]
    fn split_first_peels_one_level() {
        let face = FaceIdentifier::nested(1, FaceIdentifier::nested(0, FaceIdentifier::from_bits(4)));
        let (first, rest) = face.split_first().unwrap_or((Part::Any, FaceIdentifier::none()));
        assert_eq!(first, Part::Index(1));
        assert_eq!(rest, FaceIdentifier::nested(0, FaceIdentifier::from_bits(4)));
        assert!(FaceIdentifier::from_bits(4).split_first().is_none());
    }
}
