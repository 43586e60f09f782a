//! Ordinal age buckets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Age bucket with right-closed bounds: (0,30], (30,50], (50,70], (70,100].
///
/// Variants are declared in ascending order, so the derived `Ord` is the
/// ordinal order of the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Young,
    MiddleAged,
    Old,
    VeryOld,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Young,
        AgeGroup::MiddleAged,
        AgeGroup::Old,
        AgeGroup::VeryOld,
    ];

    /// Bucket boundaries, lowest first.
    pub const EDGES: [f64; 5] = [0.0, 30.0, 50.0, 70.0, 100.0];

    /// Bucket for an age, `None` outside (0, 100] or for NaN.
    pub fn from_age(age: f64) -> Option<Self> {
        Self::ALL
            .iter()
            .zip(Self::EDGES.windows(2))
            .find(|(_, bounds)| age > bounds[0] && age <= bounds[1])
            .map(|(group, _)| *group)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Young => "Genç",
            Self::MiddleAged => "Orta Yaş",
            Self::Old => "Yaşlı",
            Self::VeryOld => "Çok Yaşlı",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(AgeGroup::from_age(0.5), Some(AgeGroup::Young));
        assert_eq!(AgeGroup::from_age(30.0), Some(AgeGroup::Young));
        assert_eq!(AgeGroup::from_age(30.5), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(50.0), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(70.0), Some(AgeGroup::Old));
        assert_eq!(AgeGroup::from_age(70.1), Some(AgeGroup::VeryOld));
        assert_eq!(AgeGroup::from_age(100.0), Some(AgeGroup::VeryOld));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(AgeGroup::from_age(0.0), None);
        assert_eq!(AgeGroup::from_age(-3.0), None);
        assert_eq!(AgeGroup::from_age(100.5), None);
        assert_eq!(AgeGroup::from_age(f64::NAN), None);
    }

    #[test]
    fn test_ordering_and_labels() {
        assert!(AgeGroup::Young < AgeGroup::MiddleAged);
        assert!(AgeGroup::Old < AgeGroup::VeryOld);
        assert_eq!(AgeGroup::MiddleAged.to_string(), "Orta Yaş");
        assert_eq!(AgeGroup::VeryOld.label(), "Çok Yaşlı");
    }
}
