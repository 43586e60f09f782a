//! Row-level cleaning of the record table.
//!
//! Currently this is exact-duplicate removal: rows identical across every
//! column are dropped, keeping the first occurrence and the original order.

use crate::error::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Drops exact duplicate rows.
pub struct Deduplicator;

impl Deduplicator {
    /// Number of rows that duplicate an earlier row.
    pub fn count_duplicates(df: &DataFrame) -> Result<usize> {
        let unique = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        Ok(df.height() - unique.height())
    }

    /// Remove exact duplicate rows, keeping the first occurrence.
    ///
    /// Returns the deduplicated table and the number of rows removed.
    /// Running it on an already deduplicated table is a no-op.
    pub fn remove_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = df.height() - deduped.height();
        info!("Duplicate rows: {} of {}", removed, df.height());

        if removed == 0 {
            debug!("No duplicate rows found");
            return Ok((df, 0));
        }

        info!("Rows after duplicate removal: {}", deduped.height());
        Ok((deduped, removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> DataFrame {
        df![
            "Yas" => [Some(45.0), Some(45.0), None, Some(60.0)],
            "TedaviSuresi" => ["5 seans", "5 seans", "10 seans", "5 seans"],
        ]
        .unwrap()
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let (df, removed) = Deduplicator::remove_duplicates(records()).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(df.height(), 3);

        let ages: Vec<Option<f64>> = df.column("Yas").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(ages, vec![Some(45.0), None, Some(60.0)]);
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let (once, _) = Deduplicator::remove_duplicates(records()).unwrap();
        let (twice, removed) = Deduplicator::remove_duplicates(once.clone()).unwrap();
        assert_eq!(removed, 0);
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_count_duplicates() {
        assert_eq!(Deduplicator::count_duplicates(&records()).unwrap(), 1);
    }

    #[test]
    fn test_partial_duplicates_are_kept() {
        let df = df![
            "a" => [1, 1],
            "b" => ["x", "y"],
        ]
        .unwrap();
        let (df, removed) = Deduplicator::remove_duplicates(df).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_signed_zero_rows_are_duplicates() {
        let df = df![
            "Yas" => [0.0, -0.0],
            "Bolum" => ["FTR", "FTR"],
        ]
        .unwrap();
        assert_eq!(Deduplicator::count_duplicates(&df).unwrap(), 1);

        let (df, removed) = Deduplicator::remove_duplicates(df).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(df.height(), 1);
    }
}
