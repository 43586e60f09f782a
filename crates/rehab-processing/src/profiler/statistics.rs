//! Statistical functions for column profiling and diagnostics.

use crate::error::Result;
use crate::types::{CorrelationMatrix, DescribeStats, Histogram};
use crate::utils::ordered_value_counts;
use polars::prelude::*;
use std::collections::HashSet;

/// Describe a `Float64` column: count, mean, sample std, min, quartiles, max.
///
/// Nulls are ignored; an all-null column gives an empty description.
pub(crate) fn describe_numeric(series: &Series) -> Result<DescribeStats> {
    let present = series.drop_nulls();
    let count = present.len();
    if count == 0 {
        return Ok(DescribeStats::default());
    }

    let quantile = |q: f64| -> Result<Option<f64>> {
        Ok(present
            .quantile_reduce(q, QuantileMethod::Linear)?
            .value()
            .extract::<f64>())
    };

    Ok(DescribeStats {
        count,
        mean: present.mean(),
        std: present.std(1),
        min: present.min::<f64>()?,
        q25: quantile(0.25)?,
        median: present.median(),
        q75: quantile(0.75)?,
        max: present.max::<f64>()?,
        ..DescribeStats::default()
    })
}

/// Describe a text column: count, unique, most frequent value and its count.
///
/// Ties for the most frequent value go to the first one encountered.
pub(crate) fn describe_text(values: &[Option<String>]) -> DescribeStats {
    let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    let unique = present.iter().collect::<HashSet<_>>().len();
    let top = ordered_value_counts(present.iter().copied()).into_iter().next();

    DescribeStats {
        count: present.len(),
        unique: Some(unique),
        freq: top.as_ref().map(|(_, n)| *n),
        top: top.map(|(v, _)| v),
        ..DescribeStats::default()
    }
}

/// Equal-width histogram over `values`; `None` when there are no values.
///
/// The last bin is closed on the right. A constant column gets the range
/// `[v - 0.5, v + 0.5]` so it still has width.
pub(crate) fn histogram(title: &str, values: &[f64], bins: usize) -> Option<Histogram> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram {
        title: title.to_string(),
        edges,
        counts,
    })
}

/// Pearson correlation over rows where both values are present.
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Pairwise Pearson matrix over named columns.
pub(crate) fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|(_, x)| columns.iter().map(|(_, y)| pearson(x, y)).collect())
        .collect();

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_numeric() {
        let series = Series::new("Yas".into(), &[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)]);
        let stats = describe_numeric(&series).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.median, Some(2.5));
        assert_eq!(stats.q75, Some(3.25));
        assert_eq!(stats.max, Some(4.0));
        let std = stats.std.unwrap();
        assert!((std - 1.2909944).abs() < 1e-6);
    }

    #[test]
    fn test_describe_numeric_empty() {
        let series = Series::new("Yas".into(), &[None::<f64>, None]);
        let stats = describe_numeric(&series).unwrap();
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
    }

    #[test]
    fn test_describe_text() {
        let values: Vec<Option<String>> = [Some("Kadın"), Some("Erkek"), None, Some("Kadın")]
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        let stats = describe_text(&values);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.unique, Some(2));
        assert_eq!(stats.top.as_deref(), Some("Kadın"));
        assert_eq!(stats.freq, Some(2));
    }

    #[test]
    fn test_single_value_std_undefined() {
        let series = Series::new("Yas".into(), &[5.0]);
        let stats = describe_numeric(&series).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.median, Some(5.0));
        assert_eq!(stats.std, None);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [1.0, 2.0, 2.5, 10.0];
        let hist = histogram("Yas", &values, 3).unwrap();
        assert_eq!(hist.edges.len(), 4);
        assert_eq!(hist.edges[0], 1.0);
        assert_eq!(hist.edges[3], 10.0);
        assert_eq!(hist.counts, vec![3, 0, 1]);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn test_histogram_constant_and_empty() {
        let hist = histogram("x", &[7.0, 7.0], 4).unwrap();
        assert_eq!(hist.total(), 2);
        assert!(histogram("x", &[], 4).is_none());
    }

    #[test]
    fn test_pearson() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let inverse = [Some(3.0), Some(2.0), Some(1.0), None];
        assert!((pearson(&x, &inverse).unwrap() + 1.0).abs() < 1e-12);

        let constant = [Some(1.0), Some(1.0), Some(1.0), None];
        assert_eq!(pearson(&x, &constant), None);
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let columns = vec![
            ("a".to_string(), vec![Some(1.0), Some(2.0), Some(4.0)]),
            ("b".to_string(), vec![Some(3.0), Some(1.0), Some(2.0)]),
        ];
        let matrix = correlation_matrix(&columns);
        assert_eq!(matrix.get("a", "b"), matrix.get("b", "a"));
        assert!((matrix.get("a", "a").unwrap() - 1.0).abs() < 1e-12);
    }
}
