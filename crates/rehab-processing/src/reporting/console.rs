//! Human-readable diagnostics on stdout.
//!
//! Note: this sink uses `println!` intentionally; it is user-facing CLI
//! output, not logging.

use super::DiagnosticsSink;
use crate::types::{CategoryCounts, CorrelationMatrix, DatasetProfile, FinalDiagnostics, Histogram};

const BAR_WIDTH: usize = 40;

/// Prints profiles and diagnostics as text tables and histograms.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDiagnostics;

impl DiagnosticsSink for ConsoleDiagnostics {
    fn on_profile(&self, profile: &DatasetProfile) {
        section("DATASET OVERVIEW");
        println!("  Rows: {}", profile.shape.0);
        println!("  Columns: {}", profile.shape.1);
        println!(
            "  Duplicate rows: {} ({:.1}%)",
            profile.duplicate_count, profile.duplicate_percentage
        );
        println!("  Missing values: {}", profile.total_missing());
        println!();

        section("COLUMN PROFILES");
        println!(
            "  {:<24} {:<10} {:>8} {:>8} {:>8}",
            "Column", "Type", "Missing", "Missing%", "Unique"
        );
        println!("  {}", "-".repeat(62));
        for col in &profile.column_profiles {
            println!(
                "  {:<24} {:<10} {:>8} {:>7.1}% {:>8}",
                truncate(&col.name, 24),
                truncate(&col.dtype, 10),
                col.null_count,
                col.null_percentage,
                col.unique_count
            );
        }
        println!();

        section("DESCRIPTIVE STATISTICS");
        for col in &profile.column_profiles {
            let s = &col.stats;
            match (s.mean, &s.top) {
                (Some(mean), _) => println!(
                    "  {:<24} count={} mean={:.2} std={} min={} 25%={} 50%={} 75%={} max={}",
                    truncate(&col.name, 24),
                    s.count,
                    mean,
                    fmt_opt(s.std),
                    fmt_opt(s.min),
                    fmt_opt(s.q25),
                    fmt_opt(s.median),
                    fmt_opt(s.q75),
                    fmt_opt(s.max)
                ),
                (None, Some(top)) => println!(
                    "  {:<24} count={} unique={} top={:?} freq={}",
                    truncate(&col.name, 24),
                    s.count,
                    s.unique.unwrap_or(0),
                    top,
                    s.freq.unwrap_or(0)
                ),
                (None, None) => println!("  {:<24} count={}", truncate(&col.name, 24), s.count),
            }
        }
        println!();

        if let Some(hist) = &profile.age_histogram {
            print_histogram(hist);
        }
        if let Some(hist) = &profile.treatment_duration_histogram {
            print_histogram(hist);
        }
        if let Some(matrix) = &profile.correlation {
            print_correlation(matrix);
        }
        if let Some(target) = &profile.target_distribution {
            print_counts(target);
        }
        for tokens in &profile.token_frequencies {
            print_counts(tokens);
        }
    }

    fn on_complete(&self, diagnostics: &FinalDiagnostics) {
        section("FINAL DATASET");
        println!("  Rows: {}", diagnostics.shape.0);
        println!("  Columns: {}", diagnostics.shape.1);
        println!();

        if let Some(hist) = &diagnostics.age_histogram {
            print_histogram(hist);
        }
        if let Some(hist) = &diagnostics.treatment_duration_histogram {
            print_histogram(hist);
        }
        print_counts(&diagnostics.age_group_counts);
    }
}

fn section(title: &str) {
    println!("{}", title);
    println!("{}", "-".repeat(40));
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(max))
}

fn print_histogram(hist: &Histogram) {
    section(&format!("HISTOGRAM: {}", hist.title));
    let max = hist.counts.iter().copied().max().unwrap_or(0);
    for (i, count) in hist.counts.iter().enumerate() {
        println!(
            "  [{:>8.2}, {:>8.2}{} {:>6} {}",
            hist.edges[i],
            hist.edges[i + 1],
            if i + 1 == hist.counts.len() { "]" } else { ")" },
            count,
            bar(*count, max)
        );
    }
    println!();
}

fn print_counts(counts: &CategoryCounts) {
    section(&format!("COUNTS: {}", counts.title));
    let max = counts.counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for (label, n) in &counts.counts {
        println!("  {:<30} {:>6} {}", truncate(label, 30), n, bar(*n, max));
    }
    println!();
}

fn print_correlation(matrix: &CorrelationMatrix) {
    section("CORRELATION MATRIX");
    print!("  {:<24}", "");
    for name in &matrix.columns {
        print!(" {:>16}", truncate(name, 16));
    }
    println!();
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("  {:<24}", truncate(name, 24));
        for value in row {
            print!(" {:>16}", fmt_opt(*value));
        }
        println!();
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Yas", 10), "Yas");
        assert_eq!(truncate("UygulamaSuresi_per_Seans", 10), "Uygulam...");
    }

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(1, 0), "");
        assert!(!bar(1, 1000).is_empty());
    }
}
