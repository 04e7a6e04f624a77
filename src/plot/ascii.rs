//! ASCII histograms for terminal output.
//!
//! This is intentionally "dumb" (fixed bin count, one row per bin), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output
//!
//! Row markers:
//! - `*`: the bin holding the true value
//! - `+`: bins overlapping the ±10% band around the truth

use crate::math::{quantile_sorted, sorted_finite};
use crate::report::Parameter;

/// Fraction of the extreme tails cut from the plotted range.
///
/// Unbounded fits occasionally land far from the truth; plotting the full
/// range would squash the bulk of the distribution into one bin.
const TAIL_TRIM: f64 = 0.005;

/// Render a horizontal histogram of `estimates`.
pub fn render_histogram(parameter: Parameter, estimates: &[f64], truth: f64, bins: usize, width: usize) -> String {
    let bins = bins.max(3);
    let width = width.max(10);

    let sorted = sorted_finite(estimates);
    let mut out = String::new();
    out.push_str(&format!(
        "{} (n={}, truth={truth:.4e})\n",
        parameter.display_name(),
        estimates.len()
    ));

    let Some((lo, hi)) = plot_range(&sorted, truth) else {
        out.push_str("(no finite estimates)\n");
        return out;
    };

    let step = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    let mut clipped = 0usize;
    for &v in &sorted {
        if v < lo || v > hi {
            clipped += 1;
            continue;
        }
        let idx = (((v - lo) / step) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    let band = (truth - truth.abs() * 0.1, truth + truth.abs() * 0.1);

    for (i, &count) in counts.iter().enumerate() {
        let b0 = lo + step * i as f64;
        let b1 = b0 + step;
        let marker = if truth >= b0 && (truth < b1 || (i == bins - 1 && truth <= b1)) {
            '*'
        } else if b1 > band.0 && b0 < band.1 {
            '+'
        } else {
            ' '
        };
        let bar_len = (count as f64 / max_count as f64 * width as f64).round() as usize;
        let line = format!("{marker} {b0:>11.4e} | {}{} {count}", "#".repeat(bar_len), " ".repeat(width - bar_len));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if clipped > 0 {
        out.push_str(&format!("({clipped} estimate(s) outside the plotted range)\n"));
    }

    out
}

fn plot_range(sorted: &[f64], truth: f64) -> Option<(f64, f64)> {
    let lo = quantile_sorted(sorted, TAIL_TRIM)?;
    let hi = quantile_sorted(sorted, 1.0 - TAIL_TRIM)?;
    let (lo, hi) = (lo.min(truth), hi.max(truth));
    if hi > lo {
        Some((lo, hi))
    } else {
        // Degenerate (e.g. noise-free) sample: widen around the value.
        let pad = lo.abs().max(f64::MIN_POSITIVE) * 0.05;
        Some((lo - pad, hi + pad))
    }
}
