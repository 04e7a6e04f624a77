//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized

use crate::domain::KineticDesign;
use crate::report::{ParameterSummary, RunSummary};

/// One row of a design sweep: the design that was run and its summary.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub design: KineticDesign,
    pub summary: RunSummary,
}

/// Format the full run summary (design + both parameter distributions).
pub fn format_run_summary(design: &KineticDesign, summary: &RunSummary, seed: u64) -> String {
    let mut out = String::new();

    out.push_str("=== kmsim - Michaelis-Menten Monte Carlo ===\n");
    out.push_str(&format!(
        "Truth: v_max={:.3e} | k_m={:.3e}\n",
        design.max_velocity, design.michaelis_constant
    ));
    out.push_str(&format!(
        "Design: points={} | max [S]={:.3e} | min [S]={:.3e}\n",
        design.data_points_num,
        design.max_concentration,
        design.max_concentration / 2f64.powi(design.data_points_num.saturating_sub(1) as i32),
    ));
    out.push_str(&format!(
        "Noise: relative error={:.3} | repetitions={}\n",
        design.relative_error, design.repetitions
    ));
    out.push_str(&format!("Simulations: {} | seed={seed}\n", design.simulations));
    if summary.unconverged_trials > 0 {
        out.push_str(&format!(
            "Note: {} fit(s) stopped at the iteration cap.\n",
            summary.unconverged_trials
        ));
    }
    out.push('\n');

    out.push_str(&format_parameter(&summary.michaelis_constant));
    out.push('\n');
    out.push_str(&format_parameter(&summary.max_velocity));

    out
}

/// Format one parameter block: location/spread and tolerance-band coverage.
pub fn format_parameter(s: &ParameterSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} ({}):\n", s.parameter.display_name(), s.parameter.short_name()));
    out.push_str(&format!("- truth : {:.4e}\n", s.truth));
    out.push_str(&format!(
        "- mean  : {} (bias {})\n",
        fmt_opt(s.mean),
        s.relative_bias().map(fmt_pct).unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!("- std   : {}\n", fmt_opt(s.std_dev)));
    out.push_str(&format!("- median: {}\n", fmt_opt(s.median)));
    out.push_str(&format!("- 95%   : [{}, {}]\n", fmt_opt(s.q025), fmt_opt(s.q975)));
    if s.n_non_finite > 0 {
        out.push_str(&format!("- non-finite estimates: {}\n", s.n_non_finite));
    }
    for band in &s.bands {
        out.push_str(&format!(
            "  ± {:>2.0}%: {:>5.1}%  ({:.4e} .. {:.4e})\n",
            band.fraction * 100.0,
            band.probability * 100.0,
            band.lower,
            band.upper
        ));
    }

    out
}

/// Format a sweep table (one line per design).
pub fn format_sweep(rows: &[SweepRow]) -> String {
    let mut out = String::new();

    out.push_str(
        format!(
            "{:>8} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10}\n",
            "rel_err", "reps", "points", "k_m ±10%", "k_m ±20%", "vmax ±10%", "vmax ±20%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<8} {:-<6} {:-<6} {:-<10} {:-<10} {:-<10} {:-<10}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in rows {
        let d = &row.design;
        let s = &row.summary;
        out.push_str(
            format!(
                "{:>8.3} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10}\n",
                d.relative_error,
                d.repetitions,
                d.data_points_num,
                band_pct(&s.michaelis_constant, 0.1),
                band_pct(&s.michaelis_constant, 0.2),
                band_pct(&s.max_velocity, 0.1),
                band_pct(&s.max_velocity, 0.2),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn band_pct(s: &ParameterSummary, fraction: f64) -> String {
    s.band(fraction)
        .map(|b| format!("{:.1}%", b.probability * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4e}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_pct(v: f64) -> String {
    format!("{:+.2}%", v * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EstimateCollections;
    use crate::report::summarize_run;

    fn sample_summary(design: &KineticDesign) -> RunSummary {
        let estimates = EstimateCollections {
            max_velocities: vec![design.max_velocity * 0.95, design.max_velocity * 1.05],
            michaelis_constants: vec![design.michaelis_constant * 0.5, design.michaelis_constant * 1.15],
            unconverged_trials: 0,
        };
        summarize_run(design, &estimates)
    }

    #[test]
    fn run_summary_lists_both_parameters_and_bands() {
        let design = KineticDesign::default();
        let text = format_run_summary(&design, &sample_summary(&design), 42);
        assert!(text.contains("Michaelis constant (k_m)"));
        assert!(text.contains("Maximum velocity (v_max)"));
        assert!(text.contains("seed=42"));
        assert_eq!(text.matches("± 10%").count(), 2);
        assert!(!text.contains("iteration cap"));
    }

    #[test]
    fn sweep_table_has_one_line_per_row() {
        let design = KineticDesign::default();
        let rows: Vec<SweepRow> = (1..=3)
            .map(|reps| {
                let d = KineticDesign { repetitions: reps, ..design };
                SweepRow {
                    design: d,
                    summary: sample_summary(&d),
                }
            })
            .collect();
        let text = format_sweep(&rows);
        assert_eq!(text.lines().count(), 2 + 3);
        assert!(text.lines().nth(2).unwrap().contains("100.0%"));
    }
}
