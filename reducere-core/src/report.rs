//! Result assembly: one ordered row per scale position, combining the
//! baseline and reduced assignments with original/adjusted ratios and cent
//! values. `Display` renders the aligned table; cent columns are rounded to
//! two decimals for presentation while the ratio columns stay exact.

use std::fmt;

use num_rational::Ratio;

use crate::common::{ratio_to_cents, round2};
use crate::reduce::Reduction;
use crate::scale::{JustRatio, Scale};

/// One scale position, original and adjusted.
#[derive(Clone, Debug)]
pub struct ScaleRow {
    pub ratio: JustRatio,
    /// Harmonic number in the baseline (all-exact) assignment.
    pub harmonic: i64,
    /// Adjusted ratio in lowest terms: reduce(2 * new_harmonic, new base).
    pub new_ratio: JustRatio,
    /// Harmonic number in the reduced assignment.
    pub new_harmonic: i64,
    pub cents: f64,
    pub new_cents: f64,
    pub cent_diff: f64,
}

/// Full reduction report in scale order.
#[derive(Clone, Debug)]
pub struct ReduceReport {
    pub rows: Vec<ScaleRow>,
    /// Overshoot of the reduced base past the requested ceiling.
    pub violation: i64,
}

impl ReduceReport {
    pub(crate) fn assemble(scale: &Scale, reduction: &Reduction) -> Self {
        let base = reduction.reduced.base;
        let rows = scale
            .notes()
            .iter()
            .enumerate()
            .map(|(idx, ratio)| {
                let new_harmonic = reduction.reduced.harmonics[idx];
                let new_ratio = Ratio::new(2 * new_harmonic, base);
                let cents = ratio_to_cents(ratio);
                let new_cents = ratio_to_cents(&new_ratio);
                ScaleRow {
                    ratio: *ratio,
                    harmonic: reduction.baseline.harmonics[idx],
                    new_ratio,
                    new_harmonic,
                    cents: round2(cents),
                    new_cents: round2(new_cents),
                    cent_diff: round2(new_cents - cents),
                }
            })
            .collect();
        Self {
            rows,
            violation: reduction.violation,
        }
    }

    /// Notes whose adjusted ratio differs from the original.
    pub fn changed(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.ratio != row.new_ratio)
            .count()
    }

    pub fn target_met(&self) -> bool {
        self.violation == 0
    }
}

impl fmt::Display for ReduceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8}  {:>9}  {:>10}  {:>13}  {:>8}  {:>10}  {:>10}",
            "ratio", "harmonic", "new_ratio", "new_harmonic", "cents", "new_cents", "cent_diff"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>8}  {:>9}  {:>10}  {:>13}  {:>8.2}  {:>10.2}  {:>10.2}",
                row.ratio.to_string(),
                row.harmonic,
                row.new_ratio.to_string(),
                row.new_harmonic,
                row.cents,
                row.new_cents,
                row.cent_diff
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::{run_reduce, ReduceConfig};

    fn pentatonic() -> Scale {
        Scale::new(
            [(9, 8), (5, 4), (4, 3), (3, 2), (2, 1)]
                .into_iter()
                .map(|(p, q)| Ratio::new(p, q)),
        )
        .unwrap()
    }

    #[test]
    fn rows_follow_scale_order_and_round_cents() {
        let scale = pentatonic();
        let cfg = ReduceConfig {
            max_changes: 0,
            max_harmonic: 48,
        };
        let reduction = run_reduce(&scale, &cfg).unwrap();
        let report = ReduceReport::assemble(&scale, &reduction);

        assert_eq!(report.rows.len(), 5);
        assert!(report.target_met());
        assert_eq!(report.changed(), 0);
        for (row, ratio) in report.rows.iter().zip(scale.notes()) {
            assert_eq!(row.ratio, *ratio);
            assert_eq!(row.new_ratio, *ratio);
            assert_eq!(row.cent_diff, 0.0);
        }
        let octave_row = report.rows.last().unwrap();
        assert_eq!(octave_row.cents, 1200.0);
        assert_eq!(octave_row.harmonic, 48);
        assert_eq!(octave_row.new_harmonic, 48);
    }

    #[test]
    fn chromatic_report_rounds_retuned_cents() {
        let scale = Scale::new(
            [
                (16, 15),
                (9, 8),
                (6, 5),
                (5, 4),
                (4, 3),
                (45, 32),
                (3, 2),
                (8, 5),
                (5, 3),
                (9, 5),
                (15, 8),
                (2, 1),
            ]
            .into_iter()
            .map(|(p, q)| Ratio::new(p, q)),
        )
        .unwrap();
        let reduction = run_reduce(&scale, &ReduceConfig::default()).unwrap();
        let report = ReduceReport::assemble(&scale, &reduction);

        assert!(report.target_met());
        assert_eq!(report.changed(), 3);
        // 9/8 retunes to 67/60, 45/32 to 7/5, 15/8 to 28/15.
        let near = |a: f64, b: f64| (a - b).abs() < 1e-9;
        let second = &report.rows[1];
        assert_eq!(second.new_ratio, Ratio::new(67, 60));
        assert!(near(second.cents, 203.91));
        assert!(near(second.new_cents, 191.04));
        assert!(near(second.cent_diff, -12.87));
        let tritone = &report.rows[5];
        assert_eq!(tritone.new_ratio, Ratio::new(7, 5));
        assert!(near(tritone.new_cents, 582.51));
        assert!(near(tritone.cent_diff, -7.71));
        let seventh = &report.rows[10];
        assert_eq!(seventh.new_ratio, Ratio::new(28, 15));
        assert!(near(seventh.cent_diff, -7.71));
        for idx in [0, 2, 3, 4, 6, 7, 8, 9, 11] {
            assert!(near(report.rows[idx].cent_diff, 0.0));
        }
    }

    #[test]
    fn table_rendering_keeps_integral_ratios_bare() {
        let scale = pentatonic();
        let cfg = ReduceConfig {
            max_changes: 0,
            max_harmonic: 48,
        };
        let reduction = run_reduce(&scale, &cfg).unwrap();
        let rendered = ReduceReport::assemble(&scale, &reduction).to_string();

        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("new_harmonic"));
        assert!(rendered.contains("1200.00"));
        // The octave prints as "2", not "2/1".
        let octave_line = rendered.lines().last().unwrap();
        assert!(octave_line.trim_start().starts_with('2'));
        assert!(!octave_line.contains("2/1"));
    }
}
