//! Integer model of a harmonic assignment.
//!
//! Each note gets a positive integer harmonic number `x` taken relative to
//! the octave's harmonic `x2` (the base). The signed deviation term
//!
//! ```text
//! u = 2q * x - p * x2        (note ratio p/q in lowest terms)
//! ```
//!
//! is zero exactly when `x / x2 == (p/q) / 2` holds as exact rational
//! arithmetic; the cross-multiplied form keeps the relation linear, since
//! division is not expressible in integer linear constraints. With p and q
//! coprime, a zero deviation forces `2q / gcd(2, p)` to divide the base;
//! that per-note divisor drives the reduction pass.
//!
//! Variable bounds are derived from the exact baseline base harmonic rather
//! than a fixed huge constant: the all-aligned assignment at that base stays
//! feasible in every pass, so every pass has an optimum with `x2` at or
//! below it, and each note's harmonic near `x2 * p / (2q)`.

use num_integer::Integer;

use crate::scale::{Scale, ScaleError};

/// Coefficients and bounds for one note.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NoteTerm {
    /// Numerator of the note's ratio in lowest terms.
    pub numer: i64,
    /// Denominator of the note's ratio in lowest terms.
    pub denom: i64,
    /// Exact alignment requires this to divide the base: 2q / gcd(2, p).
    pub divisor: i64,
    /// Coefficient of the note's own harmonic in the alignment relation: 2q.
    pub own_coeff: f64,
    /// Coefficient of the base harmonic in the alignment relation: p.
    pub base_coeff: f64,
    /// Upper bound for the note's harmonic number.
    pub harmonic_bound: f64,
}

/// Shared data for every pass over one scale.
#[derive(Clone, Debug)]
pub(crate) struct HarmonicModel {
    pub terms: Vec<NoteTerm>,
    /// Index of the octave's term; its harmonic is the base.
    pub octave: usize,
    /// Exact minimal base harmonic with every note aligned (lcm arithmetic,
    /// no solver involved). Upper-bounds the optimal base of every pass.
    pub baseline_base: i64,
}

impl HarmonicModel {
    pub fn build(scale: &Scale) -> Result<Self, ScaleError> {
        let baseline_base = scale.baseline_base_harmonic()?;
        let mut terms = Vec::with_capacity(scale.len());
        for r in scale.notes() {
            let (p, q) = (*r.numer(), *r.denom());
            let two_q = q.checked_mul(2).ok_or(ScaleError::HarmonicRange)?;
            // Aligned harmonic at the baseline base, rounded up, plus one
            // unit of slack for rounding at smaller bases. Signed div_ceil
            // is not stable, so the ceiling is spelled out.
            let aligned = baseline_base
                .checked_mul(p)
                .ok_or(ScaleError::HarmonicRange)?;
            let harmonic_bound = aligned
                .checked_add(two_q - 1)
                .ok_or(ScaleError::HarmonicRange)?
                / two_q
                + 1;
            terms.push(NoteTerm {
                numer: p,
                denom: q,
                divisor: two_q / p.gcd(&2),
                own_coeff: two_q as f64,
                base_coeff: p as f64,
                harmonic_bound: harmonic_bound as f64,
            });
        }
        Ok(Self {
            terms,
            octave: scale.octave_index(),
            baseline_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use num_rational::Ratio;

    use super::*;
    use crate::scale::octave;

    #[test]
    fn bounds_cover_the_aligned_assignment() {
        let scale = Scale::new(vec![
            Ratio::new(9, 8),
            Ratio::new(4, 3),
            Ratio::new(3, 2),
            octave(),
        ])
        .unwrap();
        let model = HarmonicModel::build(&scale).unwrap();
        assert_eq!(model.baseline_base, 48);
        for (term, ratio) in model.terms.iter().zip(scale.notes()) {
            // x = base * p / (2q) must fit under the bound.
            let aligned = model.baseline_base * ratio.numer() / (2 * ratio.denom());
            assert!(term.harmonic_bound >= aligned as f64);
            assert_eq!(model.baseline_base % term.divisor, 0);
        }
    }

    #[test]
    fn harmonic_bounds_round_the_aligned_harmonic_up() {
        // 3/2 over base 4: aligned harmonic 3, so the bound is 4.
        let scale = Scale::new(vec![Ratio::new(3, 2), octave()]).unwrap();
        let model = HarmonicModel::build(&scale).unwrap();
        assert_eq!(model.baseline_base, 4);
        assert_eq!(model.terms[0].harmonic_bound, 4.0);
        assert_eq!(model.terms[1].harmonic_bound, 5.0);
    }

    #[test]
    fn alignment_divisors_follow_numerator_parity() {
        let scale = Scale::new(vec![
            Ratio::new(3, 2),  // odd numerator: divisor 2q = 4
            Ratio::new(4, 3),  // even numerator: divisor q = 3
            Ratio::new(16, 15), // even numerator: divisor 15
            octave(),          // divisor 1
        ])
        .unwrap();
        let model = HarmonicModel::build(&scale).unwrap();
        let divisors: Vec<i64> = model.terms.iter().map(|t| t.divisor).collect();
        assert_eq!(divisors, vec![4, 3, 15, 1]);
    }

    #[test]
    fn octave_term_has_unit_coefficients() {
        let scale = Scale::new(vec![Ratio::new(3, 2), octave()]).unwrap();
        let model = HarmonicModel::build(&scale).unwrap();
        let oct = &model.terms[model.octave];
        // For 2/1 the deviation is 2 * x2 - 2 * x2, identically zero.
        assert_eq!(oct.own_coeff, 2.0);
        assert_eq!(oct.base_coeff, 2.0);
        assert_eq!(oct.divisor, 1);
    }
}
