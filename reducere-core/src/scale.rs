//! Scale input handling.
//!
//! A scale is an ordered sequence of distinct positive rationals that must
//! contain the octave 2/1; the octave anchors every harmonic assignment, so
//! a scale without it has no base harmonic to speak of. Order is musically
//! meaningful and preserved through every downstream table.
//!
//! Validation happens up front, before any solver is touched: a bad scale is
//! a caller error, never a solver outcome.

use num_integer::Integer;
use num_rational::Ratio;
use thiserror::Error;

/// An exact just intonation ratio.
pub type JustRatio = Ratio<i64>;

/// The octave, 2/1.
pub fn octave() -> JustRatio {
    Ratio::from_integer(2)
}

#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("scale must contain the octave 2/1")]
    MissingOctave,
    #[error("duplicate ratio {0} in scale")]
    DuplicateRatio(JustRatio),
    #[error("ratio {0} is not positive")]
    NonPositiveRatio(JustRatio),
    #[error("harmonic numbers for this scale exceed the supported integer range")]
    HarmonicRange,
}

/// Ordered, duplicate-free sequence of just ratios including the octave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scale {
    notes: Vec<JustRatio>,
    octave_idx: usize,
}

impl Scale {
    /// Validate and build a scale. Ratios are kept in the given order;
    /// `Ratio` construction has already reduced them to lowest terms.
    pub fn new(notes: impl IntoIterator<Item = JustRatio>) -> Result<Self, ScaleError> {
        let notes: Vec<JustRatio> = notes.into_iter().collect();
        for (i, r) in notes.iter().enumerate() {
            if *r <= Ratio::from_integer(0) {
                return Err(ScaleError::NonPositiveRatio(*r));
            }
            if notes[..i].contains(r) {
                return Err(ScaleError::DuplicateRatio(*r));
            }
        }
        let octave_idx = notes
            .iter()
            .position(|r| *r == octave())
            .ok_or(ScaleError::MissingOctave)?;
        Ok(Self { notes, octave_idx })
    }

    pub fn notes(&self) -> &[JustRatio] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Position of the octave within the scale.
    pub fn octave_index(&self) -> usize {
        self.octave_idx
    }

    /// Smallest base harmonic under which every note is exactly aligned:
    /// the octave sits at harmonic `b` and each p/q at `b * p / (2q)`.
    ///
    /// With p and q coprime, integrality of `b * p / (2q)` forces
    /// `2q / gcd(2, p)` to divide `b`, so the answer is the lcm of those
    /// divisors over the scale.
    pub fn baseline_base_harmonic(&self) -> Result<i64, ScaleError> {
        let mut base: i64 = 1;
        for r in &self.notes {
            let (p, q) = (*r.numer(), *r.denom());
            let two_q = q.checked_mul(2).ok_or(ScaleError::HarmonicRange)?;
            let divisor = two_q / p.gcd(&2);
            base = lcm_checked(base, divisor)?;
        }
        Ok(base)
    }
}

fn lcm_checked(a: i64, b: i64) -> Result<i64, ScaleError> {
    let g = a.gcd(&b);
    (a / g).checked_mul(b).ok_or(ScaleError::HarmonicRange)
}
