//! Two-phase harmonic reduction.
//!
//! Phase 1 (baseline): every note is held exactly aligned and the base
//! harmonic is minimized as a small integer program, recovering the least
//! base under which the scale is exact. Its assignment fills the "harmonic"
//! column of the report.
//!
//! Phase 2 (reduction): at most `max_changes` notes may move off exact
//! alignment, the base may exceed `max_harmonic` only by a non-negative
//! violation slack, and the pair (violation, total |deviation|) is minimized
//! lexicographically. This phase is solved exactly by enumeration rather
//! than by a solver: a base keeps a note aligned precisely when the note's
//! divisor (see [`HarmonicModel`]) divides it, so the change budget admits
//! a base exactly when at most `max_changes` divisors fail to divide it.
//! The minimal violation falls out of a search over kept-note lcm values,
//! and the closest retuning out of a scan of the admissible bases, scoring
//! each candidate by its summed |deviation|. Ties between the two equally
//! close harmonics of a changed note go to the lower one.
//!
//! A nonzero final violation means the ceiling is out of reach within the
//! change budget; the result is still the best achievable and is returned
//! with a warning, not an error.

use good_lp::{default_solver, variable, variables, Expression, Solution, SolverModel, Variable};
use log::{debug, warn};
use num_integer::Integer;
use thiserror::Error;

use crate::model::{HarmonicModel, NoteTerm};
use crate::report::ReduceReport;
use crate::scale::{Scale, ScaleError};

#[derive(Debug, Error)]
pub enum ReduceError {
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error("max_harmonic must be a positive integer (got {0})")]
    InvalidMaxHarmonic(i64),
    /// The baseline model is feasible by construction, so a solver failure
    /// is a bug in the model (or a bound cut too tight), never a property
    /// of the scale.
    #[error("solver failed on a feasible model: {0}")]
    Solver(String),
}

/// Tuning parameters for the reduction pass.
#[derive(Clone, Debug)]
pub struct ReduceConfig {
    /// Number of notes allowed to move off exact alignment.
    pub max_changes: usize,
    /// Target ceiling for the base harmonic. Missing it within the change
    /// budget produces a warning, not an error.
    pub max_harmonic: i64,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            max_changes: 3,
            max_harmonic: 200,
        }
    }
}

/// One solved harmonic assignment: per-note harmonics plus the base (the
/// octave's harmonic in that pass).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarmonicAssignment {
    pub harmonics: Vec<i64>,
    pub base: i64,
}

/// Outcome of both phases.
#[derive(Clone, Debug)]
pub struct Reduction {
    /// Phase 1 assignment, always exactly aligned.
    pub baseline: HarmonicAssignment,
    /// Phase 2 assignment; exact for unchanged notes, approximate for the
    /// changed ones.
    pub reduced: HarmonicAssignment,
    /// Amount by which the reduced base overshoots `max_harmonic`; zero when
    /// the target was met.
    pub violation: i64,
}

impl Reduction {
    pub fn target_met(&self) -> bool {
        self.violation == 0
    }
}

/// Run both phases and assemble the report table.
pub fn harmonic_reduce(scale: &Scale, cfg: &ReduceConfig) -> Result<ReduceReport, ReduceError> {
    let reduction = run_reduce(scale, cfg)?;
    Ok(ReduceReport::assemble(scale, &reduction))
}

/// Run both phases and return the raw assignments.
pub fn run_reduce(scale: &Scale, cfg: &ReduceConfig) -> Result<Reduction, ReduceError> {
    if cfg.max_harmonic < 1 {
        return Err(ReduceError::InvalidMaxHarmonic(cfg.max_harmonic));
    }
    let model = HarmonicModel::build(scale)?;

    let baseline = solve_baseline(&model)?;
    debug!("baseline base harmonic: {}", baseline.base);

    let (reduced, violation) = reduce_pass(&model, cfg);
    debug!("reduced base harmonic: {}, violation {violation}", reduced.base);
    if violation != 0 {
        warn!(
            "could not get under {} harmonics with only {} changes (base harmonic reached {})",
            cfg.max_harmonic, cfg.max_changes, reduced.base
        );
    }

    Ok(Reduction {
        baseline,
        reduced,
        violation,
    })
}

// --------------------------- Baseline pass -----------------------------

/// Phase 1: minimize the base with every alignment relation held as an
/// equality. The exact lcm value is a known lower bound on the base, so
/// pinning it turns the solve into a verification instead of an open-ended
/// lattice search.
fn solve_baseline(model: &HarmonicModel) -> Result<HarmonicAssignment, ReduceError> {
    let base_bound = model.baseline_base as f64;
    let mut vars = variables!();
    let mut x: Vec<Variable> = Vec::with_capacity(model.terms.len());
    for (idx, term) in model.terms.iter().enumerate() {
        let min = if idx == model.octave { base_bound } else { 1.0 };
        x.push(vars.add(variable().integer().min(min).max(term.harmonic_bound)));
    }

    let mut problem = vars.minimise(single(x[model.octave])).using(default_solver);
    // Alignment: 2q * x - p * x2 == 0 for every note but the octave, whose
    // relation is the identity 2 * x2 == 2 * x2.
    for (idx, term) in model.terms.iter().enumerate() {
        if idx == model.octave {
            continue;
        }
        let mut def = Expression::with_capacity(2);
        def.add_mul(term.own_coeff, x[idx]);
        def.add_mul(-term.base_coeff, x[model.octave]);
        problem = problem.with(def.eq(0.0));
    }

    let solution = problem
        .solve()
        .map_err(|e| ReduceError::Solver(e.to_string()))?;
    let harmonics: Vec<i64> = x.iter().map(|v| as_integer(solution.value(*v))).collect();
    let base = harmonics[model.octave];
    Ok(HarmonicAssignment { harmonics, base })
}

fn single(var: Variable) -> Expression {
    let mut e = Expression::with_capacity(1);
    e.add_mul(1.0, var);
    e
}

/// The backend reports integer variables as near-integral floats.
fn as_integer(value: f64) -> i64 {
    value.round_ties_even() as i64
}

// --------------------------- Reduction pass -----------------------------

/// Phase 2, solved exactly. Returns the closest admissible assignment and
/// the minimal ceiling violation.
fn reduce_pass(model: &HarmonicModel, cfg: &ReduceConfig) -> (HarmonicAssignment, i64) {
    let budget = cfg.max_changes.min(model.terms.len());
    let divisors: Vec<i64> = model.terms.iter().map(|t| t.divisor).collect();

    // Phase 2a: the least admissible base is the smallest lcm reachable by
    // dropping up to `budget` divisors; bases below it misalign too many
    // notes, and it is admissible itself. The overshoot past the ceiling is
    // the minimal violation.
    let min_admissible = min_kept_lcm(&divisors, budget);
    let violation = (min_admissible - cfg.max_harmonic).max(0);

    // Phase 2b: with the violation locked, the base ranges over
    // 1..=max_harmonic + violation. When the baseline base itself is in
    // range the all-aligned assignment has deviation zero and wins outright.
    let cap = cfg.max_harmonic + violation;
    if cap >= model.baseline_base {
        return (aligned_assignment(model, model.baseline_base), violation);
    }

    let (mut best, _, mut best_deviation) = retune(model, min_admissible);
    for base in 1..=cap {
        if base == min_admissible {
            continue;
        }
        let (candidate, moved, deviation) = retune(model, base);
        if moved <= budget && deviation < best_deviation {
            best = candidate;
            best_deviation = deviation;
        }
    }
    debug!("reduction pass: base {}, total |deviation| {best_deviation}", best.base);
    (best, violation)
}

/// Smallest lcm of the divisors left after dropping up to `drops` of them.
/// Partial lcm values all divide the full-set lcm, which the model already
/// computed without overflow.
fn min_kept_lcm(divisors: &[i64], drops: usize) -> i64 {
    let Some((&d, rest)) = divisors.split_first() else {
        return 1;
    };
    let kept = min_kept_lcm(rest, drops).lcm(&d);
    if drops > 0 {
        kept.min(min_kept_lcm(rest, drops - 1))
    } else {
        kept
    }
}

/// Closest assignment over a fixed base: every note takes the integer
/// harmonic nearest to exact alignment. Returns the assignment, the number
/// of notes forced off exact alignment, and the summed |deviation|.
fn retune(model: &HarmonicModel, base: i64) -> (HarmonicAssignment, usize, i64) {
    let mut harmonics = Vec::with_capacity(model.terms.len());
    let mut moved = 0;
    let mut total = 0;
    for term in &model.terms {
        let (x, deviation) = nearest_harmonic(term, base);
        if deviation != 0 {
            moved += 1;
            total += deviation;
        }
        harmonics.push(x);
    }
    (HarmonicAssignment { harmonics, base }, moved, total)
}

/// Harmonic number minimizing |2q * x - p * base| for one note, with the
/// resulting |deviation|. Ties go to the lower harmonic; the harmonic never
/// drops below one.
fn nearest_harmonic(term: &NoteTerm, base: i64) -> (i64, i64) {
    let two_q = 2 * term.denom;
    let target = term.numer * base;
    let down = (target / two_q).max(1);
    let up = down + 1;
    let dev_down = (two_q * down - target).abs();
    let dev_up = (two_q * up - target).abs();
    if dev_down <= dev_up {
        (down, dev_down)
    } else {
        (up, dev_up)
    }
}

/// Exactly aligned assignment over a base every divisor divides.
fn aligned_assignment(model: &HarmonicModel, base: i64) -> HarmonicAssignment {
    let harmonics = model
        .terms
        .iter()
        .map(|term| term.numer * base / (2 * term.denom))
        .collect();
    HarmonicAssignment { harmonics, base }
}

// --------------------------- Tests -----------------------------
