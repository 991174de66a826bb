//! Command-line driver: parse a scale and the two tuning parameters, run
//! the reduction, print the report table and, when the target cannot be
//! met, the warning.

use clap::Parser;
use num_rational::Ratio;
use reducere_core::{harmonic_reduce, JustRatio, ReduceConfig, Scale};

/// Adjust a just intonation scale to lie lower in the harmonic series.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scale ratios as exact fractions ("16/15 9/8 ... 2"); the octave 2
    /// must be present. Defaults to the twelve-note just chromatic scale.
    #[arg(value_parser = parse_ratio)]
    ratios: Vec<JustRatio>,

    /// Number of notes allowed to be changed.
    #[arg(long, default_value_t = 3)]
    max_changes: usize,

    /// Target maximum harmonic in the adjusted scale.
    #[arg(long, default_value_t = 200)]
    max_harmonic: i64,
}

fn parse_ratio(s: &str) -> Result<JustRatio, String> {
    let (numer, denom) = match s.split_once('/') {
        Some((n, d)) => (n, d),
        None => (s, "1"),
    };
    let numer: i64 = numer
        .trim()
        .parse()
        .map_err(|_| format!("invalid numerator in {s:?}"))?;
    let denom: i64 = denom
        .trim()
        .parse()
        .map_err(|_| format!("invalid denominator in {s:?}"))?;
    if denom == 0 {
        return Err(format!("zero denominator in {s:?}"));
    }
    Ok(Ratio::new(numer, denom))
}

/// The twelve-note just chromatic scale.
fn default_scale() -> Vec<JustRatio> {
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
    .map(|(p, q)| Ratio::new(p, q))
    .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let ratios = if args.ratios.is_empty() {
        default_scale()
    } else {
        args.ratios
    };
    let scale = Scale::new(ratios)?;
    let cfg = ReduceConfig {
        max_changes: args.max_changes,
        max_harmonic: args.max_harmonic,
    };

    let report = harmonic_reduce(&scale, &cfg)?;
    print!("{report}");
    if !report.target_met() {
        println!(
            "Warning: could not get under {} harmonics with only {} changes",
            args.max_harmonic, args.max_changes
        );
    }
    Ok(())
}
