use std::io::{self, Write};

use anyhow::{bail, Context as _};
use consistent_sampling::{
    distribution::{GoodnessOfFit, RValueHistogram},
    RValue, RValueGenerator, TraceId,
};
use rand::{rngs::SmallRng, Rng as _, SeedableRng as _};
use tracing::info;

use crate::cli::AuditArgs;

pub fn run<G>(generator: &G, args: AuditArgs) -> anyhow::Result<()>
where
    G: RValueGenerator,
{
    if args.samples == 0 {
        bail!("At least one sample is required.");
    }

    info!(samples = args.samples, seed = args.seed, "Generating r-values for random trace IDs...");
    let histogram = sample_histogram(generator, args.seed, args.samples);
    let fit = histogram.goodness_of_fit(args.min_expected);

    let stdout = io::stdout();
    let mut output = stdout.lock();
    write_report(&histogram, &fit, args.z, &mut output).context("Failed to write audit report.")?;

    if fit.degrees_of_freedom() == 0 {
        bail!(
            "Too few samples to test the distribution: no r-value is expected at least {} times in {} samples.",
            args.min_expected,
            args.samples
        );
    }

    if !fit.passes(args.z) {
        bail!(
            "R-value distribution does not match the expected distribution: chi-squared statistic {:.3} exceeds {:.3} \
             ({} degrees of freedom).",
            fit.statistic(),
            fit.critical_value(args.z),
            fit.degrees_of_freedom()
        );
    }

    info!("R-value distribution matches the expected distribution.");
    Ok(())
}

fn sample_histogram<G>(generator: &G, seed: u64, samples: u64) -> RValueHistogram
where
    G: RValueGenerator,
{
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..samples)
        .map(|_| generator.generate(&TraceId::from(rng.random::<u128>())))
        .collect()
}

fn write_report<W: Write>(histogram: &RValueHistogram, fit: &GoodnessOfFit, z: f64, output: &mut W) -> io::Result<()> {
    writeln!(output, "{:>3} {:>12} {:>16}", "r", "observed", "expected")?;
    for r in RValue::all() {
        let observed = histogram.count(r);
        if observed == 0 && r >= fit.pooled_tail_start() {
            continue;
        }
        writeln!(output, "{:>3} {:>12} {:>16.3}", r, observed, histogram.expected_count(r))?;
    }

    writeln!(output)?;
    writeln!(output, "samples:            {}", histogram.total())?;
    writeln!(output, "pooled tail:        r >= {}", fit.pooled_tail_start())?;
    writeln!(output, "degrees of freedom: {}", fit.degrees_of_freedom())?;
    writeln!(output, "chi-squared:        {:.3}", fit.statistic())?;
    writeln!(output, "critical value:     {:.3} (z = {})", fit.critical_value(z), z)?;
    writeln!(output, "result:             {}", if fit.passes(z) { "pass" } else { "fail" })
}
