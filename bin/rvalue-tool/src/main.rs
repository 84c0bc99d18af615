//! Command-line tool for computing consistent sampling r-values from trace IDs, and for auditing that a generator's
//! r-values follow the expected distribution.

#![deny(warnings)]
#![deny(missing_docs)]

use anyhow::Context as _;
use clap::Parser as _;
use consistent_sampling::RValueGeneratorConfiguration;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod audit;

mod cli;
use self::cli::{Cli, Command};

mod generate;

const ENV_PREFIX: &str = "RVALUE";

fn main() {
    // Standard output carries r-values and reports, so logs go to standard error.
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = RValueGeneratorConfiguration::load(cli.config.as_deref(), ENV_PREFIX)
        .context("Failed to load r-value generator configuration.")?;
    if let Some(source) = cli.source {
        config.source = source.into();
    }

    let generator = config.build();
    info!(source = generator.source().as_str(), "Using r-value generator.");

    match cli.command {
        Command::Generate(args) => generate::run(&generator, args),
        Command::Audit(args) => audit::run(&generator, args),
    }
}
