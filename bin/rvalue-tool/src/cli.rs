use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use consistent_sampling::RandomBitsSource;

#[derive(Parser)]
#[command(about)]
pub struct Cli {
    /// Path to a YAML configuration file.
    ///
    /// Values from the file are overridden by `RVALUE_`-prefixed environment variables, such as `RVALUE_SOURCE`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where the random bits of each trace ID come from.
    ///
    /// Overrides the configuration file and environment.
    #[arg(long, global = true, value_enum)]
    pub source: Option<SourceArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Computes the r-value of each trace ID.
    ///
    /// Prints one `<trace ID> <r-value>` line per trace ID.
    Generate(GenerateArgs),

    /// Generates r-values for a seeded population of random trace IDs and checks them against the expected
    /// distribution.
    Audit(AuditArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Trace IDs to compute r-values for, as 32 lowercase hexadecimal characters.
    ///
    /// When none are given, trace IDs are read from standard input, one per line.
    pub trace_ids: Vec<String>,
}

#[derive(Args)]
pub struct AuditArgs {
    /// Number of random trace IDs to generate.
    #[arg(long, default_value_t = 1_000_000)]
    pub samples: u64,

    /// Seed for the random number generator.
    ///
    /// The same seed always produces the same population of trace IDs.
    #[arg(long, default_value_t = 0xC0FFEE)]
    pub seed: u64,

    /// Minimum expected count for an r-value to get its own bucket in the chi-squared test.
    #[arg(long, default_value_t = 5.0)]
    pub min_expected: f64,

    /// Upper-tail standard normal quantile used to derive the chi-squared critical value.
    ///
    /// 3.09 corresponds to a significance level of 0.001, 3.72 to 0.0001.
    #[arg(long, default_value_t = 3.72)]
    pub z: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SourceArg {
    /// Use the low bits of the trace ID directly.
    Structural,

    /// Hash the trace ID.
    Hashed,
}

impl From<SourceArg> for RandomBitsSource {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Structural => Self::Structural,
            SourceArg::Hashed => Self::Hashed,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_with_global_options() {
        let cli = Cli::try_parse_from([
            "rvalue-tool",
            "generate",
            "--source",
            "structural",
            "4bf92f3577b34da6a3ce929d0e0e4736",
            "0af7651916cd43dd8448eb211c80319c",
        ])
        .unwrap();

        assert_eq!(cli.source, Some(SourceArg::Structural));
        assert!(cli.config.is_none());
        match cli.command {
            Command::Generate(args) => assert_eq!(args.trace_ids.len(), 2),
            _ => panic!("expected generate subcommand"),
        }
    }

    #[test]
    fn audit_defaults() {
        let cli = Cli::try_parse_from(["rvalue-tool", "--config", "rvalue.yaml", "audit"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("rvalue.yaml")));
        assert_eq!(cli.source, None);
        match cli.command {
            Command::Audit(args) => {
                assert_eq!(args.samples, 1_000_000);
                assert_eq!(args.seed, 0xC0FFEE);
                assert_eq!(args.min_expected, 5.0);
                assert_eq!(args.z, 3.72);
            }
            _ => panic!("expected audit subcommand"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["rvalue-tool", "--source", "murmur3", "audit"]).is_err());
    }

    #[test]
    fn source_conversion() {
        assert_eq!(RandomBitsSource::from(SourceArg::Hashed), RandomBitsSource::Hashed);
        assert_eq!(RandomBitsSource::from(SourceArg::Structural), RandomBitsSource::Structural);
    }
}
