use std::path::{Path, PathBuf};

use figment::{
    error::Kind,
    providers::{Env, Format as _, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt as _, Snafu};
use tracing::debug;

use crate::{ConsistentRValueGenerator, RandomBitsSource};

/// A configuration error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigurationError {
    /// Environment variable prefix was empty.
    #[snafu(display("Environment variable prefix must not be empty."))]
    EmptyPrefix,

    /// Configuration file could not be read.
    #[snafu(display("Failed to read configuration file '{}'.", path.display()))]
    ReadFile {
        /// Path to the configuration file.
        path: PathBuf,

        /// Error source.
        source: std::io::Error,
    },

    /// A configuration field held a value of the wrong type, such as a number for `source`.
    #[snafu(display(
        "Invalid value for r-value generator setting '{}': expected {}, got {}.",
        field,
        expected_ty,
        actual_ty
    ))]
    InvalidFieldType {
        /// Period-separated path to the field.
        field: String,

        /// Description of the type the field accepts.
        expected_ty: String,

        /// Description of the value found.
        actual_ty: String,
    },

    /// The source of random bits named neither `structural` nor `hashed`.
    #[snafu(display(
        "Unknown source of random bits '{}', expected one of: {}.",
        actual,
        expected.join(", ")
    ))]
    UnknownSource {
        /// The configured value.
        actual: String,

        /// Accepted values.
        expected: &'static [&'static str],
    },

    /// Generic configuration error.
    #[snafu(display("Failed to load r-value generator configuration: {}", source))]
    Generic {
        /// Error source.
        source: Box<figment::Error>,
    },
}

impl From<figment::Error> for ConfigurationError {
    fn from(e: figment::Error) -> Self {
        match e.kind {
            Kind::InvalidType(actual_ty, expected_ty) => Self::InvalidFieldType {
                field: e.path.join("."),
                expected_ty,
                actual_ty: actual_ty.to_string(),
            },
            Kind::UnknownVariant(actual, expected) => Self::UnknownSource { actual, expected },
            _ => Self::Generic { source: Box::new(e) },
        }
    }
}

/// Configuration for r-value generation.
///
/// Sources are layered in order of increasing precedence: built-in defaults, then an optional YAML file, then
/// environment variables. With a prefix of `RVALUE`, the source of random bits is read from `RVALUE_SOURCE`.
///
/// ```yaml
/// # Either `hashed` (default) or `structural`.
/// source: structural
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RValueGeneratorConfiguration {
    /// Where the random bits of each trace ID come from.
    ///
    /// Only set this to `structural` if every trace ID in the system is guaranteed to have at least its low 62 bits
    /// drawn from a strong random source. Defaults to `hashed`.
    pub source: RandomBitsSource,
}

impl RValueGeneratorConfiguration {
    /// Loads the configuration from the given YAML file.
    ///
    /// Fields missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// If the file cannot be read, is not valid YAML, or holds invalid values, an error will be returned.
    pub fn from_yaml<P>(path: P) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
    {
        let figment = with_yaml(defaults(), path.as_ref())?;
        extract(figment)
    }

    /// Loads the configuration from environment variables with the given prefix.
    ///
    /// The prefix given will have an underscore appended to it if it does not already end with one. The prefix is
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, or an environment variable holds an invalid value, an error will be returned.
    pub fn from_environment(prefix: &str) -> Result<Self, ConfigurationError> {
        let figment = with_environment(defaults(), prefix)?;
        extract(figment)
    }

    /// Loads the configuration from an optional YAML file, overridden by environment variables with the given prefix.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not valid YAML, if the prefix is empty, or if any source holds an invalid
    /// value, an error will be returned.
    pub fn load(path: Option<&Path>, prefix: &str) -> Result<Self, ConfigurationError> {
        let mut figment = defaults();
        if let Some(path) = path {
            figment = with_yaml(figment, path)?;
        }
        figment = with_environment(figment, prefix)?;
        extract(figment)
    }

    /// Builds the r-value generator described by this configuration.
    pub fn build(&self) -> ConsistentRValueGenerator {
        ConsistentRValueGenerator::new(self.source)
    }
}

fn defaults() -> Figment {
    Figment::from(Serialized::defaults(RValueGeneratorConfiguration::default()))
}

fn with_yaml(figment: Figment, path: &Path) -> Result<Figment, ConfigurationError> {
    let contents = std::fs::read_to_string(path).context(ReadFile { path })?;
    debug!(file_path = %path.display(), "Loaded YAML configuration file.");
    Ok(figment.merge(Yaml::string(&contents)))
}

fn with_environment(figment: Figment, prefix: &str) -> Result<Figment, ConfigurationError> {
    if prefix.is_empty() {
        return Err(ConfigurationError::EmptyPrefix);
    }

    let prefix = if prefix.ends_with('_') {
        prefix.to_string()
    } else {
        format!("{}_", prefix)
    };

    Ok(figment.merge(Env::prefixed(&prefix)))
}

fn extract(figment: Figment) -> Result<RValueGeneratorConfiguration, ConfigurationError> {
    let config: RValueGeneratorConfiguration = figment.extract()?;
    debug!(source = config.source.as_str(), "Resolved r-value generator configuration.");
    Ok(config)
}
