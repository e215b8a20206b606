//! Runtime configuration parsed from environment variables.
//!
//! Every setting can be overridden on the command line; see
//! [`Config::apply_overrides`].

use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;

use scope_rules::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH, Limits};

use crate::error::CliError;

/// Environment variable holding the log level.
pub const LOG_LEVEL_VAR: &str = "SCOPE_RULES_LOG_LEVEL";
/// Environment variable holding the nesting limit.
pub const MAX_DEPTH_VAR: &str = "SCOPE_RULES_MAX_DEPTH";
/// Environment variable holding the length limit, in bytes.
pub const MAX_LENGTH_VAR: &str = "SCOPE_RULES_MAX_LENGTH";

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Warn` so that only malformed-rule diagnostics reach stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging.
    Trace,
    /// Debug-level information, including which command ran.
    Debug,
    /// Standard informational messages.
    Info,
    /// Malformed rules and other recoverable problems.
    #[default]
    Warn,
    /// Failures only.
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(CliError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Settings shared by every subcommand.
///
/// # Environment Variables
///
/// - `SCOPE_RULES_LOG_LEVEL`: trace, debug, info, warn or error
/// - `SCOPE_RULES_MAX_DEPTH`: deepest `!`/parenthesis nesting accepted
/// - `SCOPE_RULES_MAX_LENGTH`: longest rule accepted, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Log level.
    pub log_level: LogLevel,
    /// Nesting limit applied when parsing rules.
    pub max_depth: usize,
    /// Length limit applied when parsing rules.
    pub max_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidConfig` if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(val) => val.parse()?,
            None => defaults.log_level,
        };
        let max_depth = match lookup(MAX_DEPTH_VAR) {
            Some(val) => parse_limit(MAX_DEPTH_VAR, &val)?,
            None => defaults.max_depth,
        };
        let max_length = match lookup(MAX_LENGTH_VAR) {
            Some(val) => parse_limit(MAX_LENGTH_VAR, &val)?,
            None => defaults.max_length,
        };
        Ok(Self {
            log_level,
            max_depth,
            max_length,
        })
    }

    /// Apply command-line overrides, which take precedence over the
    /// environment.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        max_depth: Option<NonZeroUsize>,
        max_length: Option<NonZeroUsize>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if let Some(depth) = max_depth {
            self.max_depth = depth.get();
        }
        if let Some(length) = max_length {
            self.max_length = length.get();
        }
        self
    }

    /// Parser limits for rules.
    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
            max_length: self.max_length,
        }
    }
}

fn parse_limit(name: &str, value: &str) -> Result<usize, CliError> {
    value
        .trim()
        .parse::<NonZeroUsize>()
        .map(NonZeroUsize::get)
        .map_err(|_| {
            CliError::InvalidConfig(format!(
                "invalid {name} value '{value}', expected a positive integer"
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(ToString::to_string)
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("Info", LogLevel::Info)]
    #[case("warning", LogLevel::Warn)]
    #[case(" error ", LogLevel::Error)]
    fn log_level_parses_valid_values(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().ok(), Some(expected));
        assert_eq!(
            expected.as_filter_str().parse::<LogLevel>().ok(),
            Some(expected)
        );
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "loud".parse::<LogLevel>();
        assert!(result.is_err_and(|err| err.to_string().contains("unknown log level 'loud'")));
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).ok();
        assert_eq!(config, Some(Config::default()));
        assert_eq!(Config::default().log_level, LogLevel::Warn);
        assert_eq!(Config::default().limits(), Limits::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            (LOG_LEVEL_VAR, "debug"),
            (MAX_DEPTH_VAR, "8"),
            (MAX_LENGTH_VAR, " 512 "),
        ]))
        .ok();
        assert_eq!(
            config,
            Some(Config {
                log_level: LogLevel::Debug,
                max_depth: 8,
                max_length: 512,
            })
        );
    }

    #[rstest]
    #[case(MAX_DEPTH_VAR, "0")]
    #[case(MAX_DEPTH_VAR, "-3")]
    #[case(MAX_LENGTH_VAR, "lots")]
    #[case(LOG_LEVEL_VAR, "chatty")]
    fn rejects_invalid_values(#[case] name: &str, #[case] value: &str) {
        let result = Config::from_lookup(lookup_from(&[(name, value)]));
        assert!(matches!(result, Err(CliError::InvalidConfig(_))));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = Config::from_lookup(lookup_from(&[(MAX_DEPTH_VAR, "8")]))
            .map(|config| {
                config.apply_overrides(Some(LogLevel::Error), NonZeroUsize::new(3), None)
            })
            .ok();
        assert_eq!(
            config,
            Some(Config {
                log_level: LogLevel::Error,
                max_depth: 3,
                max_length: DEFAULT_MAX_LENGTH,
            })
        );
    }
}
