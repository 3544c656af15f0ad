//! Run options that bound how long a consumer keeps going.
//!
//! Options come from an [`OptionSource`]: the typed [`ConsumerOptions`]
//! builder, a plain map of values, or the process environment. Every source
//! speaks the same three names so hosts can wire flags straight through.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use burrow_core::{BurrowError, Result};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerOption {
    /// Stop after this many items were acknowledged or rejected, 0 for no limit
    MaxIterations,

    /// Stop once peak memory use reaches this many bytes, 0 or less for no limit
    MemoryLimit,

    /// Stop after this many seconds without any item, 0 for no limit
    IdleTimeout,
}

impl ConsumerOption {
    pub const ALL: [ConsumerOption; 3] = [
        ConsumerOption::MaxIterations,
        ConsumerOption::MemoryLimit,
        ConsumerOption::IdleTimeout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConsumerOption::MaxIterations => "max_iterations",
            ConsumerOption::MemoryLimit => "memory_limit",
            ConsumerOption::IdleTimeout => "idle_timeout",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            ConsumerOption::MaxIterations => "BURROW_MAX_ITERATIONS",
            ConsumerOption::MemoryLimit => "BURROW_MEMORY_LIMIT",
            ConsumerOption::IdleTimeout => "BURROW_IDLE_TIMEOUT",
        }
    }

    /// Value used when a source doesn't provide one; every default disables
    /// the limit.
    pub fn default_value(&self) -> i64 {
        match self {
            ConsumerOption::MaxIterations => 0,
            ConsumerOption::MemoryLimit => -1,
            ConsumerOption::IdleTimeout => 0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConsumerOption::MaxIterations => "The maximum number of items to process",
            ConsumerOption::MemoryLimit => "The memory limit in bytes, 0 or less to disable",
            ConsumerOption::IdleTimeout => "Seconds to wait for an item before exiting",
        }
    }
}

impl fmt::Display for ConsumerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConsumerOption {
    type Err = BurrowError;

    fn from_str(s: &str) -> Result<Self> {
        ConsumerOption::ALL
            .into_iter()
            .find(|option| option.name() == s)
            .ok_or_else(|| BurrowError::InvalidArgument(format!("unknown consumer option: {}", s)))
    }
}

/// Anything that can answer "what is the value of option X?"
pub trait OptionSource: Send + Sync {
    /// The configured value, or `None` when the source doesn't set it
    fn get(&self, option: ConsumerOption) -> Option<i64>;

    /// Look an option up by its string name; unknown names have no value
    fn get_by_name(&self, name: &str) -> Option<i64> {
        name.parse::<ConsumerOption>()
            .ok()
            .and_then(|option| self.get(option))
    }
}

impl OptionSource for HashMap<String, i64> {
    fn get(&self, option: ConsumerOption) -> Option<i64> {
        HashMap::get(self, option.name()).copied()
    }
}

/// Raw string values, as they arrive from command line flags
impl OptionSource for HashMap<String, String> {
    fn get(&self, option: ConsumerOption) -> Option<i64> {
        HashMap::get(self, option.name()).and_then(|raw| parse_value(option, raw))
    }
}

/// Reads options from `BURROW_*` environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvOptions;

impl OptionSource for EnvOptions {
    fn get(&self, option: ConsumerOption) -> Option<i64> {
        let raw = std::env::var(option.env_var()).ok()?;
        parse_value(option, &raw)
    }
}

fn parse_value(option: ConsumerOption, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(option = %option, value = %raw, error = %e, "Ignoring unparsable option value");
            None
        }
    }
}

/// Validated run options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerOptions {
    max_iterations: u64,
    memory_limit_bytes: i64,
    idle_timeout: Option<Duration>,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            memory_limit_bytes: -1,
            idle_timeout: None,
        }
    }
}

impl ConsumerOptions {
    pub fn new() -> ConsumerOptions {
        ConsumerOptions::default()
    }

    pub fn max_iterations(mut self, max_iterations: u64) -> ConsumerOptions {
        self.max_iterations = max_iterations;
        self
    }
    pub fn get_max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn memory_limit_bytes(mut self, memory_limit_bytes: i64) -> ConsumerOptions {
        self.memory_limit_bytes = memory_limit_bytes;
        self
    }
    pub fn get_memory_limit_bytes(&self) -> i64 {
        self.memory_limit_bytes
    }

    /// Idle timeout in whole seconds, 0 disables it
    pub fn idle_timeout_secs(mut self, idle_timeout_secs: u64) -> ConsumerOptions {
        self.idle_timeout = (idle_timeout_secs > 0).then(|| Duration::from_secs(idle_timeout_secs));
        self
    }
    pub fn get_idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Read and validate every option from a source
    pub fn from_source(source: &dyn OptionSource) -> Result<ConsumerOptions> {
        let value = |option: ConsumerOption| source.get(option).unwrap_or(option.default_value());

        let max_iterations = value(ConsumerOption::MaxIterations);
        if max_iterations < 0 {
            return Err(BurrowError::Configuration(format!(
                "option {} can't be negative, got {}",
                ConsumerOption::MaxIterations,
                max_iterations
            )));
        }

        let idle_timeout = value(ConsumerOption::IdleTimeout);
        if idle_timeout < 0 {
            return Err(BurrowError::Configuration(format!(
                "option {} can't be negative, got {}",
                ConsumerOption::IdleTimeout,
                idle_timeout
            )));
        }

        Ok(ConsumerOptions::new()
            .max_iterations(max_iterations as u64)
            .memory_limit_bytes(value(ConsumerOption::MemoryLimit))
            .idle_timeout_secs(idle_timeout as u64))
    }
}

impl OptionSource for ConsumerOptions {
    fn get(&self, option: ConsumerOption) -> Option<i64> {
        match option {
            ConsumerOption::MaxIterations => {
                Some(i64::try_from(self.max_iterations).unwrap_or(i64::MAX))
            }
            ConsumerOption::MemoryLimit => Some(self.memory_limit_bytes),
            ConsumerOption::IdleTimeout => self
                .idle_timeout
                .map(|t| i64::try_from(t.as_secs()).unwrap_or(i64::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for option in ConsumerOption::ALL {
            assert_eq!(option.name().parse::<ConsumerOption>().unwrap(), option);
        }
        assert!("max_jobs".parse::<ConsumerOption>().is_err());
    }

    #[test]
    fn unknown_names_have_no_value() {
        let options = ConsumerOptions::new().max_iterations(5);
        assert_eq!(options.get_by_name("max_iterations"), Some(5));
        assert_eq!(options.get_by_name("nope"), None);
    }

    #[test]
    fn defaults_disable_every_limit() {
        let options = ConsumerOptions::from_source(&HashMap::<String, i64>::new()).unwrap();
        assert_eq!(options, ConsumerOptions::default());
        assert_eq!(options.get_max_iterations(), 0);
        assert_eq!(options.get_memory_limit_bytes(), -1);
        assert_eq!(options.get_idle_timeout(), None);
    }

    #[test]
    fn reads_values_from_a_map() {
        let source = HashMap::from([
            ("max_iterations".to_string(), 10i64),
            ("memory_limit".to_string(), 1024),
            ("idle_timeout".to_string(), 3),
        ]);
        let options = ConsumerOptions::from_source(&source).unwrap();
        assert_eq!(options.get_max_iterations(), 10);
        assert_eq!(options.get_memory_limit_bytes(), 1024);
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn string_values_that_dont_parse_are_ignored() {
        let source = HashMap::from([
            ("max_iterations".to_string(), "ten".to_string()),
            ("idle_timeout".to_string(), " 7 ".to_string()),
        ]);
        assert_eq!(OptionSource::get(&source, ConsumerOption::MaxIterations), None);
        assert_eq!(OptionSource::get(&source, ConsumerOption::IdleTimeout), Some(7));
    }

    #[test]
    fn negative_values_are_rejected() {
        let source = HashMap::from([("max_iterations".to_string(), -1i64)]);
        assert!(matches!(
            ConsumerOptions::from_source(&source).unwrap_err(),
            BurrowError::Configuration(_)
        ));

        let source = HashMap::from([("idle_timeout".to_string(), -5i64)]);
        assert!(matches!(
            ConsumerOptions::from_source(&source).unwrap_err(),
            BurrowError::Configuration(_)
        ));
    }

    #[test]
    fn typed_options_are_their_own_source() {
        let options = ConsumerOptions::new()
            .max_iterations(2)
            .memory_limit_bytes(64)
            .idle_timeout_secs(9);
        assert_eq!(ConsumerOptions::from_source(&options).unwrap(), options);
    }

    #[test]
    fn huge_limits_saturate_instead_of_going_negative() {
        let options = ConsumerOptions::new()
            .max_iterations(u64::MAX)
            .idle_timeout_secs(u64::MAX);
        assert_eq!(options.get(ConsumerOption::MaxIterations), Some(i64::MAX));
        assert_eq!(options.get(ConsumerOption::IdleTimeout), Some(i64::MAX));

        let read = ConsumerOptions::from_source(&options).unwrap();
        assert_eq!(read.get_max_iterations(), i64::MAX as u64);
        assert_eq!(read.get_idle_timeout(), Some(Duration::from_secs(i64::MAX as u64)));
    }
}
