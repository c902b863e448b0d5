//! Runtime settings taken from the environment.

use ec_protocol::TimeoutPolicy;
use log::LevelFilter;

/// Log level filter (`off`, `error`, `warn`, `info`, `debug`, `trace`).
pub const LOG_VAR: &str = "CLEVO_FAN_LOG";

/// Fail a transaction on any handshake timeout (`1`, `true`, `yes`, `on`).
pub const STRICT_VAR: &str = "CLEVO_FAN_STRICT";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    pub log_level: LevelFilter,
    pub timeout_policy: TimeoutPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            timeout_policy: TimeoutPolicy::Lenient,
        }
    }
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from `lookup`. Unset or unparsable variables
    /// keep their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_level = lookup(LOG_VAR)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(defaults.log_level);

        let timeout_policy = match lookup(STRICT_VAR) {
            Some(value) if is_truthy(&value) => TimeoutPolicy::Strict,
            _ => defaults.timeout_policy,
        };

        Self {
            log_level,
            timeout_policy,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        Config::from_lookup(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        })
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(config(&[]), Config::default());
        assert_eq!(config(&[]).log_level, LevelFilter::Warn);
        assert_eq!(config(&[]).timeout_policy, TimeoutPolicy::Lenient);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        assert_eq!(config(&[(LOG_VAR, "TRACE")]).log_level, LevelFilter::Trace);
        assert_eq!(config(&[(LOG_VAR, " off ")]).log_level, LevelFilter::Off);
        assert_eq!(config(&[(LOG_VAR, "loud")]).log_level, LevelFilter::Warn);
    }

    #[test]
    fn strict_mode_switch() {
        assert_eq!(config(&[(STRICT_VAR, "1")]).timeout_policy, TimeoutPolicy::Strict);
        assert_eq!(config(&[(STRICT_VAR, "Yes")]).timeout_policy, TimeoutPolicy::Strict);
        assert_eq!(config(&[(STRICT_VAR, "0")]).timeout_policy, TimeoutPolicy::Lenient);
        assert_eq!(config(&[(STRICT_VAR, "")]).timeout_policy, TimeoutPolicy::Lenient);
    }
}
