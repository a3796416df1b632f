//! Configuration helpers for reading process environment
//!
//! Binaries read the environment once at startup through these helpers and
//! pass the resulting config structs down explicitly.

use std::str::FromStr;
use std::time::Duration;

/// Read a non-empty environment variable
///
/// Unset variables and variables containing only whitespace are both `None`.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read the first non-empty variable out of several names
pub fn env_var_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env_var(name))
}

/// Parse an environment variable, falling back to `default` when unset or invalid
pub fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env_var(name) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable environment value");
            default
        }),
        None => default,
    }
}

/// Read a duration expressed in whole seconds
pub fn env_duration_secs(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_parse::<u64>(name, default.as_secs()).max(1))
}
