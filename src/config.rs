//! Runtime tunables.
//!
//! `spec.md` treats `POOL_SIZE`, `ACTOR_QUEUE_LIMIT` and `CAST_LIMIT` as
//! compile-time constants. We still want them fixed for the lifetime of one
//! [`crate::ActorSystem`], but make them readable from the environment at
//! `create()` time, the same way `actors::HEARTBEAT` resolves
//! `QW_ACTOR_HEARTBEAT_SECS` in the reference workspace: parse if present and
//! valid, warn and fall back to the default otherwise.

use std::env::{self, VarError};
use std::num::NonZeroUsize;

use tracing::warn;

/// Default worker thread count, matching the `POOL_SIZE = 3` typical value
/// from spec.md §4.6.
const DEFAULT_POOL_SIZE: usize = 3;

/// Default per-actor mailbox capacity (spec.md §4.6).
const DEFAULT_ACTOR_QUEUE_LIMIT: usize = 1024;

/// Default upper bound on the number of actors a system may ever host
/// (spec.md §4.6).
const DEFAULT_CAST_LIMIT: usize = 1_048_576;

/// A snapshot of the tunables for one [`crate::ActorSystem`], captured once
/// at `create()` time.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    pub pool_size: usize,
    pub actor_queue_limit: usize,
    pub cast_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            pool_size: from_env_or_default("CACTI_POOL_SIZE", DEFAULT_POOL_SIZE),
            actor_queue_limit: from_env_or_default("CACTI_QUEUE_LIMIT", DEFAULT_ACTOR_QUEUE_LIMIT),
            cast_limit: from_env_or_default("CACTI_CAST_LIMIT", DEFAULT_CAST_LIMIT),
        }
    }
}

impl RuntimeConfig {
    /// Builds a config directly from explicit values, bypassing the
    /// environment. Primarily useful for tests that need a tiny
    /// `actor_queue_limit` or `cast_limit` without touching process-wide
    /// environment variables.
    pub fn new(pool_size: usize, actor_queue_limit: usize, cast_limit: usize) -> Self {
        RuntimeConfig { pool_size, actor_queue_limit, cast_limit }
    }
}

fn from_env_or_default(var: &str, default: usize) -> usize {
    match env::var(var) {
        Ok(raw) => match raw.parse::<NonZeroUsize>() {
            Ok(value) => value.get(),
            Err(_) => {
                warn!(
                    variable = var,
                    value = raw.as_str(),
                    "failed to parse as a positive integer, using default ({default})"
                );
                default
            }
        },
        Err(VarError::NotPresent) => default,
        Err(VarError::NotUnicode(os_str)) => {
            warn!(variable = var, value = ?os_str, "environment value is not valid unicode, using default ({default})");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_typical_values() {
        // SAFETY: test runs single-threaded with respect to these vars; no other
        // test in this crate mutates them.
        std::env::remove_var("CACTI_POOL_SIZE");
        std::env::remove_var("CACTI_QUEUE_LIMIT");
        std::env::remove_var("CACTI_CAST_LIMIT");
        let config = RuntimeConfig::default();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.actor_queue_limit, DEFAULT_ACTOR_QUEUE_LIMIT);
        assert_eq!(config.cast_limit, DEFAULT_CAST_LIMIT);
    }

    #[test]
    fn explicit_config_bypasses_environment() {
        let config = RuntimeConfig::new(1, 4, 8);
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.actor_queue_limit, 4);
        assert_eq!(config.cast_limit, 8);
    }
}
