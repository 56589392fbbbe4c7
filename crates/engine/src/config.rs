//! Configuration system for the simulation engine.
//!
//! This module defines the configuration structures used to parameterize a
//! fresh engine. It provides:
//! 1. **Defaults:** the baseline world order and entropy-based seeding.
//! 2. **Structures:** hierarchical config for memory and the evolver.
//!
//! Configuration is supplied via JSON from the host (`Config::from_json`) or
//! use `Config::default()`.

use serde::Deserialize;

use crate::common::constants::MAX_ORDER;

/// Default configuration constants for the engine.
mod defaults {
    /// Default world order (2^16 = 65,536 cells).
    ///
    /// Large enough for populations of hundreds of small replicators while
    /// keeping debug-build validation passes fast.
    pub const MEMORY_ORDER: u32 = 16;
}

/// World memory configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    /// World order; the world holds `1 << order` cells. Must be at most 31.
    pub order: u32,
}

impl Default for MemoryConfig {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            order: defaults::MEMORY_ORDER,
        }
    }
}

/// Evolver configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvolverConfig {
    /// Explicit xorshift-128 seed words. When absent, the evolver seeds
    /// itself from host entropy, making every run unique.
    pub seed: Option<[u32; 4]>,
}

/// Root engine configuration.
///
/// # Examples
///
/// ```
/// use alvm_core::Config;
///
/// let config = Config::from_json(r#"{"memory": {"order": 12}}"#)?;
/// assert_eq!(config.memory.order, 12);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// World memory parameters.
    pub memory: MemoryConfig,
    /// Evolver parameters.
    pub evolver: EvolverConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// Unknown fields are rejected so host typos surface immediately.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error on malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        assert!(
            config.memory.order <= MAX_ORDER,
            "world order {} exceeds maximum {}",
            config.memory.order,
            MAX_ORDER
        );
        Ok(config)
    }
}
