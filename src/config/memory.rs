//! Memory layer configuration.
//!
//! Tunables of the per-thread temporary buffer pool.

use super::{parse_env_bool, parse_env_var, Config, ValidationError};
use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default size of one pool buffer (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
/// Default alignment of pool buffers (64 B)
pub const DEFAULT_BUFFER_ALIGNMENT: usize = 64;
/// Default bound of the ready-stack
pub const DEFAULT_MAX_CACHED_BUFFERS: usize = 32;
/// Default leak-guard threshold
pub const DEFAULT_MAX_LIVE_ALLOCATIONS: usize = 100;

/// Configuration of a [`TemporaryPool`](crate::memory::TemporaryPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryPoolConfig {
    /// Size of every pool buffer; requests above it bypass the pool
    pub buffer_size: usize,

    /// Alignment of pool buffers (power of two)
    pub alignment: usize,

    /// Maximum number of returned buffers kept for reuse
    pub max_cached_buffers: usize,

    /// Live allocations per pool above which a leak is assumed
    pub max_live_allocations: usize,

    /// Log every buffer the pool creates
    pub log_buffer_creation: bool,
}

impl Default for TemporaryPoolConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            alignment: DEFAULT_BUFFER_ALIGNMENT,
            max_cached_buffers: DEFAULT_MAX_CACHED_BUFFERS,
            max_live_allocations: DEFAULT_MAX_LIVE_ALLOCATIONS,
            log_buffer_creation: true,
        }
    }
}

impl Config for TemporaryPoolConfig {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.buffer_size == 0 {
            errors.push(
                ValidationError::new(
                    "buffer_size",
                    &self.buffer_size.to_string(),
                    "buffer size must be greater than 0",
                )
                .with_suggestion("typical values: 16KB-1MB"),
            );
        }

        if !self.alignment.is_power_of_two() {
            errors.push(
                ValidationError::new(
                    "alignment",
                    &self.alignment.to_string(),
                    "alignment must be a power of two",
                )
                .with_suggestion("16, 32, 64, 128"),
            );
        } else if self.alignment > 4096 {
            errors.push(ValidationError::new(
                "alignment",
                &self.alignment.to_string(),
                "alignment must not exceed the page size",
            ));
        }

        if self.max_live_allocations == 0 {
            errors.push(ValidationError::new(
                "max_live_allocations",
                &self.max_live_allocations.to_string(),
                "leak guard must allow at least one live allocation",
            ));
        }

        if !errors.is_empty() {
            return Err(ProbeError::configuration(format!(
                "Temporary pool configuration validation failed: {}",
                errors
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            )));
        }

        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();

        config.buffer_size = parse_env_var(&format!("{}TEMP_POOL_BUFFER_SIZE", prefix), config.buffer_size);
        config.alignment = parse_env_var(&format!("{}TEMP_POOL_ALIGNMENT", prefix), config.alignment);
        config.max_cached_buffers =
            parse_env_var(&format!("{}TEMP_POOL_MAX_CACHED", prefix), config.max_cached_buffers);
        config.max_live_allocations =
            parse_env_var(&format!("{}TEMP_POOL_MAX_LIVE", prefix), config.max_live_allocations);
        config.log_buffer_creation =
            parse_env_bool(&format!("{}TEMP_POOL_LOG_BUFFERS", prefix), config.log_buffer_creation);

        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            buffer_size: 256 * 1024,
            max_cached_buffers: 64,
            max_live_allocations: 256,
            log_buffer_creation: false,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            buffer_size: 16 * 1024,
            alignment: 16,
            max_cached_buffers: 4,
            ..Self::default()
        }
    }

    fn realtime_preset() -> Self {
        // Large cache so that the steady state never reaches the system allocator.
        Self {
            max_cached_buffers: 128,
            max_live_allocations: 128,
            log_buffer_creation: false,
            ..Self::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            ProbeError::configuration(format!("Failed to serialize temporary pool config: {}", e))
        })?;

        std::fs::write(path, serialized).map_err(|e| {
            ProbeError::configuration(format!("Failed to write temporary pool config file: {}", e))
        })?;

        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::configuration(format!("Failed to read temporary pool config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ProbeError::configuration(format!("Failed to parse temporary pool config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }
}
