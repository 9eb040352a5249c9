// In: src/config.rs

//! The single source of truth for all walker configuration.
//!
//! This module defines the unified `WalkerConfig` struct, which is designed to be
//! created once at the application boundary (e.g., from a JSON file or code) and
//! then passed down through the system via a shared, read-only `Arc<WalkerConfig>`.

use serde::{Deserialize, Serialize};

use crate::error::OttxError;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// How string fields are turned into text.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    /// **Default:** invalid UTF-8 fails the walk with `InvalidTextEncoding`.
    #[default]
    Strict,
    /// Invalid sequences are replaced with U+FFFD.
    Lossy,
}

//==================================================================================
// II. The Unified WalkerConfig
//==================================================================================

/// The single, unified configuration for a walk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WalkerConfig {
    /// **The buffering unit in bytes.**
    /// Bounds every piece the cursors hand out while draining and every block the
    /// decompressor produces. Larger values reduce call overhead, smaller values
    /// reduce peak memory for skipped payloads.
    #[serde(default = "default_buffer_unit")]
    pub buffer_unit: usize,

    /// Maximum nesting of struct fields inside a table schema.
    #[serde(default = "default_max_schema_depth")]
    pub max_schema_depth: usize,

    /// Decoding policy for string fields.
    #[serde(default)]
    pub text_mode: TextMode,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            buffer_unit: default_buffer_unit(),
            max_schema_depth: default_max_schema_depth(),
            text_mode: TextMode::default(),
        }
    }
}

impl WalkerConfig {
    /// Parses and validates a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, OttxError> {
        let config: WalkerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the walker cannot run with.
    pub fn validate(&self) -> Result<(), OttxError> {
        if self.buffer_unit == 0 {
            return Err(OttxError::InvalidConfig(
                "buffer_unit must be at least 1 byte".to_string(),
            ));
        }
        if self.max_schema_depth == 0 {
            return Err(OttxError::InvalidConfig(
                "max_schema_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Helper for `serde` to provide a default for `buffer_unit` (64 KiB).
fn default_buffer_unit() -> usize {
    64 * 1024
}

/// Helper for `serde` to provide a default for `max_schema_depth`.
fn default_max_schema_depth() -> usize {
    64
}
