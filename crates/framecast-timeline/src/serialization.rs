//! Composition serialization with versioning and migration.
//!
//! Uses JSON with a schema version field for forward-compatible
//! persistence. Loaded compositions are structurally re-validated:
//! builder invariants do not survive serde on their own.

use framecast_core::{FramecastError, Result};
use serde::{Deserialize, Serialize};

use crate::composition::CompositionTimeline;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned composition file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompositionFile {
    /// Schema version for migration.
    pub version: u32,
    /// The composition data.
    pub composition: CompositionTimeline,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl CompositionFile {
    /// Wrap a composition for persistence.
    pub fn new(composition: CompositionTimeline) -> Self {
        Self {
            version: CURRENT_VERSION,
            composition,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            FramecastError::Serialization(format!("failed to serialize composition: {e}"))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| FramecastError::Serialization(format!("invalid JSON: {e}")))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

        if version > CURRENT_VERSION {
            return Err(FramecastError::Serialization(format!(
                "composition file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version)?;

        let file: Self = serde_json::from_value(migrated)
            .map_err(|e| FramecastError::Serialization(format!("failed to parse composition: {e}")))?;

        file.composition.validate()?;
        Ok(file)
    }

    /// Save to a file path.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load from a file path.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 → v1: bare composition without the version wrapper.
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "composition": data,
                        "app_version": "0.1.0",
                    });
                }
                version = 1;
            }
            _ => {
                return Err(FramecastError::Serialization(format!(
                    "no migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}
