//! Merge configuration from stylemerge.toml

use crate::model::{DocumentStyleMap, ElementKind, ElementStylePatch};
use crate::session::Session;
use crate::settings::MergeSettingsPatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name looked up when no configuration path is given
pub const DEFAULT_CONFIG_FILE: &str = "stylemerge.toml";

/// Deepest list level a configured numbering format may target
const MAX_LIST_LEVEL: u8 = 8;

/// Merge configuration from stylemerge.toml
///
/// ```toml
/// [settings]
/// mode = "smart-merge"
/// run_formatting = "keep-emphasis"
///
/// [styles.heading1]
/// font_family = "Georgia"
/// font_size = 36
///
/// [numbering_formats]
/// 0 = "upperRoman"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Settings applied on top of the defaults
    pub settings: MergeSettingsPatch,

    /// Main-style overrides keyed by element kind (`heading1`..`heading4`, `body`, `numbered`, `bulleted`)
    pub styles: BTreeMap<String, ElementStylePatch>,

    /// Ordinal list formats keyed by 0-based level
    pub numbering_formats: BTreeMap<String, String>,
}

impl MergeConfig {
    /// Load configuration from a stylemerge.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(MergeConfig)` - Successfully loaded and validated configuration
    /// * `Err(ConfigError)` - Error reading, parsing or validating the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(ConfigError::Io)?;

        let config: MergeConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.style_patches()?;
        config.level_formats()?;

        Ok(config)
    }

    /// Save configuration to a stylemerge.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&path, content).map_err(ConfigError::Io)?;

        Ok(())
    }

    /// Style patches with their keys resolved to element kinds
    pub fn style_patches(&self) -> Result<Vec<(ElementKind, &ElementStylePatch)>, ConfigError> {
        self.styles
            .iter()
            .map(|(key, patch)| {
                key.parse::<ElementKind>()
                    .map(|kind| (kind, patch))
                    .map_err(|_| ConfigError::InvalidKind(key.clone()))
            })
            .collect()
    }

    /// Numbering formats with their keys resolved to list levels
    pub fn level_formats(&self) -> Result<Vec<(u8, &str)>, ConfigError> {
        self.numbering_formats
            .iter()
            .map(|(key, format)| {
                key.trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|level| *level <= MAX_LIST_LEVEL)
                    .map(|level| (level, format.as_str()))
                    .ok_or_else(|| ConfigError::InvalidLevel(key.clone()))
            })
            .collect()
    }

    /// Push settings, style overrides and numbering formats through the session
    ///
    /// Nothing is applied when any key is invalid.
    pub fn apply(&self, session: Session) -> Result<Session, ConfigError> {
        let styles = self.style_patches()?;
        let formats = self.level_formats()?;

        let mut session = session.update_settings(&self.settings);
        if session.main_document().is_some() {
            for (kind, patch) in styles {
                if !patch.is_empty() {
                    session = session.update_main_style(kind, patch);
                }
            }
            for (level, format) in formats {
                session = session.update_numbering_format(level, format);
            }
        } else if !self.styles.is_empty() || !self.numbering_formats.is_empty() {
            log::warn!("Style overrides in the configuration need a main document; skipping them");
        }
        Ok(session)
    }

    /// Apply style overrides and numbering formats to a standalone style map
    pub fn apply_to_style_map(&self, style_map: &mut DocumentStyleMap) -> Result<(), ConfigError> {
        for (kind, patch) in self.style_patches()? {
            style_map.patch(kind, patch);
        }
        for (level, format) in self.level_formats()? {
            style_map
                .numbering_formats
                .insert(level, format.to_string());
        }
        Ok(())
    }
}

/// Errors that can occur when loading or saving the merge configuration
#[derive(Debug)]
pub enum ConfigError {
    /// IO error when reading or writing file
    Io(std::io::Error),

    /// Error parsing TOML
    Parse(toml::de::Error),

    /// Error serializing to TOML
    Serialize(toml::ser::Error),

    /// A `[styles]` key names no element kind
    InvalidKind(String),

    /// A `[numbering_formats]` key is not a list level
    InvalidLevel(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "TOML serialize error: {}", e),
            ConfigError::InvalidKind(key) => write!(
                f,
                "unknown element kind '{}' (expected heading1..heading4, body, numbered or bulleted)",
                key
            ),
            ConfigError::InvalidLevel(key) => write!(
                f,
                "invalid list level '{}' (expected 0..={})",
                key, MAX_LIST_LEVEL
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
