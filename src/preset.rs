//! Named preset persistence for encoding configurations.
//!
//! One JSON file holds all named presets plus the name of the last-used
//! one. The file lives at a caller-supplied path; nothing here assumes a
//! particular settings directory.

use crate::error::Result;
use crate::options::EncodingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name used when the caller never picked a preset.
pub const DEFAULT_PRESET: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PresetFile {
    #[serde(default = "default_preset_name")]
    last_preset: String,
    #[serde(default)]
    presets: BTreeMap<String, EncodingConfig>,
}

fn default_preset_name() -> String {
    DEFAULT_PRESET.to_string()
}

impl Default for PresetFile {
    fn default() -> Self {
        Self {
            last_preset: default_preset_name(),
            presets: BTreeMap::new(),
        }
    }
}

/// Store of named [`EncodingConfig`] presets backed by one JSON file.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
    file: PresetFile,
}

impl PresetStore {
    /// Load the store from `path`. A missing file yields an empty store;
    /// a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => PresetFile::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, file })
    }

    /// Write the store back to its file, creating parent directories as
    /// needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Configuration stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&EncodingConfig> {
        self.file.presets.get(name)
    }

    /// Store `config` under `name`, replacing any previous entry, and
    /// mark it as the last-used preset.
    pub fn insert(&mut self, name: impl Into<String>, config: EncodingConfig) {
        let name = name.into();
        self.file.last_preset = name.clone();
        self.file.presets.insert(name, config);
    }

    /// Remove the preset stored under `name`.
    pub fn remove(&mut self, name: &str) -> Option<EncodingConfig> {
        self.file.presets.remove(name)
    }

    /// All preset names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.file.presets.keys().map(String::as_str)
    }

    /// Name of the last-used preset.
    pub fn last(&self) -> &str {
        &self.file.last_preset
    }

    /// Mark `name` as the last-used preset.
    pub fn set_last(&mut self, name: impl Into<String>) {
        self.file.last_preset = name.into();
    }

    /// Configuration of the last-used preset, or the defaults when it is
    /// not stored.
    pub fn last_config(&self) -> EncodingConfig {
        self.get(self.last()).cloned().unwrap_or_default()
    }
}
