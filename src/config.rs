use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "curation.json";

/// Filter tables and canonical ordering handed to the curation engine
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct CurationConfig {
    /// Canonical channel names, in the order they should appear
    #[serde(default)]
    pub catalog: Vec<String>,
    /// Exact first-extra lines to drop, e.g. `#EXTGRP:Германия | Germany`
    #[serde(default)]
    pub exclude_regions: HashSet<String>,
    /// Substrings that drop a channel when found in its name, e.g. `(Омск)`
    #[serde(default)]
    pub exclude_name_substrings: HashSet<String>,
    /// Two-letter codes that drop a channel when classified from its name
    #[serde(default)]
    pub exclude_country_codes: HashSet<String>,
}

impl CurationConfig {
    /// Per-user location: `<config_dir>/curation.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "m3u-curator", "m3u-curator")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading curation config {}", path.display()))?;
        let config: CurationConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing curation config {}", path.display()))?;
        config.warn_suspicious();
        debug!(
            "loaded curation config: {} catalog entries, {} regions, {} name substrings, {} country codes",
            config.catalog.len(),
            config.exclude_regions.len(),
            config.exclude_name_substrings.len(),
            config.exclude_country_codes.len()
        );
        Ok(config)
    }

    /// Load from the per-user location, or an empty config (no filtering,
    /// no catalog) when nothing is there.
    pub fn load_default() -> Result<Self, anyhow::Error> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("no curation config found, using an empty one");
                Ok(CurationConfig::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), anyhow::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn warn_suspicious(&self) {
        for code in &self.exclude_country_codes {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                warn!("country code {:?} can never match (expected two uppercase letters)", code);
            }
        }
        let mut seen = HashSet::new();
        for name in &self.catalog {
            if !seen.insert(name) {
                warn!("catalog entry {:?} is listed more than once, only the first position is used", name);
            }
        }
    }
}
