// Application settings
// Loaded from ~/.config/genverify/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default generation tolerance, in MW.
pub const DEFAULT_TOLERANCE: f64 = 3.0;
/// Default timestamp tolerance, in minutes.
pub const DEFAULT_TOLERANCE_MINUTES: f64 = 6.0;

/// How reference and candidate rows are paired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentSetting {
    /// Row i against row i; row counts must agree
    #[default]
    Positional,
    /// Join rows by their displayed key
    RowKey,
}

/// Plant consolidation applied to the PIM input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub enabled: bool,
    /// Plant that receives the sum
    pub target: String,
    /// Plant folded into `target` and dropped
    pub absorbed: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "CETR".to_string(),
            absorbed: "CESM".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum |PIM - SAGER| that still counts as a match (MW)
    #[serde(rename = "tolerance.generation")]
    pub tolerance_generation: f64,

    /// Timestamp tolerance in minutes. Only the restriction workflow reads it.
    #[serde(rename = "tolerance.minutes")]
    pub tolerance_minutes: f64,

    /// Comma-separated plant identifiers, in report order
    pub plants: String,

    pub merge: MergeSettings,

    pub alignment: AlignmentSetting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance_generation: DEFAULT_TOLERANCE,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            plants: String::new(),
            merge: MergeSettings::default(),
            alignment: AlignmentSetting::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("genverify");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file yields defaults silently; an
    /// unreadable or corrupt one yields defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str::<Settings>(&cleaned) {
                    Ok(settings) => match settings.validate() {
                        Ok(()) => settings,
                        Err(e) => {
                            log::warn!("invalid {}: {}; using defaults", path.display(), e);
                            Self::default()
                        }
                    },
                    Err(e) => {
                        log::warn!("error parsing {}: {}; using defaults", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save current settings to the default location
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    /// Save current settings to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())?;
        log::info!("settings saved to {}", path.display());
        Ok(())
    }

    /// Configured plants, trimmed, blanks dropped, in configured order
    pub fn plant_list(&self) -> Vec<String> {
        self.plants
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn set_plants<I, S>(&mut self, plants: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = plants
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        self.plants = joined.join(",");
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("tolerance.generation", self.tolerance_generation),
            ("tolerance.minutes", self.tolerance_minutes),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.merge.enabled {
            if self.merge.target.trim().is_empty() || self.merge.absorbed.trim().is_empty() {
                return Err("merge.target and merge.absorbed must be set".to_string());
            }
            if self.merge.target == self.merge.absorbed {
                return Err("merge.target and merge.absorbed must differ".to_string());
            }
        }
        Ok(())
    }
}
