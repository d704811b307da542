use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{ThemeloopError, ThemeloopResult};

/// Complete show description: the themes plus system-wide knobs.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShowConfig {
    /// Themes in display-rotation order.
    #[serde(default)]
    pub themes: Vec<ThemeConfig>,
    /// System-wide settings.
    #[serde(default)]
    pub system: SystemConfig,
}

/// One theme: a named group of stills, animations, fonts and text lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ThemeConfig {
    /// Display name used in logs.
    #[serde(default)]
    pub name: String,
    /// Still image paths.
    #[serde(default)]
    pub image_path: Vec<PathBuf>,
    /// Animation (GIF) paths.
    #[serde(default)]
    pub animation_path: Vec<PathBuf>,
    /// Font file paths.
    #[serde(default)]
    pub font_path: Vec<PathBuf>,
    /// Text lines shown over the visuals.
    #[serde(default)]
    pub text_line: Vec<String>,
}

/// System-wide settings consumed once at bank construction.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SystemConfig {
    /// Total number of stills kept decoded across all active themes.
    #[serde(default = "default_image_cache_size")]
    pub image_cache_size: usize,
    /// Maintenance ticks skipped after a successful theme switch.
    #[serde(default = "default_switch_cooldown")]
    pub switch_cooldown: u32,
    /// Un-cooled ticks between variety swaps on the displayed pair.
    #[serde(default = "default_swap_interval")]
    pub swap_interval: u32,
    /// Maintenance cadence in milliseconds.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Seed for slot selection and shuffles. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            image_cache_size: default_image_cache_size(),
            switch_cooldown: default_switch_cooldown(),
            swap_interval: default_swap_interval(),
            update_interval_ms: default_update_interval_ms(),
            seed: None,
        }
    }
}

fn default_image_cache_size() -> usize {
    64
}

fn default_switch_cooldown() -> u32 {
    500
}

fn default_swap_interval() -> u32 {
    128
}

fn default_update_interval_ms() -> u64 {
    16
}

impl ShowConfig {
    /// Parse a show from JSON text.
    pub fn from_json_str(s: &str) -> ThemeloopResult<Self> {
        serde_json::from_str(s).map_err(|e| ThemeloopError::config(format!("parse show JSON: {e}")))
    }

    /// Read and parse a show JSON file.
    pub fn from_json_file(path: &Path) -> ThemeloopResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("open show config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> ThemeloopResult<()> {
        if self.system.swap_interval == 0 {
            return Err(ThemeloopError::validation("swap_interval must be > 0"));
        }
        if self.system.update_interval_ms == 0 {
            return Err(ThemeloopError::validation("update_interval_ms must be > 0"));
        }
        for (i, theme) in self.themes.iter().enumerate() {
            let empty = |p: &PathBuf| p.as_os_str().is_empty();
            if theme.image_path.iter().any(empty)
                || theme.animation_path.iter().any(empty)
                || theme.font_path.iter().any(empty)
            {
                return Err(ThemeloopError::validation(format!(
                    "theme {i} ('{}') contains an empty path",
                    theme.name
                )));
            }
        }
        if self.system.image_cache_size == 0 {
            tracing::warn!("image_cache_size is 0; themes will only show animations");
        }
        Ok(())
    }

    /// Stills budget granted to each concurrently active theme slot.
    pub fn per_slot_target(&self) -> usize {
        let slots = if self.themes.len() <= 2 { 2 } else { 3 };
        self.system.image_cache_size / slots
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
