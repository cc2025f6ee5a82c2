//! Tunables for clustering, rendering and translation.
//!
//! Stored as TOML; every section and field falls back to its default when
//! absent, so a partial file only overrides what it names.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::error::ScanLayoutError;
use crate::core::text::WidthMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub cluster: ClusterConfig,
    pub render: RenderConfig,
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Maximum anchor distance in pixels for two fragments to share a line.
    /// Depends on scan resolution.
    pub y_tolerance: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { y_tolerance: 25.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Assumed body font size used to derive the character pitch.
    pub base_font_pt: f32,
    /// Monospace advance width as a fraction of the em.
    pub pitch_ratio: f32,
    /// Resolution of the page image the boxes were measured on.
    pub dpi: f32,
    /// Multiplier applied to the measured line height when sizing fonts.
    pub font_scale: f32,
    pub min_font_pt: f32,
    /// A vertical gap must exceed this many previous-line heights before
    /// blank paragraphs are inserted.
    pub gap_factor: f32,
    pub width_mode: WidthMode,
    pub font_family: String,
    /// Rightmost grid column a fragment may start at.
    pub max_columns: usize,
    /// Most blank paragraphs emitted for a single vertical gap.
    pub max_blank_rows: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_font_pt: 10.0,
            pitch_ratio: 0.6,
            dpi: 200.0,
            font_scale: 0.75,
            min_font_pt: 6.0,
            gap_factor: 1.1,
            width_mode: WidthMode::Narrow,
            font_family: "Courier New".to_string(),
            max_columns: 1000,
            max_blank_rows: 200,
        }
    }
}

impl RenderConfig {
    /// Estimated pixel width of one fixed-pitch character.
    pub fn pixels_per_char(&self) -> f32 {
        let ppc = self.base_font_pt * self.pitch_ratio * self.dpi / 72.0;
        if ppc.is_finite() && ppc > 0.0 {
            ppc
        } else {
            1.0
        }
    }

    pub fn px_to_pt(&self, px: f32) -> f32 {
        if self.dpi > 0.0 {
            px * 72.0 / self.dpi
        } else {
            px
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslateConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            source_lang: "Korean".to_string(),
            target_lang: "English".to_string(),
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

pub fn load_config(path: &Path) -> Result<LayoutConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: LayoutConfig =
        toml::from_str(&content).map_err(|source| ScanLayoutError::Config {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(config)
}

pub fn save_config(config: &LayoutConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(())
}
