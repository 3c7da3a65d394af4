//! Configuration types for Stencil detection and batch planning.
//!
//! This module provides configuration structures that control id
//! assignment, integrity tolerances, pattern grouping, hint merging and batch
//! planning. All types implement [`serde::Deserialize`] for loading from
//! external sources such as a TOML file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`IdentityConfig`] - Id strategy and whether source ids are kept.
//! - [`IntegrityConfig`] - Bounds margin for the integrity check.
//! - [`PatternConfig`] - Row tolerance for ordering repeat groups.
//! - [`HintsConfig`] - Minimum confidence for hierarchy hints.
//! - [`BatchConfig`] - Content match length and file naming.
//!
//! # Example
//!
//! ```
//! # use stencil::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.integrity().margin(), 10.0);
//! assert_eq!(config.batch().match_length(), 30);
//! ```

use serde::Deserialize;

use stencil_core::identity::{IdMode, IdReassign};

use crate::error::StencilError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Id assignment section.
    #[serde(default)]
    identity: IdentityConfig,

    /// Integrity check section.
    #[serde(default)]
    integrity: IntegrityConfig,

    /// Pattern matching section.
    #[serde(default)]
    patterns: PatternConfig,

    /// Hierarchy hint section.
    #[serde(default)]
    hints: HintsConfig,

    /// Batch planning section.
    #[serde(default)]
    batch: BatchConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        identity: IdentityConfig,
        integrity: IntegrityConfig,
        patterns: PatternConfig,
        hints: HintsConfig,
        batch: BatchConfig,
    ) -> Self {
        Self {
            identity,
            integrity,
            patterns,
            hints,
            batch,
        }
    }

    pub fn identity(&self) -> &IdentityConfig {
        &self.identity
    }

    pub fn integrity(&self) -> &IntegrityConfig {
        &self.integrity
    }

    pub fn patterns(&self) -> &PatternConfig {
        &self.patterns
    }

    pub fn hints(&self) -> &HintsConfig {
        &self.hints
    }

    pub fn batch(&self) -> &BatchConfig {
        &self.batch
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::Config`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), StencilError> {
        let margin = self.integrity.margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(StencilError::Config(format!(
                "integrity.margin must be a non-negative number, got {margin}"
            )));
        }
        let tolerance = self.patterns.row_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(StencilError::Config(format!(
                "patterns.row_tolerance must be a non-negative number, got {tolerance}"
            )));
        }
        let min_confidence = self.hints.min_confidence;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(StencilError::Config(format!(
                "hints.min_confidence must be between 0 and 1, got {min_confidence}"
            )));
        }
        if self.batch.match_length == 0 {
            return Err(StencilError::Config(
                "batch.match_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Id assignment settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IdentityConfig {
    /// Strategy used for generated ids.
    #[serde(default)]
    mode: IdMode,

    /// Which elements receive a generated id.
    #[serde(default)]
    reassign: IdReassign,
}

impl IdentityConfig {
    pub fn new(mode: IdMode, reassign: IdReassign) -> Self {
        Self { mode, reassign }
    }

    pub fn mode(&self) -> IdMode {
        self.mode
    }

    pub fn reassign(&self) -> IdReassign {
        self.reassign
    }
}

/// Integrity check settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Tolerance band around the artboard, in canonical units.
    margin: f32,
}

impl IntegrityConfig {
    pub fn new(margin: f32) -> Self {
        Self { margin }
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self { margin: 10.0 }
    }
}

/// Pattern matching settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Largest vertical gap between repeat groups that still counts as one row.
    row_tolerance: f32,
}

impl PatternConfig {
    pub fn new(row_tolerance: f32) -> Self {
        Self { row_tolerance }
    }

    pub fn row_tolerance(&self) -> f32 {
        self.row_tolerance
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 20.0,
        }
    }
}

/// Hierarchy hint settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HintsConfig {
    /// Hints below this confidence are ignored.
    min_confidence: f32,
}

impl HintsConfig {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
        }
    }
}

/// Batch planning settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of leading characters compared during content matching.
    match_length: usize,

    /// Row column holding the output file name.
    file_name_column: Option<String>,
}

impl BatchConfig {
    pub fn new(match_length: usize, file_name_column: Option<String>) -> Self {
        Self {
            match_length,
            file_name_column,
        }
    }

    pub fn match_length(&self) -> usize {
        self.match_length
    }

    pub fn file_name_column(&self) -> Option<&str> {
        self.file_name_column.as_deref()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            match_length: 30,
            file_name_column: None,
        }
    }
}
