//! Engine configuration.

use crate::annotation::AnnotationKind;
use crate::color::SerializableColor;
use crate::history::MAX_UNDO_HISTORY;
use crate::properties::TextProperties;
use crate::tools::ToolState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings an annotation session starts from. Missing fields take their
/// defaults when parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_undo_history: usize,
    pub default_tool: AnnotationKind,
    pub default_color: SerializableColor,
    pub default_thickness: f64,
    pub default_font_size: f64,
    pub palette: Vec<SerializableColor>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo_history: MAX_UNDO_HISTORY,
            default_tool: AnnotationKind::Arrow,
            default_color: SerializableColor::red(),
            default_thickness: 3.0,
            default_font_size: TextProperties::DEFAULT_FONT_SIZE,
            palette: SerializableColor::default_palette(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_undo_history == 0 {
            return Err(ConfigError::Invalid(
                "max_undo_history must be at least 1".to_string(),
            ));
        }
        if !self.default_thickness.is_finite() || !self.default_font_size.is_finite() {
            return Err(ConfigError::Invalid("sizes must be finite".to_string()));
        }
        Ok(())
    }

    /// Fresh tool state for a session, with the default tool selected.
    pub fn tool_state(&self) -> ToolState {
        let mut state = ToolState::new();
        state.set_color(self.default_color);
        state.set_thickness(self.default_thickness);
        state.set_font_size(self.default_font_size);
        if !self.palette.is_empty() {
            state.palette = self.palette.clone();
        }
        state.select_tool(self.default_tool);
        state
    }
}
