//! Per-type visual attributes of annotations.
//!
//! Each variant carries `color` and `thickness` even where the type does not
//! draw a stroke, so every annotation exposes the same base attributes.

use crate::color::SerializableColor;
use serde::{Deserialize, Serialize};

/// How the three arrowhead points are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowheadStyle {
    /// Open V.
    #[default]
    Standard,
    /// V drawn with quadratic curves.
    Rounded,
    /// Closed, filled quad.
    Square,
}

impl ArrowheadStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrowheadStyle::Standard => "standard",
            ArrowheadStyle::Rounded => "rounded",
            ArrowheadStyle::Square => "square",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(ArrowheadStyle::Standard),
            "rounded" => Some(ArrowheadStyle::Rounded),
            "square" => Some(ArrowheadStyle::Square),
            _ => None,
        }
    }

    /// Cycle to the next arrowhead style.
    pub fn next(self) -> Self {
        match self {
            ArrowheadStyle::Standard => ArrowheadStyle::Rounded,
            ArrowheadStyle::Rounded => ArrowheadStyle::Square,
            ArrowheadStyle::Square => ArrowheadStyle::Standard,
        }
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Medium,
    Bold,
}

impl FontWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Light => "light",
            FontWeight::Regular => "regular",
            FontWeight::Medium => "medium",
            FontWeight::Bold => "bold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(FontWeight::Light),
            "regular" => Some(FontWeight::Regular),
            "medium" => Some(FontWeight::Medium),
            "bold" => Some(FontWeight::Bold),
            _ => None,
        }
    }

    /// CSS-style numeric weight.
    pub fn value(&self) -> f32 {
        match self {
            FontWeight::Light => 300.0,
            FontWeight::Regular => 400.0,
            FontWeight::Medium => 500.0,
            FontWeight::Bold => 700.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowProperties {
    pub color: SerializableColor,
    pub thickness: f64,
    pub arrowhead_style: ArrowheadStyle,
}

impl Default for ArrowProperties {
    fn default() -> Self {
        Self {
            color: SerializableColor::red(),
            thickness: 3.0,
            arrowhead_style: ArrowheadStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    pub color: SerializableColor,
    /// Unused by rendering; kept for uniformity.
    pub thickness: f64,
    pub font_size: f64,
    pub text: String,
    pub background_color: Option<SerializableColor>,
    pub font_weight: FontWeight,
}

impl TextProperties {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            color: SerializableColor::red(),
            thickness: 3.0,
            font_size: Self::DEFAULT_FONT_SIZE,
            text: String::new(),
            background_color: None,
            font_weight: FontWeight::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleProperties {
    pub color: SerializableColor,
    pub thickness: f64,
    pub fill_color: Option<SerializableColor>,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub fill_opacity: f64,
}

impl Default for RectangleProperties {
    fn default() -> Self {
        Self {
            color: SerializableColor::red(),
            thickness: 3.0,
            fill_color: None,
            fill_opacity: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightProperties {
    pub color: SerializableColor,
    pub thickness: f64,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f64,
}

impl HighlightProperties {
    pub const DEFAULT_OPACITY: f64 = 0.4;
}

impl Default for HighlightProperties {
    fn default() -> Self {
        Self {
            color: SerializableColor::yellow(),
            thickness: 3.0,
            opacity: Self::DEFAULT_OPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurProperties {
    pub color: SerializableColor,
    pub thickness: f64,
    /// Visual intensity indicator; no pixels are actually blurred.
    pub blur_radius: f64,
}

impl BlurProperties {
    pub const DEFAULT_RADIUS: f64 = 10.0;
}

impl Default for BlurProperties {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            thickness: 3.0,
            blur_radius: Self::DEFAULT_RADIUS,
        }
    }
}
