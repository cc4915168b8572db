//! Appearance attributes carried by every item.
//!
//! The transform engine never reads these; they are cloned through every
//! mutation so a renderer sees them unchanged.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Default fill for new shapes (#4A90D9).
    pub fn accent() -> Self {
        Self::new(0x4A, 0x90, 0xD9, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Fill and stroke of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStyle {
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Fill opacity, 0.0..=1.0.
    #[serde(default = "default_opacity")]
    pub fill_opacity: f64,
    /// Texture identifier; empty means solid fill.
    #[serde(default)]
    pub fill_texture: String,
    /// Stroke color (None = no stroke).
    pub stroke_color: Option<SerializableColor>,
    /// Stroke width.
    pub stroke_width: f64,
    /// Stroke opacity, 0.0..=1.0.
    #[serde(default = "default_opacity")]
    pub stroke_opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ItemStyle {
    /// Style with no fill and no stroke (groups, text containers).
    pub fn invisible() -> Self {
        Self {
            fill_color: None,
            fill_opacity: 0.0,
            fill_texture: String::new(),
            stroke_color: None,
            stroke_width: 0.0,
            stroke_opacity: 1.0,
        }
    }

    /// Stroke-only style, used for lines and freehand strokes.
    pub fn outline(width: f64) -> Self {
        Self {
            fill_color: None,
            stroke_width: width,
            ..Self::default()
        }
    }
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            fill_color: Some(SerializableColor::accent()),
            fill_opacity: 1.0,
            fill_texture: String::new(),
            stroke_color: Some(SerializableColor::black()),
            stroke_width: 1.0,
            stroke_opacity: 1.0,
        }
    }
}
