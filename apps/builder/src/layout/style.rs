//! Style primitives shared by the visual backends.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontFace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const DARK_GRAY: Color = Color::rgb(0x33, 0x33, 0x33);
    pub const MUTED: Color = Color::rgb(0x55, 0x55, 0x55);
    pub const SUBTLE: Color = Color::rgb(0x66, 0x66, 0x66);
    pub const LINK: Color = Color::rgb(0x00, 0x66, 0xcc);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Components in `0.0..=1.0` for PDF colour operators.
    pub fn to_unit(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Color,
    pub underline: bool,
}

impl TextStyle {
    pub const fn new(face: FontFace, size: f32) -> Self {
        Self {
            face,
            size,
            color: Color::BLACK,
            underline: false,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
}

/// Page size and padding, in the unit of the backend (pt or px).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl PageGeometry {
    /// A4 in PDF points.
    pub const A4_PT: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
        padding_x: 28.0,
        padding_y: 20.0,
    };

    /// A4 in CSS pixels (96 px/in).
    pub const A4_PX: PageGeometry = PageGeometry {
        width: 794.0,
        height: 1123.0,
        padding_x: 28.0,
        padding_y: 20.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.padding_x
    }

    pub fn content_bottom(&self) -> f32 {
        self.height - self.padding_y
    }
}
