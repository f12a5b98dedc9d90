//! Named text styles and spacing for the visual backends.
//!
//! The screen preview and the structured PDF use the same numbers; only the
//! unit differs (px vs pt), which is carried by the page geometry.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontFace;
use crate::layout::style::{Color, TextStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub line_height: f32,
    pub body: TextStyle,
    pub name: TextStyle,
    pub contact: TextStyle,
    pub section_title: TextStyle,
    pub entry_title: TextStyle,
    pub subtitle: TextStyle,
    pub dates: TextStyle,
    pub location: TextStyle,
    pub detail: TextStyle,
    pub bullet: TextStyle,
    pub link: TextStyle,
    pub label: TextStyle,

    pub name_gap: f32,
    pub header_gap: f32,
    pub contact_gap: f32,
    pub section_gap: f32,
    pub title_gap: f32,
    pub entry_gap: f32,
    pub list_indent: f32,
    pub rule_width: f32,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self {
            line_height: 1.4,
            body: TextStyle::new(FontFace::TimesRoman, 12.0),
            name: TextStyle::new(FontFace::TimesBold, 24.0),
            contact: TextStyle::new(FontFace::TimesRoman, 10.0).color(Color::MUTED),
            section_title: TextStyle::new(FontFace::TimesBold, 12.0),
            entry_title: TextStyle::new(FontFace::TimesBold, 12.0),
            subtitle: TextStyle::new(FontFace::TimesBold, 12.0).color(Color::DARK_GRAY),
            dates: TextStyle::new(FontFace::TimesItalic, 10.0).color(Color::SUBTLE),
            location: TextStyle::new(FontFace::TimesRoman, 10.0).color(Color::SUBTLE),
            detail: TextStyle::new(FontFace::TimesRoman, 10.0).color(Color::MUTED),
            bullet: TextStyle::new(FontFace::TimesRoman, 10.0),
            link: TextStyle::new(FontFace::TimesRoman, 10.0).color(Color::LINK).underlined(),
            label: TextStyle::new(FontFace::TimesBold, 12.0),

            name_gap: 6.0,
            header_gap: 12.0,
            contact_gap: 2.0,
            section_gap: 4.0,
            title_gap: 2.0,
            entry_gap: 2.0,
            list_indent: 4.0,
            rule_width: 1.0,
        }
    }
}

impl Stylesheet {
    /// Room reserved under a section title so it never ends a page alone.
    pub fn keep_with_next(&self) -> f32 {
        self.body.size * self.line_height * 2.0
    }
}
