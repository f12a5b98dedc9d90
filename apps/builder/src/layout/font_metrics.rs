//! Static font-metric tables for the PDF base-14 faces used by the resume.
//!
//! Widths are in em units (glyph advance / 1000 from the Adobe AFM files,
//! rounded). The PDF writer references these faces without embedding them, so
//! measuring with the same tables keeps wrapping consistent with what a
//! viewer draws. All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    TimesRoman,
    TimesBold,
    TimesItalic,
}

impl FontFace {
    pub const ALL: [FontFace; 3] = [FontFace::TimesRoman, FontFace::TimesBold, FontFace::TimesItalic];

    /// PostScript name used as the PDF `BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::TimesRoman => "Times-Roman",
            FontFace::TimesBold => "Times-Bold",
            FontFace::TimesItalic => "Times-Italic",
        }
    }

    /// Resource name under the page `/Font` dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::TimesRoman => "F1",
            FontFace::TimesBold => "F2",
            FontFace::TimesItalic => "F3",
        }
    }

    /// CSS declarations for the HTML preview.
    pub fn css(&self) -> &'static str {
        match self {
            FontFace::TimesRoman => "font-family:'Times New Roman',Times,serif",
            FontFace::TimesBold => "font-family:'Times New Roman',Times,serif;font-weight:bold",
            FontFace::TimesItalic => "font-family:'Times New Roman',Times,serif;font-style:italic",
        }
    }

    pub fn metrics(&self) -> &'static FontMetricTable {
        get_metrics(self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Width table for a font face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub face: FontFace,
    widths: [f32; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '\u{2013}' => 0.5,   // en dash
            '\u{2014}' => 1.0,   // em dash
            '\u{2022}' => 0.35,  // bullet
            _ => self.average_char_width,
        }
    }

    /// Width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Width of `s` at `size` (same unit as `size`: pt or px).
    pub fn measure(&self, s: &str, size: f32) -> f32 {
        self.measure_str(s) * size
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static TIMES_ROMAN_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::TimesRoman,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.33, 0.41, 0.50, 0.50, 0.83, 0.78, 0.18, 0.33, 0.33, 0.50, 0.56, 0.25, 0.33, 0.25, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.56, 0.56, 0.56, 0.44, 0.92,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.72, 0.67, 0.67, 0.72, 0.61, 0.56, 0.72, 0.72, 0.33, 0.39, 0.72, 0.61, 0.89,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.72, 0.72, 0.56, 0.72, 0.67, 0.56, 0.61, 0.72, 0.72, 0.94, 0.72, 0.72, 0.61,
        // [     \     ]     ^     _     `
        0.33, 0.28, 0.33, 0.47, 0.50, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.44, 0.50, 0.44, 0.50, 0.44, 0.33, 0.50, 0.50, 0.28, 0.28, 0.50, 0.28, 0.78,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.50, 0.50, 0.50, 0.50, 0.33, 0.39, 0.28, 0.50, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.48, 0.20, 0.48, 0.54,
    ],
    average_char_width: 0.47,
    space_width: 0.25,
};

static TIMES_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::TimesBold,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.33, 0.56, 0.50, 0.50, 1.00, 0.83, 0.28, 0.33, 0.33, 0.50, 0.57, 0.25, 0.33, 0.25, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50,
        // :     ;     <     =     >     ?     @
        0.33, 0.33, 0.57, 0.57, 0.57, 0.50, 0.93,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.72, 0.67, 0.72, 0.72, 0.67, 0.61, 0.78, 0.78, 0.39, 0.50, 0.78, 0.67, 0.94,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.72, 0.78, 0.61, 0.78, 0.72, 0.56, 0.67, 0.72, 0.72, 1.00, 0.72, 0.72, 0.67,
        // [     \     ]     ^     _     `
        0.33, 0.28, 0.33, 0.58, 0.50, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.50, 0.56, 0.44, 0.56, 0.44, 0.33, 0.50, 0.56, 0.28, 0.33, 0.56, 0.28, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.50, 0.56, 0.56, 0.44, 0.39, 0.33, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.39, 0.22, 0.39, 0.52,
    ],
    average_char_width: 0.50,
    space_width: 0.25,
};

static TIMES_ITALIC_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::TimesItalic,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.33, 0.42, 0.50, 0.50, 0.83, 0.78, 0.21, 0.33, 0.33, 0.50, 0.68, 0.25, 0.33, 0.25, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50,
        // :     ;     <     =     >     ?     @
        0.33, 0.33, 0.68, 0.68, 0.68, 0.50, 0.92,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.61, 0.61, 0.67, 0.72, 0.61, 0.61, 0.72, 0.72, 0.33, 0.44, 0.67, 0.56, 0.83,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.61, 0.72, 0.61, 0.50, 0.56, 0.72, 0.61, 0.83, 0.61, 0.56, 0.56,
        // [     \     ]     ^     _     `
        0.39, 0.28, 0.39, 0.42, 0.50, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.50, 0.50, 0.44, 0.50, 0.44, 0.28, 0.50, 0.50, 0.28, 0.28, 0.44, 0.28, 0.72,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.50, 0.50, 0.50, 0.50, 0.39, 0.39, 0.28, 0.50, 0.44, 0.67, 0.44, 0.44, 0.39,
        // {     |     }     ~
        0.40, 0.28, 0.40, 0.54,
    ],
    average_char_width: 0.47,
    space_width: 0.25,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: &FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::TimesRoman => &TIMES_ROMAN_TABLE,
        FontFace::TimesBold => &TIMES_BOLD_TABLE,
        FontFace::TimesItalic => &TIMES_ITALIC_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(&FontFace::TimesRoman).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(&FontFace::TimesRoman);
        // "Rust" = R(0.67) + u(0.50) + s(0.39) + t(0.28) = 1.84
        let width = metrics.measure_str("Rust");
        assert!((width - 1.84).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_scales_with_size() {
        let metrics = get_metrics(&FontFace::TimesItalic);
        let at_10 = metrics.measure("resume", 10.0);
        let at_20 = metrics.measure("resume", 20.0);
        assert!((at_20 - 2.0 * at_10).abs() < 1e-3);
    }

    #[test]
    fn test_typographic_punctuation_has_width() {
        let metrics = get_metrics(&FontFace::TimesRoman);
        assert!((metrics.measure_str("\u{2013}") - 0.5).abs() < 1e-4);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider_than_roman() {
        let text = "Senior Software Engineer";
        assert!(
            get_metrics(&FontFace::TimesBold).measure_str(text)
                > get_metrics(&FontFace::TimesRoman).measure_str(text)
        );
    }

    #[test]
    fn test_every_face_has_distinct_resource() {
        let mut names: Vec<_> = FontFace::ALL.iter().map(|f| f.resource_name()).collect();
        names.dedup();
        assert_eq!(names.len(), 3);
        for face in FontFace::ALL {
            assert_eq!(face.metrics().face, face);
        }
    }
}
