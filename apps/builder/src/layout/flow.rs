//! Flow layout: stacks styled blocks down the page, wrapping text and
//! breaking to a new page when the next line does not fit.
//!
//! Units follow the supplied [`PageGeometry`] (pt for PDF, px for screen).
//! Positions are measured from the top-left corner of the page.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::style::{Align, Color, PageGeometry, TextStyle};

/// Baseline offset inside a line box, as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// Gap kept between the left column and a right-aligned trailer.
const SPLIT_GAP: f32 = 8.0;

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub style: TextStyle,
    pub link: Option<String>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }

    pub fn linked(mut self, href: Option<String>) -> Self {
        self.link = href;
        self
    }
}

/// One block in the vertical flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowItem {
    /// Word-wrapped text. `line_height` is a multiple of the largest font size
    /// on each line; `keep_with_next` reserves extra room below the first line
    /// so headings are not stranded at the bottom of a page.
    Paragraph {
        fragments: Vec<Fragment>,
        align: Align,
        indent: f32,
        line_height: f32,
        space_after: f32,
        keep_with_next: f32,
    },
    /// Left text that wraps, plus an optional right-aligned trailer on the
    /// first line (title / dates rows).
    Split {
        left: Vec<Fragment>,
        right: Option<Fragment>,
        line_height: f32,
        space_after: f32,
    },
    /// Full-width horizontal rule.
    Rule {
        thickness: f32,
        color: Color,
        space_after: f32,
    },
    Spacer(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedText {
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
    pub text: String,
    pub style: TextStyle,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRule {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub thickness: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Placed {
    Text(PlacedText),
    Rule(PlacedRule),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaidOutPage {
    pub items: Vec<Placed>,
}

impl LaidOutPage {
    pub fn texts(&self) -> impl Iterator<Item = &PlacedText> {
        self.items.iter().filter_map(|item| match item {
            Placed::Text(text) => Some(text),
            Placed::Rule(_) => None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line breaking
// ────────────────────────────────────────────────────────────────────────────

struct Token<'a> {
    word: &'a str,
    fragment: usize,
    x: f32,
    width: f32,
}

#[derive(Default)]
struct Line<'a> {
    tokens: Vec<Token<'a>>,
    width: f32,
    max_size: f32,
}

impl<'a> Line<'a> {
    fn push(&mut self, word: &'a str, fragment: usize, space: f32, width: f32, size: f32) {
        let x = self.width + space;
        self.tokens.push(Token {
            word,
            fragment,
            x,
            width,
        });
        self.width = x + width;
        self.max_size = self.max_size.max(size);
    }
}

fn break_lines(fragments: &[Fragment], max_width: f32) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for (index, fragment) in fragments.iter().enumerate() {
        let metrics = fragment.style.face.metrics();
        let size = fragment.style.size;
        for word in fragment.text.split_whitespace() {
            let width = metrics.measure(word, size);
            if current.tokens.is_empty() {
                current.push(word, index, 0.0, width, size);
                continue;
            }
            let space = metrics.space_width * size;
            if current.width + space + width > max_width {
                lines.push(std::mem::take(&mut current));
                current.push(word, index, 0.0, width, size);
            } else {
                current.push(word, index, space, width, size);
            }
        }
    }
    if !current.tokens.is_empty() {
        lines.push(current);
    }
    lines
}

/// Merges consecutive tokens of the same fragment into placed runs.
fn place_line(line: &Line<'_>, fragments: &[Fragment], origin_x: f32, baseline: f32) -> Vec<PlacedText> {
    let mut runs: Vec<(usize, f32, f32, String)> = Vec::new();
    for token in &line.tokens {
        match runs.last_mut() {
            Some((fragment, x, width, text)) if *fragment == token.fragment => {
                text.push(' ');
                text.push_str(token.word);
                *width = token.x + token.width - *x;
            }
            _ => runs.push((token.fragment, token.x, token.width, token.word.to_string())),
        }
    }
    runs.into_iter()
        .map(|(fragment, x, width, text)| PlacedText {
            x: origin_x + x,
            baseline,
            width,
            text,
            style: fragments[fragment].style,
            link: fragments[fragment].link.clone(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<LaidOutPage>,
    current: LaidOutPage,
    y: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: LaidOutPage::default(),
            y: geometry.padding_y,
        }
    }

    /// Starts a new page unless `height` still fits. An empty page always
    /// accepts the block, so oversized content cannot loop forever.
    fn reserve(&mut self, height: f32) {
        if self.y + height > self.geometry.content_bottom() && !self.current.items.is_empty() {
            debug!("Page break after page {}", self.pages.len() + 1);
            self.pages.push(std::mem::take(&mut self.current));
            self.y = self.geometry.padding_y;
        }
    }

    fn advance(&mut self, amount: f32) {
        self.y += amount;
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

fn baseline_in(top: f32, line_box: f32, size: f32) -> f32 {
    top + (line_box - size) / 2.0 + size * ASCENT
}

/// Lays `items` out onto as many pages as needed. Always returns at least
/// one page.
pub fn layout(items: &[FlowItem], geometry: &PageGeometry) -> Vec<LaidOutPage> {
    let mut cursor = Cursor::new(geometry);
    let left = geometry.padding_x;
    let content_width = geometry.content_width();

    for item in items {
        match item {
            FlowItem::Paragraph {
                fragments,
                align,
                indent,
                line_height,
                space_after,
                keep_with_next,
            } => {
                let avail = content_width - indent;
                let lines = break_lines(fragments, avail);
                for (i, line) in lines.iter().enumerate() {
                    let line_box = line.max_size * line_height;
                    let extra = if i == 0 { *keep_with_next } else { 0.0 };
                    cursor.reserve(line_box + extra);
                    let offset = match align {
                        Align::Left => 0.0,
                        Align::Center => ((avail - line.width) / 2.0).max(0.0),
                    };
                    let baseline = baseline_in(cursor.y, line_box, line.max_size);
                    let placed = place_line(line, fragments, left + indent + offset, baseline);
                    cursor.current.items.extend(placed.into_iter().map(Placed::Text));
                    cursor.advance(line_box);
                }
                if !lines.is_empty() {
                    cursor.advance(*space_after);
                }
            }
            FlowItem::Split {
                left: left_fragments,
                right,
                line_height,
                space_after,
            } => {
                let right_width = right
                    .as_ref()
                    .map(|r| r.style.face.metrics().measure(&r.text, r.style.size))
                    .unwrap_or(0.0);
                let avail = if right_width > 0.0 {
                    (content_width - right_width - SPLIT_GAP).max(content_width / 3.0)
                } else {
                    content_width
                };
                let lines = break_lines(left_fragments, avail);
                let right_size = right.as_ref().map(|r| r.style.size).unwrap_or(0.0);
                let row_count = lines.len().max(usize::from(right.is_some()));
                for row in 0..row_count {
                    let line = lines.get(row);
                    let mut size = line.map(|l| l.max_size).unwrap_or(0.0);
                    if row == 0 {
                        size = size.max(right_size);
                    }
                    let line_box = size * line_height;
                    cursor.reserve(line_box);
                    let baseline = baseline_in(cursor.y, line_box, size);
                    if let Some(line) = line {
                        let placed = place_line(line, left_fragments, left, baseline);
                        cursor.current.items.extend(placed.into_iter().map(Placed::Text));
                    }
                    if row == 0 {
                        if let Some(right) = right {
                            cursor.current.items.push(Placed::Text(PlacedText {
                                x: left + content_width - right_width,
                                baseline,
                                width: right_width,
                                text: right.text.clone(),
                                style: right.style,
                                link: right.link.clone(),
                            }));
                        }
                    }
                    cursor.advance(line_box);
                }
                if row_count > 0 {
                    cursor.advance(*space_after);
                }
            }
            FlowItem::Rule {
                thickness,
                color,
                space_after,
            } => {
                cursor.reserve(*thickness);
                cursor.current.items.push(Placed::Rule(PlacedRule {
                    x: left,
                    y: cursor.y,
                    width: content_width,
                    thickness: *thickness,
                    color: *color,
                }));
                cursor.advance(thickness + space_after);
            }
            FlowItem::Spacer(amount) => cursor.advance(*amount),
        }
    }

    cursor.finish()
}
