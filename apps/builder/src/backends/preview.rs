//! Screen preview: a paginated visual tree of positioned boxes in CSS
//! pixels, its standalone HTML form, and the snapshot step that captures
//! the same boxes into PDF pages.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backends::pdf_writer::write_pdf;
use crate::backends::stylesheet::Stylesheet;
use crate::backends::{Artifact, BackendKind, ResumeRenderer};
use crate::compose::ComposedDocument;
use crate::errors::Result;
use crate::layout::flow::{layout, FlowItem, Fragment, LaidOutPage, Placed};
use crate::layout::style::{Align, Color, PageGeometry, TextStyle};
use crate::sections::{ContactItem, EntryBlock, SectionBlock, SectionBody, SkillLine};

/// CSS px (96/in) to PDF pt (72/in).
pub const SNAPSHOT_SCALE: f32 = 0.75;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTree {
    pub title: String,
    pub geometry: PageGeometry,
    pub pages: Vec<LaidOutPage>,
}

impl VisualTree {
    pub fn build(doc: &ComposedDocument, styles: &Stylesheet) -> Self {
        let geometry = PageGeometry::A4_PX;
        let pages = layout(&preview_flow(doc, styles), &geometry);
        Self {
            title: doc.title.clone(),
            geometry,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text run in reading order, across pages.
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.texts().map(|t| t.text.as_str()))
    }

    /// Standalone HTML document: one absolutely positioned `div.page` per page.
    pub fn to_html(&self) -> String {
        let g = &self.geometry;
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n\
             body {{ margin: 0; background: #e5e5e5; }}\n\
             .page {{ position: relative; width: {}px; height: {}px; margin: 16px auto; background: #fff; overflow: hidden; }}\n\
             .page span, .page a {{ position: absolute; white-space: pre; line-height: 1; }}\n\
             .page div.rule {{ position: absolute; }}\n\
             </style>\n</head>\n<body>\n",
            tera::escape_html(&self.title),
            g.width,
            g.height,
        );

        for page in &self.pages {
            html.push_str("<div class=\"page\">\n");
            for item in &page.items {
                match item {
                    Placed::Text(text) => {
                        let top = text.baseline - text.style.size * 0.8;
                        let style = span_css(&text.style, text.x, top);
                        let escaped = tera::escape_html(&text.text);
                        let _ = match &text.link {
                            Some(href) => writeln!(
                                html,
                                "<a href=\"{}\" style=\"{style}\">{escaped}</a>",
                                tera::escape_html(href)
                            ),
                            None => writeln!(html, "<span style=\"{style}\">{escaped}</span>"),
                        };
                    }
                    Placed::Rule(rule) => {
                        let _ = writeln!(
                            html,
                            "<div class=\"rule\" style=\"left:{:.2}px;top:{:.2}px;width:{:.2}px;height:{:.2}px;background:{}\"></div>",
                            rule.x,
                            rule.y,
                            rule.width,
                            rule.thickness,
                            rule.color.to_hex()
                        );
                    }
                }
            }
            html.push_str("</div>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

fn span_css(style: &TextStyle, x: f32, top: f32) -> String {
    let mut css = format!(
        "left:{x:.2}px;top:{top:.2}px;font-size:{}px;{};color:{}",
        style.size,
        style.face.css(),
        style.color.to_hex()
    );
    if style.underline {
        css.push_str(";text-decoration:underline");
    }
    css
}

// ────────────────────────────────────────────────────────────────────────────
// Composed document → flow
// ────────────────────────────────────────────────────────────────────────────

fn paragraph(fragments: Vec<Fragment>, styles: &Stylesheet, align: Align, indent: f32, space_after: f32) -> FlowItem {
    FlowItem::Paragraph {
        fragments,
        align,
        indent,
        line_height: styles.line_height,
        space_after,
        keep_with_next: 0.0,
    }
}

fn header_flow(name: Option<&str>, contacts: &[ContactItem], styles: &Stylesheet, out: &mut Vec<FlowItem>) {
    if let Some(name) = name {
        out.push(paragraph(
            vec![Fragment::new(name.to_uppercase(), styles.name)],
            styles,
            Align::Center,
            0.0,
            styles.name_gap,
        ));
    }
    if !contacts.is_empty() {
        let mut fragments = Vec::with_capacity(contacts.len() * 2);
        for (i, contact) in contacts.iter().enumerate() {
            if i > 0 {
                fragments.push(Fragment::new("|", styles.contact));
            }
            fragments.push(Fragment::new(contact.label.clone(), styles.contact).linked(Some(contact.href.clone())));
        }
        out.push(paragraph(fragments, styles, Align::Center, 0.0, styles.contact_gap));
    }
    out.push(FlowItem::Spacer(styles.header_gap));
}

fn entry_flow(entry: &EntryBlock, styles: &Stylesheet, out: &mut Vec<FlowItem>) {
    let mut left = Vec::new();
    if !entry.title.is_empty() {
        left.push(Fragment::new(entry.title.clone(), styles.entry_title));
    }
    if let Some(subtitle) = &entry.subtitle {
        if !left.is_empty() {
            left.push(Fragment::new("\u{2014}", styles.entry_title));
        }
        left.push(Fragment::new(subtitle.clone(), styles.subtitle).linked(entry.subtitle_link.clone()));
    }
    let right = entry.dates.as_ref().map(|d| Fragment::new(d.clone(), styles.dates));
    if !left.is_empty() || right.is_some() {
        out.push(FlowItem::Split {
            left,
            right,
            line_height: styles.line_height,
            space_after: 0.0,
        });
    }

    if let Some(location) = &entry.location {
        out.push(paragraph(vec![Fragment::new(location.clone(), styles.location)], styles, Align::Left, 0.0, 0.0));
    }
    if let Some(detail) = entry.detail_text() {
        out.push(paragraph(vec![Fragment::new(detail, styles.detail)], styles, Align::Left, 0.0, 0.0));
    }
    if let Some(link) = &entry.link {
        out.push(paragraph(
            vec![Fragment::new(link.clone(), styles.link).linked(Some(link.clone()))],
            styles,
            Align::Left,
            0.0,
            0.0,
        ));
    }
    for bullet in &entry.bullets {
        out.push(paragraph(
            vec![Fragment::new(format!("\u{2022} {bullet}"), styles.bullet)],
            styles,
            Align::Left,
            styles.list_indent,
            0.0,
        ));
    }
    out.push(FlowItem::Spacer(styles.entry_gap));
}

fn skill_flow(line: &SkillLine, styles: &Stylesheet, out: &mut Vec<FlowItem>) {
    out.push(paragraph(
        vec![
            Fragment::new(format!("{}:", line.label), styles.label),
            Fragment::new(line.joined(), styles.body),
        ],
        styles,
        Align::Left,
        0.0,
        0.0,
    ));
}

fn section_flow(section: &SectionBlock, styles: &Stylesheet, out: &mut Vec<FlowItem>) {
    if let SectionBody::Profile { name, contacts } = &section.body {
        header_flow(name.as_deref(), contacts, styles, out);
        return;
    }

    out.push(FlowItem::Paragraph {
        fragments: vec![Fragment::new(section.heading.to_uppercase(), styles.section_title)],
        align: Align::Left,
        indent: 0.0,
        line_height: styles.line_height,
        space_after: 0.0,
        keep_with_next: styles.keep_with_next(),
    });
    out.push(FlowItem::Rule {
        thickness: styles.rule_width,
        color: Color::BLACK,
        space_after: styles.title_gap,
    });

    match &section.body {
        SectionBody::Entries { entries } => entries.iter().for_each(|e| entry_flow(e, styles, out)),
        SectionBody::Skills { lines } => lines.iter().for_each(|l| skill_flow(l, styles, out)),
        SectionBody::Profile { .. } => {}
    }
    out.push(FlowItem::Spacer(styles.section_gap));
}

/// Flow items for the screen preview, sections in composed order.
pub fn preview_flow(doc: &ComposedDocument, styles: &Stylesheet) -> Vec<FlowItem> {
    let mut out = Vec::new();
    for section in &doc.sections {
        section_flow(section, styles, &mut out);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Snapshot renderer
// ────────────────────────────────────────────────────────────────────────────

/// Renders the screen preview and captures it page by page into a PDF.
#[derive(Debug, Clone, Default)]
pub struct ScreenSnapshotRenderer {
    styles: Stylesheet,
}

impl ScreenSnapshotRenderer {
    pub fn preview(&self, doc: &ComposedDocument) -> VisualTree {
        VisualTree::build(doc, &self.styles)
    }
}

impl ResumeRenderer for ScreenSnapshotRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::ScreenSnapshot
    }

    fn render_composed(&self, doc: &ComposedDocument) -> Result<Artifact> {
        let tree = self.preview(doc);
        let bytes = write_pdf(&tree.pages, &tree.geometry, SNAPSHOT_SCALE, &doc.title)?;
        info!(
            "Captured preview of '{}' into {} PDF page(s)",
            doc.title,
            tree.page_count()
        );
        Ok(Artifact::new(self.kind(), &doc.title, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::pdf_writer::tests::page_strings;
    use crate::compose::tests::{full_record, jane_doe};
    use crate::compose::{compose, ComposeOptions};
    use crate::models::resume::Experience;

    fn preview_of(doc: &ComposedDocument) -> VisualTree {
        ScreenSnapshotRenderer::default().preview(doc)
    }

    #[test]
    fn test_jane_doe_preview() {
        let doc = compose(&jane_doe(), &ComposeOptions::with_order(["profile", "experience"]));
        let tree = preview_of(&doc);
        let runs: Vec<&str> = tree.text_runs().collect();

        assert_eq!(runs[0], "JANE DOE");
        assert!(runs.contains(&"EXPERIENCE"));
        assert!(runs.contains(&"Engineer"));
        assert!(runs.contains(&"Acme"));
        assert!(runs.iter().any(|r| r.ends_with("2020 – Present")));
        assert!(runs.contains(&"• Built X"));
        assert!(!runs.contains(&"EDUCATION"));
        assert!(!runs.contains(&"PROJECTS"));
    }

    #[test]
    fn test_project_technologies_carry_label() {
        let doc = compose(&full_record(), &ComposeOptions::with_order(["projects"]));
        let tree = preview_of(&doc);
        assert!(tree.text_runs().any(|r| r == "Techstack Used: Rust, WASM"));
    }

    #[test]
    fn test_section_title_has_rule() {
        let doc = compose(&jane_doe(), &ComposeOptions::with_order(["experience"]));
        let tree = preview_of(&doc);
        let rules = tree.pages[0]
            .items
            .iter()
            .filter(|i| matches!(i, Placed::Rule(_)))
            .count();
        assert_eq!(rules, 1);
    }

    #[test]
    fn test_contacts_are_separated_and_linked() {
        let doc = compose(&full_record(), &ComposeOptions::with_order(["profile"]));
        let tree = preview_of(&doc);
        let texts: Vec<_> = tree.pages[0].texts().collect();

        let email = texts.iter().find(|t| t.text == "jane@example.com").unwrap();
        assert_eq!(email.link.as_deref(), Some("mailto:jane@example.com"));
        let separators = texts.iter().filter(|t| t.text == "|").count();
        assert_eq!(separators, 1);
        assert!(texts.iter().all(|t| !t.text.starts_with('|') || t.text == "|"));
    }

    #[test]
    fn test_long_history_paginates() {
        let mut record = jane_doe();
        for i in 0..40 {
            record.experience.push(Experience {
                position: Some(format!("Role {i}")),
                company: Some("Acme".to_string()),
                start_year: Some("2019".to_string()),
                end_year: Some("2020".to_string()),
                points: vec!["Shipped things".to_string(), "Fixed things".to_string()],
                ..Experience::new()
            });
        }
        let doc = compose(&record, &ComposeOptions::default());
        let tree = preview_of(&doc);
        assert!(tree.page_count() > 1);

        let bytes = ScreenSnapshotRenderer::default().render_composed(&doc).unwrap().bytes;
        assert_eq!(page_strings(&bytes).len(), tree.page_count());
    }

    #[test]
    fn test_html_escapes_user_text() {
        let mut record = jane_doe();
        record.personal_info.name = Some("Jane <script>".to_string());
        let doc = compose(&record, &ComposeOptions::with_order(["profile"]));
        let html = preview_of(&doc).to_html();
        assert!(html.contains("JANE &lt;SCRIPT&gt;"));
        assert!(!html.contains("<SCRIPT>"));
        assert_eq!(html.matches("<div class=\"page\">").count(), 1);
    }

    #[test]
    fn test_snapshot_matches_preview_text() {
        let doc = compose(&full_record(), &ComposeOptions::default());
        let tree = preview_of(&doc);
        let artifact = ScreenSnapshotRenderer::default().render_composed(&doc).unwrap();

        let pdf_text: Vec<String> = page_strings(&artifact.bytes).concat();
        let ascii_runs: Vec<&str> = tree.text_runs().filter(|r| r.is_ascii()).collect();
        for run in ascii_runs {
            assert!(pdf_text.iter().any(|s| s == run), "missing '{run}' in snapshot");
        }
    }
}
