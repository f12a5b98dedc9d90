//! Structured PDF backend.
//!
//! The composed document becomes an explicit node tree (Document → Page →
//! View/Text with style attributes), which is then laid out by the flow
//! engine and written straight to PDF bytes. Nothing is cached between
//! calls: every render rebuilds the tree from the composed sections.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backends::pdf_writer::write_pdf;
use crate::backends::stylesheet::Stylesheet;
use crate::backends::{Artifact, BackendKind, ResumeRenderer};
use crate::compose::ComposedDocument;
use crate::errors::Result;
use crate::layout::flow::{layout, FlowItem, Fragment};
use crate::layout::font_metrics::FontFace;
use crate::layout::style::{Align, Color, PageGeometry};
use crate::sections::{ContactItem, EntryBlock, SectionBlock, SectionBody};

// ────────────────────────────────────────────────────────────────────────────
// Tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfDocumentTree {
    pub title: String,
    pub page: PageNode,
}

/// One page template; the flow engine repeats it as content overflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub size: PageGeometry,
    pub font: FontFace,
    pub font_size: f32,
    pub line_height: f32,
    pub children: Vec<PdfNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewStyle {
    pub direction: Direction,
    pub text_align: Align,
    pub padding_left: f32,
    pub margin_bottom: f32,
}

impl Default for ViewStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Column,
            text_align: Align::Left,
            padding_left: 0.0,
            margin_bottom: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNodeStyle {
    pub margin_bottom: f32,
    pub border_bottom: Option<Border>,
    /// Do not leave this node as the last thing on a page.
    pub keep_with_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum PdfNode {
    View { style: ViewStyle, children: Vec<PdfNode> },
    Text { style: TextNodeStyle, runs: Vec<Fragment> },
}

impl PdfNode {
    fn view(style: ViewStyle, children: Vec<PdfNode>) -> Self {
        PdfNode::View { style, children }
    }

    fn text(runs: Vec<Fragment>) -> Self {
        PdfNode::Text {
            style: TextNodeStyle::default(),
            runs,
        }
    }

    /// All text content beneath this node, depth first.
    pub fn collect_text(&self, out: &mut Vec<String>) {
        match self {
            PdfNode::View { children, .. } => children.iter().for_each(|c| c.collect_text(out)),
            PdfNode::Text { runs, .. } => out.extend(runs.iter().map(|r| r.text.clone())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composed document → tree
// ────────────────────────────────────────────────────────────────────────────

fn header_node(name: Option<&str>, contacts: &[ContactItem], styles: &Stylesheet) -> PdfNode {
    let mut children = Vec::new();
    if let Some(name) = name {
        children.push(PdfNode::Text {
            style: TextNodeStyle {
                margin_bottom: styles.name_gap,
                ..TextNodeStyle::default()
            },
            runs: vec![Fragment::new(name.to_uppercase(), styles.name)],
        });
    }
    if !contacts.is_empty() {
        let mut runs = Vec::new();
        for (i, contact) in contacts.iter().enumerate() {
            if i > 0 {
                runs.push(Fragment::new("|", styles.contact));
            }
            runs.push(Fragment::new(contact.label.clone(), styles.contact).linked(Some(contact.href.clone())));
        }
        children.push(PdfNode::Text {
            style: TextNodeStyle {
                margin_bottom: styles.contact_gap,
                ..TextNodeStyle::default()
            },
            runs,
        });
    }
    PdfNode::view(
        ViewStyle {
            text_align: Align::Center,
            margin_bottom: styles.header_gap,
            ..ViewStyle::default()
        },
        children,
    )
}

fn entry_node(entry: &EntryBlock, styles: &Stylesheet) -> PdfNode {
    let mut children = Vec::new();

    let mut title_runs = Vec::new();
    if !entry.title.is_empty() {
        title_runs.push(Fragment::new(entry.title.clone(), styles.entry_title));
    }
    if let Some(subtitle) = &entry.subtitle {
        if !title_runs.is_empty() {
            title_runs.push(Fragment::new("\u{2014}", styles.entry_title));
        }
        title_runs.push(Fragment::new(subtitle.clone(), styles.subtitle).linked(entry.subtitle_link.clone()));
    }
    let mut header = vec![PdfNode::text(title_runs)];
    if let Some(dates) = &entry.dates {
        header.push(PdfNode::text(vec![Fragment::new(dates.clone(), styles.dates)]));
    }
    children.push(PdfNode::view(
        ViewStyle {
            direction: Direction::Row,
            ..ViewStyle::default()
        },
        header,
    ));

    if let Some(location) = &entry.location {
        children.push(PdfNode::text(vec![Fragment::new(location.clone(), styles.location)]));
    }
    if let Some(detail) = entry.detail_text() {
        children.push(PdfNode::text(vec![Fragment::new(detail, styles.detail)]));
    }
    if let Some(link) = &entry.link {
        children.push(PdfNode::text(vec![
            Fragment::new(link.clone(), styles.link).linked(Some(link.clone()))
        ]));
    }
    if !entry.bullets.is_empty() {
        let items = entry
            .bullets
            .iter()
            .map(|b| PdfNode::text(vec![Fragment::new(format!("\u{2022} {b}"), styles.bullet)]))
            .collect();
        children.push(PdfNode::view(
            ViewStyle {
                padding_left: styles.list_indent,
                ..ViewStyle::default()
            },
            items,
        ));
    }

    PdfNode::view(
        ViewStyle {
            margin_bottom: styles.entry_gap,
            ..ViewStyle::default()
        },
        children,
    )
}

fn section_node(section: &SectionBlock, styles: &Stylesheet) -> PdfNode {
    let mut children = vec![PdfNode::Text {
        style: TextNodeStyle {
            margin_bottom: styles.title_gap,
            border_bottom: Some(Border {
                width: styles.rule_width,
                color: Color::BLACK,
            }),
            keep_with_next: true,
        },
        runs: vec![Fragment::new(section.heading.to_uppercase(), styles.section_title)],
    }];

    match &section.body {
        SectionBody::Entries { entries } => {
            children.extend(entries.iter().map(|e| entry_node(e, styles)));
        }
        SectionBody::Skills { lines } => {
            children.extend(lines.iter().map(|line| {
                PdfNode::text(vec![
                    Fragment::new(format!("{}:", line.label), styles.label),
                    Fragment::new(line.joined(), styles.body),
                ])
            }));
        }
        SectionBody::Profile { .. } => {}
    }

    PdfNode::view(
        ViewStyle {
            margin_bottom: styles.section_gap,
            ..ViewStyle::default()
        },
        children,
    )
}

/// Builds the document tree for `doc`, sections in composed order.
pub fn build_document_tree(doc: &ComposedDocument, styles: &Stylesheet) -> PdfDocumentTree {
    let children = doc
        .sections
        .iter()
        .map(|section| match &section.body {
            SectionBody::Profile { name, contacts } => header_node(name.as_deref(), contacts, styles),
            _ => section_node(section, styles),
        })
        .collect();

    PdfDocumentTree {
        title: doc.title.clone(),
        page: PageNode {
            size: PageGeometry::A4_PT,
            font: styles.body.face,
            font_size: styles.body.size,
            line_height: styles.line_height,
            children,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tree → flow
// ────────────────────────────────────────────────────────────────────────────

struct FlowContext {
    align: Align,
    indent: f32,
    line_height: f32,
    keep_room: f32,
}

fn node_flow(node: &PdfNode, ctx: &FlowContext, out: &mut Vec<FlowItem>) {
    match node {
        PdfNode::Text { style, runs } => {
            out.push(FlowItem::Paragraph {
                fragments: runs.clone(),
                align: ctx.align,
                indent: ctx.indent,
                line_height: ctx.line_height,
                space_after: if style.border_bottom.is_some() { 0.0 } else { style.margin_bottom },
                keep_with_next: if style.keep_with_next { ctx.keep_room } else { 0.0 },
            });
            if let Some(border) = style.border_bottom {
                out.push(FlowItem::Rule {
                    thickness: border.width,
                    color: border.color,
                    space_after: style.margin_bottom,
                });
            }
        }
        PdfNode::View { style, children } => {
            match style.direction {
                Direction::Row => {
                    let mut texts = children.iter().filter_map(|c| match c {
                        PdfNode::Text { runs, .. } => Some(runs),
                        PdfNode::View { .. } => None,
                    });
                    let left = texts.next().cloned().unwrap_or_default();
                    let right = texts.next().and_then(|runs| runs.first().cloned());
                    if !left.is_empty() || right.is_some() {
                        out.push(FlowItem::Split {
                            left,
                            right,
                            line_height: ctx.line_height,
                            space_after: 0.0,
                        });
                    }
                }
                Direction::Column => {
                    let inner = FlowContext {
                        align: style.text_align,
                        indent: ctx.indent + style.padding_left,
                        line_height: ctx.line_height,
                        keep_room: ctx.keep_room,
                    };
                    for child in children {
                        node_flow(child, &inner, out);
                    }
                }
            }
            if style.margin_bottom > 0.0 {
                out.push(FlowItem::Spacer(style.margin_bottom));
            }
        }
    }
}

impl PdfDocumentTree {
    pub fn to_flow(&self) -> Vec<FlowItem> {
        let ctx = FlowContext {
            align: Align::Left,
            indent: 0.0,
            line_height: self.page.line_height,
            keep_room: self.page.font_size * self.page.line_height * 2.0,
        };
        let mut out = Vec::new();
        for child in &self.page.children {
            node_flow(child, &ctx, &mut out);
        }
        out
    }

    /// Lays the tree out and writes it as PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let pages = layout(&self.to_flow(), &self.page.size);
        write_pdf(&pages, &self.page.size, 1.0, &self.title)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StructuredDocumentRenderer {
    styles: Stylesheet,
}

impl StructuredDocumentRenderer {
    pub fn document_tree(&self, doc: &ComposedDocument) -> PdfDocumentTree {
        build_document_tree(doc, &self.styles)
    }
}

impl ResumeRenderer for StructuredDocumentRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::StructuredDocument
    }

    fn render_composed(&self, doc: &ComposedDocument) -> Result<Artifact> {
        let tree = self.document_tree(doc);
        let bytes = tree.to_pdf()?;
        info!("Rendered structured PDF for '{}' ({} bytes)", doc.title, bytes.len());
        Ok(Artifact::new(self.kind(), &doc.title, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::pdf_writer::tests::page_strings;
    use crate::compose::tests::{full_record, jane_doe};
    use crate::compose::{compose, ComposeOptions};
    use crate::sections::SectionId;

    fn tree_text(tree: &PdfDocumentTree) -> Vec<String> {
        let mut out = Vec::new();
        for child in &tree.page.children {
            child.collect_text(&mut out);
        }
        out
    }

    #[test]
    fn test_tree_page_defaults() {
        let doc = compose(&jane_doe(), &ComposeOptions::default());
        let tree = StructuredDocumentRenderer::default().document_tree(&doc);
        assert_eq!(tree.page.size.width, 595.0);
        assert_eq!(tree.page.size.height, 842.0);
        assert_eq!(tree.page.font, FontFace::TimesRoman);
        assert_eq!(tree.page.font_size, 12.0);
        assert_eq!(tree.page.line_height, 1.4);
    }

    #[test]
    fn test_jane_doe_tree() {
        let doc = compose(&jane_doe(), &ComposeOptions::with_order(["profile", "experience"]));
        let tree = StructuredDocumentRenderer::default().document_tree(&doc);
        assert_eq!(tree.page.children.len(), 2);

        let text = tree_text(&tree);
        assert_eq!(text[0], "JANE DOE");
        assert!(text.contains(&"EXPERIENCE".to_string()));
        assert!(text.contains(&"Engineer".to_string()));
        assert!(text.contains(&"Acme".to_string()));
        assert!(text.iter().any(|t| t.ends_with("2020 – Present")));
        assert!(text.contains(&"• Built X".to_string()));
        assert!(!text.contains(&"EDUCATION".to_string()));
    }

    #[test]
    fn test_project_detail_is_labelled() {
        let doc = compose(&full_record(), &ComposeOptions::with_order(["projects"]));
        let text = tree_text(&StructuredDocumentRenderer::default().document_tree(&doc));
        assert!(text.contains(&"Techstack Used: Rust, WASM".to_string()));
    }

    #[test]
    fn test_jane_doe_pdf_bytes() {
        let doc = compose(&jane_doe(), &ComposeOptions::with_order(["profile", "experience"]));
        let artifact = StructuredDocumentRenderer::default().render_composed(&doc).unwrap();
        assert_eq!(artifact.filename, "Jane Doe.pdf");

        let pages = page_strings(&artifact.bytes);
        assert_eq!(pages.len(), 1);
        let strings = &pages[0];
        assert_eq!(strings[0], "JANE DOE");
        assert!(strings.contains(&"Engineer".to_string()));
        assert!(strings.contains(&"Acme".to_string()));
        // en dash is written as WinAnsi 0x96
        assert!(strings.iter().any(|s| s.ends_with("2020 \u{96} Present")));
        assert!(!strings.contains(&"EDUCATION".to_string()));
    }

    #[test]
    fn test_row_view_becomes_split() {
        let doc = compose(&jane_doe(), &ComposeOptions::with_order(["experience"]));
        let flow = StructuredDocumentRenderer::default().document_tree(&doc).to_flow();
        let split = flow
            .iter()
            .find_map(|item| match item {
                FlowItem::Split { left, right, .. } => Some((left, right)),
                _ => None,
            })
            .unwrap();
        assert_eq!(split.0[0].text, "Engineer");
        assert!(split.1.as_ref().unwrap().text.ends_with("Present"));
    }

    #[test]
    fn test_bullets_are_indented() {
        let doc = compose(&full_record(), &ComposeOptions::with_order(["projects"]));
        let flow = StructuredDocumentRenderer::default().document_tree(&doc).to_flow();
        let bullet_indent = flow.iter().find_map(|item| match item {
            FlowItem::Paragraph { fragments, indent, .. } if fragments[0].text.starts_with('\u{2022}') => {
                Some(*indent)
            }
            _ => None,
        });
        assert_eq!(bullet_indent, Some(4.0));
    }

    #[test]
    fn test_headings_follow_overrides() {
        let options = ComposeOptions::with_order(["skills"]).heading(SectionId::Skills, "Toolbox");
        let doc = compose(&full_record(), &options);
        let tree = StructuredDocumentRenderer::default().document_tree(&doc);
        let text = tree_text(&tree);
        assert_eq!(text[0], "TOOLBOX");
        assert!(text.contains(&"Rust, Go".to_string()));
        assert!(text.contains(&"Tools & Technologies:".to_string()));
    }
}
