//! lopdf writer shared by the snapshot and structured PDF backends.
//!
//! Takes pages that have already been laid out (top-left origin, in the
//! layout's own unit) and emits one PDF page per laid-out page using the
//! standard Type1 base fonts. `scale` converts layout units to points, so
//! the screen preview (px) and the document tree (pt) share this code.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::errors::Result;
use crate::layout::flow::{LaidOutPage, Placed, PlacedRule, PlacedText};
use crate::layout::font_metrics::FontFace;
use crate::layout::style::{Color, PageGeometry};

/// Underline offset below the baseline, as a fraction of the font size.
const UNDERLINE_OFFSET: f32 = 0.12;

/// Encodes text for a WinAnsiEncoding base font. Characters outside the
/// code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2022}' => 0x95,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{20AC}' => 0x80,
            c if (c as u32) < 0x80 || ((c as u32) >= 0xA0 && (c as u32) <= 0xFF) => c as u8,
            _ => b'?',
        })
        .collect()
}

fn literal(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

#[derive(Default)]
struct PageState {
    font: Option<(FontFace, f32)>,
    fill: Option<Color>,
}

struct PageContext {
    scale: f32,
    page_height: f32,
    content: Content,
    state: PageState,
    links: Vec<([f32; 4], String)>,
}

impl PageContext {
    fn new(scale: f32, page_height: f32) -> Self {
        Self {
            scale,
            page_height,
            content: Content { operations: vec![] },
            state: PageState::default(),
            links: Vec::new(),
        }
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    /// Layout y (top-down) to PDF y (bottom-up), in points.
    fn flip(&self, y: f32) -> f32 {
        self.page_height - y * self.scale
    }

    fn set_fill(&mut self, color: Color) {
        if self.state.fill != Some(color) {
            let [r, g, b] = color.to_unit();
            self.op("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill = Some(color);
        }
    }

    fn set_font(&mut self, face: FontFace, size: f32) {
        if self.state.font != Some((face, size)) {
            self.op(
                "Tf",
                vec![
                    Object::Name(face.resource_name().as_bytes().to_vec()),
                    (size * self.scale).into(),
                ],
            );
            self.state.font = Some((face, size));
        }
    }

    fn draw_text(&mut self, text: &PlacedText) {
        if text.text.trim().is_empty() {
            return;
        }
        let x = text.x * self.scale;
        let y = self.flip(text.baseline);

        self.op("BT", vec![]);
        self.set_font(text.style.face, text.style.size);
        self.set_fill(text.style.color);
        self.op("Td", vec![x.into(), y.into()]);
        self.op("Tj", vec![literal(&text.text)]);
        self.op("ET", vec![]);

        if text.style.underline {
            let under = text.baseline + text.style.size * UNDERLINE_OFFSET;
            self.fill_rect(text.x, under, text.width, (text.style.size / 16.0).max(0.5), text.style.color);
        }

        if let Some(href) = &text.link {
            let top = text.baseline - text.style.size * 0.8;
            let bottom = text.baseline + text.style.size * 0.2;
            let rect = [x, self.flip(bottom), (text.x + text.width) * self.scale, self.flip(top)];
            self.links.push((rect, href.clone()));
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.set_fill(color);
        let pdf_y = self.flip(y + height);
        self.op(
            "re",
            vec![
                (x * self.scale).into(),
                pdf_y.into(),
                (width * self.scale).into(),
                (height * self.scale).into(),
            ],
        );
        self.op("f", vec![]);
    }

    fn draw_rule(&mut self, rule: &PlacedRule) {
        self.fill_rect(rule.x, rule.y, rule.width, rule.thickness, rule.color);
    }

    fn draw(&mut self, item: &Placed) {
        match item {
            Placed::Text(text) => self.draw_text(text),
            Placed::Rule(rule) => self.draw_rule(rule),
        }
    }
}

fn font_resources(doc: &mut Document) -> Dictionary {
    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    fonts
}

fn link_annotation(doc: &mut Document, rect: [f32; 4], href: &str) -> ObjectId {
    let action = dictionary! {
        "S" => "URI",
        "URI" => Object::String(href.as_bytes().to_vec(), StringFormat::Literal),
    };
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect.iter().map(|v| Object::from(*v)).collect::<Vec<Object>>(),
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => action,
    })
}

/// Writes `pages` as a PDF. `geometry` is in layout units; `scale` maps
/// them to points.
pub fn write_pdf(pages: &[LaidOutPage], geometry: &PageGeometry, scale: f32, title: &str) -> Result<Vec<u8>> {
    let page_width = geometry.width * scale;
    let page_height = geometry.height * scale;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let fonts = font_resources(&mut doc);
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let mut ctx = PageContext::new(scale, page_height);
        for item in &page.items {
            ctx.draw(item);
        }
        let PageContext { content, links, .. } = ctx;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        if !links.is_empty() {
            let annots: Vec<Object> = links
                .iter()
                .map(|(rect, href)| Object::Reference(link_annotation(&mut doc, *rect, href)))
                .collect();
            page_dict.set("Annots", annots);
        }
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => literal(title),
        "Producer" => literal(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!("Wrote PDF '{title}': {} page(s), {} bytes", page_ids.len(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::flow::{layout, FlowItem, Fragment};
    use crate::layout::style::{Align, TextStyle};

    /// Every string shown with `Tj`, page by page, decoded as Latin-1.
    pub(crate) fn page_strings(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).expect("valid pdf");
        doc.get_pages()
            .values()
            .map(|page_id| {
                let raw = doc.get_page_content(*page_id).expect("page content");
                let content = Content::decode(&raw).expect("decodable content");
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| op.operands.first())
                    .filter_map(|obj| obj.as_str().ok())
                    .map(|raw| raw.iter().map(|b| *b as char).collect())
                    .collect()
            })
            .collect()
    }

    fn one_line(text: &str, link: Option<&str>) -> Vec<LaidOutPage> {
        let style = TextStyle::new(FontFace::TimesRoman, 12.0);
        let item = FlowItem::Paragraph {
            fragments: vec![Fragment::new(text, style).linked(link.map(str::to_string))],
            align: Align::Left,
            indent: 0.0,
            line_height: 1.4,
            space_after: 0.0,
            keep_with_next: 0.0,
        };
        layout(&[item], &PageGeometry::A4_PT)
    }

    #[test]
    fn test_win_ansi_maps_typographic_characters() {
        assert_eq!(encode_win_ansi("a – b"), vec![b'a', b' ', 0x96, b' ', b'b']);
        assert_eq!(encode_win_ansi("•"), vec![0x95]);
        assert_eq!(encode_win_ansi("é"), vec![0xE9]);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_written_pdf_parses_with_text() {
        let pages = one_line("Jane Doe", None);
        let bytes = write_pdf(&pages, &PageGeometry::A4_PT, 1.0, "Jane Doe").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let strings = page_strings(&bytes);
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0], vec!["Jane Doe".to_string()]);
    }

    #[test]
    fn test_media_box_is_scaled() {
        let pages = one_line("x", None);
        let bytes = write_pdf(&pages, &PageGeometry::A4_PX, 0.75, "x").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - 595.5).abs() < 0.01);
        assert!((height - 842.25).abs() < 0.01);
    }

    #[test]
    fn test_links_become_uri_annotations() {
        let pages = one_line("GitHub", Some("https://github.com/jane"));
        let bytes = write_pdf(&pages, &PageGeometry::A4_PT, 1.0, "links").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1);

        let annot = doc
            .get_object(annots[0].as_reference().unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        let action = annot.get(b"A").unwrap().as_dict().unwrap();
        assert_eq!(action.get(b"URI").unwrap().as_str().unwrap(), b"https://github.com/jane");
    }

    #[test]
    fn test_every_laid_out_page_is_written() {
        let pages = vec![LaidOutPage::default(), LaidOutPage::default()];
        let bytes = write_pdf(&pages, &PageGeometry::A4_PT, 1.0, "blank").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
