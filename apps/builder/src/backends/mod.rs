//! Output backends: the three interchangeable ways a composed resume
//! becomes an artifact.
//!
//! Every backend implements [`ResumeRenderer`]; callers pick one through
//! [`renderer_for`] and never branch on the concrete type.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::compose::{compose, ComposeOptions, ComposedDocument};
use crate::errors::{BuilderError, Result};
use crate::models::resume::{ResumeRecord, DEFAULT_DOCUMENT_NAME};

pub mod document;
pub mod latex;
pub mod pdf_writer;
pub mod preview;
pub mod stylesheet;

pub use document::StructuredDocumentRenderer;
pub use latex::{LatexStyle, TemplateRenderer};
pub use preview::ScreenSnapshotRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Paginated screen preview captured into PDF pages.
    ScreenSnapshot,
    /// Structured document tree written directly as PDF.
    StructuredDocument,
    /// LaTeX source produced by template substitution.
    TemplateSubstitution,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::ScreenSnapshot => "snapshot",
            BackendKind::StructuredDocument => "structured",
            BackendKind::TemplateSubstitution => "latex",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            BackendKind::ScreenSnapshot | BackendKind::StructuredDocument => "pdf",
            BackendKind::TemplateSubstitution => "tex",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BackendKind::ScreenSnapshot | BackendKind::StructuredDocument => "application/pdf",
            BackendKind::TemplateSubstitution => "application/x-tex",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" | "preview" | "screen" => Ok(BackendKind::ScreenSnapshot),
            "structured" | "pdf" | "document" => Ok(BackendKind::StructuredDocument),
            "latex" | "template" | "tex" => Ok(BackendKind::TemplateSubstitution),
            other => Err(BuilderError::UnknownBackend(other.to_string())),
        }
    }
}

/// A finished export: bytes plus the name and media type to save them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: BackendKind,
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Makes `stem` safe as a single file name: path separators, reserved and
/// control characters become `_`, leading dots are dropped.
pub fn file_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        DEFAULT_DOCUMENT_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

impl Artifact {
    /// `stem` is the document title; the extension comes from `kind`.
    pub fn new(kind: BackendKind, stem: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            kind,
            filename: format!("{}.{}", file_stem(stem), kind.extension()),
            content_type: kind.content_type(),
            bytes: bytes.into(),
        }
    }
}

/// Backend-specific knobs that are not part of the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererSettings {
    pub latex_style: LatexStyle,
}

/// The single rendering capability shared by all backends.
///
/// Implementations are pure: the same record, order and headings always
/// produce the same artifact, and no state survives between calls.
pub trait ResumeRenderer: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn render_composed(&self, doc: &ComposedDocument) -> Result<Artifact>;

    fn render(&self, record: &ResumeRecord, options: &ComposeOptions) -> Result<Artifact> {
        self.render_composed(&compose(record, options))
    }
}

/// Selects the renderer for `kind`.
pub fn renderer_for(kind: BackendKind, settings: &RendererSettings) -> Arc<dyn ResumeRenderer> {
    match kind {
        BackendKind::ScreenSnapshot => Arc::new(ScreenSnapshotRenderer::default()),
        BackendKind::StructuredDocument => Arc::new(StructuredDocumentRenderer::default()),
        BackendKind::TemplateSubstitution => Arc::new(TemplateRenderer::new(settings.latex_style)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::tests::{full_record, jane_doe};

    #[test]
    fn test_backend_kind_aliases() {
        assert_eq!("preview".parse::<BackendKind>().unwrap(), BackendKind::ScreenSnapshot);
        assert_eq!("PDF".parse::<BackendKind>().unwrap(), BackendKind::StructuredDocument);
        assert_eq!(" template ".parse::<BackendKind>().unwrap(), BackendKind::TemplateSubstitution);
        assert!(matches!(
            "docx".parse::<BackendKind>(),
            Err(BuilderError::UnknownBackend(s)) if s == "docx"
        ));
    }

    #[test]
    fn test_every_backend_names_artifact_after_person() {
        let settings = RendererSettings::default();
        for kind in [
            BackendKind::ScreenSnapshot,
            BackendKind::StructuredDocument,
            BackendKind::TemplateSubstitution,
        ] {
            let renderer = renderer_for(kind, &settings);
            assert_eq!(renderer.kind(), kind);
            let artifact = renderer.render(&jane_doe(), &ComposeOptions::default()).unwrap();
            assert_eq!(artifact.filename, format!("Jane Doe.{}", kind.extension()));
            assert_eq!(artifact.content_type, kind.content_type());
            assert!(!artifact.bytes.is_empty());
        }
    }

    #[test]
    fn test_empty_record_exports_as_resume() {
        let settings = RendererSettings::default();
        for kind in [BackendKind::StructuredDocument, BackendKind::TemplateSubstitution] {
            let artifact = renderer_for(kind, &settings)
                .render(&ResumeRecord::empty(), &ComposeOptions::default())
                .unwrap();
            assert_eq!(artifact.filename, format!("Resume.{}", kind.extension()));
        }
    }

    #[test]
    fn test_filename_cannot_escape_output_dir() {
        let artifact = Artifact::new(BackendKind::TemplateSubstitution, "../../etc/Jane", b"x".to_vec());
        assert_eq!(artifact.filename, "_.._etc_Jane.tex");
        assert!(!artifact.filename.contains('/'));

        assert_eq!(file_stem("a\\b\nc"), "a_b_c");
        assert_eq!(file_stem("  ..  "), "Resume");
        assert_eq!(file_stem("Jane Doe"), "Jane Doe");

        let mut record = jane_doe();
        record.personal_info.name = Some("Jane/Doe".to_string());
        let artifact = renderer_for(BackendKind::StructuredDocument, &RendererSettings::default())
            .render(&record, &ComposeOptions::default())
            .unwrap();
        assert_eq!(artifact.filename, "Jane_Doe.pdf");
    }

    #[test]
    fn test_rendering_is_deterministic_per_backend() {
        let record = full_record();
        let options = ComposeOptions::default();
        let settings = RendererSettings::default();
        for kind in [
            BackendKind::ScreenSnapshot,
            BackendKind::StructuredDocument,
            BackendKind::TemplateSubstitution,
        ] {
            let renderer = renderer_for(kind, &settings);
            let first = renderer.render(&record, &options).unwrap();
            let second = renderer.render(&record, &options).unwrap();
            assert_eq!(first.bytes, second.bytes, "{kind} output differs between runs");
        }
    }
}
