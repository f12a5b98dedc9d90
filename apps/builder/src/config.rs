use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::backends::{BackendKind, LatexStyle, RendererSettings};
use crate::compose::{ComposeOptions, DEFAULT_ORDER};
use crate::sections::SectionId;

/// Host configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_dir: PathBuf,
    pub output_dir: PathBuf,
    pub backend: BackendKind,
    pub sections: Vec<String>,
    pub headings: HashMap<SectionId, String>,
    pub latex_style: LatexStyle,
    pub save_debounce: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let sections = match lookup("RESUME_SECTIONS") {
            Some(raw) => parse_sections(&raw),
            None => DEFAULT_ORDER.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Config {
            store_dir: PathBuf::from(var("RESUME_STORE_DIR", ".resume")),
            output_dir: PathBuf::from(var("RESUME_OUTPUT_DIR", "out")),
            backend: var("RESUME_BACKEND", "structured")
                .parse::<BackendKind>()
                .context("RESUME_BACKEND must be one of snapshot, structured, latex")?,
            sections,
            headings: parse_headings(&var("RESUME_HEADINGS", ""))
                .context("RESUME_HEADINGS must be section=Heading pairs separated by ';'")?,
            latex_style: var("RESUME_LATEX_STYLE", "awesome-cv")
                .parse::<LatexStyle>()
                .map_err(|e| anyhow!(e))
                .context("RESUME_LATEX_STYLE must be awesome-cv or classic")?,
            save_debounce: Duration::from_millis(
                var("RESUME_SAVE_DEBOUNCE_MS", "250")
                    .parse::<u64>()
                    .context("RESUME_SAVE_DEBOUNCE_MS must be a number of milliseconds")?,
            ),
            rust_log: var("RUST_LOG", "info"),
        })
    }

    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            order: self.sections.clone(),
            headings: self.headings.clone(),
        }
    }

    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            latex_style: self.latex_style,
        }
    }
}

fn parse_sections(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `experience=Work History;skills=Toolbox`.
fn parse_headings(raw: &str) -> Result<HashMap<SectionId, String>> {
    let mut headings = HashMap::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (id, text) = pair
            .split_once('=')
            .with_context(|| format!("missing '=' in '{pair}'"))?;
        let id = id.trim().parse::<SectionId>().map_err(|e| anyhow!(e))?;
        headings.insert(id, text.trim().to_string());
    }
    Ok(headings)
}
