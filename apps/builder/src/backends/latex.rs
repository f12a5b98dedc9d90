//! Templated LaTeX backend.
//!
//! A fixed skeleton (document class and preamble boilerplate) is rendered by
//! Tera; repeated sections expand their per-entry block once per entry, in
//! entry order. Every user value goes through the `tex` filter, URLs inside
//! `\href{}` through the `url` filter. The output is LaTeX source only.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tera::{Context, Tera, Value};
use tracing::info;

use crate::backends::{Artifact, BackendKind, ResumeRenderer};
use crate::compose::ComposedDocument;
use crate::errors::Result;
use crate::format::split_name;
use crate::sections::{ContactItem, EntryBlock, SectionBody, SectionId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatexStyle {
    /// `awesome-cv` class: cvsection / cventry / cvhonors, fully driven by
    /// the section order.
    #[default]
    AwesomeCv,
    /// `resume.cls` with rSection blocks; the profile goes into the preamble.
    Classic,
}

impl LatexStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatexStyle::AwesomeCv => "awesome-cv",
            LatexStyle::Classic => "classic",
        }
    }

    fn template(&self) -> (&'static str, &'static str) {
        match self {
            LatexStyle::AwesomeCv => ("awesome-cv.tex", AWESOME_CV_TEMPLATE),
            LatexStyle::Classic => ("classic.tex", CLASSIC_TEMPLATE),
        }
    }
}

impl fmt::Display for LatexStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LatexStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awesome-cv" | "awesomecv" | "awesome" => Ok(LatexStyle::AwesomeCv),
            "classic" | "resume" => Ok(LatexStyle::Classic),
            other => Err(format!("unknown LaTeX style '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Escaping
// ────────────────────────────────────────────────────────────────────────────

/// Escapes the LaTeX special characters `\ { } $ & # ^ _ % ~`.
pub fn escape_tex(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '{' | '}' | '$' | '&' | '#' | '_' | '%' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a URL for `\href{}`: only `% # \ { }` need protecting there.
pub fn escape_url(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '%' | '#' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn filter_with(value: &Value, escape: fn(&str) -> String) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(s) => Value::String(escape(s)),
        other => Value::String(escape(&other.to_string())),
    }
}

fn tex_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(filter_with(value, escape_tex))
}

fn url_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(filter_with(value, escape_url))
}

// ────────────────────────────────────────────────────────────────────────────
// Template context
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ContactView {
    icon: &'static str,
    label: String,
    href: String,
    external: bool,
}

impl From<&ContactItem> for ContactView {
    fn from(item: &ContactItem) -> Self {
        let (icon, external) = if item.href.starts_with("mailto:") {
            ("\\faEnvelope", false)
        } else if item.href.starts_with("tel:") {
            ("\\faMobile", false)
        } else if item.label == "LinkedIn" {
            ("\\faLinkedin", true)
        } else if item.label == "GitHub" {
            ("\\faGithub", true)
        } else {
            ("\\faLink", true)
        };
        Self {
            icon,
            label: item.label.clone(),
            href: item.href.clone(),
            external,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProfileView {
    name: String,
    first_name: String,
    last_name: String,
    contacts: Vec<ContactView>,
}

#[derive(Debug, Serialize)]
struct SkillView {
    label: String,
    items: String,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    id: SectionId,
    heading: &'a str,
    entries: &'a [EntryBlock],
    skills: Vec<SkillView>,
}

#[derive(Debug, Serialize)]
struct TexDocument<'a> {
    title: &'a str,
    profile: Option<ProfileView>,
    sections: Vec<SectionView<'a>>,
}

impl<'a> TexDocument<'a> {
    fn from_composed(doc: &'a ComposedDocument) -> Self {
        let mut profile = None;
        let sections = doc
            .sections
            .iter()
            .map(|section| {
                let mut skills = Vec::new();
                match &section.body {
                    SectionBody::Profile { name, contacts } => {
                        let name = name.clone().unwrap_or_default();
                        let (first_name, last_name) = split_name(&name);
                        profile = Some(ProfileView {
                            name,
                            first_name,
                            last_name,
                            contacts: contacts.iter().map(ContactView::from).collect(),
                        });
                    }
                    SectionBody::Skills { lines } => {
                        skills = lines
                            .iter()
                            .map(|line| SkillView {
                                label: line.label.clone(),
                                items: line.joined(),
                            })
                            .collect();
                    }
                    SectionBody::Entries { .. } => {}
                }
                SectionView {
                    id: section.id,
                    heading: &section.heading,
                    entries: section.entries(),
                    skills,
                }
            })
            .collect();

        Self {
            title: &doc.title,
            profile,
            sections,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer {
    style: LatexStyle,
}

impl TemplateRenderer {
    pub fn new(style: LatexStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> LatexStyle {
        self.style
    }

    /// Renders the LaTeX source for `doc`.
    pub fn render_source(&self, doc: &ComposedDocument) -> Result<String> {
        let (name, template) = self.style.template();

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("tex", tex_filter);
        tera.register_filter("url", url_filter);
        tera.add_raw_template(name, template)?;

        let value = serde_json::to_value(TexDocument::from_composed(doc))?;
        let context = Context::from_value(value)?;
        Ok(tera.render(name, &context)?)
    }
}

impl ResumeRenderer for TemplateRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::TemplateSubstitution
    }

    fn render_composed(&self, doc: &ComposedDocument) -> Result<Artifact> {
        let source = self.render_source(doc)?;
        info!(
            "Rendered {} LaTeX for '{}' ({} sections)",
            self.style,
            doc.title,
            doc.sections.len()
        );
        Ok(Artifact::new(self.kind(), &doc.title, source.into_bytes()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

const AWESOME_CV_TEMPLATE: &str = r#"{% raw %}%!TEX TS-program = xelatex
%!TEX encoding = UTF-8 Unicode
% Awesome CV LaTeX Template
%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%
%     Configuration
%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%
\documentclass[]{awesome-cv}
\usepackage{textcomp}
\fontdir[fonts/]
\newcommand*{\sectiondir}{resume/}
\colorlet{awesome}{awesome-red}
{% endraw %}
\begin{document}
{% for section in sections %}
%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%
%     {{ section.heading | tex }}
%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%
{% if section.id == "profile" -%}
\begin{center}
{% if profile.name -%}
\headerfirstnamestyle{ {{- profile.first_name | tex -}} } \headerlastnamestyle{ {{- profile.last_name | tex -}} } \\
{% endif -%}
\vspace{2mm}
{% for c in profile.contacts %}{% if not loop.first %} | {% endif %}{ {{- c.icon }}\ {% if c.external %}\href{ {{- c.href | url -}} }{ {{- c.label | tex -}} }{% else %}{{ c.label | tex }}{% endif %}}{% endfor %}
\end{center}
{% elif section.id == "skills" -%}
\cvsection{ {{- section.heading | tex -}} }
\begin{cventries}
\cventry
  {}
  {\def\arraystretch{1.15}\begin{tabular}{ l l }
{% for line in section.skills %}    { {{- line.label | tex -}} }: & {\skill{ {{- line.items | tex -}} }} \\
{% endfor %}  \end{tabular}}
  {}
  {}
  {}
\end{cventries}

\vspace{-7mm}
{% elif section.id == "awards" -%}
\cvsection{ {{- section.heading | tex -}} }
\begin{cvhonors}
{% for e in section.entries -%}
\cvhonor
  { {{- e.title | tex -}} }
  { {{- e.detail | tex -}} }
  { {{- e.subtitle | tex -}} }
  { {{- e.date_range | tex -}} }
{% endfor -%}
\end{cvhonors}
{% else -%}
\cvsection{ {{- section.heading | tex -}} }
\begin{cventries}
{% for e in section.entries -%}
{% if section.id == "education" -%}
\cventry
  { {{- e.subtitle | tex -}} }
  { {{- e.title | tex -}} }
  { {{- e.location | tex -}} }
  { {{- e.date_range | tex -}} }
  { {%- if e.detail %}GPA: {{ e.detail | tex }}{% endif -%} }
{% elif section.id == "projects" -%}
\cventry
  { {{- e.detail | tex -}} }
  { {{- e.title | tex -}} }
  {}
  { {%- if e.link %}\href{ {{- e.link | url -}} }{ {{- e.link | tex -}} }{% endif -%} }
  { {%- if e.bullets %}
\begin{cvitems}
{% for b in e.bullets %}    \item { {{- b | tex -}} }
{% endfor %}\end{cvitems}
  {%- endif -%} }
{% else -%}
\cventry
  { {{- e.title | tex -}} }
  { {{- e.subtitle | tex -}} }
  { {{- e.location | tex -}} }
  { {{- e.date_range | tex -}} }
  { {%- if e.bullets %}
\begin{cvitems}
{% for b in e.bullets %}    \item { {{- b | tex -}} }
{% endfor %}\end{cvitems}
  {%- endif -%} }
{% endif -%}
{% endfor -%}
\end{cventries}
{% endif -%}
{% endfor %}
\end{document}
"#;

const CLASSIC_TEMPLATE: &str = r#"{% raw %}\documentclass{resume} % Use the custom resume.cls style

\usepackage[left=0.4 in,top=0.4in,right=0.4 in,bottom=0.3in]{geometry} % Document margins
\newcommand{\tab}[1]{\hspace{.2\textwidth}\rlap{#1}}
\newcommand{\itab}[1]{\hspace{0em}\rlap{#1}}
{% endraw %}
{% if profile -%}
\name{ {{- profile.name | tex -}} }
\address{
{%- for c in profile.contacts %}{% if not loop.first %} \\{% endif %}
\href{ {{- c.href | url -}} }{ {{- c.label | tex -}} }
{%- endfor %}
}
{% endif %}
\begin{document}
{% for section in sections %}{% if section.id != "profile" %}
%----------------------------------------------------------------------------------------
\begin{rSection}{ {{- section.heading | upper | tex -}} }
{% if section.id == "skills" -%}
{% for line in section.skills %}\textbf{ {{- line.label | tex -}} :} {{ line.items | tex }}{% if not loop.last %} \\{% endif %}
{% endfor -%}
{% else -%}
{% for e in section.entries %}
\textbf{ {{- e.title | tex -}} }{% if e.date_range %} \hfill {{ e.date_range | tex }}{% endif %}
{%- if e.subtitle or e.location %} \\
{% if e.subtitle %}{% if e.subtitle_link %}\href{ {{- e.subtitle_link | url -}} }{ {{- e.subtitle | tex -}} }{% else %}{{ e.subtitle | tex }}{% endif %}{% endif %}{% if e.location %} \hfill \textit{ {{- e.location | tex -}} }{% endif %}
{%- endif %}
{%- if e.detail %} \\
{{ e.detail | tex }}
{%- endif %}
{%- if e.link %} \\
\href{ {{- e.link | url -}} }{ {{- e.link | tex -}} }
{%- endif %}
{% if e.bullets -%}
\begin{itemize}
    \itemsep -6pt {}
{% for b in e.bullets %}    \item {{ b | tex }}
{% endfor %}\end{itemize}
{% endif -%}
{% endfor -%}
{% endif -%}
\end{rSection}
{% endif %}{% endfor %}
\end{document}
"#;
