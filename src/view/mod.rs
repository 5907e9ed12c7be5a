//! Template rendering
//!
//! This module wraps Tera for rendering the HTML pages. Templates are
//! compiled into the binary with `include_str!` for single-binary
//! deployment and registered once at startup; there is no theme switching
//! or hot reload.

use anyhow::{Context as AnyhowContext, Result};
use tera::{Context, Tera};

/// Every template shipped in the binary, base layout first so the pages
/// extending it resolve during registration.
const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("about.html", include_str!("../../templates/about.html")),
    (
        "article_list.html",
        include_str!("../../templates/article_list.html"),
    ),
    (
        "article_read.html",
        include_str!("../../templates/article_read.html"),
    ),
    (
        "article_form.html",
        include_str!("../../templates/article_form.html"),
    ),
    ("search.html", include_str!("../../templates/search.html")),
    ("login.html", include_str!("../../templates/login.html")),
    (
        "register.html",
        include_str!("../../templates/register.html"),
    ),
];

/// Template engine holding the compiled page templates
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compile and register the embedded templates.
    ///
    /// # Errors
    ///
    /// Returns an error when a template fails to parse; this is a startup
    /// failure, not a per-request one.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATE_SOURCES.to_vec())
            .context("Failed to compile embedded templates")?;
        Ok(Self { tera })
    }

    /// Render a template to an HTML string
    pub fn render(&self, template: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("Failed to render '{}'", template))
    }
}
