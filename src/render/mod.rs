//! Template rendering
//!
//! Thin wrapper around Tera. Templates are loaded once at startup from the
//! configured directory; every page handler renders through [`TemplateEngine`].

use anyhow::Result;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
}

/// Tera-backed template engine
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every `.html` template under `templates_dir`
    pub fn new(templates_dir: &str) -> Result<Self> {
        let glob = format!("{}/**/*.html", templates_dir.trim_end_matches('/'));
        let tera = Tera::new(&glob)
            .map_err(|e| RenderError::Template(format!("failed to load templates: {}", e)))?;
        Ok(Self { tera })
    }

    /// Build an engine from an existing Tera instance
    pub fn from_tera(tera: Tera) -> Self {
        Self { tera }
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut msg = format!("failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                msg.push_str(&format!("\n  caused by: {}", s));
                source = s.source();
            }
            RenderError::Template(msg).into()
        })
    }

    /// Render with the site name injected, as every front-end view expects
    pub fn render_page(
        &self,
        template: &str,
        context: &TeraContext,
        site_name: &str,
    ) -> Result<String> {
        let mut full = context.clone();
        full.insert("site_name", site_name);
        self.render(template, &full)
    }
}
