//! Tera templates compiled into the binary.

use rust_embed::Embed;
use tera::{Context, Tera};

use crate::Result;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Load every embedded template. They are registered together so that
    /// `{% extends "base.html" %}` resolves regardless of load order.
    pub fn new() -> Result<Self> {
        let mut sources = Vec::new();
        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let body = String::from_utf8_lossy(&content.data).into_owned();
                sources.push((filename.to_string(), body));
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;
        tera.autoescape_on(vec![".html"]);

        tracing::debug!(
            count = tera.get_template_names().count(),
            "Loaded HTML templates"
        );
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }
}
