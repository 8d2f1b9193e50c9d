//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off so URLs stay
//! readable; templates escape display text explicitly with `| escape`.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("page.html", include_str!("site/page.html")),
            ("post.html", include_str!("site/post.html")),
            ("404.html", include_str!("site/404.html")),
            (
                "partials/links.html",
                include_str!("site/partials/links.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub author: String,
    pub tagline: String,
    pub root: String,
    pub links: Vec<LinkData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub name: String,
    pub href: String,
}

/// `<head>` metadata for the page being rendered
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetaData {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A post as shown in the home listing
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
}

/// A fully rendered page or post
#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub title: String,
    pub description: Option<String>,
    /// Display date
    pub date: Option<String>,
    /// Machine-readable date for `<time datetime>`
    pub datetime: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}
