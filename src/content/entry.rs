//! Content entry model shared by pages and posts

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

/// Which collection an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Pages,
    Posts,
}

impl Collection {
    /// Directory name under the content directory
    pub fn dir_name(&self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::Posts => "posts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Pre-rendered entry body.
///
/// Produced once by the loader and only ever forwarded to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Body(String);

impl Body {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// The rendered HTML
    pub fn as_html(&self) -> &str {
        &self.0
    }
}

/// One unit of renderable content: a page or a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    /// `/`-separated path, unique within its collection
    pub slug: String,

    /// Display title
    pub title: String,

    /// Short summary; `None` means it is omitted from the UI
    pub description: Option<String>,

    /// Publication instant. Required for posts, ignored for pages.
    pub date: Option<DateTime<FixedOffset>>,

    /// Rendered body
    pub body: Body,

    /// Source file path relative to the content directory
    pub source: String,
}

impl ContentEntry {
    /// Create an entry with an empty body and no optional fields
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: None,
            date: None,
            body: Body::default(),
            source: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Title and description projected from a resolved entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PageMetadata {
    /// Metadata for a lookup result; a miss yields empty metadata.
    pub fn from_entry(entry: Option<&ContentEntry>) -> Self {
        match entry {
            Some(entry) => Self {
                title: Some(entry.title.clone()),
                description: entry.description.clone(),
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}
