//! Site configuration (_config.yml)

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub tagline: String,
    pub description: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    pub posts_dir: String,

    // Directory
    pub content_dir: String,
    pub static_dir: String,
    pub public_dir: String,
    #[serde(default)]
    pub ignore: Vec<String>,

    // Writing
    pub render_drafts: bool,
    pub strict: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Date format
    pub date_format: String,

    /// Contact links shown on the home page and page footers, in file order
    #[serde(default)]
    pub links: IndexMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "folio".to_string(),
            author: "John Doe".to_string(),
            tagline: String::new(),
            description: String::new(),
            timezone: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            posts_dir: "posts".to_string(),

            content_dir: "content".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),
            ignore: Vec::new(),

            render_drafts: false,
            strict: false,
            highlight: HighlightConfig::default(),

            date_format: "MMMM D, YYYY".to_string(),

            links: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Timezone used for front-matter dates that carry no offset.
    ///
    /// An empty `timezone` means UTC.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        if self.timezone.trim().is_empty() {
            return Ok(chrono_tz::UTC);
        }
        self.timezone
            .trim()
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Compiled `ignore` patterns
    pub fn ignore_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.ignore
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| anyhow!("Invalid ignore pattern {:?}: {}", p, e))
            })
            .collect()
    }

    /// URL segment posts are served under, without surrounding slashes
    pub fn posts_prefix(&self) -> &str {
        self.posts_dir.trim_matches('/')
    }

    /// Reject values that would only fail later, deep inside a build
    fn check(&self) -> Result<()> {
        self.tz()?;
        self.ignore_patterns()?;
        let posts_dir = self.posts_prefix();
        if posts_dir.is_empty() || posts_dir.contains('/') {
            return Err(anyhow!(
                "posts_dir must be a single path segment, got {:?}",
                self.posts_dir
            ));
        }
        Ok(())
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
