//! folio: a small static site generator for a personal portfolio and blog
//!
//! Markdown pages and posts are loaded into an immutable [`content::ContentStore`].
//! Pages are addressed by hierarchical slug through [`routing::SlugResolver`],
//! posts are listed newest-first through [`listing::PostOrderer`], and the
//! [`generator::Generator`] renders both into static HTML or serves them live.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod routing;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The main folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content directory (holds `pages/` and `posts/`)
    pub content_dir: std::path::PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Folio {
    /// Create a new folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            static_dir,
            public_dir,
        }
    }

    /// Path of the site configuration file
    pub fn config_path(&self) -> std::path::PathBuf {
        self.base_dir.join("_config.yml")
    }

    /// Load, validate and return the content store
    pub fn load_store(&self) -> Result<content::ContentStore> {
        content::ContentStore::load(self)
    }

    /// Build the static site
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
