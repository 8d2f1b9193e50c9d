//! Generator module - renders routes to HTML and writes the static site

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{ContentEntry, ContentStore, PageMetadata};
use crate::helpers::{
    date_xml, format_date, full_url_for, link_href, route_path, route_url, url_for,
};
use crate::listing::PostOrderer;
use crate::routing::{split_slug, StaticParams};
use crate::templates::{
    EntryData, LinkData, MetaData, NavLink, PostSummary, SiteData, TemplateRenderer,
};
use crate::Folio;

/// Counts of what a build wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub posts: usize,
    pub assets: usize,
}

/// One route of the generated site
#[derive(Debug, Clone, Serialize)]
pub struct RouteEntry {
    pub segments: Vec<String>,
    pub path: String,
}

/// Every route the build produces, written to `routes.json`
#[derive(Debug, Clone, Serialize)]
pub struct RouteManifest {
    pub pages: Vec<RouteEntry>,
    pub posts: Vec<RouteEntry>,
}

/// Renders the site's routes, to disk or on demand
pub struct Generator {
    folio: Folio,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, store: &ContentStore) -> Result<BuildReport> {
        let public_dir = &self.folio.public_dir;
        fs::create_dir_all(public_dir)?;

        let mut report = BuildReport {
            assets: self.copy_static_assets()?,
            ..Default::default()
        };

        self.write_file(public_dir.join("index.html"), &self.render_home(store)?)?;

        // Posts first: a page with the same URL overwrites the post, matching
        // the server, which tries pages before posts.
        let mut written = HashSet::new();
        for post in store.ordered_posts() {
            let segments = self.post_segments(post);
            if !written.insert(segments.clone()) {
                tracing::debug!("Skipping shadowed post {}", post.source);
                continue;
            }
            let html = self.render_post(store, post)?;
            self.write_file(self.output_path(&segments)?, &html)?;
            report.posts += 1;
        }

        let resolver = store.pages_resolver();
        let mut written_pages = HashSet::new();
        for params in resolver.static_params() {
            if !written_pages.insert(params.segments.clone()) {
                continue;
            }
            let Some(page) = resolver.resolve(&params.segments) else {
                return Err(anyhow!("Route {} does not resolve", params.path()));
            };
            let html = self.render_page(page, &params.segments)?;
            self.write_file(self.output_path(&params.segments)?, &html)?;
            report.pages += 1;
        }

        self.write_file(public_dir.join("404.html"), &self.render_not_found()?)?;

        let manifest = serde_json::to_string_pretty(&self.route_manifest(store))?;
        self.write_file(public_dir.join("routes.json"), &manifest)?;

        Ok(report)
    }

    /// Home page: header, links and every post newest first
    pub fn render_home(&self, store: &ContentStore) -> Result<String> {
        let posts: Vec<PostSummary> = store
            .ordered_posts()
            .into_iter()
            .map(|post| PostSummary {
                title: post.title.clone(),
                description: post.description.clone(),
                url: route_url(&self.folio.config, &self.post_segments(post)),
            })
            .collect();

        let meta = MetaData {
            title: None,
            description: Some(self.folio.config.description.clone())
                .filter(|d| !d.trim().is_empty()),
        };

        let mut context = self.base_context(meta, &[] as &[String]);
        context.insert("posts", &posts);
        self.renderer.render("home.html", &context)
    }

    /// A standalone page reached through the catch-all route
    pub fn render_page<S: AsRef<str>>(
        &self,
        page: &ContentEntry,
        segments: &[S],
    ) -> Result<String> {
        let meta = PageMetadata::from_entry(Some(page));
        let mut context = self.base_context(meta.into(), segments);
        context.insert("entry", &self.entry_data(page));
        self.renderer.render("page.html", &context)
    }

    /// A post with links to its neighbours in listing order
    pub fn render_post(&self, store: &ContentStore, post: &ContentEntry) -> Result<String> {
        let (newer, older) = PostOrderer::new(store.posts()).neighbours(&post.slug);
        let segments = self.post_segments(post);

        let meta = PageMetadata::from_entry(Some(post));
        let mut context = self.base_context(meta.into(), &segments);
        context.insert("entry", &self.entry_data(post));
        if let Some(newer) = newer {
            context.insert("newer", &self.nav_link(newer));
        }
        if let Some(older) = older {
            context.insert("older", &self.nav_link(older));
        }
        self.renderer.render("post.html", &context)
    }

    /// Page shown for any route that resolves to nothing
    pub fn render_not_found(&self) -> Result<String> {
        let meta = MetaData {
            title: Some("Not found".to_string()),
            description: None,
        };
        let context = self.base_context(meta, &[] as &[String]);
        self.renderer.render("404.html", &context)
    }

    /// Enumerate every page and post route
    pub fn route_manifest(&self, store: &ContentStore) -> RouteManifest {
        let route = |segments: Vec<String>| RouteEntry {
            path: route_url(&self.folio.config, &segments),
            segments,
        };

        RouteManifest {
            pages: store
                .pages_resolver()
                .static_params()
                .into_iter()
                .map(|StaticParams { segments }| route(segments))
                .collect(),
            posts: store
                .ordered_posts()
                .into_iter()
                .map(|post| route(self.post_segments(post)))
                .collect(),
        }
    }

    /// Route segments of a post: the posts prefix followed by its slug
    pub fn post_segments(&self, post: &ContentEntry) -> Vec<String> {
        let mut segments = vec![self.folio.config.posts_prefix().to_string()];
        segments.extend(split_slug(&post.slug));
        segments
    }

    fn base_context<S: AsRef<str>>(&self, meta: MetaData, segments: &[S]) -> Context {
        let config = &self.folio.config;
        let site = SiteData {
            title: config.title.clone(),
            author: config.author.clone(),
            tagline: config.tagline.clone(),
            root: url_for(config, ""),
            links: config
                .links
                .iter()
                .map(|(name, href)| LinkData {
                    name: name.clone(),
                    href: link_href(config, href),
                })
                .collect(),
        };

        let relative = route_path(segments);

        let mut context = Context::new();
        context.insert("site", &site);
        context.insert("meta", &meta);
        context.insert("canonical_url", &full_url_for(config, &relative));
        context
    }

    fn entry_data(&self, entry: &ContentEntry) -> EntryData {
        EntryData {
            title: entry.title.clone(),
            description: entry.description.clone(),
            date: entry
                .date
                .as_ref()
                .map(|d| format_date(d, &self.folio.config.date_format)),
            datetime: entry.date.as_ref().map(date_xml),
            body: entry.body.as_html().to_string(),
        }
    }

    fn nav_link(&self, post: &ContentEntry) -> NavLink {
        NavLink {
            title: post.title.clone(),
            url: route_url(&self.folio.config, &self.post_segments(post)),
        }
    }

    /// `<public>/<segments...>/index.html`, refusing to leave the output dir
    fn output_path(&self, segments: &[String]) -> Result<PathBuf> {
        let mut path = self.folio.public_dir.clone();
        for segment in segments {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(anyhow!("Refusing to write route segment {:?}", segment));
            }
            path.push(segment);
        }
        Ok(path.join("index.html"))
    }

    fn write_file(&self, path: PathBuf, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&path, content).map_err(|e| anyhow!("Failed to write {:?}: {}", path, e))?;
        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }

    /// Copy the static directory (images, CV, stylesheets) into the output
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.folio.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

impl From<PageMetadata> for MetaData {
    fn from(meta: PageMetadata) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
        }
    }
}
