//! Immutable snapshot of all loaded content

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use super::loader::ContentLoader;
use super::{Collection, ContentEntry, ContentError};
use crate::listing::PostOrderer;
use crate::routing::SlugResolver;
use crate::Folio;

lazy_static! {
    /// Characters that survive a URL path segment without percent-encoding
    static ref UNRESERVED_SEGMENT: Regex = Regex::new(r"^[A-Za-z0-9._~-]+$").unwrap();
}

/// Pages and posts, loaded once and never mutated
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Vec<ContentEntry>,
    posts: Vec<ContentEntry>,
}

impl ContentStore {
    /// Build a store from already loaded collections
    pub fn new(pages: Vec<ContentEntry>, posts: Vec<ContentEntry>) -> Self {
        Self { pages, posts }
    }

    /// Load every page and post of a site and check integrity.
    ///
    /// Integrity faults fail the load when `strict` is set and are logged
    /// otherwise.
    pub fn load(folio: &Folio) -> Result<Self> {
        let loader = ContentLoader::new(folio)?;
        let store = Self::new(
            loader.load(Collection::Pages)?,
            loader.load(Collection::Posts)?,
        );

        tracing::info!(
            "Loaded {} pages and {} posts",
            store.pages.len(),
            store.posts.len()
        );

        let problems = store.validate();
        if !problems.is_empty() {
            if folio.config.strict {
                let report = problems
                    .iter()
                    .map(|p| format!("  - {}", p))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(anyhow!(
                    "{} content problem(s) found:\n{}",
                    problems.len(),
                    report
                ));
            }
            for problem in &problems {
                tracing::warn!("{}", problem);
            }
        }

        Ok(store)
    }

    pub fn pages(&self) -> &[ContentEntry] {
        &self.pages
    }

    pub fn posts(&self) -> &[ContentEntry] {
        &self.posts
    }

    /// Resolver over the page collection
    pub fn pages_resolver(&self) -> SlugResolver<'_> {
        SlugResolver::new(&self.pages)
    }

    /// Resolver over the post collection
    pub fn posts_resolver(&self) -> SlugResolver<'_> {
        SlugResolver::new(&self.posts)
    }

    /// Posts in listing order
    pub fn ordered_posts(&self) -> Vec<&ContentEntry> {
        PostOrderer::new(&self.posts).ordered()
    }

    /// Report every integrity fault in the store
    pub fn validate(&self) -> Vec<ContentError> {
        let mut problems = Vec::new();

        for (collection, entries) in [
            (Collection::Pages, &self.pages),
            (Collection::Posts, &self.posts),
        ] {
            let mut seen: HashMap<&str, &ContentEntry> = HashMap::new();
            for entry in entries {
                if let Some(reason) = slug_problem(&entry.slug) {
                    problems.push(ContentError::MalformedSlug {
                        collection,
                        slug: entry.slug.clone(),
                        source_path: entry.source.clone(),
                        reason,
                    });
                }

                match seen.get(entry.slug.as_str()) {
                    Some(first) => problems.push(ContentError::DuplicateSlug {
                        collection,
                        slug: entry.slug.clone(),
                        first: first.source.clone(),
                        second: entry.source.clone(),
                    }),
                    None => {
                        seen.insert(&entry.slug, entry);
                    }
                }
            }
        }

        for post in &self.posts {
            if post.date.is_none() {
                problems.push(ContentError::MissingDate {
                    slug: post.slug.clone(),
                    source_path: post.source.clone(),
                });
            }
        }

        problems
    }
}

/// Why a slug cannot round-trip through a URL path, if it can't
fn slug_problem(slug: &str) -> Option<&'static str> {
    if slug.is_empty() {
        return Some("slug is empty");
    }
    if slug.starts_with('/') || slug.ends_with('/') {
        return Some("leading or trailing '/'");
    }
    if slug.split('/').any(str::is_empty) {
        return Some("empty path segment");
    }
    if !slug.split('/').all(|s| UNRESERVED_SEGMENT.is_match(s)) {
        return Some("segment needs percent-encoding");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::DateTime;
    use std::fs;
    use tempfile::TempDir;

    fn post(slug: &str, date: &str) -> ContentEntry {
        ContentEntry::new(slug, slug)
            .with_date(DateTime::parse_from_rfc3339(date).unwrap())
            .with_source(format!("posts/{}.md", slug))
    }

    #[test]
    fn test_clean_store_has_no_problems() {
        let store = ContentStore::new(
            vec![
                ContentEntry::new("about", "About"),
                ContentEntry::new("projects/foo", "Foo"),
            ],
            vec![post("a", "2023-01-01T00:00:00Z")],
        );
        assert!(store.validate().is_empty());
    }

    #[test]
    fn test_duplicate_slug_reported() {
        let store = ContentStore::new(
            vec![
                ContentEntry::new("about", "First").with_source("pages/about.md"),
                ContentEntry::new("about", "Second").with_source("pages/about/index.md"),
            ],
            Vec::new(),
        );
        let problems = store.validate();
        assert_eq!(
            problems,
            vec![ContentError::DuplicateSlug {
                collection: Collection::Pages,
                slug: "about".to_string(),
                first: "pages/about.md".to_string(),
                second: "pages/about/index.md".to_string(),
            }]
        );
    }

    #[test]
    fn test_same_slug_in_both_collections_is_fine() {
        let store = ContentStore::new(
            vec![ContentEntry::new("hello", "Page")],
            vec![post("hello", "2023-01-01T00:00:00Z")],
        );
        assert!(store.validate().is_empty());
    }

    #[test]
    fn test_malformed_slugs_reported() {
        let store = ContentStore::new(
            vec![
                ContentEntry::new("a//b", "x"),
                ContentEntry::new("/lead", "x"),
                ContentEntry::new("has space", "x"),
                ContentEntry::new("odd%2Fslash", "x"),
            ],
            Vec::new(),
        );
        let reasons: Vec<_> = store
            .validate()
            .into_iter()
            .map(|p| match p {
                ContentError::MalformedSlug { reason, .. } => reason,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                "empty path segment",
                "leading or trailing '/'",
                "segment needs percent-encoding",
                "segment needs percent-encoding",
            ]
        );
    }

    #[test]
    fn test_undated_post_reported() {
        let store = ContentStore::new(Vec::new(), vec![ContentEntry::new("undated", "x")]);
        assert!(matches!(
            store.validate().as_slice(),
            [ContentError::MissingDate { slug, .. }] if slug == "undated"
        ));
    }

    #[test]
    fn test_strict_load_fails_on_duplicates() {
        let dir = TempDir::new().unwrap();
        let pages = dir.path().join("content/pages");
        fs::create_dir_all(pages.join("about")).unwrap();
        fs::write(pages.join("about.md"), "---\ntitle: One\n---\n").unwrap();
        fs::write(pages.join("about/index.md"), "---\ntitle: Two\n---\n").unwrap();

        let lenient = Folio::with_config(dir.path(), SiteConfig::default());
        let store = ContentStore::load(&lenient).unwrap();
        assert_eq!(store.pages().len(), 2);
        // The walk visits `about/` before `about.md`, so the index file wins.
        assert_eq!(store.pages_resolver().resolve(&["about"]).unwrap().title, "Two");

        let strict = Folio::with_config(
            dir.path(),
            SiteConfig {
                strict: true,
                ..Default::default()
            },
        );
        let err = ContentStore::load(&strict).unwrap_err();
        assert!(err.to_string().contains("duplicate pages slug"));
    }
}
