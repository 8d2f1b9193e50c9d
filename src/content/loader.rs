//! Content loader - loads pages and posts from the content directory

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::{Collection, ContentEntry, FrontMatter, MarkdownRenderer};
use crate::Folio;

/// Loads content entries from `<content_dir>/pages` and `<content_dir>/posts`
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    renderer: MarkdownRenderer,
    tz: chrono_tz::Tz,
    ignore: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Result<Self> {
        Ok(Self {
            folio,
            renderer: MarkdownRenderer::with_options(&folio.config.highlight),
            tz: folio.config.tz()?,
            ignore: folio.config.ignore_patterns()?,
        })
    }

    /// Load every entry of a collection, in file-system walk order
    pub fn load(&self, collection: Collection) -> Result<Vec<ContentEntry>> {
        let dir = self.folio.content_dir.join(collection.dir_name());
        if !dir.exists() {
            tracing::debug!("No {} directory at {:?}", collection, dir);
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        // Sorted walk so "first match wins" is reproducible across machines.
        for entry in WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let relative = path
                .strip_prefix(&self.folio.content_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            if self.ignore.iter().any(|p| p.matches(&relative)) {
                tracing::debug!("Ignoring {}", relative);
                continue;
            }

            match self.load_entry(&dir, path) {
                Ok(Some(content)) => entries.push(content),
                Ok(None) => tracing::debug!("Skipping draft {}", relative),
                Err(e) => tracing::warn!("Failed to load {} {:?}: {}", collection, path, e),
            }
        }

        Ok(entries)
    }

    /// Load a single entry; `None` for drafts that should not be built
    fn load_entry(&self, collection_dir: &Path, path: &Path) -> Result<Option<ContentEntry>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.is_draft() && !self.folio.config.render_drafts {
            return Ok(None);
        }

        let relative = path.strip_prefix(collection_dir)?;
        let slug = slug_from_path(relative)?;

        let source = path
            .strip_prefix(&self.folio.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        // A blank title falls back to the file stem like a missing one.
        let title = fm
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            });

        let date = match &fm.date {
            Some(raw) => {
                let parsed = fm.parse_date(&self.tz);
                if parsed.is_none() {
                    tracing::warn!("Unparsable date {:?} in {}", raw, source);
                }
                parsed
            }
            None => None,
        };

        let mut entry = ContentEntry::new(slug, title)
            .with_body(self.renderer.render(body)?)
            .with_source(source);
        entry.description = fm.description.filter(|d| !d.trim().is_empty());
        entry.date = date;

        Ok(Some(entry))
    }
}

/// Derive a slug from a path relative to its collection directory.
///
/// The extension is dropped and a nested `index` file collapses onto its
/// directory (`projects/index.md` -> `projects`). A top-level `index.md`
/// keeps the slug `index`.
pub fn slug_from_path(relative: &Path) -> Result<String> {
    let without_ext = relative.with_extension("");

    let mut segments = Vec::new();
    for component in without_ext.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| anyhow!("Non UTF-8 path {:?}", relative))?;
                segments.push(part.to_string());
            }
            Component::CurDir => {}
            _ => return Err(anyhow!("Unexpected path component in {:?}", relative)),
        }
    }

    if segments.len() > 1 && segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }

    if segments.is_empty() {
        return Err(anyhow!("Empty slug for {:?}", relative));
    }

    Ok(segments.join("/"))
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path(Path::new("about.md")).unwrap(), "about");
        assert_eq!(
            slug_from_path(Path::new("projects/foo.md")).unwrap(),
            "projects/foo"
        );
        assert_eq!(
            slug_from_path(Path::new("projects/index.md")).unwrap(),
            "projects"
        );
        assert_eq!(slug_from_path(Path::new("index.md")).unwrap(), "index");
    }

    #[test]
    fn test_load_pages_and_posts() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "content/pages/about.md",
            "---\ntitle: About\ndescription: Who I am\n---\n\nHello.\n",
        );
        write(
            dir.path(),
            "content/pages/projects/foo.md",
            "---\ntitle: Foo\n---\n\nA project.\n",
        );
        write(
            dir.path(),
            "content/posts/first.md",
            "---\ntitle: First\ndate: 2023-01-01\n---\n\nPost body.\n",
        );

        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let loader = ContentLoader::new(&folio).unwrap();

        let pages = loader.load(Collection::Pages).unwrap();
        let slugs: Vec<_> = pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["about", "projects/foo"]);
        assert_eq!(pages[0].description.as_deref(), Some("Who I am"));
        assert_eq!(pages[1].description, None);
        assert!(pages[0].body.as_html().contains("<p>Hello.</p>"));
        assert_eq!(pages[1].source, "pages/projects/foo.md");

        let posts = loader.load(Collection::Posts).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "first");
        assert_eq!(
            posts[0].date.unwrap().to_rfc3339(),
            "2023-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "content/pages/uses.md", "Just text.\n");

        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let pages = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Pages)
            .unwrap();
        assert_eq!(pages[0].title, "uses");
    }

    #[test]
    fn test_blank_title_falls_back_to_file_stem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "content/pages/empty.md", "---\ntitle: \"\"\n---\n\nx\n");
        write(dir.path(), "content/pages/spaces.md", "---\ntitle: \"   \"\n---\n\nx\n");

        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let pages = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Pages)
            .unwrap();
        let titles: Vec<_> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["empty", "spaces"]);
    }

    #[test]
    fn test_drafts_skipped_unless_enabled() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "content/posts/wip.md",
            "---\ntitle: WIP\ndate: 2024-01-01\ndraft: true\n---\n",
        );

        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let posts = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Posts)
            .unwrap();
        assert!(posts.is_empty());

        let config = SiteConfig {
            render_drafts: true,
            ..Default::default()
        };
        let folio = Folio::with_config(dir.path(), config);
        let posts = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Posts)
            .unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "content/pages/keep.md", "---\ntitle: Keep\n---\n");
        write(dir.path(), "content/pages/notes/skip.md", "---\ntitle: Skip\n---\n");

        let config = SiteConfig {
            ignore: vec!["pages/notes/**".to_string()],
            ..Default::default()
        };
        let folio = Folio::with_config(dir.path(), config);
        let pages = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Pages)
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slug, "keep");
    }

    #[test]
    fn test_unparsable_date_loads_without_date() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "content/posts/odd.md",
            "---\ntitle: Odd\ndate: someday\n---\n",
        );

        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let posts = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Posts)
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].date, None);
    }

    #[test]
    fn test_missing_collection_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let pages = ContentLoader::new(&folio)
            .unwrap()
            .load(Collection::Pages)
            .unwrap();
        assert!(pages.is_empty());
    }
}
