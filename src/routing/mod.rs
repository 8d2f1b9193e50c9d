//! Slug routing: path segments to content entries and back
//!
//! A slug is the `/`-join of a route's path segments. [`join_segments`] and
//! [`split_slug`] are exact inverses of each other, which is what lets the
//! static build enumerate every page route and the server resolve it again.

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::content::{ContentEntry, PageMetadata};

/// Join path segments into a candidate slug. No decoding or normalization.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a slug back into its path segments.
///
/// The empty slug has no segments, so `join_segments(&split_slug(s)) == s`
/// holds for every string.
pub fn split_slug(slug: &str) -> Vec<String> {
    if slug.is_empty() {
        return Vec::new();
    }
    slug.split('/').map(str::to_string).collect()
}

/// Turn a request path into decoded path segments.
///
/// Empty segments from leading, trailing or doubled slashes are dropped.
/// Returns `None` when a segment is not valid UTF-8 once decoded, or decodes
/// to something containing `/`: such a segment could never be told apart
/// from two real segments after joining.
pub fn path_segments(path: &str) -> Option<Vec<String>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|raw| {
            let decoded = percent_decode_str(raw).decode_utf8().ok()?;
            if decoded.contains('/') {
                return None;
            }
            Some(decoded.into_owned())
        })
        .collect()
}

/// Route parameters of one statically generated page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticParams {
    pub segments: Vec<String>,
}

impl StaticParams {
    /// URL path relative to the site root, with a trailing slash
    pub fn path(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        format!("/{}/", self.segments.join("/"))
    }
}

/// Looks up entries of one collection by path segments
#[derive(Debug, Clone, Copy)]
pub struct SlugResolver<'a> {
    entries: &'a [ContentEntry],
}

impl<'a> SlugResolver<'a> {
    pub fn new(entries: &'a [ContentEntry]) -> Self {
        Self { entries }
    }

    /// The first entry whose slug equals the joined segments.
    ///
    /// Matching is exact and case-sensitive. With duplicate slugs the entry
    /// loaded first wins.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&'a ContentEntry> {
        let slug = join_segments(segments);
        self.find(&slug)
    }

    /// Look up an already joined slug
    pub fn find(&self, slug: &str) -> Option<&'a ContentEntry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }

    /// Title and description for a route; empty when nothing matches
    pub fn metadata<S: AsRef<str>>(&self, segments: &[S]) -> PageMetadata {
        PageMetadata::from_entry(self.resolve(segments))
    }

    /// Path segments of every entry, in collection order
    pub fn static_params(&self) -> Vec<StaticParams> {
        self.entries
            .iter()
            .map(|entry| StaticParams {
                segments: split_slug(&entry.slug),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<ContentEntry> {
        vec![
            ContentEntry::new("about", "About").with_description("Who I am"),
            ContentEntry::new("projects/foo", "Foo"),
            ContentEntry::new("projects", "Projects"),
        ]
    }

    #[test]
    fn test_resolve_nested_slug() {
        let pages = pages();
        let resolver = SlugResolver::new(&pages);
        let found = resolver.resolve(&["projects", "foo"]).unwrap();
        assert_eq!(found, &pages[1]);
    }

    #[test]
    fn test_resolve_miss() {
        let pages = pages();
        let resolver = SlugResolver::new(&pages);
        assert!(resolver.resolve(&["missing"]).is_none());
        assert!(resolver.resolve(&["projects", "bar"]).is_none());
        assert!(resolver.resolve::<&str>(&[]).is_none());
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let pages = pages();
        let resolver = SlugResolver::new(&pages);
        assert!(resolver.resolve(&["About"]).is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let pages = vec![
            ContentEntry::new("about", "First"),
            ContentEntry::new("about", "Second"),
        ];
        let resolver = SlugResolver::new(&pages);
        assert_eq!(resolver.resolve(&["about"]).unwrap().title, "First");
    }

    #[test]
    fn test_every_entry_round_trips() {
        let pages = pages();
        let resolver = SlugResolver::new(&pages);
        let params = resolver.static_params();
        assert_eq!(params.len(), pages.len());
        for (entry, params) in pages.iter().zip(&params) {
            assert_eq!(join_segments(&params.segments), entry.slug);
            assert_eq!(resolver.resolve(&params.segments), Some(entry));
        }
    }

    #[test]
    fn test_empty_collection() {
        let resolver = SlugResolver::new(&[]);
        assert!(resolver.static_params().is_empty());
        assert!(resolver.resolve(&["anything"]).is_none());
    }

    #[test]
    fn test_split_join_inverse() {
        for slug in ["", "about", "projects/foo", "a//b", "/lead", "trail/"] {
            assert_eq!(join_segments(&split_slug(slug)), slug);
        }
        assert!(split_slug("").is_empty());
        assert_eq!(split_slug("projects/foo"), vec!["projects", "foo"]);
    }

    #[test]
    fn test_metadata() {
        let pages = pages();
        let resolver = SlugResolver::new(&pages);

        let meta = resolver.metadata(&["about"]);
        assert_eq!(meta.title.as_deref(), Some("About"));
        assert_eq!(meta.description.as_deref(), Some("Who I am"));

        assert!(resolver.metadata(&["nope"]).is_empty());
    }

    #[test]
    fn test_static_params_path() {
        let params = StaticParams {
            segments: vec!["projects".to_string(), "foo".to_string()],
        };
        assert_eq!(params.path(), "/projects/foo/");
        assert_eq!(StaticParams { segments: vec![] }.path(), "/");
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(
            path_segments("/projects/foo/").unwrap(),
            vec!["projects", "foo"]
        );
        assert_eq!(path_segments("/caf%C3%A9").unwrap(), vec!["café"]);
        assert!(path_segments("/").unwrap().is_empty());
    }

    #[test]
    fn test_path_segments_rejects_encoded_slash() {
        assert_eq!(path_segments("/projects%2Ffoo"), None);
        assert_eq!(path_segments("/bad%FF"), None);
    }
}
