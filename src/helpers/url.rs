//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Bytes escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/index.pdf") // -> "/blog/index.pdf"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Root-relative path of a route given by its path segments.
///
/// Each segment is percent-encoded on its own, so the server decodes it back
/// to the same segment list.
pub fn route_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| format!("{}/", utf8_percent_encode(s.as_ref(), SEGMENT)))
        .collect()
}

/// Site-relative URL of a route, including the configured root
pub fn route_url<S: AsRef<str>>(config: &SiteConfig, segments: &[S]) -> String {
    url_for(config, &route_path(segments))
}

/// Resolve a configured link: absolute URLs and `mailto:` pass through,
/// site paths get the root prepended.
pub fn link_href(config: &SiteConfig, href: &str) -> String {
    if href.starts_with('/') {
        url_for(config, href)
    } else {
        href.to_string()
    }
}

/// Inverse of [`url_for`]: the site-relative part of a request path.
///
/// `None` when the path lies outside the configured root.
pub fn strip_root<'a>(config: &SiteConfig, path: &'a str) -> Option<&'a str> {
    let root = config.root.trim_matches('/');
    if root.is_empty() {
        return Some(path);
    }

    let rest = path.strip_prefix('/')?.strip_prefix(root)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
