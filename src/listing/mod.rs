//! Post listing order

use crate::content::ContentEntry;

/// Orders posts for the home page listing
#[derive(Debug, Clone, Copy)]
pub struct PostOrderer<'a> {
    posts: &'a [ContentEntry],
}

impl<'a> PostOrderer<'a> {
    pub fn new(posts: &'a [ContentEntry]) -> Self {
        Self { posts }
    }

    /// Every post, newest first.
    ///
    /// Dates compare as instants whatever offset they were written with.
    /// Undated posts sort after all dated ones. The sort is stable, so posts
    /// with equal dates keep their collection order.
    pub fn ordered(&self) -> Vec<&'a ContentEntry> {
        let mut ordered: Vec<&ContentEntry> = self.posts.iter().collect();
        // `None < Some(_)`, so reversing the comparison puts undated last.
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        ordered
    }

    /// Neighbours of a post in listing order: (newer, older)
    pub fn neighbours(
        &self,
        slug: &str,
    ) -> (Option<&'a ContentEntry>, Option<&'a ContentEntry>) {
        let ordered = self.ordered();
        let Some(pos) = ordered.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let newer = pos.checked_sub(1).map(|i| ordered[i]);
        let older = ordered.get(pos + 1).copied();
        (newer, older)
    }
}
