//! Content module - pages, posts, and the store that holds them

mod entry;
mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod store;

pub use entry::{Body, Collection, ContentEntry, PageMetadata};
pub use error::ContentError;
pub use frontmatter::{parse_date_string, FrontMatter};
pub use markdown::MarkdownRenderer;
pub use store::ContentStore;
