//! Content integrity errors

use thiserror::Error;

use super::Collection;

/// A fault in the loaded content that the resolver and orderer tolerate,
/// but that usually means an authoring mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("duplicate {collection} slug {slug:?}: {first} shadows {second}")]
    DuplicateSlug {
        collection: Collection,
        slug: String,
        first: String,
        second: String,
    },

    #[error("malformed {collection} slug {slug:?} in {source_path}: {reason}")]
    MalformedSlug {
        collection: Collection,
        slug: String,
        source_path: String,
        reason: &'static str,
    },

    #[error("post {slug:?} in {source_path} has no valid date")]
    MissingDate { slug: String, source_path: String },
}
