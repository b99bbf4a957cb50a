//! Defines the [`Post`] type, a single authored content item, along with the
//! small amount of behavior shared by the relation indexer and the feed.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use url::Url;

/// A single post, as loaded from the content catalog. Posts are constructed
/// once per build and never mutated afterwards; every downstream view
/// (relations, page descriptors, feed entries) is derived from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// Opaque identifier, stable within a build. For posts loaded from disk
    /// this is the source file path relative to the posts directory, minus
    /// the extension (e.g., `2020/hello`).
    pub id: String,

    /// The site-absolute URL path of the post (e.g., `/hello-world`). Unique
    /// among published posts.
    pub path: String,

    /// The display title. Never empty.
    pub title: String,

    /// The publication date, or `None` if the source omitted it or it could
    /// not be parsed. See [`crate::feed::MissingDatePolicy`].
    pub date: Option<NaiveDate>,

    /// Tag labels. Comparison is exact and case-sensitive.
    pub tags: BTreeSet<String>,

    /// Unpublished posts are excluded from every derived view.
    pub published: bool,

    /// Plain-text excerpt derived from the body.
    pub excerpt: String,

    /// Explicit summary. Takes precedence over `excerpt` when non-empty.
    pub description: Option<String>,

    /// The rendered body. Opaque to this crate.
    pub body_html: String,

    /// Banner image reference, passed through untouched.
    pub banner: Option<String>,
}

impl Post {
    /// Returns the post's summary text: the explicit `description` if it is
    /// present and non-empty, otherwise the derived `excerpt`.
    pub fn summary(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if !description.trim().is_empty() => description,
            _ => &self.excerpt,
        }
    }

    /// Returns true if the two posts have at least one tag in common.
    pub fn shares_tag_with(&self, other: &Post) -> bool {
        // `BTreeSet::is_disjoint` walks both sets in order.
        !self.tags.is_disjoint(&other.tags)
    }

    /// The absolute URL for the post: `base_url` followed by `path`.
    pub fn url(&self, base_url: &Url) -> String {
        crate::url::concat(base_url, &self.path)
    }
}
