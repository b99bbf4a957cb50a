//! Defines [`PageDescriptor`], the record handed to the page generator for
//! each published post: which page to build and which posts it may suggest.

use crate::catalog::Catalog;
use crate::post::Post;
use crate::relation::RelationIndex;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// The page context for one published post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// The post's path, which is also the page's path.
    pub path: String,
    pub title: String,

    /// Paths of the post's related posts, in catalog order. The page
    /// generator samples from these at render time (see
    /// [`crate::sample::Sampler`]).
    pub related: Vec<String>,
}

impl PageDescriptor {
    /// Resolves `related` back into posts. Paths that are not published in
    /// `catalog` are skipped.
    pub fn related_posts<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Post> {
        self.related
            .iter()
            .filter_map(|path| catalog.get(path))
            .collect()
    }
}

/// Creates a descriptor for every post in `index`, in catalog order.
pub fn descriptors(index: &RelationIndex) -> Vec<PageDescriptor> {
    index
        .iter()
        .map(|(post, related)| PageDescriptor {
            path: post.path.clone(),
            title: post.title.clone(),
            related: related.iter().map(|r| r.path.clone()).collect(),
        })
        .collect()
}

/// Writes `descriptors` to `w` as a pretty-printed JSON array.
pub fn write_descriptors<W: Write>(descriptors: &[PageDescriptor], w: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(w, descriptors)
}
