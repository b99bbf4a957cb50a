//! Defines the [`Catalog`], the ordered collection of every [`Post`] in a
//! build. The catalog is the single input to both the relation indexer
//! ([`crate::relation`]) and the feed ([`crate::feed`]).

use crate::post::Post;
use std::collections::HashMap;

/// All posts in a build, in load order. Load order is the tie-breaker for
/// every ordering decision downstream, so it is preserved as given.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    posts: Vec<Post>,

    /// Index into `posts` of the first published post at each path.
    published_positions: HashMap<String, usize>,
}

impl Catalog {
    /// Wraps `posts` without reordering them.
    pub fn new(posts: Vec<Post>) -> Catalog {
        let mut published_positions = HashMap::new();
        for (i, post) in posts.iter().enumerate().filter(|(_, post)| post.published) {
            published_positions.entry(post.path.clone()).or_insert(i);
        }
        Catalog {
            posts,
            published_positions,
        }
    }

    /// Every post, published or not.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// The published posts, in catalog order.
    pub fn published(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| post.published)
    }

    /// Looks up a published post by its path.
    pub fn get(&self, path: &str) -> Option<&Post> {
        self.published_positions.get(path).map(|&i| &self.posts[i])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Checks the invariants downstream views rely on. Currently that is
    /// path uniqueness among published posts: two published posts with the
    /// same path would collide on the same page and feed entry.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for post in self.published() {
            if let Some(first) = seen.insert(&post.path, &post.id) {
                return Err(Error::DuplicatePath {
                    path: post.path.clone(),
                    first: first.to_owned(),
                    second: post.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Post>> for Catalog {
    fn from(posts: Vec<Post>) -> Catalog {
        Catalog::new(posts)
    }
}

/// The result of a fallible catalog operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a defect in the catalog as a whole (as opposed to a defect in
/// a single source file, see [`crate::parser::Error`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when two published posts claim the same path.
    #[error("duplicate path `{path}` published by both `{first}` and `{second}`")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;

    #[test]
    fn test_published_filters_and_keeps_order() {
        let mut hidden = post("/b", "2020-01-02", &[]);
        hidden.published = false;
        let catalog = Catalog::new(vec![
            post("/c", "2020-01-03", &[]),
            hidden,
            post("/a", "2020-01-01", &[]),
        ]);

        let paths: Vec<&str> = catalog.published().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/c", "/a"], paths);
        assert_eq!(3, catalog.len());
        assert!(catalog.get("/b").is_none());
        assert!(catalog.get("/a").is_some());
    }

    #[test]
    fn test_get_skips_drafts_sharing_a_path() {
        let mut draft = post("/a", "2020-01-01", &[]);
        draft.id = String::from("a-draft");
        draft.published = false;
        let mut published = post("/a", "2020-01-02", &[]);
        published.id = String::from("a-live");
        let catalog = Catalog::new(vec![draft, published, post("/b", "2020-01-03", &[])]);

        assert_eq!(Some("a-live"), catalog.get("/a").map(|p| p.id.as_str()));
        assert_eq!(Some("b"), catalog.get("/b").map(|p| p.id.as_str()));
        assert!(catalog.get("/c").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicate_published_paths() {
        let mut second = post("/a", "2020-01-02", &[]);
        second.id = String::from("a-again");
        let catalog = Catalog::new(vec![post("/a", "2020-01-01", &[]), second]);

        match catalog.validate() {
            Err(Error::DuplicatePath { path, first, second }) => {
                assert_eq!("/a", path);
                assert_eq!("a", first);
                assert_eq!("a-again", second);
            }
            other => panic!("wanted DuplicatePath, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_ignores_unpublished_duplicates() {
        let mut draft = post("/a", "2020-01-02", &[]);
        draft.published = false;
        let catalog = Catalog::new(vec![post("/a", "2020-01-01", &[]), draft]);
        assert!(catalog.validate().is_ok());
    }
}
