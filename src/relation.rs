//! Derives, for every published [`Post`], the set of other published posts
//! that share at least one tag with it.
//!
//! The relation is computed through an inverted index (tag → posts) rather
//! than by comparing every pair of posts: each post's candidates are the
//! union of the index entries for its tags. The result is identical to the
//! pairwise definition, `B ∈ related(A)` iff `A` and `B` are distinct
//! published posts and `tags(A) ∩ tags(B) ≠ ∅`.

use crate::catalog::Catalog;
use crate::post::Post;
use std::collections::HashMap;
use tracing::debug;

/// The related posts of every published post in a [`Catalog`]. Built once
/// per build by [`RelationIndex::build`] and shared read-only with whatever
/// generates pages.
pub struct RelationIndex<'a> {
    /// The published posts, in catalog order.
    subjects: Vec<&'a Post>,

    /// `relations[i]` holds the related posts of `subjects[i]`, in catalog
    /// order.
    relations: Vec<Vec<&'a Post>>,

    /// Maps a post path to its position in `subjects`.
    positions: HashMap<&'a str, usize>,
}

impl<'a> RelationIndex<'a> {
    /// Computes the relation sets for every published post in `catalog`.
    /// Unpublished posts are neither subjects nor candidates. Tags are
    /// compared exactly; a post without tags has no relations.
    pub fn build(catalog: &'a Catalog) -> RelationIndex<'a> {
        let subjects: Vec<&'a Post> = catalog.published().collect();

        let mut by_tag: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, &post) in subjects.iter().enumerate() {
            for tag in post.tags.iter() {
                by_tag.entry(tag.as_str()).or_default().push(i);
            }
        }

        let relations = subjects
            .iter()
            .map(|post| {
                let mut candidates: Vec<usize> = post
                    .tags
                    .iter()
                    .filter_map(|tag| by_tag.get(tag.as_str()))
                    .flatten()
                    .copied()
                    .collect();

                // A post sharing several tags shows up once per shared tag.
                candidates.sort_unstable();
                candidates.dedup();

                candidates
                    .into_iter()
                    .map(|i| subjects[i])
                    .filter(|other| other.path != post.path)
                    .collect()
            })
            .collect();

        let positions = subjects
            .iter()
            .enumerate()
            .map(|(i, &post)| (post.path.as_str(), i))
            .collect();

        debug!(posts = subjects.len(), tags = by_tag.len(), "indexed relations");
        RelationIndex {
            subjects,
            relations,
            positions,
        }
    }

    /// Returns the related posts for the published post at `path`, or `None`
    /// if there is no such published post.
    pub fn get(&self, path: &str) -> Option<&[&'a Post]> {
        self.positions
            .get(path)
            .map(|&i| self.relations[i].as_slice())
    }

    /// Iterates over every published post and its related posts, in catalog
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Post, &[&'a Post])> + '_ {
        self.subjects
            .iter()
            .copied()
            .zip(self.relations.iter().map(Vec::as_slice))
    }

    /// The number of published posts in the index.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;

    fn paths(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.path.clone()).collect()
    }

    fn worked_example() -> Catalog {
        let mut c = post("/c", "2020-03-01", &["z"]);
        c.published = false;
        Catalog::new(vec![
            post("/a", "2020-01-01", &["x", "y"]),
            post("/b", "2020-02-01", &["y"]),
            c,
        ])
    }

    #[test]
    fn test_worked_example() {
        let catalog = worked_example();
        let index = RelationIndex::build(&catalog);

        assert_eq!(2, index.len());
        assert_eq!(Some(vec![String::from("/b")]), index.get("/a").map(paths));
        assert_eq!(Some(vec![String::from("/a")]), index.get("/b").map(paths));
        assert!(index.get("/c").is_none());
    }

    #[test]
    fn test_unpublished_posts_are_never_candidates() {
        let mut hidden = post("/hidden", "2020-01-01", &["x"]);
        hidden.published = false;
        let catalog = Catalog::new(vec![post("/a", "2020-01-01", &["x"]), hidden]);
        let index = RelationIndex::build(&catalog);
        assert_eq!(Some(Vec::<String>::new()), index.get("/a").map(paths));
    }

    #[test]
    fn test_multiple_shared_tags_listed_once_in_catalog_order() {
        let catalog = Catalog::new(vec![
            post("/a", "2020-01-01", &["x", "y", "z"]),
            post("/b", "2020-01-02", &["z"]),
            post("/c", "2020-01-03", &["x", "y", "z"]),
            post("/d", "2020-01-04", &["w"]),
        ]);
        let index = RelationIndex::build(&catalog);
        assert_eq!(
            Some(vec![String::from("/b"), String::from("/c")]),
            index.get("/a").map(paths)
        );
        assert_eq!(Some(Vec::<String>::new()), index.get("/d").map(paths));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let catalog = Catalog::new(vec![
            post("/a", "2020-01-01", &["Rust"]),
            post("/b", "2020-01-02", &["rust"]),
        ]);
        let index = RelationIndex::build(&catalog);
        assert_eq!(Some(0), index.get("/a").map(<[_]>::len));
        assert_eq!(Some(0), index.get("/b").map(<[_]>::len));
    }

    #[test]
    fn test_untagged_posts_have_no_relations() {
        let catalog = Catalog::new(vec![
            post("/a", "2020-01-01", &[]),
            post("/b", "2020-01-02", &[]),
        ]);
        let index = RelationIndex::build(&catalog);
        assert!(index.iter().all(|(_, related)| related.is_empty()));
    }

    /// Checks the index against the pairwise definition over a catalog with
    /// a mix of overlapping tags.
    #[test]
    fn test_matches_pairwise_definition() {
        let tag_sets: &[&[&str]] = &[
            &["a", "b"],
            &["b"],
            &["c"],
            &["a", "c"],
            &[],
            &["d", "b"],
            &["e"],
            &["e", "a"],
        ];
        let mut posts: Vec<Post> = tag_sets
            .iter()
            .enumerate()
            .map(|(i, tags)| post(&format!("/{}", i), "2020-01-01", tags))
            .collect();
        posts[2].published = false;
        let catalog = Catalog::new(posts);
        let index = RelationIndex::build(&catalog);

        for (subject, related) in index.iter() {
            // No self-relation.
            assert!(related.iter().all(|other| other.path != subject.path));
            for other in catalog.posts() {
                let expected = other.published
                    && other.path != subject.path
                    && subject.shares_tag_with(other);
                let actual = related.iter().any(|r| r.path == other.path);
                assert_eq!(
                    expected, actual,
                    "relation between {} and {}",
                    subject.path, other.path
                );
            }
        }
    }
}
