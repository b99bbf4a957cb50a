//! Picks the handful of related posts shown alongside a post.
//!
//! Selection is random on every render, bounded by a limit, and never
//! repeats a post. Duplicate references in the input (the same path listed
//! twice) are collapsed before sampling, and the sample itself is a partial
//! Fisher-Yates shuffle, so the work done is linear in the input size no
//! matter how the input looks.

use crate::post::Post;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// The number of related posts shown by default.
pub const DEFAULT_LIMIT: usize = 2;

/// Samples at most `limit` distinct posts from a relation set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sampler {
    limit: usize,
}

impl Default for Sampler {
    fn default() -> Self {
        Sampler::new(DEFAULT_LIMIT)
    }
}

impl Sampler {
    pub fn new(limit: usize) -> Sampler {
        Sampler { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Draws `min(limit, n)` posts from `relation_set` uniformly at random,
    /// where `n` is the number of distinct paths in `relation_set`. The
    /// result is in draw order and contains no path twice. An empty
    /// relation set yields an empty selection, in which case nothing should
    /// be rendered.
    pub fn sample<'a, R>(&self, relation_set: &[&'a Post], rng: &mut R) -> Vec<&'a Post>
    where
        R: Rng + ?Sized,
    {
        let mut seen: HashSet<&str> = HashSet::with_capacity(relation_set.len());
        let mut candidates: Vec<&'a Post> = relation_set
            .iter()
            .copied()
            .filter(|post| seen.insert(post.path.as_str()))
            .collect();

        let amount = self.limit.min(candidates.len());
        if amount == 0 {
            return Vec::new();
        }

        let (selected, _) = candidates.partial_shuffle(rng, amount);
        selected.to_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn posts(n: usize) -> Vec<Post> {
        (0..n)
            .map(|i| post(&format!("/{}", i), "2020-01-01", &["t"]))
            .collect()
    }

    fn assert_distinct(selection: &[&Post]) {
        let paths: HashSet<&str> = selection.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(selection.len(), paths.len(), "duplicate in selection");
    }

    #[test]
    fn test_empty_relation_set() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Sampler::default().sample(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_single_item() {
        let mut rng = StdRng::seed_from_u64(1);
        let all = posts(1);
        let refs: Vec<&Post> = all.iter().collect();
        let selection = Sampler::default().sample(&refs, &mut rng);
        assert_eq!(1, selection.len());
        assert_eq!("/0", selection[0].path);
    }

    #[test]
    fn test_zero_limit() {
        let mut rng = StdRng::seed_from_u64(1);
        let all = posts(3);
        let refs: Vec<&Post> = all.iter().collect();
        assert!(Sampler::new(0).sample(&refs, &mut rng).is_empty());
    }

    #[test]
    fn test_size_is_min_of_limit_and_len() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..6 {
            let all = posts(n);
            let refs: Vec<&Post> = all.iter().collect();
            for limit in 0..8 {
                let selection = Sampler::new(limit).sample(&refs, &mut rng);
                assert_eq!(limit.min(n), selection.len(), "n = {}, limit = {}", n, limit);
                assert_distinct(&selection);
            }
        }
    }

    #[test]
    fn test_duplicate_references_terminate_and_collapse() {
        let mut rng = StdRng::seed_from_u64(3);
        let all = posts(2);
        // Thousands of references to the same post plus a single other one:
        // a rejection sampler would spin here.
        let mut refs: Vec<&Post> = std::iter::repeat(&all[0]).take(10_000).collect();
        refs.push(&all[1]);

        let selection = Sampler::new(2).sample(&refs, &mut rng);
        assert_eq!(2, selection.len());
        assert_distinct(&selection);

        let only_duplicates: Vec<&Post> = std::iter::repeat(&all[0]).take(100).collect();
        let selection = Sampler::new(2).sample(&only_duplicates, &mut rng);
        assert_eq!(1, selection.len());
    }

    #[test]
    fn test_roughly_uniform_coverage() {
        const TRIALS: usize = 10_000;
        let mut rng = StdRng::seed_from_u64(42);
        let all = posts(5);
        let refs: Vec<&Post> = all.iter().collect();
        let sampler = Sampler::default();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..TRIALS {
            let selection = sampler.sample(&refs, &mut rng);
            assert_eq!(2, selection.len());
            assert_distinct(&selection);
            for p in selection {
                *counts.entry(p.path.clone()).or_default() += 1;
            }
        }

        // Each post is expected in 2/5 of the trials.
        assert_eq!(5, counts.len());
        let expected = TRIALS * 2 / 5;
        for (path, count) in counts {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.1, "{} drawn {} times, expected ~{}", path, count, expected);
        }
    }

    #[test]
    fn test_selection_varies_between_draws() {
        let mut rng = StdRng::seed_from_u64(9);
        let all = posts(5);
        let refs: Vec<&Post> = all.iter().collect();
        let sampler = Sampler::default();

        let mut distinct: HashSet<Vec<String>> = HashSet::new();
        for _ in 0..50 {
            let selection = sampler.sample(&refs, &mut rng);
            distinct.insert(selection.iter().map(|p| p.path.clone()).collect());
        }
        assert!(distinct.len() > 1);
    }
}
