//! Exports the [`build_site`] function which stitches together the high-level
//! steps of a build: loading the catalog ([`crate::parser`]), deriving the
//! related posts of every published post ([`crate::relation`]) and writing
//! them out as page descriptors ([`crate::page`]), and generating the Atom
//! feed ([`crate::feed`]).

use crate::catalog::{Catalog, Error as CatalogError};
use crate::config::Config;
use crate::feed::{feed_entries, write_feed, Error as FeedError, FeedConfig};
use crate::page::{descriptors, write_descriptors};
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::post::Post;
use crate::relation::RelationIndex;
use crate::sample::Sampler;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Counts reported at the end of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// All posts in the catalog, published or not.
    pub posts: usize,

    /// Posts that received a page descriptor.
    pub pages: usize,

    pub feed_entries: usize,
    pub pages_path: PathBuf,
    pub feed_path: PathBuf,
}

/// Loads and validates the catalog for `config`.
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    let catalog = PostParser::default().parse_posts(&config.posts_directory)?;
    catalog.validate()?;
    Ok(catalog)
}

/// Builds the site from a [`Config`] object. The relation index and the feed
/// are both derived from the catalog before anything is written, so a failed
/// build leaves the output directory untouched.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
    let catalog = load_catalog(config)?;
    info!(
        posts = catalog.len(),
        published = catalog.published().count(),
        "loaded catalog"
    );

    // derive the page descriptors
    let index = RelationIndex::build(&catalog);
    let pages = descriptors(&index);
    let mut pages_json = Vec::new();
    write_descriptors(&pages, &mut pages_json).map_err(Error::Pages)?;

    // derive the feed
    let entries = feed_entries(&catalog, &config.base_url, config.missing_dates)?;
    let mut feed_xml = Vec::new();
    write_feed(
        FeedConfig {
            title: config.title.clone(),
            id: config.base_url.to_string(),
            author: config.author.clone(),
            home_page: config.base_url.clone(),
            feed_url: config.feed_url().map_err(|err| Error::FeedUrl(err.to_string()))?,
        },
        &entries,
        &mut feed_xml,
    )?;

    // Only now touch the file system.
    let pages_path = config.pages_path();
    let feed_path = config.feed_path();
    create_dir(&config.output_directory)?;
    write_file(&pages_path, &pages_json)?;
    write_file(&feed_path, &feed_xml)?;

    let summary = BuildSummary {
        posts: catalog.len(),
        pages: pages.len(),
        feed_entries: entries.len(),
        pages_path,
        feed_path,
    };
    info!(
        pages = summary.pages,
        feed_entries = summary.feed_entries,
        output = %config.output_directory.display(),
        "build finished"
    );
    Ok(summary)
}

/// Samples the related posts shown on the page for `path`, as the page
/// generator would on a render.
pub fn related_for<R: Rng + ?Sized>(
    config: &Config,
    path: &str,
    limit: usize,
    rng: &mut R,
) -> Result<Vec<Post>> {
    let catalog = load_catalog(config)?;
    let index = RelationIndex::build(&catalog);
    let relation_set = index
        .get(path)
        .ok_or_else(|| Error::UnknownPost(path.to_owned()))?;
    debug!(path, candidates = relation_set.len(), limit, "sampling related posts");

    Ok(Sampler::new(limit)
        .sample(relation_set, rng)
        .into_iter()
        .cloned()
        .collect())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::Write {
        path: dir.to_owned(),
        err,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// The result of a build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from loading the
/// catalog, validating it, producing the feed or page descriptors, and
/// writing the output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors loading posts.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned when the catalog as a whole is inconsistent.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Returned for errors producing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned when the feed's own URL can't be derived from the base URL.
    #[error("deriving feed URL: {0}")]
    FeedUrl(String),

    /// Returned for errors serializing page descriptors.
    #[error("serializing page descriptors: {0}")]
    Pages(#[source] serde_json::Error),

    /// Returned for I/O problems while writing output files.
    #[error("writing `{}`: {}", .path.display(), .err)]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when related posts are requested for a path that isn't a
    /// published post.
    #[error("no published post at path `{0}`")]
    UnknownPost(String),
}
