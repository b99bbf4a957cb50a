//! Support for creating Atom feeds from the content catalog.
//!
//! Building a feed happens in two steps. [`feed_entries`] filters, orders and
//! shapes the published posts into [`FeedEntry`] values; this is where the
//! ordering policy lives. [`write_feed`] then serializes the entries into an
//! Atom document.

use crate::catalog::Catalog;
use crate::config::Author;
use crate::post::Post;
use atom_syndication::{Content, Entry, Feed, FixedDateTime, Link, Person, Text};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::io::Write;
use tracing::warn;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    /// The feed title.
    pub title: String,

    /// The feed's unique ID, typically the home page URL.
    pub id: String,

    pub author: Option<Author>,

    /// The site's home page, linked as the feed's `alternate`.
    pub home_page: Url,

    /// Where the feed itself will be published, linked as `self`.
    pub feed_url: Url,
}

/// What to do with published posts that have no usable date. There is no
/// right place in a date-ordered feed for such a post, so the choice is left
/// to configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDatePolicy {
    /// Fail the build, naming the offending posts.
    #[default]
    Fail,

    /// Keep the posts, placed after every dated post in catalog order.
    Last,

    /// Leave the posts out of the feed.
    Exclude,
}

/// A published post shaped for syndication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,

    /// The absolute URL of the post: the site's base URL followed by the
    /// post's path.
    pub url: String,

    /// The entry's permanent ID. Always equal to `url`.
    pub guid: String,

    /// `None` only for undated posts kept by [`MissingDatePolicy::Last`].
    pub date: Option<NaiveDate>,

    /// The post's description if it has one, otherwise its excerpt.
    pub description: String,

    /// The full post body, as HTML.
    pub content_encoded: String,
}

impl FeedEntry {
    fn from_post(post: &Post, base_url: &Url) -> FeedEntry {
        let url = post.url(base_url);
        FeedEntry {
            title: post.title.clone(),
            guid: url.clone(),
            url,
            date: post.date,
            description: post.summary().to_owned(),
            content_encoded: post.body_html.clone(),
        }
    }
}

/// Selects the published posts in `catalog` and turns them into feed
/// entries, newest first. Posts dated the same day keep their catalog order.
/// Undated posts are handled according to `missing_dates`.
pub fn feed_entries(
    catalog: &Catalog,
    base_url: &Url,
    missing_dates: MissingDatePolicy,
) -> Result<Vec<FeedEntry>> {
    let (mut dated, mut undated): (Vec<&Post>, Vec<&Post>) =
        catalog.published().partition(|post| post.date.is_some());

    if !undated.is_empty() {
        let paths: Vec<String> = undated.iter().map(|post| post.path.clone()).collect();
        match missing_dates {
            MissingDatePolicy::Fail => return Err(Error::MissingDate(paths)),
            MissingDatePolicy::Exclude => {
                warn!(posts = ?paths, "leaving undated posts out of the feed");
                undated.clear();
            }
            MissingDatePolicy::Last => {
                warn!(posts = ?paths, "placing undated posts at the end of the feed");
            }
        }
    }

    // `sort_by` is stable, which keeps same-day posts in catalog order.
    dated.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(dated
        .into_iter()
        .chain(undated)
        .map(|post| FeedEntry::from_post(post, base_url))
        .collect())
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`FeedEntry`]s and writes the result to a [`std::io::Write`]. This function
/// takes ownership of the provided [`FeedConfig`].
pub fn write_feed<W: Write>(config: FeedConfig, entries: &[FeedEntry], w: W) -> Result<()> {
    feed(config, entries).write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, entries: &[FeedEntry]) -> Feed {
    // The feed is as fresh as its newest entry. Deriving this from the
    // content rather than the clock keeps rebuilds byte-for-byte identical.
    let updated = entries
        .iter()
        .filter_map(|entry| entry.date)
        .max()
        .map(midnight_utc)
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH.fixed_offset());

    let mut feed = Feed::default();
    feed.set_title(Text::plain(config.title));
    feed.set_id(config.id);
    feed.set_updated(updated);
    feed.set_links(vec![
        link(config.home_page.as_str(), "alternate"),
        link(config.feed_url.as_str(), "self"),
    ]);
    feed.set_entries(
        entries
            .iter()
            .map(|entry| atom_entry(entry, &config.author, updated))
            .collect::<Vec<Entry>>(),
    );
    feed.set_authors(author_to_people(config.author));
    feed
}

fn atom_entry(entry: &FeedEntry, author: &Option<Author>, fallback: FixedDateTime) -> Entry {
    let date = entry.date.map(midnight_utc);

    let mut content = Content::default();
    content.set_value(Some(entry.content_encoded.clone()));
    content.set_content_type(Some(String::from("html")));

    let mut atom = Entry::default();
    atom.set_id(entry.guid.clone());
    atom.set_title(Text::plain(entry.title.clone()));
    atom.set_updated(date.unwrap_or(fallback));
    atom.set_published(date);
    atom.set_links(vec![link(&entry.url, "alternate")]);
    atom.set_summary(Some(Text::plain(entry.description.clone())));
    atom.set_content(Some(content));
    atom.set_authors(author_to_people(author.clone()));
    atom
}

fn link(href: &str, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link
}

/// Posts only carry a calendar date; the feed publishes them at midnight UTC.
fn midnight_utc(date: NaiveDate) -> FixedDateTime {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name);
            person.set_email(author.email);
            vec![person]
        }
        None => Vec::new(),
    }
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, and
/// undated-post issues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when there is an Atom-related error.
    #[error(transparent)]
    Atom(#[from] atom_syndication::Error),

    /// Returned under [`MissingDatePolicy::Fail`] when published posts have no
    /// usable date. Holds the posts' paths.
    #[error("published posts without a valid date: {}", .0.join(", "))]
    MissingDate(Vec<String>),
}
