//! Defines the [`Parser`] and its [`Error`] type: the logic for loading the
//! content catalog from post source files on disk.
//!
//! A post source file is a YAML frontmatter block fenced by `---` lines,
//! followed by the post body as already-rendered HTML. The body is carried
//! through verbatim; this crate never renders markup.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::excerpt;
use crate::post::Post;

/// File extensions recognized as post sources.
const EXTENSIONS: &[&str] = &["html", "md"];

/// Parses [`Post`] objects from source files.
pub struct Parser {
    /// The maximum length of derived excerpts. See [`excerpt::prune`].
    excerpt_length: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(excerpt::DEFAULT_LENGTH)
    }
}

impl Parser {
    /// Constructs a new parser whose excerpts are at most `excerpt_length`
    /// characters long.
    pub fn new(excerpt_length: usize) -> Parser {
        Parser { excerpt_length }
    }

    /// Recursively searches `source_directory` for post files (extension
    /// `.html` or `.md`) and returns them as a [`Catalog`], in path order.
    /// Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `path`, and optionally
    ///    `date`, `published`, `tags`, `description`, and `banner`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body (HTML)
    ///
    /// For example:
    ///
    /// ```html
    /// ---
    /// title: Hello, world!
    /// path: /hello-world
    /// date: 2021-04-16
    /// published: true
    /// tags: [greet]
    /// ---
    /// <h1>Hello</h1>
    /// <p>World</p>
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Catalog> {
        let mut posts = Vec::new();
        for result in WalkDir::new(source_directory).sort_by_file_name() {
            let entry = result?;
            if !entry.file_type().is_file() || !Self::is_post_file(entry.path()) {
                continue;
            }
            // strip_prefix() should never fail since `source_directory` is
            // always an ancestor of the entry's path.
            let relative_path = entry
                .path()
                .strip_prefix(source_directory)
                .unwrap_or_else(|_| entry.path());
            posts.push(self.parse_file(entry.path(), relative_path)?);
        }

        debug!(
            directory = %source_directory.display(),
            posts = posts.len(),
            "loaded posts"
        );
        Ok(Catalog::new(posts))
    }

    fn is_post_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| EXTENSIONS.contains(&ext))
    }

    fn parse_file(&self, full_path: &Path, relative_path: &Path) -> Result<Post> {
        use std::io::Read;

        let annotate = |err: Error| {
            Error::Annotated(format!("parsing post `{}`", relative_path.display()), Box::new(err))
        };

        let mut contents = String::new();
        File::open(full_path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|err| annotate(Error::Io(err)))?;

        self.parse_post(&Self::post_id(relative_path), &contents)
            .map_err(annotate)
    }

    /// The ID of a post is its source path relative to the posts directory,
    /// without the extension and with `/` separators.
    fn post_id(relative_path: &Path) -> String {
        let stem: PathBuf = relative_path.with_extension("");
        stem.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Parses a single [`Post`] from an `id` and the `input` file contents.
    pub fn parse_post(&self, id: &str, input: &str) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            // The closing fence has to be a line of its own; a `---` inside
            // a YAML string value or a `----` line must not terminate the
            // frontmatter.
            let rest = &input[FENCE.len()..];
            let closing = rest.match_indices("\n---").find(|&(offset, _)| {
                let after = &rest[offset + 1 + FENCE.len()..];
                after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")
            });
            match closing {
                None => Err(Error::FrontmatterMissingEndFence),
                Some((offset, _)) => Ok((
                    FENCE.len(),                             // yaml_start
                    FENCE.len() + offset + 1,                // yaml_stop
                    FENCE.len() + offset + 1 + FENCE.len(),  // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        let title = frontmatter.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(Error::MissingField("title"));
        }
        let path = frontmatter.path.unwrap_or_default();
        if path.trim().is_empty() {
            return Err(Error::MissingField("path"));
        }

        let date = match frontmatter.date.as_deref() {
            None => {
                warn!(post = id, "post has no date");
                None
            }
            Some(raw) => {
                let date = parse_date(raw);
                if date.is_none() {
                    warn!(post = id, date = raw, "post date is not a valid date");
                }
                date
            }
        };

        let body_html = input[body_start..].trim_start_matches(['\r', '\n']).to_owned();
        Ok(Post {
            id: id.to_owned(),
            path,
            title,
            date,
            tags: parse_tags(id, frontmatter.tags),
            published: frontmatter.published,
            excerpt: excerpt::prune(&body_html, self.excerpt_length),
            description: frontmatter.description,
            body_html,
            banner: frontmatter.banner,
        })
    }
}

/// Parses a frontmatter date. Accepts calendar dates (`2021-04-16`) and
/// RFC 3339 timestamps (`2021-04-16T09:30:00+02:00`), of which only the date
/// in the timestamp's own offset is kept.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Reads the frontmatter `tags` value. Anything other than a list is a data
/// defect and yields no tags; within a list, scalars are kept as strings and
/// nested lists or mappings are dropped.
fn parse_tags(id: &str, tags: Value) -> BTreeSet<String> {
    match tags {
        Value::Null => BTreeSet::new(),
        Value::Sequence(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                other => {
                    warn!(post = id, tag = ?other, "ignoring tag that is not a scalar");
                    None
                }
            })
            .collect(),
        other => {
            warn!(post = id, tags = ?other, "tags is not a list, treating it as empty");
            BTreeSet::new()
        }
    }
}

#[derive(Deserialize, Clone, Default)]
#[serde(default)]
struct Frontmatter {
    /// The title of the post.
    title: Option<String>,

    /// The URL path of the post.
    path: Option<String>,

    /// The date of the post. Kept as a string so that a malformed date is a
    /// data defect for the feed to judge rather than a YAML error.
    date: Option<String>,

    /// Whether the post is published. Defaults to `false`.
    published: bool,

    /// The tags associated with the post. Kept as raw YAML so that a
    /// malformed list is recovered from in [`parse_tags`].
    tags: Value,

    /// An explicit summary for the post.
    description: Option<String>,

    /// A banner image reference.
    banner: Option<String>,
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a required frontmatter field is missing or empty.
    #[error("frontmatter field `{0}` is missing or empty")]
    MissingField(&'static str),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, #[source] Box<Error>),
}
