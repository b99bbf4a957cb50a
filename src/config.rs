use crate::feed::MissingDatePolicy;
use crate::sample::DEFAULT_LIMIT;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "candor.yaml";

#[derive(Deserialize)]
struct RelatedLimit(usize);
impl Default for RelatedLimit {
    fn default() -> Self {
        RelatedLimit(DEFAULT_LIMIT)
    }
}

#[derive(Deserialize)]
struct FeedFile(String);
impl Default for FeedFile {
    fn default() -> Self {
        FeedFile(String::from("feed.atom"))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    title: String,
    base_url: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default)]
    posts_directory: Option<PathBuf>,

    #[serde(default)]
    output_directory: Option<PathBuf>,

    #[serde(default)]
    feed_file: FeedFile,

    #[serde(default)]
    related_limit: RelatedLimit,

    #[serde(default)]
    missing_dates: MissingDatePolicy,
}

/// The author credited in the feed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

pub struct Config {
    pub title: String,
    pub base_url: Url,
    pub author: Option<Author>,
    pub posts_directory: PathBuf,
    pub output_directory: PathBuf,
    pub feed_file: String,
    pub related_limit: usize,
    pub missing_dates: MissingDatePolicy,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its ancestors,
    /// and loads the first one found.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the project file at `path`. Relative directories in the file are
    /// resolved against the file's own directory. `output_directory`, when
    /// given, takes precedence over the file's `output_directory`.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;

        if project.base_url.cannot_be_a_base() {
            bail!("`base_url` must be a hierarchical URL, got `{}`", project.base_url);
        }
        if project.feed_file.0.trim().is_empty() {
            bail!("`feed_file` must not be empty");
        }

        let project_root = match path.parent() {
            None => bail!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            ),
            Some(root) => root,
        };

        Ok(Config {
            title: project.title,
            base_url: project.base_url,
            author: project.author,
            posts_directory: project_root
                .join(project.posts_directory.unwrap_or_else(|| PathBuf::from("posts"))),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(
                    project
                        .output_directory
                        .unwrap_or_else(|| PathBuf::from("public")),
                ),
            },
            feed_file: project.feed_file.0,
            related_limit: project.related_limit.0,
            missing_dates: project.missing_dates,
        })
    }

    /// Where the feed is written on disk.
    pub fn feed_path(&self) -> PathBuf {
        self.output_directory.join(&self.feed_file)
    }

    /// Where the page descriptors are written on disk.
    pub fn pages_path(&self) -> PathBuf {
        self.output_directory.join("pages.json")
    }

    /// Where the feed will be served from.
    pub fn feed_url(&self) -> Result<Url> {
        Ok(crate::url::join(&self.base_url, &self.feed_file)?)
    }
}
