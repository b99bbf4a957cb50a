//! Builds absolute URLs for posts and artifacts from the site's base URL.
//!
//! Post paths are site-absolute (`/hello-world`) and the base URL may carry a
//! path of its own (`https://example.org/blog`), so [`Url::join`] is the wrong
//! tool here: it would discard the base path. Instead the two are
//! concatenated, making sure exactly one slash separates them.

use url::Url;

/// Concatenates `base` and `path` into an absolute URL string. Trailing
/// slashes on `base` and a missing leading slash on `path` are normalized so
/// that `https://example.org/` + `a` and `https://example.org` + `/a` both
/// yield `https://example.org/a`.
pub fn concat(base: &Url, path: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Like [`concat`], but parses the result back into a [`Url`].
pub fn join(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&concat(base, path))
}
