//! The library code for `candor`, which derives the reading suggestions and
//! the syndication feed of a personal blog. A build can be broken down into
//! three steps:
//!
//! 1. Loading the content catalog from post source files on disk
//!    ([`crate::parser`], [`crate::catalog`])
//! 2. Relating every published post to the other published posts it shares a
//!    tag with, and handing the result to the page generator as page
//!    descriptors ([`crate::relation`], [`crate::page`])
//! 3. Serializing the published posts, newest first, into an Atom feed
//!    ([`crate::feed`])
//!
//! Steps two and three are independent of one another. Both are pure
//! functions of the catalog; [`crate::build`] runs them and only writes
//! output once both have succeeded.
//!
//! A fourth piece runs later, at render time: the [`crate::sample::Sampler`]
//! picks a small random selection from a post's related posts each time the
//! page is rendered.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod catalog;
pub mod config;
pub mod excerpt;
pub mod feed;
pub mod page;
pub mod parser;
pub mod post;
pub mod relation;
pub mod sample;
pub mod url;
