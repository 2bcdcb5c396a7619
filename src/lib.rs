//! The library code for the `blotter` static site generator. A build can be
//! broken down into a handful of distinct steps:
//!
//! 1. Loading the post and index templates ([`crate::template`])
//! 2. Parsing posts from source files on disk ([`crate::parser`]), which
//!    splits off each file's metadata block ([`crate::frontmatter`]) and
//!    renders its Markdown body ([`crate::markdown`]), highlighting fenced
//!    code ([`crate::highlight`])
//! 3. Templating the post pages and the index page and writing them to disk
//!    ([`crate::write`])
//! 4. Copying the static assets into the output tree
//!
//! [`crate::build::build_site`] stitches these together. The other entry
//! point, [`crate::new_post::create_post`], scaffolds a new post source file.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod frontmatter;
pub mod highlight;
pub mod htmlrenderer;
pub mod markdown;
pub mod new_post;
pub mod parser;
pub mod post;
pub mod tag;
pub mod template;
pub mod util;
pub mod value;
pub mod write;
