use crate::post::{Post, PostSummary};
use crate::template::{self, Templates};
use crate::value::index_value;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// The file name of every page written by [`Writer`].
const INDEX_FILE: &str = "index.html";

/// Responsible for templating and writing HTML pages to disk from [`Post`]
/// sources.
pub struct Writer<'a> {
    /// The post and index templates.
    pub templates: &'a Templates,

    /// The root of the output tree. Post pages are written to
    /// `{output_directory}/{slug}/index.html` and the index page to
    /// `{output_directory}/index.html`.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Writes one page per post plus the index page, and returns the post
    /// summaries in display order (newest first).
    ///
    /// `posts` must be in processing order. Post pages are written in that
    /// order, so when two posts share a slug the later one wins. Display
    /// order is by date, descending; the sort is stable, so posts with equal
    /// dates keep their processing order.
    pub fn write_posts(&self, posts: &[Post]) -> Result<Vec<PostSummary>> {
        let mut order: Vec<usize> = (0..posts.len()).collect();
        order.sort_by(|&a, &b| posts[b].date.cmp(&posts[a].date));

        let summaries: Vec<PostSummary> =
            order.iter().map(|&i| posts[i].summarize()).collect();

        let mut rank = vec![0; posts.len()];
        for (position, &i) in order.iter().enumerate() {
            rank[i] = position;
        }

        for (i, post) in posts.iter().enumerate() {
            let position = rank[i];
            let prev = match position {
                0 => None,
                _ => summaries.get(position - 1),
            };
            let next = summaries.get(position + 1);
            self.write_post(post, prev, next)?;
        }

        self.write_index(&summaries)?;
        Ok(summaries)
    }

    /// Templates a single post and writes it to
    /// `{output_directory}/{slug}/index.html`.
    fn write_post(
        &self,
        post: &Post,
        prev: Option<&PostSummary>,
        next: Option<&PostSummary>,
    ) -> Result<()> {
        let dir = self.output_directory.join(&post.slug);
        fs::create_dir_all(&dir)?;
        log::debug!("Writing `{}`", dir.join(INDEX_FILE).display());
        self.templates.render_post(
            &mut File::create(dir.join(INDEX_FILE))?,
            post.to_value(prev, next),
        )?;
        Ok(())
    }

    /// Templates the index page and writes it to
    /// `{output_directory}/index.html`.
    fn write_index(&self, summaries: &[PostSummary]) -> Result<()> {
        self.templates.render_index(
            &mut File::create(self.output_directory.join(INDEX_FILE))?,
            index_value(summaries),
        )?;
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(template::Error),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for fallible template operations.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
