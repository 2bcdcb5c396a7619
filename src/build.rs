//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the templates
//! ([`crate::template`]), cleaning the output directory, parsing the posts
//! ([`crate::parser`]), rendering post and index pages ([`crate::write`]) and
//! copying the static source directory into the static output directory.

use crate::config::Config;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::template::{Error as TemplateError, Templates};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`] object and returns the output
/// directory. This calls into [`Templates::load`],
/// [`PostParser::parse_posts`] and [`Writer::write_posts`] which do the
/// heavy-lifting. This function also cleans the output directory first and
/// copies the static assets afterwards.
///
/// There is no rollback: an error at any step aborts the build and leaves
/// the output directory in whatever state it reached.
pub fn build_site(config: &Config) -> Result<PathBuf> {
    // Parse the template files before touching the output directory so a
    // broken theme doesn't leave the previous site deleted.
    let templates =
        Templates::load(&config.templates_directory, &config.template_partials)?;

    // The whole output tree is rebuilt from scratch on every run.
    clean(&config.output_directory)?;

    let posts = PostParser::new().parse_posts(&config.content_directory)?;

    let writer = Writer {
        templates: &templates,
        output_directory: &config.output_directory,
    };
    let summaries = writer.write_posts(&posts)?;
    log::info!("Wrote {} post(s) and the index page", summaries.len());

    if config.static_directory.is_dir() {
        copy_dir(
            &config.static_directory,
            &config.output_directory.join(STATIC_OUTPUT_DIRECTORY),
        )?;
    } else {
        log::debug!(
            "No static directory at `{}`; skipping",
            config.static_directory.display()
        );
    }

    Ok(config.output_directory.clone())
}

/// The name of the static assets directory inside the output directory.
pub const STATIC_OUTPUT_DIRECTORY: &str = "static";

/// Deletes `dir` (if it exists) and recreates it empty.
fn clean(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            })
        }
    }
    fs::create_dir_all(dir).map_err(|e| Error::Clean {
        path: dir.to_owned(),
        err: e,
    })
}

/// Recursively copies the contents of `src` into `dst`.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    use walkdir::WalkDir;
    for result in WalkDir::new(src).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor of
        // the entry's path
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            Error::CopyStatic {
                path: entry.path().to_owned(),
                err: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "path is outside of the static directory",
                ),
            }
        })?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::CopyStatic {
                path: target.clone(),
                err: e,
            })?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::CopyStatic {
                path: entry.path().to_owned(),
                err: e,
            })?;
        }
    }

    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during template loading,
/// parsing, writing, cleaning the output directory and copying static files.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the templates.
    Template(TemplateError),

    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing [`crate::post::Post`]s to disk as HTML
    /// files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while copying static files.
    CopyStatic { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::CopyStatic { path, err } => {
                write!(f, "Copying static file '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::CopyStatic { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator while walking directories.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
