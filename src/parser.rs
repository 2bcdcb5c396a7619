//! Defines the [`Parser`] and [`Error`] types: the logic for reading post
//! source files from the file system into [`Post`]s. See [`Post::to_value`]
//! and [`Post::summarize`] for how posts are later converted into template
//! values.

use crate::frontmatter;
use crate::highlight::Highlighter;
use crate::markdown;
use crate::post::{self, Post};
use crate::tag;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
#[derive(Default)]
pub struct Parser {
    /// Shared by every post so the syntax definitions are loaded once.
    highlighter: Highlighter,
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            highlighter: Highlighter::new(),
        }
    }

    /// Searches `source_directory` for post files (extension `.md`) and
    /// returns the parsed [`Post`]s in processing order: by file name,
    /// descending. A missing `source_directory` yields no posts. Each post
    /// file is structured as follows:
    ///
    /// 1. An optional metadata block: a `---` line, YAML with any of the
    ///    fields `title`, `date`, `slug` and `tags` (plus arbitrary extra
    ///    fields), and a closing `---` line
    /// 2. The Markdown post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        if !source_directory.is_dir() {
            log::warn!(
                "Content directory `{}` does not exist; no posts to build",
                source_directory.display()
            );
            return Ok(Vec::new());
        }

        source_files(source_directory)?
            .iter()
            .map(|path| self.parse_post(path))
            .collect()
    }

    /// Parses a single post file, annotating any error with its path.
    pub fn parse_post(&self, path: &Path) -> Result<Post> {
        match self._parse_post(path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, path: &Path) -> Result<Post> {
        use std::io::Read;
        let mut contents = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
        let modified = file.metadata()?.modified()?;
        drop(file);

        log::debug!("Parsing `{}`", path.display());
        let (metadata, body) = frontmatter::parse(&contents);

        let file_stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| InvalidFileNameError(path.to_owned()))?;
        let slug = post::resolve_slug(&metadata, file_stem);
        validate_slug(&slug)?;
        let title = post::resolve_title(&metadata, &slug);
        let date = post::resolve_date(&metadata, modified);
        let tags = tag::from_names(&metadata.tags());

        let mut html = String::new();
        markdown::to_html(&mut html, body, &self.highlighter, &post::url_for(&slug))?;

        log::debug!("Parsed `{}` as `{}` ({})", path.display(), slug, date);
        Ok(Post {
            slug,
            title,
            date,
            body: html,
            tags,
            metadata,
            source_path: path.to_owned(),
        })
    }
}

/// Lists the `.md` files directly inside `dir`, sorted by file name
/// descending. Hidden files are skipped.
fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for result in fs::read_dir(dir)? {
        let entry = result?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden
            && entry.file_type()?.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(MARKDOWN_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}

/// A slug becomes a single directory under the output directory, so it must
/// be one plain path component.
fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty()
        || slug == "."
        || slug == ".."
        || slug.contains(|c: char| c == '/' || c == '\\')
    {
        return Err(Error::InvalidSlug(slug.to_owned()));
    }
    Ok(())
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {
    /// Implements the [`std::error::Error`] trait for [`InvalidFileNameError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's slug can't be used as an output directory name.
    InvalidSlug(String),

    /// Returned for I/O errors.
    Io(std::io::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidSlug(slug) => write!(
                f,
                "invalid slug `{}`: must be a single, non-empty path component",
                slug
            ),
            Error::Io(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidSlug(_) => None,
            Error::Io(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{DateTime, Local, NaiveDate};

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_post_with_metadata() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write(
            dir.path(),
            "hello.md",
            "---\ntitle: \"Hello World\"\ndate: 2024-01-15\ntags: [rust]\n---\n\n# Hi\n",
        );

        let post = Parser::new().parse_post(&path)?;
        assert_eq!("hello", post.slug);
        assert_eq!("Hello World", post.title);
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            post.date
        );
        assert_eq!("<h1>Hi</h1>\n", post.body);
        assert_eq!("rust", post.tags[0].name);
        Ok(())
    }

    #[test]
    fn test_parse_post_without_metadata_uses_mtime() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write(dir.path(), "plain-post.md", "Just text.\n");

        let post = Parser::new().parse_post(&path)?;
        let modified = fs::metadata(&path)?.modified()?;
        assert_eq!("plain-post", post.slug);
        assert_eq!("plain-post", post.title);
        assert_eq!(DateTime::<Local>::from(modified).naive_local(), post.date);
        assert!(post.metadata.is_empty());
        assert_eq!("<p>Just text.</p>\n", post.body);
        Ok(())
    }

    #[test]
    fn test_parse_post_malformed_metadata_degrades() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write(dir.path(), "broken.md", "---\ntitle: [oops\n---\nBody\n");

        let post = Parser::new().parse_post(&path)?;
        assert_eq!("broken", post.title);
        assert_eq!("<p>Body</p>\n", post.body);
        Ok(())
    }

    #[test]
    fn test_parse_post_highlights_code() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write(dir.path(), "code.md", "```rust\nfn main() {}\n```\n");

        let post = Parser::new().parse_post(&path)?;
        assert!(post
            .body
            .starts_with(r#"<pre><code class="language-rust"><span class="source rust">"#));
        Ok(())
    }

    #[test]
    fn test_parse_post_invalid_slug() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.md", "---\nslug: ../escape\n---\nBody\n");

        match Parser::new().parse_post(&path) {
            Err(Error::Annotated(_, err)) => {
                assert!(matches!(*err, Error::InvalidSlug(_)))
            }
            other => panic!("expected an invalid slug error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_posts_order_and_filtering() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "2024-01-01-a.md", "a");
        write(dir.path(), "2024-03-01-c.md", "c");
        write(dir.path(), "2024-02-01-b.md", "b");
        write(dir.path(), "notes.txt", "not a post");
        write(dir.path(), ".hidden.md", "hidden");
        fs::create_dir(dir.path().join("drafts.md"))?;

        let posts = Parser::new().parse_posts(dir.path())?;
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(vec!["2024-03-01-c", "2024-02-01-b", "2024-01-01-a"], slugs);
        Ok(())
    }

    #[test]
    fn test_parse_posts_missing_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(Parser::new().parse_posts(&dir.path().join("nope"))?.is_empty());
        Ok(())
    }
}
