//! Creates new post source files, pre-populated with a metadata block.

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The slug used when a title has no usable characters at all.
const FALLBACK_SLUG: &str = "post";

/// The outcome of [`create_post`].
#[derive(Debug, PartialEq)]
pub enum NewPost {
    /// A new file was written at this path.
    Created(PathBuf),

    /// A file already exists at this path; nothing was written.
    Exists(PathBuf),
}

/// Converts a title into a file-name slug: lowercased, whitespace turned
/// into hyphens, punctuation (including `_`) removed, repeated hyphens
/// collapsed and leading/trailing hyphens trimmed. Non-ASCII letters and
/// digits are kept.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
    }
    let slug = slug.trim_end_matches('-');
    match slug.is_empty() {
        true => FALLBACK_SLUG.to_owned(),
        false => slug.to_owned(),
    }
}

/// The path a post titled `title` created on `date` gets:
/// `{content_directory}/{YYYY-MM-DD}-{slug}.md`.
pub fn post_path(content_directory: &Path, title: &str, date: NaiveDate) -> PathBuf {
    content_directory.join(format!(
        "{}-{}.md",
        date.format(crate::post::DATE_FORMAT),
        slugify(title)
    ))
}

/// Creates a new post source file for `title` dated `date`, creating
/// `content_directory` if needed. An existing file is never overwritten.
pub fn create_post(
    content_directory: &Path,
    title: &str,
    date: NaiveDate,
) -> io::Result<NewPost> {
    let path = post_path(content_directory, title, date);
    fs::create_dir_all(content_directory)?;

    // `create_new` refuses to replace an existing file.
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path);
    let mut file = match file {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(NewPost::Exists(path))
        }
        Err(e) => return Err(e),
    };

    use std::io::Write;
    file.write_all(skeleton(title, date).as_bytes())?;
    log::debug!("Created `{}`", path.display());
    Ok(NewPost::Created(path))
}

fn skeleton(title: &str, date: NaiveDate) -> String {
    format!(
        "---\ntitle: {}\ndate: {}\ntags: []\n---\n# {}\n\nWrite the first paragraph of your post here.\n",
        yaml_quote(title),
        date.format(crate::post::DATE_FORMAT),
        title,
    )
}

/// Quotes `s` as a YAML double-quoted scalar.
fn yaml_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\t' => quoted.push_str("\\t"),
            '\n' | '\r' => quoted.push(' '),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontmatter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 4).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!("my-first-post", slugify("My First Post!"));
        assert_eq!("dont-panic", slugify("  Don't   Panic -- "));
        assert_eq!("snakecase-title", slugify("snake_case title"));
        assert_eq!("rust-2024", slugify("Rust 2024?!"));
        assert_eq!("café", slugify("Café"));
        assert_eq!("post", slugify("!!!"));
    }

    #[test]
    fn test_create_post() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let content = dir.path().join("content");

        let created = create_post(&content, "My First Post!", today())?;
        let path = content.join("2024-05-04-my-first-post.md");
        assert_eq!(NewPost::Created(path.clone()), created);

        let text = fs::read_to_string(&path)?;
        let (metadata, body) = frontmatter::parse(&text);
        assert_eq!(Some("My First Post!".to_owned()), metadata.get_str("title"));
        assert_eq!(Some("2024-05-04".to_owned()), metadata.get_str("date"));
        assert!(metadata.tags().is_empty());
        assert!(body.starts_with("# My First Post!\n"));
        Ok(())
    }

    #[test]
    fn test_create_post_does_not_overwrite() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("2024-05-04-my-first-post.md");

        create_post(dir.path(), "My First Post!", today())?;
        fs::write(&path, "edited")?;

        let again = create_post(dir.path(), "My First Post!", today())?;
        assert_eq!(NewPost::Exists(path.clone()), again);
        assert_eq!("edited", fs::read_to_string(&path)?);
        Ok(())
    }

    #[test]
    fn test_title_with_quotes_round_trips() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let title = r#"The "Best" \ Worst: a post"#;

        match create_post(dir.path(), title, today())? {
            NewPost::Created(path) => {
                let text = fs::read_to_string(&path)?;
                let (metadata, _) = frontmatter::parse(&text);
                assert_eq!(Some(title.to_owned()), metadata.get_str("title"));
            }
            other => panic!("expected a new post, got {:?}", other),
        }
        Ok(())
    }
}
