//! Defines the [`Post`] and [`PostSummary`] types along with the rules for
//! deriving a post's slug, title and date from its metadata. See
//! [`crate::parser`] for reading posts from disk and [`crate::value`] for
//! converting them into template values.

use crate::frontmatter::Metadata;
use crate::tag::Tag;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, ParseResult};
use std::path::PathBuf;
use std::time::SystemTime;

/// The marker separating a post's summary from the rest of its body.
pub const FOLD_TAG: &str = "<!-- more -->";

/// Output format of the `date` template field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Output format of the `datetime` template field.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A fully parsed and rendered post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's URL path segment and output directory name.
    pub slug: String,

    /// The title of the post.
    pub title: String,

    /// The publication date of the post.
    pub date: NaiveDateTime,

    /// The rendered body of the post (HTML).
    pub body: String,

    /// The tags associated with the post.
    pub tags: Vec<Tag>,

    /// The full metadata block, including the keys used above.
    pub metadata: Metadata,

    /// The file the post was parsed from.
    pub source_path: PathBuf,
}

impl Post {
    /// Returns the part of the body before [`FOLD_TAG`] and whether the body
    /// was actually folded.
    pub fn summary(&self) -> (&str, bool) {
        match self.body.find(FOLD_TAG) {
            Some(i) => (&self.body[..i], true),
            None => (&self.body, false),
        }
    }

    /// The site-relative URL of the post page.
    pub fn url(&self) -> String {
        url_for(&self.slug)
    }

    pub fn summarize(&self) -> PostSummary {
        let (summary, summarized) = self.summary();
        PostSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            date: self.date,
            summary: summary.to_owned(),
            summarized,
            tags: self.tags.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// The subset of a [`Post`] listed on the index page and linked from
/// neighbouring posts.
#[derive(Clone, Debug, PartialEq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: NaiveDateTime,
    pub summary: String,
    pub summarized: bool,
    pub tags: Vec<Tag>,
    pub metadata: Metadata,
}

impl PostSummary {
    pub fn url(&self) -> String {
        url_for(&self.slug)
    }
}

pub fn url_for(slug: &str) -> String {
    format!("/{}/", slug)
}

/// The metadata `slug` if present, otherwise the source file's stem.
pub fn resolve_slug(metadata: &Metadata, file_stem: &str) -> String {
    metadata
        .get_str("slug")
        .unwrap_or_else(|| file_stem.to_owned())
}

/// The metadata `title` if present, otherwise the slug.
pub fn resolve_title(metadata: &Metadata, slug: &str) -> String {
    metadata.get_str("title").unwrap_or_else(|| slug.to_owned())
}

/// Returns the post date from the metadata `date` value, falling back to
/// `modified` when the key is missing or isn't a recognizable ISO-8601 date.
pub fn resolve_date(metadata: &Metadata, modified: SystemTime) -> NaiveDateTime {
    let fallback = || DateTime::<Local>::from(modified).naive_local();
    match metadata.get_str("date") {
        None => fallback(),
        Some(date) => match parse_date(&date) {
            Ok(date) => date,
            Err(e) => {
                log::warn!(
                    "Unrecognized date `{}` ({}); using the file modification time",
                    date,
                    e
                );
                fallback()
            }
        },
    }
}

/// Parses an ISO-8601 date or date-time. Accepts `YYYY-MM-DD`, date-times
/// separated by `T` or a space (with optional seconds and fractional
/// seconds), and RFC 3339 timestamps with an offset, which are taken at
/// their local wall-clock time.
pub fn parse_date(input: &str) -> ParseResult<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let input = input.trim();
    for format in DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(date);
        }
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Ok(date.naive_local());
    }

    // Report the error for the plain-date form, which is the expected one.
    NaiveDate::parse_from_str(input, DATE_FORMAT).map(|date| date.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Timelike;
    use std::time::Duration;

    fn metadata(yaml: &str) -> Metadata {
        Metadata::decode(yaml).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(ymd(2024, 1, 15), parse_date("2024-01-15").unwrap());

        let date = parse_date("2024-01-15T08:30:05").unwrap();
        assert_eq!((8, 30, 5), (date.hour(), date.minute(), date.second()));

        let date = parse_date("2024-01-15 08:30").unwrap();
        assert_eq!((8, 30), (date.hour(), date.minute()));

        let date = parse_date("2024-01-15T08:30:00+02:00").unwrap();
        assert_eq!(8, date.hour());

        assert!(parse_date("January 15th").is_err());
        assert!(parse_date("2024-13-45").is_err());
    }

    #[test]
    fn test_resolve_date_from_metadata() {
        let modified = SystemTime::UNIX_EPOCH;
        let date = resolve_date(&metadata("date: 2024-01-15\n"), modified);
        assert_eq!(ymd(2024, 1, 15), date);
    }

    #[test]
    fn test_resolve_date_falls_back_to_modified() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 * 400);
        let wanted = DateTime::<Local>::from(modified).naive_local();

        assert_eq!(wanted, resolve_date(&Metadata::default(), modified));
        assert_eq!(wanted, resolve_date(&metadata("date: not a date\n"), modified));
        assert_eq!(wanted, resolve_date(&metadata("date: [2024]\n"), modified));
    }

    #[test]
    fn test_resolve_slug_and_title() {
        let empty = Metadata::default();
        assert_eq!("hello", resolve_slug(&empty, "hello"));
        assert_eq!("hello", resolve_title(&empty, "hello"));

        let meta = metadata("slug: custom\ntitle: Hello World\n");
        assert_eq!("custom", resolve_slug(&meta, "hello"));
        assert_eq!("Hello World", resolve_title(&meta, "custom"));
    }

    #[test]
    fn test_summary_fold() {
        let mut post = Post {
            slug: "s".to_owned(),
            title: "t".to_owned(),
            date: ymd(2024, 1, 1),
            body: format!("<p>intro</p>\n{}\n<p>rest</p>\n", FOLD_TAG),
            tags: Vec::new(),
            metadata: Metadata::default(),
            source_path: PathBuf::from("s.md"),
        };
        assert_eq!(("<p>intro</p>\n", true), post.summary());

        post.body = "<p>all</p>\n".to_owned();
        let summary = post.summarize();
        assert_eq!("<p>all</p>\n", summary.summary);
        assert!(!summary.summarized);
        assert_eq!("/s/", summary.url());
    }
}
