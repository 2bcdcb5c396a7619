//! Defines the [`Tag`] type, which represents a [`crate::post::Post`] tag.

use std::hash::{Hash, Hasher};

/// Represents a [`crate::post::Post`] tag. Tags are only labels on a post;
/// there are no per-tag index pages.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag as written in the post's metadata.
    pub name: String,

    /// The tag's name, slugified so e.g., `macOS` and `MacOS` resolve to the
    /// same value. Themes can use it as a CSS class or an anchor.
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        Tag {
            name: name.to_owned(),
            slug: slug::slugify(name),
        }
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `slug`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

/// Converts a list of tag names into [`Tag`]s, dropping later duplicates
/// (by slug) while keeping the order in which they were written.
pub fn from_names(names: &[String]) -> Vec<Tag> {
    use std::collections::HashSet;
    let mut seen: HashSet<Tag> = HashSet::new();
    names
        .iter()
        .map(|name| Tag::new(name))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tag_slug() {
        let tag = Tag::new("Rust Lang");
        assert_eq!("Rust Lang", tag.name);
        assert_eq!("rust-lang", tag.slug);
    }

    #[test]
    fn test_from_names_dedups_by_slug() {
        let names = vec![
            "macOS".to_owned(),
            "rust".to_owned(),
            "MacOS".to_owned(),
        ];
        let tags = from_names(&names);
        let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(vec!["macos", "rust"], slugs);
        assert_eq!("macOS", tags[0].name);
    }
}
