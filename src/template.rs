//! Exports [`Templates`], the page template engine. Each build constructs its
//! own instance from the theme's template files; nothing is cached across
//! builds or shared through global state.

use gtmpl::{Context, Template, Value};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The file name of the post template inside the templates directory.
pub const POST_TEMPLATE: &str = "post.html";

/// The file name of the index template inside the templates directory.
pub const INDEX_TEMPLATE: &str = "index.html";

/// The two page templates.
pub struct Templates {
    post: Template,
    index: Template,
}

impl Templates {
    /// Loads [`POST_TEMPLATE`] and [`INDEX_TEMPLATE`] from `directory`. The
    /// `partials` are prepended to both (in order) so that `{{define}}` blocks
    /// declared in them are available to each page template.
    pub fn load(directory: &Path, partials: &[PathBuf]) -> Result<Templates> {
        let files = |name: &str| {
            partials
                .iter()
                .cloned()
                .chain(std::iter::once(directory.join(name)))
                .collect::<Vec<PathBuf>>()
        };
        Ok(Templates {
            post: parse_template(files(POST_TEMPLATE).iter())?,
            index: parse_template(files(INDEX_TEMPLATE).iter())?,
        })
    }

    /// Builds the templates directly from source text.
    pub fn from_sources(post: &str, index: &str) -> Result<Templates> {
        Ok(Templates {
            post: parse_source(post, Path::new(POST_TEMPLATE))?,
            index: parse_source(index, Path::new(INDEX_TEMPLATE))?,
        })
    }

    /// Executes the post template against `value`, writing the page to `w`.
    pub fn render_post<W: Write>(&self, w: &mut W, value: Value) -> Result<()> {
        execute(&self.post, w, value)
    }

    /// Executes the index template against `value`, writing the page to `w`.
    pub fn render_index<W: Write>(&self, w: &mut W, value: Value) -> Result<()> {
        execute(&self.index, w, value)
    }
}

fn execute<W: Write>(template: &Template, w: &mut W, value: Value) -> Result<()> {
    let context = Context::from(value).map_err(Error::Execute)?;
    template.execute(w, &context).map_err(Error::Execute)
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(
    template_files: impl Iterator<Item = P>,
) -> Result<Template> {
    let mut contents = String::new();
    let mut last = PathBuf::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?;
        contents.push(' ');
        last = template_file.to_owned();
    }

    parse_source(&contents, &last)
}

fn parse_source(contents: &str, path: &Path) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|message| Error::ParseTemplate {
            path: path.to_owned(),
            message,
        })?;
    Ok(template)
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for loading and executing templates.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening or reading template files,
    /// including a missing templates directory.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate { path: PathBuf, message: String },

    /// Returned for errors while executing a template.
    Execute(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { path, message } => {
                write!(f, "Parsing template '{}': {}", path.display(), message)
            }
            Error::Execute(message) => {
                write!(f, "Executing template: {}", message)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate { .. } => None,
            Error::Execute(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn object(pairs: &[(&str, &str)]) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), Value::String(v.to_string()));
        }
        Value::Object(m)
    }

    #[test]
    fn test_render_from_sources() -> Result<()> {
        let templates = Templates::from_sources(
            "<h1>{{.title}}</h1>{{.content}}",
            "<ul>{{range .posts}}<li>{{.title}}</li>{{end}}</ul>",
        )?;

        let mut out = Vec::new();
        templates.render_post(
            &mut out,
            object(&[("title", "Hi"), ("content", "<p>x</p>")]),
        )?;
        assert_eq!("<h1>Hi</h1><p>x</p>", String::from_utf8_lossy(&out));

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "posts".to_owned(),
            Value::Array(vec![object(&[("title", "A")]), object(&[("title", "B")])]),
        );
        let mut out = Vec::new();
        templates.render_index(&mut out, Value::Object(m))?;
        assert_eq!("<ul><li>A</li><li>B</li></ul>", String::from_utf8_lossy(&out));
        Ok(())
    }

    #[test]
    fn test_load_with_partials() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("base.html"),
            r#"{{define "header"}}<header>blog</header>{{end}}"#,
        )?;
        std::fs::write(
            dir.path().join(POST_TEMPLATE),
            r#"{{template "header" .}}{{.title}}"#,
        )?;
        std::fs::write(
            dir.path().join(INDEX_TEMPLATE),
            r#"{{template "header" .}}index"#,
        )?;

        let templates =
            Templates::load(dir.path(), &[dir.path().join("base.html")])?;
        let mut out = Vec::new();
        templates.render_post(&mut out, object(&[("title", "Hi")]))?;
        assert_eq!(
            "<header>blog</header>Hi",
            String::from_utf8_lossy(&out).trim()
        );
        Ok(())
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        match Templates::load(&dir.path().join("missing"), &[]) {
            Err(Error::OpenTemplateFile { path, .. }) => {
                assert!(path.ends_with(POST_TEMPLATE))
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("loading a missing template should fail"),
        }
    }
}
