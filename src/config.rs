use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The name of the optional project file at the root of a blog.
pub const PROJECT_FILE: &str = "blog.yaml";

/// The contents of a `blog.yaml` project file. Every field is optional and
/// relative paths are resolved against the directory holding the file.
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Project {
    content_directory: Option<PathBuf>,
    templates_directory: Option<PathBuf>,
    static_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    /// Listed relative to the project root, like every other path here.
    template_partials: Vec<PathBuf>,
}

/// The resolved locations of a blog's source and output directories.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The Markdown post sources (`content/`).
    pub content_directory: PathBuf,

    /// The theme: `post.html`, `index.html` and any partials
    /// (`templates/`).
    pub templates_directory: PathBuf,

    /// Files to be copied verbatim into `{output_directory}/static`
    /// (`static/`).
    pub static_directory: PathBuf,

    /// The generated site (`site/`). Deleted and rebuilt by every build.
    pub output_directory: PathBuf,

    /// Extra template files parsed ahead of each page template.
    pub template_partials: Vec<PathBuf>,
}

impl Config {
    /// The default layout rooted at `root`: `content/`, `templates/`,
    /// `static/` and `site/`.
    pub fn with_root(root: &Path) -> Config {
        Config {
            content_directory: root.join("content"),
            templates_directory: root.join("templates"),
            static_directory: root.join("static"),
            output_directory: root.join("site"),
            template_partials: Vec::new(),
        }
    }

    /// Looks for a [`PROJECT_FILE`] in `dir` and then in each of its parent
    /// directories. If none is found, the default layout rooted at `dir` is
    /// used.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for candidate in dir.ancestors() {
            let path = candidate.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path).map_err(|e| {
                    anyhow!("Loading configuration `{}`: {:?}", path.display(), e)
                });
            }
        }
        log::debug!(
            "No `{}` found; using the default layout in `{}`",
            PROJECT_FILE,
            dir.display()
        );
        Ok(Config::with_root(dir))
    }

    /// Loads the configuration from a project file; the project root is the
    /// file's parent directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        use crate::util::read_file;
        let root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        let contents = read_file(path, "project")?;
        // An empty project file is valid and means "all defaults".
        let project: Project = match contents.trim().is_empty() {
            true => Project::default(),
            false => serde_yaml::from_str(&contents)?,
        };

        let defaults = Config::with_root(root);
        let resolve = |dir: Option<PathBuf>, default: PathBuf| match dir {
            Some(dir) => root.join(dir),
            None => default,
        };
        Ok(Config {
            content_directory: resolve(project.content_directory, defaults.content_directory),
            templates_directory: resolve(
                project.templates_directory,
                defaults.templates_directory,
            ),
            static_directory: resolve(project.static_directory, defaults.static_directory),
            output_directory: resolve(project.output_directory, defaults.output_directory),
            template_partials: project
                .template_partials
                .iter()
                .map(|relpath| root.join(relpath))
                .collect(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_layout_without_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(Config::with_root(dir.path()), config);
        assert_eq!(dir.path().join("site"), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_project_file_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "content_directory: posts\noutput_directory: public\ntemplate_partials: [templates/base.html]\n",
        )?;
        let nested = dir.path().join("posts").join("drafts");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("posts"), config.content_directory);
        assert_eq!(dir.path().join("public"), config.output_directory);
        assert_eq!(dir.path().join("templates"), config.templates_directory);
        assert_eq!(
            vec![dir.path().join("templates").join("base.html")],
            config.template_partials
        );
        Ok(())
    }

    #[test]
    fn test_empty_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "")?;
        assert_eq!(
            Config::with_root(dir.path()),
            Config::from_directory(dir.path())?
        );
        Ok(())
    }

    #[test]
    fn test_unknown_project_keys_are_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "posts_per_page: 10\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }
}
