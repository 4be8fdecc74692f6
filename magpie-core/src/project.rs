use std::io;
use std::path::{Path, PathBuf};

/// The fixed directory convention every magpie project follows:
///
/// ```text
/// my-site.site/
/// ├── site/
/// │   ├── src/           # Content files (*.*.md)
/// │   ├── templates/     # Templates (*.html.erb)
/// │   └── assets/        # Static assets (images, CSS, JS)
/// └── public/            # Generated output
/// ```
///
/// The layout is the only configuration surface; there is no config file.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `site/` directory containing all source files.
    pub fn site_dir(&self) -> PathBuf {
        self.root.join("site")
    }

    /// Content source directory, `site/src/`.
    pub fn src_dir(&self) -> PathBuf {
        self.site_dir().join("src")
    }

    /// Template directory, `site/templates/`.
    pub fn templates_dir(&self) -> PathBuf {
        self.site_dir().join("templates")
    }

    /// Static asset directory, `site/assets/`.
    pub fn assets_dir(&self) -> PathBuf {
        self.site_dir().join("assets")
    }

    /// Output directory for the generated site, `public/`.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    /// Path of the primary template for a content type.
    pub fn template_path(&self, type_name: &str) -> PathBuf {
        self.templates_dir().join(format!("{type_name}.html.erb"))
    }

    /// Path of the shared layout template.
    pub fn layout_path(&self) -> PathBuf {
        self.templates_dir().join("layout.html.erb")
    }

    /// Path of a named partial template.
    pub fn partial_path(&self, name: &str) -> PathBuf {
        self.templates_dir().join(format!("_{name}.html.erb"))
    }

    /// A project exists iff its `site/` directory is present.
    pub fn exists(&self) -> bool {
        self.site_dir().is_dir()
    }

    /// Create the standard directory structure.
    pub fn create(&self) -> io::Result<()> {
        for dir in [
            self.src_dir(),
            self.templates_dir(),
            self.assets_dir(),
            self.output_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn derives_standard_paths() {
        let project = Project::new("/tmp/my-blog.site");
        assert_eq!(project.site_dir(), PathBuf::from("/tmp/my-blog.site/site"));
        assert_eq!(
            project.src_dir(),
            PathBuf::from("/tmp/my-blog.site/site/src")
        );
        assert_eq!(
            project.templates_dir(),
            PathBuf::from("/tmp/my-blog.site/site/templates")
        );
        assert_eq!(
            project.assets_dir(),
            PathBuf::from("/tmp/my-blog.site/site/assets")
        );
        assert_eq!(
            project.output_dir(),
            PathBuf::from("/tmp/my-blog.site/public")
        );
    }

    #[test]
    fn template_path_helpers() {
        let project = Project::new("/tmp/x.site");
        assert_eq!(
            project.template_path("blog"),
            PathBuf::from("/tmp/x.site/site/templates/blog.html.erb")
        );
        assert_eq!(
            project.layout_path(),
            PathBuf::from("/tmp/x.site/site/templates/layout.html.erb")
        );
        assert_eq!(
            project.partial_path("nav"),
            PathBuf::from("/tmp/x.site/site/templates/_nav.html.erb")
        );
    }

    #[test]
    fn exists_requires_site_dir() {
        let tmp = TempDir::new().unwrap();
        let project = Project::new(tmp.path());
        assert!(!project.exists());

        project.create().unwrap();
        assert!(project.exists());
    }

    #[test]
    fn create_builds_full_tree() {
        let tmp = TempDir::new().unwrap();
        let project = Project::new(tmp.path());
        project.create().unwrap();

        assert!(project.src_dir().is_dir());
        assert!(project.templates_dir().is_dir());
        assert!(project.assets_dir().is_dir());
        assert!(project.output_dir().is_dir());
    }
}
