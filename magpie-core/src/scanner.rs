use walkdir::WalkDir;

use crate::files::{AssetFile, ContentFile, TemplateFile, parse_content_name};
use crate::project::Project;

/// Any discovered source file, as returned by [`Scanner::all_files`].
#[derive(Debug, Clone)]
pub enum SiteFile {
    Content(ContentFile),
    Template(TemplateFile),
    Asset(AssetFile),
}

/// Discovers content, template, and asset files under a project's fixed
/// subdirectories. A missing root directory yields an empty collection, not an
/// error.
pub struct Scanner {
    project: Project,
}

impl Scanner {
    pub fn new(project: &Project) -> Self {
        Self {
            project: project.clone(),
        }
    }

    /// All content files under `site/src/`, recursively. A file is content
    /// when its basename has at least three dot-segments ending in `.md`
    /// (`name.type.md`); dotfiles are skipped. Sorted by path so results are
    /// deterministic within a run.
    pub fn content_files(&self) -> Vec<ContentFile> {
        let root = self.project.src_dir();
        if !root.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<ContentFile> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path().is_file() && is_content_name(e.file_name().to_string_lossy().as_ref())
            })
            .filter_map(|e| ContentFile::load(e.path(), &root).ok())
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));
        files
    }

    /// All template files: direct children of `site/templates/` matching
    /// `*.html.erb`.
    pub fn template_files(&self) -> Vec<TemplateFile> {
        let root = self.project.templates_dir();
        let Ok(entries) = std::fs::read_dir(&root) else {
            return Vec::new();
        };

        let mut files: Vec<TemplateFile> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.to_string_lossy().ends_with(".html.erb"))
            .map(|p| TemplateFile::new(&p))
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));
        files
    }

    /// All asset files under `site/assets/`, recursively.
    pub fn asset_files(&self) -> Vec<AssetFile> {
        let root = self.project.assets_dir();
        if !root.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<AssetFile> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| AssetFile::new(e.path(), &root))
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));
        files
    }

    /// Every discovered file of all three kinds.
    pub fn all_files(&self) -> Vec<SiteFile> {
        let mut files: Vec<SiteFile> = Vec::new();
        files.extend(self.content_files().into_iter().map(SiteFile::Content));
        files.extend(self.template_files().into_iter().map(SiteFile::Template));
        files.extend(self.asset_files().into_iter().map(SiteFile::Asset));
        files
    }
}

fn is_content_name(name: &str) -> bool {
    !name.starts_with('.') && parse_content_name(name).is_some()
}
