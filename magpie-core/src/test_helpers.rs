//! Shared helpers for building scratch sites in tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::project::Project;

/// A temporary project named `test-site.site` with the standard directory
/// tree already created. The tempdir is removed on drop.
pub struct TestSite {
    _tmp: TempDir,
    project: Project,
}

impl TestSite {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("test-site.site");
        let project = Project::new(&root);
        project.create().unwrap();
        Self { _tmp: tmp, project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Write a content file under `site/src/`, creating parent directories.
    pub fn content(&self, rel: &str, body: &str) -> PathBuf {
        write_file(&self.project.src_dir().join(rel), body)
    }

    /// Write a template under `site/templates/`.
    pub fn template(&self, rel: &str, body: &str) -> PathBuf {
        write_file(&self.project.templates_dir().join(rel), body)
    }

    /// Write an asset under `site/assets/`.
    pub fn asset(&self, rel: &str, body: &str) -> PathBuf {
        write_file(&self.project.assets_dir().join(rel), body)
    }

    /// Path of a generated file under `public/`.
    pub fn output(&self, rel: &str) -> PathBuf {
        self.project.output_dir().join(rel)
    }
}

fn write_file(path: &Path, body: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, body).unwrap();
    path.to_path_buf()
}
