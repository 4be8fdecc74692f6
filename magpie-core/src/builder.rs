use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::feed::{self, FeedGenerator};
use crate::files::{AssetFile, ContentFile};
use crate::project::Project;
use crate::renderer::{RenderError, Renderer};
use crate::scanner::Scanner;
use crate::sitemap::SitemapGenerator;

/// A failure that aborts the whole build (output directory handling). Per-file
/// failures never take this path; they are recorded in [`BuildStats`].
#[derive(Debug)]
pub enum BuildError {
    Io(std::io::Error),
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

/// Why a single file failed to build.
#[derive(Debug)]
pub enum BuildErrorKind {
    /// The content type has no `{type}.html.erb` template.
    MissingTemplate(String),
    Render(RenderError),
    Io(std::io::Error),
}

/// A per-file failure, tagged with the originating source path.
#[derive(Debug)]
pub struct BuildFailure {
    pub file: PathBuf,
    pub error: BuildErrorKind,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            BuildErrorKind::MissingTemplate(template) => {
                write!(f, "Missing template '{}' for {}", template, self.file.display())
            }
            BuildErrorKind::Render(e) => write!(f, "{}: {}", self.file.display(), e),
            BuildErrorKind::Io(e) => write!(f, "{}: IO error: {}", self.file.display(), e),
        }
    }
}

/// Accumulated results of one build invocation.
#[derive(Debug, Default)]
pub struct BuildStats {
    pub files_built: usize,
    pub files_skipped: usize,
    pub assets_copied: usize,
    pub assets_skipped: usize,
    pub errors: Vec<BuildFailure>,
    pub total_time: Duration,
}

impl BuildStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_files(&self) -> usize {
        self.files_built + self.files_skipped
    }

    pub fn total_assets(&self) -> usize {
        self.assets_copied + self.assets_skipped
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

enum ContentOutcome {
    Built,
    Skipped,
    Failed(BuildFailure),
}

enum AssetOutcome {
    Copied,
    Skipped,
    Failed(BuildFailure),
}

/// Orchestrates a build: staleness check per file, parallel rendering and
/// copying, error aggregation, derived outputs.
pub struct Builder {
    project: Project,
    clean: bool,
}

impl Builder {
    pub fn new(project: &Project) -> Self {
        Self {
            project: project.clone(),
            clean: false,
        }
    }

    /// Discard existing output and rebuild everything regardless of
    /// timestamps.
    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Run a full build. Content files and assets are processed as two
    /// concurrent parallel phases; each file is an independent unit of work
    /// whose failure is recorded without aborting its siblings.
    pub fn build(&self) -> Result<BuildStats, BuildError> {
        let started = Instant::now();
        let mut stats = BuildStats::new();

        if self.clean {
            self.clean_output()?;
        }
        std::fs::create_dir_all(self.project.output_dir())?;

        let scanner = Scanner::new(&self.project);
        let content = scanner.content_files();
        let assets = scanner.asset_files();
        let renderer = Renderer::new(&self.project, &content);

        let (content_outcomes, asset_outcomes) = rayon::join(
            || {
                content
                    .par_iter()
                    .map(|file| self.process_content(&renderer, file))
                    .collect::<Vec<_>>()
            },
            || {
                assets
                    .par_iter()
                    .map(|asset| self.process_asset(asset))
                    .collect::<Vec<_>>()
            },
        );

        for outcome in content_outcomes {
            match outcome {
                ContentOutcome::Built => stats.files_built += 1,
                ContentOutcome::Skipped => stats.files_skipped += 1,
                ContentOutcome::Failed(failure) => stats.errors.push(failure),
            }
        }
        for outcome in asset_outcomes {
            match outcome {
                AssetOutcome::Copied => stats.assets_copied += 1,
                AssetOutcome::Skipped => stats.assets_skipped += 1,
                AssetOutcome::Failed(failure) => stats.errors.push(failure),
            }
        }

        self.generate_derived_outputs(&content);

        stats.total_time = started.elapsed();
        Ok(stats)
    }

    /// Remove every entry directly under the output root. Does nothing when
    /// the output directory does not exist.
    pub fn clean_output(&self) -> std::io::Result<()> {
        let output_dir = self.project.output_dir();
        if !output_dir.is_dir() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&output_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(entry.path())?;
            } else {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn process_content(&self, renderer: &Renderer, file: &ContentFile) -> ContentOutcome {
        let template = self.project.template_path(file.type_name());
        if !template.exists() {
            return ContentOutcome::Failed(BuildFailure {
                file: file.path().to_path_buf(),
                error: BuildErrorKind::MissingTemplate(format!(
                    "{}.html.erb",
                    file.type_name()
                )),
            });
        }

        if !self.needs_rebuild(file) {
            return ContentOutcome::Skipped;
        }

        let html = match renderer.render_content(file) {
            Ok(html) => html,
            Err(e) => {
                return ContentOutcome::Failed(BuildFailure {
                    file: file.path().to_path_buf(),
                    error: BuildErrorKind::Render(e),
                });
            }
        };

        let output = self.project.output_dir().join(file.output_path());
        if let Err(e) = write_output(&output, &html) {
            return ContentOutcome::Failed(BuildFailure {
                file: file.path().to_path_buf(),
                error: BuildErrorKind::Io(e),
            });
        }

        ContentOutcome::Built
    }

    fn process_asset(&self, asset: &AssetFile) -> AssetOutcome {
        if !self.needs_asset_copy(asset) {
            return AssetOutcome::Skipped;
        }

        match asset.copy_to(&self.project.output_dir()) {
            Ok(()) => AssetOutcome::Copied,
            Err(e) => AssetOutcome::Failed(BuildFailure {
                file: asset.path().to_path_buf(),
                error: BuildErrorKind::Io(e),
            }),
        }
    }

    /// A content file is stale when its output is missing or strictly older
    /// than the source, its resolved template, or the layout. Equal
    /// timestamps count as fresh; the same rule applies to assets.
    fn needs_rebuild(&self, file: &ContentFile) -> bool {
        if self.clean {
            return true;
        }

        let output = self.project.output_dir().join(file.output_path());
        let Ok(output_mtime) = mtime_of(&output) else {
            return true;
        };

        if file.mtime() > output_mtime {
            return true;
        }

        if let Ok(template_mtime) = mtime_of(&self.project.template_path(file.type_name())) {
            if template_mtime > output_mtime {
                return true;
            }
        }

        if let Ok(layout_mtime) = mtime_of(&self.project.layout_path()) {
            if layout_mtime > output_mtime {
                return true;
            }
        }

        false
    }

    fn needs_asset_copy(&self, asset: &AssetFile) -> bool {
        if self.clean {
            return true;
        }

        let output = self.project.output_dir().join(asset.output_path());
        let Ok(output_mtime) = mtime_of(&output) else {
            return true;
        };

        match asset.mtime() {
            Ok(source_mtime) => source_mtime > output_mtime,
            Err(_) => true,
        }
    }

    /// Feeds (only when feed-typed content exists) and the sitemap (always).
    /// Failures here are warnings, never build errors.
    fn generate_derived_outputs(&self, content: &[ContentFile]) {
        let has_posts = content
            .iter()
            .any(|f| feed::FEED_TYPES.contains(&f.type_name()));

        if has_posts {
            let feeds = FeedGenerator::new(&self.project);
            if let Err(e) = feeds.generate_rss(content) {
                eprintln!("Warning: failed to generate RSS feed: {}", e);
            }
            if let Err(e) = feeds.generate_atom(content) {
                eprintln!("Warning: failed to generate Atom feed: {}", e);
            }
        }

        if let Err(e) = SitemapGenerator::new(&self.project).generate(content) {
            eprintln!("Warning: failed to generate sitemap: {}", e);
        }
    }
}

fn write_output(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
}

fn mtime_of(path: &Path) -> std::io::Result<std::time::SystemTime> {
    std::fs::metadata(path)?.modified()
}
