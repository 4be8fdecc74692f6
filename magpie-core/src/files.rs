use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::date::Date;
use crate::markdown;

/// A markdown content file named `[YYYY-MM-DD-]<name>.<type>.md`.
///
/// Every derived attribute is computed once at construction from the path, the
/// raw content, and the modification time; instances are immutable and
/// discarded after a build pass.
#[derive(Debug, Clone)]
pub struct ContentFile {
    path: PathBuf,
    relative_path: PathBuf,
    type_name: String,
    name: String,
    date: Date,
    slug: String,
    output_path: PathBuf,
    title: String,
    excerpt: String,
    reading_time: u32,
    content: String,
    mtime: SystemTime,
}

impl ContentFile {
    /// Read a content file and derive its attributes. `src_root` is the
    /// content root the output path is computed relative to.
    pub fn load(path: &Path, src_root: &Path) -> io::Result<Self> {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (type_name, base) = parse_content_name(&basename).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a content file name: {basename}"),
            )
        })?;

        let content = std::fs::read_to_string(path)?;
        let mtime = std::fs::metadata(path)?.modified()?;

        let (date_prefix, name) = split_date_prefix(&base);
        let date = date_prefix.unwrap_or_else(|| Date::from_system_time(mtime));
        let slug = name.replace('_', "-");

        let relative_path = path
            .strip_prefix(src_root)
            .unwrap_or(path)
            .to_path_buf();
        let output_path = relative_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("{name}.html"));

        let title =
            markdown::first_heading(&content).unwrap_or_else(|| humanize(&name));
        let excerpt = extract_excerpt(&content);
        let reading_time = reading_time(&content);

        Ok(Self {
            path: path.to_path_buf(),
            relative_path,
            type_name,
            name,
            date,
            slug,
            output_path,
            title,
            excerpt,
            reading_time,
            content,
            mtime,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the content root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Content type from the second-to-last dot-segment of the filename.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Basename without the `.{type}.md` suffix and any date prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Date from the filename prefix, falling back to the mtime day.
    pub fn date(&self) -> Date {
        self.date
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Output path relative to the output root.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    /// Estimated reading time in minutes (200 words per minute, minimum 1).
    pub fn reading_time(&self) -> u32 {
        self.reading_time
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// The metadata record exposed to templates.
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            title: self.title.clone(),
            date: self.date,
            type_name: self.type_name.clone(),
            slug: self.slug.clone(),
            path: self.output_path.to_string_lossy().into_owned(),
            excerpt: self.excerpt.clone(),
            reading_time: self.reading_time,
        }
    }
}

/// Serializable page metadata, used for the `all_posts` and `all_pages`
/// template collections.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub date: Date,
    #[serde(rename = "type")]
    pub type_name: String,
    pub slug: String,
    pub path: String,
    pub excerpt: String,
    pub reading_time: u32,
}

/// A template file named `<type>.html.erb`. Content is read on demand; the
/// renderer caches compiled templates keyed on path and mtime.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
    type_name: String,
}

impl TemplateFile {
    pub fn new(path: &Path) -> Self {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Partials keep their leading underscore as part of the type.
        let type_name = basename
            .strip_suffix(".html.erb")
            .unwrap_or(&basename)
            .to_string();

        Self {
            path: path.to_path_buf(),
            type_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn content(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// A static asset, copied into the output tree verbatim.
#[derive(Debug, Clone)]
pub struct AssetFile {
    path: PathBuf,
    output_path: PathBuf,
}

impl AssetFile {
    pub fn new(path: &Path, assets_root: &Path) -> Self {
        let output_path = path
            .strip_prefix(assets_root)
            .unwrap_or(path)
            .to_path_buf();

        Self {
            path: path.to_path_buf(),
            output_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output path relative to the output root, mirroring the asset tree.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn mtime(&self) -> io::Result<SystemTime> {
        std::fs::metadata(&self.path)?.modified()
    }

    /// Copy the asset under `output_root`, creating parent directories.
    pub fn copy_to(&self, output_root: &Path) -> io::Result<()> {
        let target = output_root.join(&self.output_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&self.path, &target)?;
        Ok(())
    }
}

/// Split a content basename into (type, base-without-type-suffix). Requires at
/// least three dot-segments, e.g. `name.type.md`.
pub(crate) fn parse_content_name(basename: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = basename.split('.').collect();
    if parts.len() < 3 || *parts.last()? != "md" {
        return None;
    }

    let type_name = parts[parts.len() - 2].to_string();
    let base = parts[..parts.len() - 2].join(".");
    Some((type_name, base))
}

/// Split a leading `YYYY-MM-DD-` prefix off a name. The prefix is stripped
/// whenever it has the right shape; it only becomes the date when it parses as
/// an in-range calendar day.
fn split_date_prefix(base: &str) -> (Option<Date>, String) {
    if has_date_prefix_shape(base) {
        (Date::parse(&base[..10]), base[11..].to_string())
    } else {
        (None, base.to_string())
    }
}

fn has_date_prefix_shape(base: &str) -> bool {
    let bytes = base.as_bytes();
    bytes.len() > 11
        && bytes[..11]
            .iter()
            .enumerate()
            .all(|(i, b)| match i {
                4 | 7 | 10 => *b == b'-',
                _ => b.is_ascii_digit(),
            })
}

/// Fallback title: `-`/`_` become spaces, first letter capitalized.
fn humanize(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// First blank-line-delimited paragraph after the title heading, capped at 150
/// words with a trailing ellipsis marker only when words were dropped.
fn extract_excerpt(content: &str) -> String {
    let body = strip_first_h1(content);
    let first_para = body.trim().split("\n\n").next().unwrap_or("");

    let words: Vec<&str> = first_para.split_whitespace().collect();
    if words.len() > 150 {
        let mut excerpt = words[..150].join(" ");
        excerpt.push_str("...");
        excerpt
    } else {
        words.join(" ")
    }
}

fn strip_first_h1(content: &str) -> String {
    let mut removed = false;
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| {
            if !removed && line.starts_with("# ") {
                removed = true;
                false
            } else {
                true
            }
        })
        .collect();
    lines.join("\n")
}

fn reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count() as u32;
    words.div_ceil(200).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_content(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn load(root: &Path, rel: &str, content: &str) -> ContentFile {
        let path = write_content(root, rel, content);
        ContentFile::load(&path, root).unwrap()
    }

    #[test]
    fn extracts_type_from_double_extension() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "hello.blog.md", "# Hello");
        assert_eq!(file.type_name(), "blog");

        let file = load(tmp.path(), "about.page.md", "# About");
        assert_eq!(file.type_name(), "page");
    }

    #[test]
    fn rejects_single_extension_names() {
        let tmp = TempDir::new().unwrap();
        let path = write_content(tmp.path(), "README.md", "# Readme");
        assert!(ContentFile::load(&path, tmp.path()).is_err());
    }

    #[test]
    fn name_strips_date_prefix() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "2026-01-06-hello.blog.md", "# Hello");
        assert_eq!(file.name(), "hello");

        let file = load(tmp.path(), "about.page.md", "# About");
        assert_eq!(file.name(), "about");
    }

    #[test]
    fn name_handles_nested_paths() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "blog/first-post.blog.md", "# Post");
        assert_eq!(file.name(), "first-post");
    }

    #[test]
    fn date_from_filename_prefix() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "2026-01-06-hello.blog.md", "# Hello");
        assert_eq!(file.date(), Date::new(2026, 1, 6));
    }

    #[test]
    fn date_falls_back_to_mtime() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "about.page.md", "# About");
        assert_eq!(file.date(), Date::from_system_time(file.mtime()));
    }

    #[test]
    fn out_of_range_prefix_is_stripped_but_not_a_date() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "2026-99-99-hello.blog.md", "# Hello");
        assert_eq!(file.name(), "hello");
        assert_eq!(file.date(), Date::from_system_time(file.mtime()));
    }

    #[test]
    fn slug_converts_underscores() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "hello_world.blog.md", "# Hello");
        assert_eq!(file.slug(), "hello-world");

        let file = load(tmp.path(), "first-post.blog.md", "# Post");
        assert_eq!(file.slug(), "first-post");
    }

    #[test]
    fn output_path_for_root_file() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "index.page.md", "# Home");
        assert_eq!(file.output_path(), Path::new("index.html"));
    }

    #[test]
    fn output_path_preserves_directories() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "blog/first-post.blog.md", "# Post");
        assert_eq!(file.output_path(), Path::new("blog/first-post.html"));
    }

    #[test]
    fn output_path_drops_date_prefix() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "2026-01-06-hello.blog.md", "# Hello");
        assert_eq!(file.output_path(), Path::new("hello.html"));
    }

    #[test]
    fn title_from_first_heading() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "test.page.md", "# My Title\n\nBody.");
        assert_eq!(file.title(), "My Title");
    }

    #[test]
    fn title_falls_back_to_humanized_name() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "my-first_post.page.md", "No heading here.");
        assert_eq!(file.title(), "My first post");
    }

    #[test]
    fn excerpt_takes_first_paragraph() {
        let tmp = TempDir::new().unwrap();
        let file = load(
            tmp.path(),
            "test.page.md",
            "# Title\n\nFirst paragraph text.\n\nSecond paragraph.",
        );
        assert_eq!(file.excerpt(), "First paragraph text.");
    }

    #[test]
    fn excerpt_truncates_past_150_words() {
        let tmp = TempDir::new().unwrap();
        let long: String = (0..151).map(|i| format!("w{i} ")).collect();
        let file = load(
            tmp.path(),
            "long.page.md",
            &format!("# Title\n\n{}", long.trim()),
        );

        assert!(file.excerpt().ends_with("..."));
        assert_eq!(file.excerpt().split_whitespace().count(), 150);
        assert!(!file.excerpt().contains("w150"));
    }

    #[test]
    fn excerpt_keeps_150_words_unmarked() {
        let tmp = TempDir::new().unwrap();
        let exact: String = (0..150)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let file = load(tmp.path(), "exact.page.md", &format!("# Title\n\n{exact}"));

        assert!(!file.excerpt().ends_with("..."));
        assert_eq!(file.excerpt().split_whitespace().count(), 150);
    }

    #[test]
    fn reading_time_has_a_floor_of_one() {
        let tmp = TempDir::new().unwrap();
        let file = load(tmp.path(), "short.page.md", "# Hi");
        assert_eq!(file.reading_time(), 1);
    }

    #[test]
    fn reading_time_rounds_up() {
        let tmp = TempDir::new().unwrap();
        let body: String = vec!["word"; 250].join(" ");
        let file = load(tmp.path(), "long.page.md", &body);
        assert_eq!(file.reading_time(), 2);
    }

    #[test]
    fn content_and_relative_path() {
        let tmp = TempDir::new().unwrap();
        let body = "# Hello World\n\nThis is a test.";
        let file = load(tmp.path(), "blog/post.blog.md", body);
        assert_eq!(file.content(), body);
        assert_eq!(file.relative_path(), Path::new("blog/post.blog.md"));
    }

    #[test]
    fn template_type_strips_extension() {
        assert_eq!(
            TemplateFile::new(Path::new("/t/blog.html.erb")).type_name(),
            "blog"
        );
        assert_eq!(
            TemplateFile::new(Path::new("/t/layout.html.erb")).type_name(),
            "layout"
        );
        // Partials keep the underscore.
        assert_eq!(
            TemplateFile::new(Path::new("/t/_nav.html.erb")).type_name(),
            "_nav"
        );
    }

    #[test]
    fn template_content_reads_on_demand() {
        let tmp = TempDir::new().unwrap();
        let body = "<article>{{ content }}</article>";
        let path = write_content(tmp.path(), "post.html.erb", body);

        let template = TemplateFile::new(&path);
        assert_eq!(template.content().unwrap(), body);
    }

    #[test]
    fn asset_output_path_mirrors_tree() {
        let asset = AssetFile::new(
            Path::new("/site/assets/images/logo.png"),
            Path::new("/site/assets"),
        );
        assert_eq!(asset.output_path(), Path::new("images/logo.png"));
    }

    #[test]
    fn asset_copy_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        let out = tmp.path().join("public");
        let src = write_content(&assets, "images/logo.png", "PNG");

        let asset = AssetFile::new(&src, &assets);
        asset.copy_to(&out).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.join("images/logo.png")).unwrap(),
            "PNG"
        );
    }
}
