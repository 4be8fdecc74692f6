use std::fmt;
use std::sync::Arc;

use tera::Context;

use crate::files::{ContentFile, PageMeta};
use crate::markdown;
use crate::project::Project;
use crate::template::{TemplateEngine, TemplateError};

/// Content types collected into the `all_posts` template variable.
const POST_TYPES: &[&str] = &["blog", "post"];

#[derive(Debug)]
pub enum RenderError {
    TemplateNotFound(String),
    Template(TemplateError),
}

impl From<TemplateError> for RenderError {
    fn from(err: TemplateError) -> Self {
        RenderError::Template(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateNotFound(type_name) => {
                write!(f, "Template not found for type: {}", type_name)
            }
            RenderError::Template(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RenderError {}

/// Turns one content file into final HTML: markdown body → page template →
/// shared layout, all rendered against the same context.
pub struct Renderer {
    project: Project,
    engine: Arc<TemplateEngine>,
    site_name: String,
    all_posts: Vec<PageMeta>,
    all_pages: Vec<PageMeta>,
}

impl Renderer {
    /// Build a renderer over one scan's content list. The post and page
    /// collections exposed to templates are precomputed here.
    pub fn new(project: &Project, content: &[ContentFile]) -> Self {
        let mut all_posts: Vec<PageMeta> = content
            .iter()
            .filter(|f| POST_TYPES.contains(&f.type_name()))
            .map(ContentFile::meta)
            .collect();
        all_posts.sort_by(|a, b| b.date.cmp(&a.date));

        let mut all_pages: Vec<PageMeta> = content
            .iter()
            .filter(|f| f.type_name() == "page")
            .map(ContentFile::meta)
            .collect();
        all_pages.sort_by(|a, b| a.title.cmp(&b.title));

        Self {
            engine: Arc::new(TemplateEngine::new(project.templates_dir())),
            site_name: infer_site_name(project),
            project: project.clone(),
            all_posts,
            all_pages,
        }
    }

    /// Render a content file: resolve the `{type}.html.erb` template, render
    /// the markdown body, render the template with `content` set to the body
    /// HTML, then wrap the result in `layout.html.erb` when one exists.
    pub fn render_content(&self, file: &ContentFile) -> Result<String, RenderError> {
        let template = self.project.template_path(file.type_name());
        if !template.exists() {
            return Err(RenderError::TemplateNotFound(file.type_name().to_string()));
        }

        let body = markdown::render_markdown(file.content());
        let mut context = self.base_context(file);
        context.insert("content", &body);
        let html = self.engine.render_file(&template, &context)?;

        let layout = self.project.layout_path();
        if layout.exists() {
            let mut context = self.base_context(file);
            context.insert("content", &html);
            Ok(self.engine.render_file(&layout, &context)?)
        } else {
            Ok(html)
        }
    }

    /// Render the partial `_<name>.html.erb` with the supplied context.
    pub fn render_partial(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        self.engine.render_partial(name, context)
    }

    fn base_context(&self, file: &ContentFile) -> Context {
        let mut context = Context::new();
        context.insert("title", file.title());
        context.insert("date", &file.date());
        context.insert("type", file.type_name());
        context.insert("slug", file.slug());
        context.insert("path", &file.output_path().to_string_lossy());
        context.insert("excerpt", file.excerpt());
        context.insert("reading_time", &file.reading_time());
        context.insert("site_name", &self.site_name);
        context.insert("all_posts", &self.all_posts);
        context.insert("all_pages", &self.all_pages);
        context
    }
}

/// Infer a display name from the project root directory: strip a trailing
/// `.site` marker, turn hyphens into spaces, capitalize each word.
pub fn infer_site_name(project: &Project) -> String {
    let root = std::fs::canonicalize(project.root())
        .unwrap_or_else(|_| project.root().to_path_buf());
    let base = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    base.strip_suffix(".site")
        .unwrap_or(&base)
        .replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
