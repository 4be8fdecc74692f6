use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use serde_json::Value;
use tera::{Context, Tera};

#[derive(Debug)]
pub enum TemplateError {
    Io(std::io::Error),
    Tera(tera::Error),
    PartialNotFound(String),
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Io(err)
    }
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::Tera(err)
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Io(e) => write!(f, "IO error: {}", e),
            TemplateError::Tera(e) => {
                // Surface the cause chain; tera's top-level message is just
                // "Failed to render '<name>'".
                write!(f, "Template error: {}", e)?;
                let mut source = std::error::Error::source(e);
                while let Some(cause) = source {
                    write!(f, ": {}", cause)?;
                    source = cause.source();
                }
                Ok(())
            }
            TemplateError::PartialNotFound(name) => write!(f, "Partial not found: {}", name),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Compiles and renders template files, caching each compiled template by
/// (path, mtime) so edits invalidate the cache automatically.
///
/// Rendering exposes a `render(partial="name", ...)` function to templates
/// that renders `_<name>.html.erb` with the calling context merged under any
/// extra keyword arguments.
pub struct TemplateEngine {
    templates_dir: PathBuf,
    cache: Mutex<HashMap<(PathBuf, SystemTime), Tera>>,
}

impl TemplateEngine {
    pub fn new<P: AsRef<Path>>(templates_dir: P) -> Self {
        Self {
            templates_dir: templates_dir.as_ref().to_path_buf(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Render the template file at `path` with the given context. Undefined
    /// context keys referenced by the template are render errors.
    pub fn render_file(
        self: &Arc<Self>,
        path: &Path,
        context: &Context,
    ) -> Result<String, TemplateError> {
        let mut tera = self.compiled(path)?;
        tera.register_function(
            "render",
            PartialFunction {
                engine: Arc::clone(self),
                base: context.clone().into_json(),
            },
        );
        Ok(tera.render(&template_name(path), context)?)
    }

    /// Render the partial `_<name>.html.erb` with the supplied context.
    pub fn render_partial(
        self: &Arc<Self>,
        name: &str,
        context: &Context,
    ) -> Result<String, TemplateError> {
        let path = self.templates_dir.join(format!("_{name}.html.erb"));
        if !path.exists() {
            return Err(TemplateError::PartialNotFound(name.to_string()));
        }
        self.render_file(&path, context)
    }

    /// Number of distinct (path, mtime) entries compiled so far.
    pub fn cached_templates(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Look up the compiled template for `path`, compiling on a cache miss.
    /// Concurrent misses may compile redundantly; last insert wins, and the
    /// output is identical either way.
    fn compiled(&self, path: &Path) -> Result<Tera, TemplateError> {
        let mtime = std::fs::metadata(path)?.modified()?;
        let key = (path.to_path_buf(), mtime);

        if let Some(tera) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(tera.clone());
        }

        let source = std::fs::read_to_string(path)?;
        let mut tera = Tera::default();
        // The .html.erb convention implies raw interpolation: `content`
        // carries rendered HTML and templates are trusted site-local files.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(&template_name(path), &source)?;

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, tera.clone());
        Ok(tera)
    }
}

fn template_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The `render(partial="name", ...)` template function. Extra keyword
/// arguments override keys of the calling context for the partial render.
struct PartialFunction {
    engine: Arc<TemplateEngine>,
    base: Value,
}

impl tera::Function for PartialFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let Some(name) = args.get("partial").and_then(Value::as_str) else {
            return Err(tera::Error::msg(
                "render() requires a string `partial` argument",
            ));
        };

        let mut merged = match &self.base {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        for (key, value) in args {
            if key != "partial" {
                merged.insert(key.clone(), value.clone());
            }
        }

        let context = Context::from_value(Value::Object(merged))?;
        self.engine
            .render_partial(name, &context)
            .map(Value::String)
            .map_err(|e| tera::Error::msg(e.to_string()))
    }
}
