//! Core build engine for magpie, a convention-based static site generator.
//!
//! A project is a fixed directory layout (`site/src`, `site/templates`,
//! `site/assets`, `public`) — no configuration file. The [`Scanner`] discovers
//! typed files, the [`Renderer`] turns markdown content into HTML through a
//! page template and shared layout, and the [`Builder`] orchestrates
//! incremental parallel builds, recording per-file outcomes in [`BuildStats`].

pub mod builder;
pub mod date;
pub mod feed;
pub mod files;
pub mod markdown;
pub mod project;
pub mod renderer;
pub mod scanner;
pub mod sitemap;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export main types
pub use builder::{BuildError, BuildErrorKind, BuildFailure, BuildStats, Builder};
pub use date::Date;
pub use feed::FeedGenerator;
pub use files::{AssetFile, ContentFile, PageMeta, TemplateFile};
pub use project::Project;
pub use renderer::{RenderError, Renderer};
pub use scanner::{Scanner, SiteFile};
pub use sitemap::SitemapGenerator;
pub use template::{TemplateEngine, TemplateError};
