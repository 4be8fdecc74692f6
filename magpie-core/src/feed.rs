use std::fmt::Write as _;
use std::io;

use crate::date::Date;
use crate::files::ContentFile;
use crate::project::Project;
use crate::renderer::infer_site_name;

/// Content types that show up in feeds (and gate feed generation).
pub(crate) const FEED_TYPES: &[&str] = &["blog", "post", "article", "news"];

/// Most recent posts included per feed.
const FEED_LIMIT: usize = 20;

/// Generates RSS 2.0 and Atom feeds over feed-typed content.
pub struct FeedGenerator {
    project: Project,
    site_name: String,
}

impl FeedGenerator {
    pub fn new(project: &Project) -> Self {
        Self {
            project: project.clone(),
            site_name: infer_site_name(project),
        }
    }

    /// Write `feed.xml` (RSS 2.0) to the output root.
    pub fn generate_rss(&self, content: &[ContentFile]) -> io::Result<()> {
        let posts = feed_posts(content);
        let url = site_url();

        let mut items = String::new();
        for post in &posts {
            let _ = write!(
                items,
                "    <item>\n      <title>{}</title>\n      <link>{}/{}</link>\n      <guid>{}/{}</guid>\n      <pubDate>{}</pubDate>\n      <description>{}</description>\n    </item>\n",
                escape_xml(post.title()),
                url,
                post.output_path().display(),
                url,
                post.output_path().display(),
                post.date().to_rfc822(),
                escape_xml(post.excerpt()),
            );
        }

        let rss = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>Latest posts from {}</description>\n    <language>en</language>\n    <atom:link href=\"{}/feed.xml\" rel=\"self\" type=\"application/rss+xml\" />\n{}  </channel>\n</rss>\n",
            escape_xml(&self.site_name),
            url,
            escape_xml(&self.site_name),
            url,
            items,
        );

        std::fs::write(self.project.output_dir().join("feed.xml"), rss)
    }

    /// Write `atom.xml` to the output root.
    pub fn generate_atom(&self, content: &[ContentFile]) -> io::Result<()> {
        let posts = feed_posts(content);
        let url = site_url();
        let updated = posts
            .first()
            .map(|p| p.date())
            .unwrap_or(Date::new(1970, 1, 1))
            .to_iso8601();

        let mut entries = String::new();
        for post in &posts {
            let _ = write!(
                entries,
                "  <entry>\n    <title>{}</title>\n    <link href=\"{}/{}\" />\n    <id>{}/{}</id>\n    <updated>{}</updated>\n    <summary>{}</summary>\n  </entry>\n",
                escape_xml(post.title()),
                url,
                post.output_path().display(),
                url,
                post.output_path().display(),
                post.date().to_iso8601(),
                escape_xml(post.excerpt()),
            );
        }

        let atom = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <title>{}</title>\n  <link href=\"{}\" />\n  <link href=\"{}/atom.xml\" rel=\"self\" />\n  <updated>{}</updated>\n  <id>{}/</id>\n  <author>\n    <name>{}</name>\n  </author>\n{}</feed>\n",
            escape_xml(&self.site_name),
            url,
            url,
            updated,
            url,
            escape_xml(&self.site_name),
            entries,
        );

        std::fs::write(self.project.output_dir().join("atom.xml"), atom)
    }
}

/// Feed-typed content, newest first, capped at [`FEED_LIMIT`].
fn feed_posts(content: &[ContentFile]) -> Vec<&ContentFile> {
    let mut posts: Vec<&ContentFile> = content
        .iter()
        .filter(|f| FEED_TYPES.contains(&f.type_name()))
        .collect();
    posts.sort_by(|a, b| b.date().cmp(&a.date()));
    posts.truncate(FEED_LIMIT);
    posts
}

/// Site URL for absolute links; overridable for deploys.
pub(crate) fn site_url() -> String {
    std::env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
