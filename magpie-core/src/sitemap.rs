use std::fmt::Write as _;
use std::io;

use crate::feed::{FEED_TYPES, escape_xml, site_url};
use crate::files::ContentFile;
use crate::project::Project;

/// Generates `sitemap.xml` over every content file.
pub struct SitemapGenerator {
    project: Project,
}

impl SitemapGenerator {
    pub fn new(project: &Project) -> Self {
        Self {
            project: project.clone(),
        }
    }

    pub fn generate(&self, content: &[ContentFile]) -> io::Result<()> {
        let url = site_url();

        let mut entries = String::new();
        for file in content {
            let path = file.output_path().to_string_lossy();
            let _ = write!(
                entries,
                "  <url>\n    <loc>{}/{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
                url,
                escape_xml(&path),
                file.date().to_iso8601(),
                changefreq(file.type_name()),
                priority(file.type_name(), &path),
            );
        }

        let sitemap = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
            entries,
        );

        std::fs::write(self.project.output_dir().join("sitemap.xml"), sitemap)
    }
}

fn priority(type_name: &str, path: &str) -> &'static str {
    if path == "index.html" {
        "1.0"
    } else if type_name == "page" {
        "0.8"
    } else if FEED_TYPES.contains(&type_name) {
        "0.6"
    } else {
        "0.5"
    }
}

fn changefreq(type_name: &str) -> &'static str {
    if FEED_TYPES.contains(&type_name) {
        "daily"
    } else if type_name == "page" {
        "weekly"
    } else {
        "monthly"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestSite;

    fn load(site: &TestSite, rel: &str, body: &str) -> ContentFile {
        let path = site.content(rel, body);
        ContentFile::load(&path, &site.project().src_dir()).unwrap()
    }

    #[test]
    fn lists_every_content_file() {
        let site = TestSite::new();
        let content = vec![
            load(&site, "index.page.md", "# Home"),
            load(&site, "2026-01-06-hello.blog.md", "# Hello"),
        ];

        SitemapGenerator::new(site.project())
            .generate(&content)
            .unwrap();

        let sitemap = std::fs::read_to_string(site.output("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<urlset"));
        assert!(sitemap.contains("/index.html</loc>"));
        assert!(sitemap.contains("/hello.html</loc>"));
        assert!(sitemap.contains("<lastmod>2026-01-06T00:00:00Z</lastmod>"));
    }

    #[test]
    fn ranks_index_pages_and_posts() {
        let site = TestSite::new();
        let content = vec![
            load(&site, "index.page.md", "# Home"),
            load(&site, "about.page.md", "# About"),
            load(&site, "post.blog.md", "# Post"),
            load(&site, "misc.note.md", "# Note"),
        ];

        SitemapGenerator::new(site.project())
            .generate(&content)
            .unwrap();

        let sitemap = std::fs::read_to_string(site.output("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<priority>1.0</priority>"));
        assert!(sitemap.contains("<priority>0.8</priority>"));
        assert!(sitemap.contains("<priority>0.6</priority>"));
        assert!(sitemap.contains("<priority>0.5</priority>"));
        assert!(sitemap.contains("<changefreq>daily</changefreq>"));
        assert!(sitemap.contains("<changefreq>weekly</changefreq>"));
        assert!(sitemap.contains("<changefreq>monthly</changefreq>"));
    }
}
