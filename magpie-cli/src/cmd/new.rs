use std::path::Path;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use magpie_core::Project;

const LAYOUT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{ title }} - {{ site_name }}</title>
  <style>
    body { max-width: 800px; margin: 0 auto; padding: 2rem; font-family: system-ui; line-height: 1.6; }
    nav { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid #ddd; }
    nav a { margin-right: 1rem; text-decoration: none; }
  </style>
</head>
<body>
  {{ render(partial="nav") }}
  {{ content }}
</body>
</html>
"#;

const NAV_PARTIAL: &str = r#"<nav>
  <a href="/">Home</a>
  <a href="/blog">Blog</a>
</nav>
"#;

const PAGE_TEMPLATE: &str = r#"<main>
  {{ content }}
</main>
"#;

const BLOG_TEMPLATE: &str = r#"<article>
  <header>
    <h1>{{ title }}</h1>
    <time datetime="{{ date }}">{{ date }}</time>
    <p>{{ reading_time }} min read</p>
  </header>
  {{ content }}
</article>
"#;

const INDEX_PAGE: &str = r#"# Welcome to Magpie

This is your new static site.

## Getting Started

Edit this file at `site/src/index.page.md` and run `magpie build` to see your changes.
"#;

const FIRST_POST: &str = r#"# Hello World

Welcome to your first blog post! This post demonstrates:

- Automatic date extraction from filename
- Title extraction from the first H1
- Folder structure preservation

Edit this file at `site/src/blog/2026-01-06-hello-world.blog.md`
"#;

const GITIGNORE: &str = "public/\n.DS_Store\n";

pub fn make_subcommand() -> Command {
    Command::new("new")
        .about("Create a new site project")
        .arg(
            Arg::new("name")
                .value_name("NAME")
                .help("Name of the site (a .site suffix is added if missing)")
                .required(true),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let name = args.get_one::<String>("name").expect("required argument");
    let site_dir = if name.ends_with(".site") {
        name.clone()
    } else {
        format!("{name}.site")
    };

    if Path::new(&site_dir).exists() {
        eprintln!("✗ Directory {site_dir} already exists");
        std::process::exit(1);
    }

    println!("Creating new site: {name}");
    let project = Project::new(&site_dir);
    project.create()?;

    write(&project.layout_path(), LAYOUT_TEMPLATE)?;
    write(&project.partial_path("nav"), NAV_PARTIAL)?;
    write(&project.template_path("page"), PAGE_TEMPLATE)?;
    write(&project.template_path("blog"), BLOG_TEMPLATE)?;
    println!("✓ Created starter templates");

    write(&project.src_dir().join("index.page.md"), INDEX_PAGE)?;
    write(
        &project
            .src_dir()
            .join("blog/2026-01-06-hello-world.blog.md"),
        FIRST_POST,
    )?;
    println!("✓ Created example content");

    write(&project.root().join(".gitignore"), GITIGNORE)?;
    println!("✓ Site created at {site_dir}");

    println!();
    println!("Next steps:");
    println!("  cd {site_dir}");
    println!("  magpie serve");

    Ok(())
}

fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
