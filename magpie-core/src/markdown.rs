use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const SYNTAX_THEME: &str = "base16-ocean.dark";

/// Render GitHub-flavored markdown to HTML.
///
/// Fenced code blocks with a known language are syntax-highlighted and wrapped
/// in a `highlight`-classed element; everything else falls back to an escaped
/// `<pre><code>` block.
pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new_ext(content, Options::all());
    let events: Vec<Event> = parser.collect();
    let mut processed = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                // Collect all text events until the end of the code block
                let mut code = String::new();
                i += 1;

                while i < events.len() {
                    match &events[i] {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(text),
                        _ => {}
                    }
                    i += 1;
                }

                processed.push(Event::Html(highlight_code(&code, lang).into()));
            }
            _ => {
                processed.push(events[i].clone());
            }
        }
        i += 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, processed.into_iter());

    out
}

fn highlight_code(code: &str, lang: &str) -> String {
    let Some(syntax) = SYNTAX_SET.find_syntax_by_token(lang) else {
        return plain_code_block(code);
    };

    let theme = &THEME_SET.themes[SYNTAX_THEME];
    match highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme) {
        Ok(highlighted) => format!("<div class=\"highlight\">{highlighted}</div>"),
        Err(_) => plain_code_block(code),
    }
}

fn plain_code_block(code: &str) -> String {
    format!("<pre><code>{}</code></pre>", html_escape::encode_text(code))
}

/// Text of the first level-1 heading, if any.
pub fn first_heading(content: &str) -> Option<String> {
    let parser = Parser::new_ext(content, Options::all());

    let mut in_h1 = false;
    let mut text = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_h1 = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                return Some(text.trim().to_string());
            }
            Event::Text(t) | Event::Code(t) => {
                if in_h1 {
                    text.push_str(&t);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render_markdown("# Hello\n\nThis is **bold** text.");
        assert!(html.contains("<h1"));
        assert!(html.contains("Hello"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn highlights_fenced_code() {
        let html = render_markdown("```rust\nfn main() {}\n```");
        assert!(html.contains("class=\"highlight\""));
        assert!(html.contains("main"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_block() {
        let html = render_markdown("```no-such-lang\nx < y\n```");
        assert!(html.contains("<pre><code>"));
        assert!(html.contains("x &lt; y"));
        assert!(!html.contains("class=\"highlight\""));
    }

    #[test]
    fn renders_gfm_task_lists() {
        let html = render_markdown("- [ ] Task\n- [x] Done");
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn renders_gfm_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn extracts_first_h1() {
        assert_eq!(
            first_heading("# My Title\n\nBody text."),
            Some("My Title".to_string())
        );
    }

    #[test]
    fn skips_lower_level_headings() {
        assert_eq!(
            first_heading("## Section\n\n# Real Title"),
            Some("Real Title".to_string())
        );
    }

    #[test]
    fn no_heading_yields_none() {
        assert_eq!(first_heading("Just a paragraph."), None);
    }
}
