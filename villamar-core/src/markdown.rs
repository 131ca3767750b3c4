use std::path::Path;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

/// Render a markdown file (legal/informational prose) to HTML.
pub fn render_markdown_file(path: &Path) -> Result<String, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(render_markdown(&content))
}

pub fn render_markdown(content: &str) -> String {
    let options = Options::all();
    let parser = Parser::new_ext(content, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// First H1 of the document, falling back to the file stem.
pub fn get_page_title(path: &Path) -> String {
    let fallback = || {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().replace('-', " "))
            .unwrap_or_default()
    };
    let Ok(content) = std::fs::read_to_string(path) else {
        return fallback();
    };
    first_heading(&content).unwrap_or_else(fallback)
}

fn first_heading(content: &str) -> Option<String> {
    let parser = Parser::new_ext(content, Options::all());
    let mut in_heading = false;
    let mut text = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) if level as u32 == 1 => {
                in_heading = true;
            }
            Event::End(TagEnd::Heading { .. }) if in_heading => {
                return Some(text);
            }
            Event::Text(t) if in_heading => text.push_str(&t),
            Event::Code(t) if in_heading => text.push_str(&t),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_basics() {
        let html = render_markdown("# Privacy Policy\n\nWe collect *very little*.");
        assert!(html.contains("<h1>Privacy Policy</h1>"));
        assert!(html.contains("<em>very little</em>"));
    }

    #[test]
    fn test_first_heading() {
        assert_eq!(
            first_heading("# Terms of Use\n\nBody."),
            Some("Terms of Use".to_string())
        );
        assert_eq!(first_heading("No headings here."), None);
        // A lower-level heading does not count as the title.
        assert_eq!(first_heading("## Section\n\n# Title"), Some("Title".to_string()));
    }
}
