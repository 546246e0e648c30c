//! Markdown text transform for designated context fields.
//!
//! Fields listed in [`MARKDOWN_FIELDS`](crate::types::MARKDOWN_FIELDS) are
//! written by users as markdown and rendered to HTML once, while the context is
//! assembled. Templates insert them with `| safe`.
//!
//! A field that renders to a single paragraph is unwrapped, so a one-line
//! description such as `**bold** text` can be dropped inline into a heading or
//! a `<p>` the template already provides. Multi-block content keeps its tags.

use crate::types::{Fields, MARKDOWN_FIELDS};
use pulldown_cmark::{Options, Parser, html as md_html};
use serde_yaml::Value;

const P_OPEN: &str = "<p>";
const P_CLOSE: &str = "</p>";

/// Convert markdown source to HTML.
pub fn to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    unwrap_single_paragraph(html.trim_end())
}

fn unwrap_single_paragraph(html: &str) -> String {
    match html
        .strip_prefix(P_OPEN)
        .and_then(|rest| rest.strip_suffix(P_CLOSE))
    {
        Some(inner) if !inner.contains(P_OPEN) => inner.to_string(),
        _ => html.to_string(),
    }
}

/// Replace every markdown field holding a string with its HTML rendering.
///
/// Non-string values (null, lists) are left untouched.
pub fn apply_markdown_fields(fields: &mut Fields) {
    for name in MARKDOWN_FIELDS {
        if let Some(Value::String(text)) = fields.get_mut(*name) {
            *text = to_html(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DESCRIPTION;

    #[test]
    fn bold_becomes_strong() {
        assert_eq!(to_html("**bold**"), "<strong>bold</strong>");
    }

    #[test]
    fn single_paragraph_is_unwrapped() {
        assert_eq!(to_html("plain text"), "plain text");
        assert_eq!(to_html("*a* and `b`"), "<em>a</em> and <code>b</code>");
    }

    #[test]
    fn multiple_blocks_keep_paragraphs() {
        let html = to_html("first\n\nsecond");
        assert!(html.starts_with("<p>first</p>"));
        assert!(html.ends_with("<p>second</p>"));
    }

    #[test]
    fn headings_are_not_unwrapped() {
        let html = to_html("# Title\n\nBody");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn empty_text_stays_empty() {
        assert_eq!(to_html(""), "");
    }

    #[test]
    fn only_markdown_fields_are_transformed() {
        let mut fields = Fields::new();
        fields.insert(DESCRIPTION.into(), Value::String("**hi**".into()));
        fields.insert("title".into(), Value::String("**raw**".into()));
        apply_markdown_fields(&mut fields);

        assert_eq!(fields[DESCRIPTION].as_str(), Some("<strong>hi</strong>"));
        assert_eq!(fields["title"].as_str(), Some("**raw**"));
    }

    #[test]
    fn null_description_left_alone() {
        let mut fields = Fields::new();
        fields.insert(DESCRIPTION.into(), Value::Null);
        apply_markdown_fields(&mut fields);
        assert_eq!(fields[DESCRIPTION], Value::Null);
    }
}
