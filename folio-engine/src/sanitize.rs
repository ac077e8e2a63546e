//! Allow-list sanitizer for authored rich text
//!
//! Post bodies are HTML written by hand (or pasted from an editor) and are
//! rendered inside the reader. Before that they pass through a strict filter:
//!
//! - Allowed elements keep their tag but lose every attribute.
//! - Links keep only `href` and always open in a new context with
//!   `rel="noopener noreferrer"`. Script-scheme hrefs collapse to `#`.
//! - Any other element is unwrapped: its children are promoted in place.
//! - `script` and `style` are dropped together with their content.
//! - Comments are dropped.
//!
//! Malformed markup is parsed the way a browser would (html5ever via
//! `scraper`), so the filter is best-effort but never fails.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Elements that survive sanitizing
const ALLOWED: &[&str] = &[
    "a", "p", "h1", "h2", "h3", "ul", "ol", "li", "blockquote", "code", "pre", "strong", "b",
    "em", "i", "br",
];

/// Elements removed along with everything inside them
const DROPPED: &[&str] = &["script", "style"];

/// Elements whose boundaries separate words in extracted text
const BLOCKS: &[&str] = &[
    "p", "h1", "h2", "h3", "ul", "ol", "li", "blockquote", "pre", "br", "div",
];

/// URL schemes that would execute when followed
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Sanitize an HTML fragment for display
pub fn sanitize_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    for child in fragment.root_element().children() {
        write_node(child, &mut out);
    }
    out
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => escape_text(text, out),
        Node::Element(element) => {
            let name = element.name();
            if DROPPED.contains(&name) {
                return;
            }
            if !ALLOWED.contains(&name) {
                for child in node.children() {
                    write_node(child, out);
                }
                return;
            }

            if name == "a" {
                let href = safe_href(element.attr("href"));
                out.push_str("<a href=\"");
                escape_attr(href, out);
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
            } else {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }

            // br is void: no children, no closing tag
            if name == "br" {
                return;
            }

            for child in node.children() {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        // Comments, doctypes and processing instructions are discarded
        _ => {}
    }
}

fn safe_href(href: Option<&str>) -> &str {
    let href = href.map(str::trim).filter(|h| !h.is_empty()).unwrap_or("#");
    let lowered = href.to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        "#"
    } else {
        href
    }
}

/// Plain text of an HTML fragment with whitespace collapsed
///
/// Script and style content is not text and is skipped.
pub fn text_content(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();
    for child in fragment.root_element().children() {
        collect_text(child, &mut raw);
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) if DROPPED.contains(&element.name()) => {}
        Node::Element(element) => {
            for child in node.children() {
                collect_text(child, out);
            }
            // Inline markup can sit inside a word; only blocks separate words
            if BLOCKS.contains(&element.name()) {
                out.push(' ');
            }
        }
        _ => {}
    }
}

/// Text excerpt of at most `max_chars` characters, ellipsized when cut
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = text_content(html);
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Escape text for an HTML text node
pub fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escape text for a double-quoted attribute value
pub fn escape_attr(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
