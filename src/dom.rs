use scraper::{ElementRef, Html, Node};

use crate::config::CleanerConfig;

/// Elements whose whole subtree is dropped before text is collected.
const SKIP_TAGS: [&str; 7] = ["script", "style", "svg", "nav", "footer", "header", "form"];

/// Reduces raw HTML to the text a model needs to see.
#[derive(Debug, Clone, Copy)]
pub struct Cleaner {
    max_chars: usize,
}

impl Cleaner {
    pub fn new(config: &CleanerConfig) -> Self {
        Self {
            max_chars: config.max_chars,
        }
    }

    pub fn clean(&self, html: &str) -> String {
        clean_html(html, self.max_chars)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(&CleanerConfig::default())
    }
}

enum Pending<'a> {
    Text(&'a str),
    Element(ElementRef<'a>),
}

/// Strip non-content elements, join the remaining text nodes with newlines
/// and cut the result to `max_chars` characters.
///
/// Malformed markup is handled by the HTML5 parser's error recovery, so this
/// always returns best-effort text.
pub fn clean_html(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    // Explicit stack instead of recursion: pathological nesting can't blow it.
    let mut stack = vec![Pending::Element(doc.root_element())];
    while let Some(item) = stack.pop() {
        match item {
            Pending::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    pieces.push(text);
                }
            }
            Pending::Element(element) => {
                for child in element.children().rev() {
                    match child.value() {
                        Node::Text(text) => stack.push(Pending::Text(&**text)),
                        Node::Element(el) if SKIP_TAGS.contains(&el.name()) => {}
                        Node::Element(_) => {
                            if let Some(child_ref) = ElementRef::wrap(child) {
                                stack.push(Pending::Element(child_ref));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    truncate_chars(&pieces.join("\n"), max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
