//! Derives the plain-text excerpt shown for a post when it has no explicit
//! description.

use scraper::{ElementRef, Html, Node};

/// The maximum excerpt length, in characters, before the ellipsis.
pub const DEFAULT_LENGTH: usize = 250;

const ELLIPSIS: char = '…';

/// Strips markup from `html`, collapses whitespace, and prunes the result to
/// at most `length` characters. Truncation happens at the last word boundary
/// that fits and is marked with a trailing `…`. A single word longer than
/// `length` is cut mid-word.
pub fn prune(html: &str, length: usize) -> String {
    let text = collapse_whitespace(&strip_tags(html));
    if text.chars().count() <= length {
        return text;
    }

    let cut = text
        .char_indices()
        .nth(length)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];

    // If the cut landed inside a word, back off to the previous space.
    let head = match text[cut..].starts_with(' ') {
        true => head,
        false => match head.rfind(' ') {
            Some(space) => &head[..space],
            None => head,
        },
    };

    let mut excerpt = head.trim_end().to_owned();
    excerpt.push(ELLIPSIS);
    excerpt
}

/// Parses `html` as a fragment and joins its text, leaving out the contents
/// of `script` and `style` elements. Character references are decoded by the
/// parser.
fn strip_tags(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    push_text(fragment.root_element(), &mut text);
    text
}

fn push_text(element: ElementRef, text: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if SKIPPED.contains(&e.name()) => {}
            Node::Element(e) => {
                if let Some(child) = ElementRef::wrap(child) {
                    // Block-level elements separate words even without
                    // whitespace in the source.
                    let block = is_block(e.name());
                    if block {
                        text.push(' ');
                    }
                    push_text(child, text);
                    if block {
                        text.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

const SKIPPED: &[&str] = &["script", "style", "template", "noscript"];

fn is_block(name: &str) -> bool {
    const BLOCKS: &[&str] = &[
        "p", "br", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol",
        "pre", "blockquote", "hr", "table", "tr", "td", "th", "section",
        "figure", "figcaption",
    ];
    BLOCKS.contains(&name)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
