use reqwest::Url;
use scraper::{ElementRef, Node};

/// Absolute form of `href`. Root-relative and relative links are joined onto
/// `origin`, absolute ones are returned untouched.
pub(crate) fn resolve_url(origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }
    Url::parse(origin)
        .and_then(|base| base.join(href))
        .ok()
        .map(|u| u.to_string())
}

/// Last non-empty path segment, e.g. `.../ski-resort/kitzski/` -> `kitzski`.
pub(crate) fn resort_id_from_url(url: &str) -> Option<String> {
    url.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .map(ToString::to_string)
}

/// Text of every child node, in document order. Text nodes give their raw
/// text, elements their concatenated descendant text. Comments are skipped.
pub(crate) fn child_node_texts(el: ElementRef) -> Vec<String> {
    el.children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                Some(text.to_string())
            }
            Node::Element(_) => ElementRef::wrap(child).map(|e| e.text().collect::<String>()),
            _ => None,
        })
        .collect()
}

pub(crate) fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

pub(crate) fn trimmed_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
