//! Plain-text helpers over parsed markup

use scraper::{ElementRef, Selector};

/// Concatenate every text node below `element`
///
/// Leaf text nodes are joined depth-first, left to right. No whitespace
/// normalisation is applied, so paragraph breaks in the source survive as
/// the newlines the markup already contains.
pub(crate) fn plain_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Trimmed text of all matches of `selector` below `element`, joined
pub(crate) fn child_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .flat_map(|matched| matched.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Trimmed text of each match of `selector` below `element`
pub(crate) fn child_texts(element: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    element
        .select(selector)
        .map(|matched| matched.text().collect::<String>().trim().to_string())
        .collect()
}

/// Value of `attr` on the first match of `selector` below `element`
pub(crate) fn child_attr<'a>(
    element: ElementRef<'a>,
    selector: &Selector,
    attr: &str,
) -> Option<&'a str> {
    element
        .select(selector)
        .next()
        .and_then(|matched| matched.value().attr(attr))
}
