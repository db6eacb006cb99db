use scraper::ElementRef;

/// Text of an element: every descendant text node trimmed, empty ones dropped,
/// the rest joined by `sep`.
pub fn stripped_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// True if the element has no `class` attribute or an empty one.
pub fn is_classless(element: ElementRef<'_>) -> bool {
    element.value().classes().next().is_none()
}
