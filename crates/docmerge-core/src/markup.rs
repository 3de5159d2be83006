//! Locating and removing inline base64 images in HTML.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

/// An `<img>` element whose `src` is a base64 data URI. Group 1 is the payload.
static RE_INLINE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*"data:[^",]*;base64, ?([^"]*)"[^>]*>"#).unwrap()
});

/// One embedded image located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage<'a> {
    /// Byte range of the whole `<img ...>` element
    pub element: Range<usize>,
    /// Encoded payload as written in the document
    pub payload: &'a str,
}

impl InlineImage<'_> {
    /// Offset just past the element's closing `>`.
    pub fn end(&self) -> usize {
        self.element.end
    }
}

/// All inline images, in document order.
pub fn find_inline_images(html: &str) -> Vec<InlineImage<'_>> {
    RE_INLINE_IMAGE
        .captures_iter(html)
        .filter_map(|caps| {
            let element = caps.get(0)?;
            let payload = caps.get(1)?;
            Some(InlineImage {
                element: element.range(),
                payload: payload.as_str(),
            })
        })
        .collect()
}

/// Remove every inline image element.
pub fn strip_inline_images(html: &str) -> Cow<'_, str> {
    RE_INLINE_IMAGE.replace_all(html, "")
}

/// Escape text for insertion into HTML body content.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_inline_images() {
        let html = r#"<p>a</p><img src="data:image/png;base64,QUJD" alt="x"><p>b</p><img width="3" src="data:image/jpeg;base64,REVG">"#;
        let images = find_inline_images(html);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].payload, "QUJD");
        assert_eq!(
            &html[images[0].element.clone()],
            r#"<img src="data:image/png;base64,QUJD" alt="x">"#
        );
        assert_eq!(images[1].payload, "REVG");
        assert_eq!(images[1].end(), html.len());
    }

    #[test]
    fn test_linked_images_are_not_inline() {
        let html = r#"<img src="figure.png"><img src="https://example.com/a.png">"#;
        assert!(find_inline_images(html).is_empty());
    }

    #[test]
    fn test_space_after_comma_is_tolerated() {
        let html = r#"<img src="data:image/png;base64, QUJD">"#;
        assert_eq!(find_inline_images(html)[0].payload, "QUJD");
    }

    #[test]
    fn test_strip_inline_images() {
        let html = r#"<h1>T</h1><img src="data:image/png;base64,QUJD" /><p>x</p><img src="keep.png">"#;
        assert_eq!(
            strip_inline_images(html),
            r#"<h1>T</h1><p>x</p><img src="keep.png">"#
        );
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("a<b & c>d"), "a&lt;b &amp; c&gt;d");
    }
}
