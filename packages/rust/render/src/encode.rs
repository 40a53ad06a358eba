//! The two ways feed data may enter a rendered document.
//!
//! Every interpolated value goes through exactly one of these: [`component`]
//! for anything placed inside a URL, [`text`] for anything placed in markup
//! (text nodes and quoted attribute values, including finished URLs).

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left unescaped, matching JavaScript's `encodeURIComponent`:
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Escape `& < > " '` so the value cannot open or close markup.
///
/// Safe for text nodes and for single- or double-quoted attribute values.
pub fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(value)
}

/// Percent-encode a value for use as one URL query component or path segment.
pub fn component(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, URI_COMPONENT).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escapes_markup() {
        assert_eq!(text("Bushy Park"), "Bushy Park");
        assert_eq!(
            text("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn text_neutralizes_script_injection() {
        let escaped = text("</p><script>alert('x')</script>");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(!escaped.contains('\''));
    }

    #[test]
    fn text_borrows_when_clean() {
        assert!(matches!(text("plain words"), Cow::Borrowed(_)));
    }

    #[test]
    fn component_matches_encode_uri_component() {
        assert_eq!(component("Teddington Lock, Bushy Park"), "Teddington%20Lock%2C%20Bushy%20Park");
        assert_eq!(component("a&b=c?d/e#f"), "a%26b%3Dc%3Fd%2Fe%23f");
        assert_eq!(component("St. James's (Park)!*~_-"), "St.%20James's%20(Park)!*~_-");
        assert_eq!(component("-0.33"), "-0.33");
    }

    #[test]
    fn component_encodes_utf8_bytes() {
        assert_eq!(component("Café"), "Caf%C3%A9");
    }
}
