//! HTML character references.
//!
//! Quoted and bare attribute values and raw text are decoded on the way in;
//! the serializer escapes on the way out.

/// Decode named (full HTML5 table) and numeric character references.
/// Unknown references are left as written.
pub fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Escape `& < > " '` so the text can sit inside a quoted attribute or
/// between tags.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text content. A leading `{` or whitespace character is written as
/// a numeric reference, since the parser reads the first raw character as the
/// content mode and skips whitespace before it.
pub fn escape_text(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '{' || c.is_whitespace() => {
            format!("&#{};{}", u32::from(c), escape(chars.as_str()))
        }
        _ => escape(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_named() {
        assert_eq!(decode("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode("&quot;W E&quot;"), "\"W E\"");
    }

    #[test]
    fn test_decode_full_table() {
        assert_eq!(decode("&hearts; &Alpha; &frac12;"), "\u{2665} \u{391} \u{bd}");
        assert_eq!(decode("&CounterClockwiseContourIntegral;"), "\u{2233}");
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode("&#x27;"), "'");
        assert_eq!(decode("&#00000000065;"), "A");
        assert_eq!(decode("&#123;1}"), "{1}");
    }

    #[test]
    fn test_decode_leaves_unknown_alone() {
        assert_eq!(decode("&bogus;"), "&bogus;");
        assert_eq!(decode("trailing &"), "trailing &");
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom's & Jerry</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom&#x27;s &amp; Jerry&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_then_decode() {
        let text = r#"feet < "meters" & 'yards'"#;
        assert_eq!(decode(&escape(text)), text);
    }

    #[test]
    fn test_escape_text_leading_characters() {
        assert_eq!(escape_text("{1}"), "&#123;1}");
        assert_eq!(escape_text(" x"), "&#32;x");
        assert_eq!(escape_text("\n x "), "&#10; x ");
        assert_eq!(escape_text("a {b}"), "a {b}");
        assert_eq!(escape_text("<b>"), "&lt;b&gt;");
        assert_eq!(escape_text(""), "");
    }
}
