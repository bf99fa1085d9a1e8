use std::borrow::Cow;
use std::fmt::Write;

fn needs_escape(c: char) -> bool {
    matches!(c, '<' | '>' | '"' | '\'' | '&') || u32::from(c) > 159
}

/// Escapes reserved HTML characters; anything above U+009F becomes a
/// numeric entity.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(needs_escape) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);
    for c in text[first..].chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '&' => out.push_str("&amp;"),
            c if u32::from(c) > 159 => {
                // writing into a String cannot fail
                let _ = write!(out, "&#{};", u32::from(c));
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters() {
        assert_eq!(escape_html("<a>"), "&lt;a&gt;");
        assert_eq!(
            escape_html(r#"Tom & "Jerry's""#),
            "Tom &amp; &quot;Jerry&apos;s&quot;"
        );
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_html("plain text 123"), Cow::Borrowed(_)));
    }

    #[test]
    fn high_code_points_become_numeric_entities() {
        // U+009F stays, U+00A0 is the first escaped code point
        assert_eq!(escape_html("\u{9f}"), "\u{9f}");
        assert_eq!(escape_html("\u{a0}"), "&#160;");
        assert_eq!(escape_html("é"), "&#233;");
        assert_eq!(escape_html("🌍"), "&#127757;");
    }
}
