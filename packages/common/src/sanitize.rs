//! Sanitization utilities.
//!
//! These functions are the only path by which externally supplied strings
//! become node attributes or rendered HTML. Every attribute parser in the
//! schema routes through them.
//!
//! All of them are pure: rejected input degrades to `None`/empty, never to
//! an error the caller has to recover from.

use url::Url;

/// Allowed URI protocols for image sources
const ALLOWED_IMAGE_PROTOCOLS: [&str; 2] = ["http", "https"];

/// Allowed URI protocols for links
const ALLOWED_LINK_PROTOCOLS: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Base used to resolve relative URLs before protocol inspection.
/// Relative sources stay relative in the document; only the resolved
/// protocol is inspected.
const RESOLVE_BASE: &str = "https://localhost/";

/// Validate and sanitize an image source URL.
///
/// Accepts only URLs that resolve under `http:`/`https:`. Anything else
/// (`javascript:`, `data:`, `vbscript:`, malformed input) yields `None`.
pub fn validate_image_src(src: &str) -> Option<String> {
    if src.is_empty() {
        return None;
    }

    let base = Url::parse(RESOLVE_BASE).ok()?;
    let resolved = base.join(src).ok()?;
    if ALLOWED_IMAGE_PROTOCOLS.contains(&resolved.scheme()) {
        Some(src.to_string())
    } else {
        None
    }
}

/// Entity-escape alt text so it is safe inside an attribute value.
///
/// Empty/absent input yields `""`. The escaped form is what gets stored on
/// the node; the serializer emits it verbatim.
pub fn sanitize_alt_text(alt: &str) -> String {
    escape_html_attr(alt)
}

/// Validate an href is an internal anchor only: `#` followed by
/// `[A-Za-z0-9-]+`. Anything else (bare `#`, external links, disallowed
/// characters) yields `None`.
pub fn validate_toc_href(href: &str) -> Option<String> {
    let anchor = href.strip_prefix('#')?;
    if anchor.is_empty() {
        return None;
    }
    if anchor.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Some(href.to_string())
    } else {
        None
    }
}

/// Validate a URL's protocol against the link allow-list.
///
/// Internal anchors are always valid here; `is_valid_url` adds the
/// non-empty-anchor requirement.
pub fn is_valid_protocol(url: &str) -> bool {
    if url.is_empty() || url.starts_with('#') {
        return true;
    }

    match extract_protocol(url) {
        Some(protocol) => ALLOWED_LINK_PROTOCOLS.contains(&protocol.as_str()),
        None => false,
    }
}

/// Validate a URL is safe for link insertion.
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    if !is_valid_protocol(url) {
        return false;
    }

    // Internal anchors need at least one character after '#'
    if let Some(anchor) = url.strip_prefix('#') {
        return !anchor.is_empty();
    }

    // External http(s) URLs must actually parse
    if url.starts_with("http") {
        return Url::parse(url).is_ok();
    }

    true
}

/// Extract the protocol from a URL for validation and error messages.
/// Matches `[a-z][a-z0-9+\-.]*:` at the start, case-insensitively.
pub fn extract_protocol(url: &str) -> Option<String> {
    let colon = url.find(':')?;
    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme.to_ascii_lowercase())
    } else {
        None
    }
}

/// Escape text content for safe embedding between tags.
pub fn escape_html_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a string for safe embedding inside a double-quoted attribute.
pub fn escape_html_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the HTML entities the serializer can emit, plus numeric
/// references. Unknown named entities are left as-is.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let semi = match tail.find(';') {
            Some(i) if i > 1 => i,
            _ => {
                out.push('&');
                rest = &tail[1..];
                continue;
            }
        };

        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => decode_numeric_entity(entity),
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_src_allows_https() {
        assert_eq!(
            validate_image_src("https://example.com/a.png"),
            Some("https://example.com/a.png".to_string())
        );
        assert_eq!(
            validate_image_src("http://example.com/a.png"),
            Some("http://example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_validate_image_src_allows_relative() {
        assert_eq!(
            validate_image_src("/uploads/a.png"),
            Some("/uploads/a.png".to_string())
        );
    }

    #[test]
    fn test_validate_image_src_rejects_bad_protocols() {
        assert_eq!(validate_image_src("javascript:alert(1)"), None);
        assert_eq!(validate_image_src("data:image/png;base64,AA"), None);
        assert_eq!(validate_image_src("vbscript:msgbox(1)"), None);
        assert_eq!(validate_image_src(""), None);
    }

    #[test]
    fn test_sanitize_alt_text_escapes() {
        assert_eq!(
            sanitize_alt_text(r#""><script>alert(1)</script>"#),
            "&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;"
        );
        assert_eq!(sanitize_alt_text(""), "");
    }

    #[test]
    fn test_validate_toc_href() {
        assert_eq!(
            validate_toc_href("#intro-1"),
            Some("#intro-1".to_string())
        );
        assert_eq!(validate_toc_href("#Intro"), Some("#Intro".to_string()));
        assert_eq!(validate_toc_href("#"), None);
        assert_eq!(validate_toc_href("https://evil.com/#x"), None);
        assert_eq!(validate_toc_href("#a b"), None);
        assert_eq!(validate_toc_href("#a<b"), None);
    }

    #[test]
    fn test_is_valid_url_protocols() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/a?b=c"));
        assert!(is_valid_url("mailto:a@b.com"));
        assert!(is_valid_url("tel:+15551234567"));
        assert!(is_valid_url("#section"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("#"));
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("data:text/html,<b>x</b>"));
        assert!(!is_valid_url("example.com"));
    }

    #[test]
    fn test_escape_roundtrip() {
        let raw = "a < b & \"c\"";
        assert_eq!(decode_entities(&escape_html_attr(raw)), raw);
        assert_eq!(decode_entities(&escape_html_text(raw)), raw);
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
        assert_eq!(decode_entities("a & b"), "a & b");
    }
}
