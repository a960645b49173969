//! HTML token stream.
//!
//! The persisted representation is a constrained HTML dialect produced by
//! our own serializer, so the lexer stays deliberately small: tags,
//! closing tags, text, with comments and declarations dropped. Stray `<`
//! characters that do not open a tag are handled by the raw-tree builder,
//! which treats unlexable spans as text.

use logos::{Lexer, Logos, Skip};

fn lex_comment(lex: &mut Lexer<HtmlToken>) -> Skip {
    match lex.remainder().find("-->") {
        Some(end) => lex.bump(end + 3),
        None => lex.bump(lex.remainder().len()),
    }
    Skip
}

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum HtmlToken {
    /// `<!-- ... -->` — dropped
    #[token("<!--", lex_comment)]
    Comment,

    /// `<!doctype html>` and other declarations — dropped. The pattern
    /// excludes `<!-` so comments always go through the comment callback,
    /// which tolerates `>` inside the comment body.
    #[regex(r"<![^->][^>]*>", logos::skip)]
    Declaration,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>")]
    CloseTag,

    #[regex(r"<[a-zA-Z][^>]*>")]
    OpenTag,

    #[regex(r"[^<]+")]
    Text,
}

/// Tokenize HTML source into `(token, byte span)` pairs. Spans of
/// unlexable input are surfaced as `Err` entries for the caller to
/// degrade into text.
pub fn tokenize(source: &str) -> Vec<(Result<HtmlToken, ()>, std::ops::Range<usize>)> {
    HtmlToken::lexer(source)
        .spanned()
        .map(|(token, span)| (token.map_err(|_| ()), span))
        .collect()
}

/// An opening tag pulled apart into name and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub self_closing: bool,
}

/// Parse the innards of an `OpenTag` slice. Attribute values are
/// entity-decoded; names are lowercased.
pub fn parse_tag(slice: &str) -> Tag {
    let inner = slice
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end();
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };

    let mut chars = inner.char_indices().peekable();
    let mut name = String::new();
    for (_, c) in chars.by_ref() {
        if c.is_whitespace() {
            break;
        }
        name.push(c.to_ascii_lowercase());
    }

    let mut attrs = Vec::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        // Attribute name
        let mut attr_name = String::new();
        let mut eq = false;
        for (_, c) in chars.by_ref() {
            match c {
                '=' => {
                    eq = true;
                    break;
                }
                c if c.is_whitespace() => break,
                c => attr_name.push(c.to_ascii_lowercase()),
            }
        }
        if attr_name.is_empty() {
            // Stray '=' — already consumed, drop it
            continue;
        }

        if !eq {
            // Boolean attribute
            attrs.push((attr_name, String::new()));
            continue;
        }

        // Attribute value
        let mut value = String::new();
        match chars.peek() {
            Some(&(_, quote @ ('"' | '\''))) => {
                chars.next();
                for (_, c) in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
        }
        attrs.push((attr_name, vellum_common::decode_entities(&value)));
    }

    Tag {
        name,
        attrs,
        self_closing,
    }
}

/// Tag name from a `CloseTag` slice, lowercased.
pub fn close_tag_name(slice: &str) -> String {
    slice
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("<p>hi</p>");
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone().unwrap()).collect();
        assert_eq!(
            kinds,
            vec![HtmlToken::OpenTag, HtmlToken::Text, HtmlToken::CloseTag]
        );
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let tokens = tokenize("<!doctype html><!-- note --><p>x</p>");
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone().unwrap()).collect();
        assert_eq!(
            kinds,
            vec![HtmlToken::OpenTag, HtmlToken::Text, HtmlToken::CloseTag]
        );
    }

    #[test]
    fn test_parse_tag_attrs() {
        let tag = parse_tag(r#"<img src="/a.png" alt="a &amp; b" data-x=1>"#);
        assert_eq!(tag.name, "img");
        assert_eq!(
            tag.attrs,
            vec![
                ("src".to_string(), "/a.png".to_string()),
                ("alt".to_string(), "a & b".to_string()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_parse_tag_self_closing_and_boolean() {
        let tag = parse_tag("<hr />");
        assert_eq!(tag.name, "hr");
        assert!(tag.self_closing);

        let tag = parse_tag("<input disabled>");
        assert_eq!(tag.attrs, vec![("disabled".to_string(), String::new())]);
    }

    #[test]
    fn test_close_tag_name() {
        assert_eq!(close_tag_name("</P >"), "p");
        assert_eq!(close_tag_name("</figcaption>"), "figcaption");
    }
}
