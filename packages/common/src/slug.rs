//! Heading slug generation.
//!
//! Used by the editor's TOC deriver and the persisted-HTML content
//! processor. Both paths must produce identical ids for the same input,
//! so the algorithm lives here and nowhere else.

use std::collections::HashSet;

/// Generate a URL-safe id from heading text.
///
/// HTML tags and entities are stripped first so markup can never leak into
/// an anchor. The bare utility returns `""` for all-stripped input; the
/// id-assignment paths fall back to `"heading"`.
///
/// Idempotent on its own output.
pub fn generate_heading_id(text: &str) -> String {
    let stripped = strip_markup(text);

    let mut slug = String::with_capacity(stripped.len());
    let mut pending_hyphen = false;
    for c in stripped.to_lowercase().chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c),
            c if c.is_whitespace() => Some('-'),
            '-' => Some('-'),
            _ => None,
        };
        let Some(mapped) = mapped else { continue };

        if mapped == '-' {
            // Collapse whitespace/hyphen runs; drop leading hyphens
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(mapped);
        }
    }

    slug
}

/// Fallback id used when a heading's text slugs to nothing.
pub const FALLBACK_HEADING_ID: &str = "heading";

/// Disambiguate `base` against already-assigned ids: first free of
/// `base`, `base-1`, `base-2`, ... The chosen id is recorded in `used`.
pub fn assign_unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let mut unique = base.to_string();
    let mut counter = 1usize;
    while used.contains(&unique) {
        unique = format!("{base}-{counter}");
        counter += 1;
    }
    used.insert(unique.clone());
    unique
}

/// Remove HTML tags and entity sequences from heading text.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_tag = false;

    while let Some((i, c)) = chars.next() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            continue;
        }
        match c {
            '<' => in_tag = true,
            '&' => {
                // Drop through the first following ';' when one exists
                match text[i + 1..].find(';') {
                    Some(rel) if rel > 0 => {
                        let end = i + 1 + rel;
                        while let Some(&(j, _)) = chars.peek() {
                            if j > end {
                                break;
                            }
                            chars.next();
                        }
                    }
                    _ => out.push('&'),
                }
            }
            _ => out.push(c),
        }
    }

    out
}
