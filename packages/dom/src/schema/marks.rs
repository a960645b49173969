//! Mark types.
//!
//! Marks wrap inline text: formatting (strong/em/strike/code) and links.
//! Link hrefs are validated both when parsed from markup and when applied
//! through a transaction; a failing href drops the mark, never the text.

use super::html::{attr, HtmlText};
use crate::node::{AttrMap, Mark};
use crate::raw::RawElement;
use serde_json::Value;
use vellum_common::is_valid_url;

pub struct MarkType {
    pub name: &'static str,

    /// Source tags that map to this mark on import.
    pub parse_tags: &'static [&'static str],

    /// Extract mark attributes from a matched element. `None` rejects the
    /// mark (content is kept, unmarked).
    pub parse_attrs: fn(&RawElement) -> Option<AttrMap>,

    /// Canonical tag and attributes for this mark.
    pub render: fn(&Mark) -> (&'static str, Vec<(String, HtmlText)>),

    /// Re-validate a mark being applied through a transaction.
    pub validate: fn(&Mark) -> bool,
}

fn no_attrs(_el: &RawElement) -> Option<AttrMap> {
    Some(AttrMap::new())
}

fn always_valid(_mark: &Mark) -> bool {
    true
}

fn parse_link_attrs(el: &RawElement) -> Option<AttrMap> {
    let href = el.attr("href")?;
    if !is_valid_url(href) {
        return None;
    }
    let mut attrs = AttrMap::new();
    attrs.insert("href".to_string(), Value::String(href.to_string()));
    Some(attrs)
}

fn validate_link(mark: &Mark) -> bool {
    mark.attrs
        .get("href")
        .and_then(Value::as_str)
        .map(is_valid_url)
        .unwrap_or(false)
}

fn render_link(mark: &Mark) -> (&'static str, Vec<(String, HtmlText)>) {
    let href = mark
        .attrs
        .get("href")
        .and_then(Value::as_str)
        .unwrap_or("");
    ("a", vec![attr("href", href)])
}

macro_rules! simple_mark {
    ($name:literal, $tags:expr, $render_tag:literal) => {
        MarkType {
            name: $name,
            parse_tags: $tags,
            parse_attrs: no_attrs,
            render: |_| ($render_tag, Vec::new()),
            validate: always_valid,
        }
    };
}

pub fn default_marks() -> Vec<MarkType> {
    vec![
        simple_mark!("strong", &["strong", "b"], "strong"),
        simple_mark!("em", &["em", "i"], "em"),
        simple_mark!("strike", &["s", "del", "strike"], "s"),
        simple_mark!("code", &["code"], "code"),
        MarkType {
            name: "link",
            parse_tags: &["a"],
            parse_attrs: parse_link_attrs,
            render: render_link,
            validate: validate_link,
        },
    ]
}
