//! Content models.
//!
//! A content model is a small grammar over child type and group names:
//! whitespace-separated terms, each a name, a group, or a parenthesized
//! choice, with an optional `*`, `+`, or `?` quantifier. Examples:
//! `"inline*"`, `"block+"`, `"figcaption"`, `"(tableHeader | tableCell)+"`.

use super::{Group, Schema};

#[derive(Debug, Clone, PartialEq)]
pub struct ContentModel {
    terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq)]
struct Term {
    options: Vec<TermName>,
    quantifier: Quantifier,
}

#[derive(Debug, Clone, PartialEq)]
enum TermName {
    Type(String),
    Group(Group),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quantifier {
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl ContentModel {
    /// Parse a content expression. Tolerant: malformed input yields the
    /// terms that could be read (expressions are static schema strings).
    pub fn parse(expr: &str) -> Self {
        let mut terms = Vec::new();
        let mut rest = expr.trim();

        while !rest.is_empty() {
            let (token, tail) = match rest.strip_prefix('(') {
                Some(inner) => match inner.find(')') {
                    Some(close) => {
                        let names = &inner[..close];
                        let mut after = &inner[close + 1..];
                        let quantifier = take_quantifier(&mut after);
                        let options = names
                            .split('|')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(TermName::parse)
                            .collect();
                        (Term { options, quantifier }, after)
                    }
                    None => break,
                },
                None => {
                    let end = rest
                        .find(char::is_whitespace)
                        .unwrap_or(rest.len());
                    let mut word = &rest[..end];
                    let after = &rest[end..];
                    let quantifier = take_trailing_quantifier(&mut word);
                    (
                        Term {
                            options: vec![TermName::parse(word)],
                            quantifier,
                        },
                        after,
                    )
                }
            };
            terms.push(token);
            rest = tail.trim_start();
        }

        Self { terms }
    }

    /// No children allowed (atoms and leaves).
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// At least one child is required.
    pub fn requires_content(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t.quantifier, Quantifier::One | Quantifier::OneOrMore))
    }

    /// The model holds only text.
    pub fn only_text(&self) -> bool {
        !self.terms.is_empty()
            && self.terms.iter().all(|t| {
                t.options
                    .iter()
                    .all(|o| matches!(o, TermName::Type(n) if n == "text"))
            })
    }

    /// The model accepts inline content directly.
    pub fn accepts_inline(&self) -> bool {
        self.terms.iter().any(|t| {
            t.options.iter().any(|o| match o {
                TermName::Group(g) => *g == Group::Inline,
                TermName::Type(n) => n == "text",
            })
        })
    }

    /// Whether a child of this type could appear anywhere in the model.
    pub fn accepts(&self, type_name: &str, schema: &Schema) -> bool {
        self.terms
            .iter()
            .any(|t| t.options.iter().any(|o| o.matches(type_name, schema)))
    }

    /// The single concrete type a node of this model can be filled with
    /// when it must not be empty.
    pub fn filler_type(&self, schema: &Schema) -> Option<&'static str> {
        let term = self.terms.first()?;
        if !matches!(
            term.quantifier,
            Quantifier::One | Quantifier::OneOrMore
        ) {
            return None;
        }
        match term.options.first()? {
            TermName::Type(name) => schema.node_type(name).map(|t| t.name),
            TermName::Group(Group::Block) => Some("paragraph"),
            TermName::Group(_) => None,
        }
    }

    /// Validate an ordered child type sequence against the model.
    pub fn matches(&self, children: &[&str], schema: &Schema) -> bool {
        self.match_from(0, children, schema)
    }

    fn match_from(&self, term_index: usize, children: &[&str], schema: &Schema) -> bool {
        let Some(term) = self.terms.get(term_index) else {
            return children.is_empty();
        };

        let accepts = |name: &str| term.options.iter().any(|o| o.matches(name, schema));

        match term.quantifier {
            Quantifier::One => {
                !children.is_empty()
                    && accepts(children[0])
                    && self.match_from(term_index + 1, &children[1..], schema)
            }
            Quantifier::Optional => {
                (!children.is_empty()
                    && accepts(children[0])
                    && self.match_from(term_index + 1, &children[1..], schema))
                    || self.match_from(term_index + 1, children, schema)
            }
            Quantifier::ZeroOrMore | Quantifier::OneOrMore => {
                let min = if term.quantifier == Quantifier::OneOrMore {
                    1
                } else {
                    0
                };
                let max = children.iter().take_while(|c| accepts(c)).count();
                // Greedy with backtracking
                for taken in (min..=max).rev() {
                    if self.match_from(term_index + 1, &children[taken..], schema) {
                        return true;
                    }
                }
                false
            }
        }
    }
}

impl TermName {
    fn parse(word: &str) -> Self {
        match word {
            "block" => TermName::Group(Group::Block),
            "inline" => TermName::Group(Group::Inline),
            name => TermName::Type(name.to_string()),
        }
    }

    fn matches(&self, type_name: &str, schema: &Schema) -> bool {
        match self {
            TermName::Type(name) => name == type_name,
            TermName::Group(group) => schema.group_of(type_name) == Some(*group),
        }
    }
}

fn take_quantifier(rest: &mut &str) -> Quantifier {
    let (q, consumed) = match rest.chars().next() {
        Some('*') => (Quantifier::ZeroOrMore, 1),
        Some('+') => (Quantifier::OneOrMore, 1),
        Some('?') => (Quantifier::Optional, 1),
        _ => (Quantifier::One, 0),
    };
    *rest = &rest[consumed..];
    q
}

fn take_trailing_quantifier(word: &mut &str) -> Quantifier {
    let (q, trim) = match word.chars().last() {
        Some('*') => (Quantifier::ZeroOrMore, 1),
        Some('+') => (Quantifier::OneOrMore, 1),
        Some('?') => (Quantifier::Optional, 1),
        _ => (Quantifier::One, 0),
    };
    *word = &word[..word.len() - trim];
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_inline_star() {
        let schema = Schema::editor_default();
        let model = ContentModel::parse("inline*");
        assert!(model.matches(&[], &schema));
        assert!(model.matches(&["text", "text", "hardBreak"], &schema));
        assert!(!model.matches(&["paragraph"], &schema));
        assert!(model.accepts_inline());
        assert!(!model.requires_content());
    }

    #[test]
    fn test_block_plus() {
        let schema = Schema::editor_default();
        let model = ContentModel::parse("block+");
        assert!(!model.matches(&[], &schema));
        assert!(model.matches(&["paragraph", "heading"], &schema));
        assert!(!model.matches(&["text"], &schema));
        assert!(model.requires_content());
        assert_eq!(model.filler_type(&schema), Some("paragraph"));
    }

    #[test]
    fn test_single_child() {
        let schema = Schema::editor_default();
        let model = ContentModel::parse("figcaption");
        assert!(model.matches(&["figcaption"], &schema));
        assert!(!model.matches(&[], &schema));
        assert!(!model.matches(&["figcaption", "figcaption"], &schema));
        assert_eq!(model.filler_type(&schema), Some("figcaption"));
    }

    #[test]
    fn test_choice() {
        let schema = Schema::editor_default();
        let model = ContentModel::parse("(tableHeader | tableCell)+");
        assert!(model.matches(&["tableHeader", "tableCell", "tableCell"], &schema));
        assert!(!model.matches(&["paragraph"], &schema));
        assert!(!model.matches(&[], &schema));
    }

    #[test]
    fn test_empty_model() {
        let schema = Schema::editor_default();
        let model = ContentModel::parse("");
        assert!(model.is_empty());
        assert!(model.matches(&[], &schema));
        assert!(!model.matches(&["text"], &schema));
    }

    #[test]
    fn test_rows_not_blocks() {
        // Row/cell types are only reachable by name, never via "block"
        let schema = Schema::editor_default();
        let blocks = ContentModel::parse("block+");
        assert!(!blocks.matches(&["tableRow"], &schema));
        assert!(!blocks.matches(&["listItem"], &schema));
        assert!(!blocks.matches(&["figcaption"], &schema));
    }
}
