use super::error::SearchError;
use super::fields::{FieldMatching, KeywordKind, SearchFields};
use super::parser::{Offset, ParsedQuery, unquote};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOp {
    Equals,
    Contains,
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOp::Equals => f.write_str("equals"),
            MatchOp::Contains => f.write_str("contains"),
        }
    }
}

/// A storage-layer filter derived from one offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum Predicate {
    /// Every term must appear somewhere in the record's text
    Text { terms: Vec<String> },
    Field {
        field: String,
        value: String,
        op: MatchOp,
        negated: bool,
    },
    /// A related record whose name matches exists (any related record when `value` is empty)
    Relation {
        relation: String,
        value: String,
        op: MatchOp,
        negated: bool,
    },
    Active { active: bool },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions {
    /// Reject offsets that cannot be translated instead of skipping them
    pub strict: bool,
}

impl TranslateOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// An offset skipped in lenient mode, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredOffset {
    pub keyword: String,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Translation {
    pub predicates: Vec<Predicate>,
    pub ignored: Vec<IgnoredOffset>,
}

/// Translate offsets into predicates.
///
/// When several `active` offsets are present the last one wins.
pub fn translate(
    parsed: &ParsedQuery,
    fields: &SearchFields,
    options: TranslateOptions,
) -> Result<Translation, SearchError> {
    let mut translation = Translation::default();

    for offset in &parsed.offsets {
        match translate_offset(offset, parsed.is_excluded(offset), fields) {
            Ok(Some(predicate)) => {
                if matches!(predicate, Predicate::Active { .. }) {
                    translation
                        .predicates
                        .retain(|p| !matches!(p, Predicate::Active { .. }));
                }
                translation.predicates.push(predicate);
            }
            Ok(None) => {}
            Err(err) if options.strict => return Err(err),
            Err(err) => {
                tracing::warn!(keyword = %offset.keyword, value = %offset.value, %err, "ignoring search offset");
                translation.ignored.push(IgnoredOffset {
                    keyword: offset.keyword.clone(),
                    value: offset.value.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(translation)
}

fn translate_offset(
    offset: &Offset,
    negated: bool,
    fields: &SearchFields,
) -> Result<Option<Predicate>, SearchError> {
    let op = if offset.exact {
        MatchOp::Equals
    } else {
        MatchOp::Contains
    };

    match fields.classify(&offset.keyword) {
        KeywordKind::Freetext => {
            let terms = split_terms(&offset.value);
            Ok((!terms.is_empty()).then_some(Predicate::Text { terms }))
        }
        KeywordKind::Relation if offset.keyword.eq_ignore_ascii_case("active") => {
            let active = parse_active(&offset.value)?;
            Ok(Some(Predicate::Active {
                active: active != negated,
            }))
        }
        KeywordKind::Relation => Ok(Some(Predicate::Relation {
            relation: offset.keyword.to_lowercase(),
            value: offset.value.clone(),
            op,
            negated,
        })),
        KeywordKind::Field => {
            let meta = fields
                .get(&offset.keyword)
                .ok_or_else(|| SearchError::UnknownKeyword(offset.keyword.clone()))?;
            if !meta.searchable {
                return Err(SearchError::NotSearchable(offset.keyword.clone()));
            }
            if offset.value.is_empty() {
                return Ok(None);
            }
            let op = match meta.matching {
                FieldMatching::Equality => MatchOp::Equals,
                FieldMatching::Substring => op,
            };
            Ok(Some(Predicate::Field {
                field: offset.keyword.clone(),
                value: offset.value.clone(),
                op,
                negated,
            }))
        }
        KeywordKind::Unknown => Err(SearchError::UnknownKeyword(offset.keyword.clone())),
    }
}

fn parse_active(value: &str) -> Result<bool, SearchError> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SearchError::InvalidActiveValue(value.to_string())),
    }
}

/// Split freetext into terms, keeping quoted phrases whole
fn split_terms(s: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                push_term(&mut terms, &s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    push_term(&mut terms, &s[start..]);

    terms
}

fn push_term(terms: &mut Vec<String>, part: &str) {
    let part = part.trim();
    let term = unquote(part).unwrap_or(part).trim();
    if !term.is_empty() {
        terms.push(term.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_terms() {
        assert_eq!(
            split_terms(r#"big "red fox" jumps"#),
            vec!["big", "red fox", "jumps"]
        );
        assert!(split_terms("   ").is_empty());
    }

    #[test]
    fn test_parse_active() {
        assert_eq!(parse_active("TRUE"), Ok(true));
        assert_eq!(parse_active("false"), Ok(false));
        assert_eq!(
            parse_active("maybe"),
            Err(SearchError::InvalidActiveValue("maybe".to_string()))
        );
    }

    #[test]
    fn test_negated_active_flips_value() {
        let parsed = ParsedQuery::parse("-active:true");
        let translation =
            translate(&parsed, &SearchFields::new(), TranslateOptions::default()).unwrap();
        assert_eq!(
            translation.predicates,
            vec![Predicate::Active { active: false }]
        );
    }
}
