use super::fields::{FREETEXT, KeywordKind, SearchFields};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static KEYWORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(-)?([A-Za-z_][A-Za-z0-9_.]*):(.*)$").expect("valid keyword token regex")
});

static NO_FIELDS: LazyLock<SearchFields> = LazyLock::new(SearchFields::default);

/// Final token the UI appends to open the keyword picker
pub const PICKER_SUFFIX: &str = "+";

/// One keyword/value unit of a search string (e.g. `status:open` or `-tag:"big deal"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub keyword: String,
    pub value: String,
    /// The value was written as a quoted phrase
    #[serde(default)]
    pub exact: bool,
    /// Character offset of the token in the original text
    #[serde(default)]
    pub position: usize,
    /// The token carried a leading `-`
    #[serde(default)]
    pub negated: bool,
    #[serde(default)]
    pub kind: KeywordKind,
}

impl Offset {
    pub fn new(keyword: &str, value: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            value: value.to_string(),
            exact: false,
            position: 0,
            negated: false,
            kind: NO_FIELDS.classify(keyword),
        }
    }

    pub fn freetext(value: &str, position: usize) -> Self {
        Self {
            position,
            ..Self::new(FREETEXT, value)
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn is_freetext(&self) -> bool {
        self.keyword == FREETEXT
    }

    pub fn is_taggable(&self) -> bool {
        self.kind.is_taggable()
    }
}

/// Structured form of a search string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub original_text: String,
    pub offsets: Vec<Offset>,
    /// Keywords negated with a leading `-`
    #[serde(default)]
    pub exclude: BTreeSet<String>,
}

impl ParsedQuery {
    /// Parse without field metadata; only relation keywords are taggable.
    pub fn parse(text: &str) -> Self {
        parse(text, None)
    }

    pub fn parse_with_fields(text: &str, fields: &SearchFields) -> Self {
        parse(text, Some(fields))
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// First offset for `keyword`, compared ASCII case-insensitively
    pub fn find(&self, keyword: &str) -> Option<&Offset> {
        self.offsets.iter().find(|o| o.keyword.eq_ignore_ascii_case(keyword))
    }

    pub fn offsets_for<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Offset> + 'a {
        self.offsets
            .iter()
            .filter(move |o| o.keyword.eq_ignore_ascii_case(keyword))
    }

    /// Whether `offset` is excluded.
    ///
    /// The per-offset flag decides. A keyword listed in `exclude` with no
    /// flagged offset (a hand-built query) excludes the whole keyword group.
    pub fn is_excluded(&self, offset: &Offset) -> bool {
        if offset.is_freetext() {
            return false;
        }
        offset.negated
            || (self.exclude.contains(&offset.keyword)
                && !self.offsets_for(&offset.keyword).any(|o| o.negated))
    }

    /// Set the value of `keyword`, keeping exactly one offset for it.
    ///
    /// Matching ignores ASCII case (`ACTIVE:` and `active:` are one keyword).
    /// The first matching offset is updated in place, keeping its spelling,
    /// and later duplicates are dropped; a new offset is appended when none
    /// exists. Returns whether an existing offset was replaced.
    pub fn set_keyword(&mut self, keyword: &str, value: &str) -> bool {
        let mut seen = false;
        let mut dropped_negated = false;

        self.offsets.retain_mut(|offset| {
            if !offset.keyword.eq_ignore_ascii_case(keyword) {
                return true;
            }
            if seen {
                dropped_negated |= offset.negated;
                return false;
            }
            seen = true;
            offset.value = value.to_string();
            offset.exact = false;
            true
        });

        if dropped_negated {
            let offsets = &self.offsets;
            self.exclude.retain(|excluded| {
                !excluded.eq_ignore_ascii_case(keyword)
                    || offsets.iter().any(|o| o.negated && o.keyword == *excluded)
            });
        }

        if !seen {
            let position = self.original_text.chars().count();
            self.offsets.push(Offset::new(keyword, value).at(position));
        }

        seen
    }

    /// Same offsets in the same order, ignoring positions and source text
    pub fn is_equivalent(&self, other: &ParsedQuery) -> bool {
        self.offsets.len() == other.offsets.len()
            && self.offsets.iter().zip(&other.offsets).all(|(a, b)| {
                a.keyword == b.keyword
                    && a.value == b.value
                    && a.exact == b.exact
                    && self.is_excluded(a) == other.is_excluded(b)
            })
    }

    pub fn to_search_string(&self) -> String {
        super::serializer::serialize(self)
    }
}

/// A whitespace-delimited token with its starting character position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawToken<'a> {
    text: &'a str,
    position: usize,
    unterminated: bool,
}

/// Parse a search string into offsets.
///
/// Never fails: anything that is not a well-formed `keyword:value` token is
/// kept as freetext, and consecutive freetext tokens are merged into a
/// single offset joined by one space.
pub fn parse(text: &str, fields: Option<&SearchFields>) -> ParsedQuery {
    let fields = fields.unwrap_or(&NO_FIELDS);
    let mut tokens = tokenize(text);

    while tokens
        .last()
        .is_some_and(|t| !t.unterminated && t.text == PICKER_SUFFIX)
    {
        tokens.pop();
    }

    let mut offsets: Vec<Offset> = Vec::with_capacity(tokens.len());
    let mut exclude = BTreeSet::new();

    for token in tokens {
        match keyword_offset(&token, fields) {
            Some(offset) => {
                if offset.negated {
                    exclude.insert(offset.keyword.clone());
                }
                offsets.push(offset);
            }
            None => match offsets.last_mut() {
                Some(last) if last.is_freetext() => {
                    last.value.push(' ');
                    last.value.push_str(token.text);
                }
                _ => offsets.push(Offset::freetext(token.text, token.position)),
            },
        }
    }

    ParsedQuery {
        original_text: text.to_string(),
        offsets,
        exclude,
    }
}

/// Build a keyword offset, or `None` when the token is freetext
fn keyword_offset(token: &RawToken<'_>, fields: &SearchFields) -> Option<Offset> {
    if token.unterminated {
        return None;
    }

    let caps = KEYWORD_TOKEN_RE.captures(token.text)?;
    let negated = caps.get(1).is_some();
    let keyword = caps.get(2)?.as_str();
    let raw_value = caps.get(3)?.as_str();

    if keyword == FREETEXT {
        return None;
    }

    let (value, exact) = match unquote(raw_value) {
        Some(inner) => (inner, true),
        None if raw_value.contains('"') => return None,
        None => (raw_value, false),
    };

    Some(Offset {
        keyword: keyword.to_string(),
        value: value.to_string(),
        exact,
        position: token.position,
        negated,
        kind: fields.classify(keyword),
    })
}

/// Strip one pair of surrounding quotes; the inside must be quote-free.
pub(crate) fn unquote(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then_some(inner)
}

/// Split on whitespace outside double quotes.
///
/// An unterminated quote swallows the rest of the input into one token.
fn tokenize(s: &str) -> Vec<RawToken<'_>> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().enumerate().peekable();

    while let Some(&(position, (start, ch))) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut in_quotes = false;
        let mut end = s.len();
        while let Some(&(_, (idx, c))) = chars.peek() {
            if c == '"' {
                in_quotes = !in_quotes;
            } else if c.is_whitespace() && !in_quotes {
                end = idx;
                break;
            }
            chars.next();
        }

        if in_quotes {
            let rest = s[start..].trim_end();
            tracing::debug!(position, rest, "unterminated quote, keeping remainder as text");
            tokens.push(RawToken {
                text: rest,
                position,
                unterminated: true,
            });
            break;
        }

        tokens.push(RawToken {
            text: &s[start..end],
            position,
            unterminated: false,
        });
    }

    tokens
}
