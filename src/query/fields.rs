use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyword used for offsets that carry plain search text
pub const FREETEXT: &str = "freetext";

/// Keywords that refer to joined entities rather than scalar fields
pub const RELATION_KEYWORDS: [&str; 8] = [
    "assignee",
    "status",
    "stage",
    "tag",
    "opportunity",
    "contact",
    "company",
    "active",
];

/// What a keyword refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeywordKind {
    /// Plain search text
    Freetext,
    /// One of [`RELATION_KEYWORDS`]
    Relation,
    /// A configured field alias
    Field,
    /// Parsed structurally but not recognised
    #[default]
    Unknown,
}

impl KeywordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordKind::Freetext => "freetext",
            KeywordKind::Relation => "relation",
            KeywordKind::Field => "field",
            KeywordKind::Unknown => "unknown",
        }
    }

    /// Whether the UI renders the offset as a highlighted tag
    pub fn is_taggable(self) -> bool {
        matches!(self, KeywordKind::Relation | KeywordKind::Field)
    }
}

/// How a field value is compared when no exact phrase is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldMatching {
    #[default]
    Substring,
    Equality,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMeta {
    pub searchable: bool,
    pub matching: FieldMatching,
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self {
            searchable: true,
            matching: FieldMatching::Substring,
        }
    }
}

/// Field metadata keyed by alias, as supplied by the data-access layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SearchFields {
    fields: BTreeMap<String, FieldMeta>,
}

impl SearchFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, alias: &str, meta: FieldMeta) -> Self {
        self.fields.insert(alias.to_string(), meta);
        self
    }

    pub fn get(&self, alias: &str) -> Option<&FieldMeta> {
        self.fields.get(alias)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Classify a keyword against the relation keywords and the known fields.
    ///
    /// Relation keywords win over a field with the same alias.
    pub fn classify(&self, keyword: &str) -> KeywordKind {
        if keyword == FREETEXT {
            KeywordKind::Freetext
        } else if is_relation_keyword(keyword) {
            KeywordKind::Relation
        } else if self.fields.contains_key(keyword) {
            KeywordKind::Field
        } else {
            KeywordKind::Unknown
        }
    }

    /// Keywords offered by the `+` picker: relations first, then searchable fields.
    ///
    /// `active` is left out because the UI drives it with its own toggle.
    pub fn picker_keywords(&self) -> Vec<&str> {
        RELATION_KEYWORDS
            .iter()
            .copied()
            .filter(|k| *k != "active")
            .chain(
                self.fields
                    .iter()
                    .filter(|(_, meta)| meta.searchable)
                    .map(|(alias, _)| alias.as_str()),
            )
            .collect()
    }
}

impl FromIterator<(String, FieldMeta)> for SearchFields {
    fn from_iter<T: IntoIterator<Item = (String, FieldMeta)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

pub fn is_relation_keyword(keyword: &str) -> bool {
    RELATION_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(keyword))
}
