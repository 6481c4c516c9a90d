use crate::query::{MatchOp, Predicate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RecordId = u64;

/// A CRM record (contact, company, opportunity) as seen by search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Custom field values keyed by alias
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Names of related records keyed by relation (`company`, `tag`, ...)
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<String>>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Record {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            email: None,
            phone: None,
            active: true,
            fields: BTreeMap::new(),
            relations: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_field(mut self, alias: &str, value: &str) -> Self {
        self.fields.insert(alias.to_string(), value.to_string());
        self
    }

    pub fn with_relation(mut self, relation: &str, names: &[&str]) -> Self {
        self.relations.insert(
            relation.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Native columns first, then custom fields
    pub fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(self.name.as_str()),
            "email" => self.email.as_deref(),
            "phone" => self.phone.as_deref(),
            _ => self.fields.get(field).map(String::as_str),
        }
    }

    pub fn related(&self, relation: &str) -> &[String] {
        self.relations
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Values the record is counted under when grouping by `key`.
    ///
    /// Relations yield every related name; `active` yields `true`/`false`.
    pub fn group_values(&self, key: &str) -> Vec<String> {
        if key == "active" {
            return vec![self.active.to_string()];
        }
        if let Some(names) = self.relations.get(key) {
            return names.clone();
        }
        self.field_value(key)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .into_iter()
            .collect()
    }

    /// Check the record against a single predicate (case-insensitive)
    pub fn matches(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Text { terms } => {
                let haystack = self.search_text();
                terms
                    .iter()
                    .all(|term| haystack.contains(&term.to_lowercase()))
            }
            Predicate::Field {
                field,
                value,
                op,
                negated,
            } => {
                let matched = self
                    .field_value(field)
                    .is_some_and(|actual| compare(actual, value, *op));
                matched != *negated
            }
            Predicate::Relation {
                relation,
                value,
                op,
                negated,
            } => {
                let related = self.related(relation);
                let matched = if value.is_empty() {
                    !related.is_empty()
                } else {
                    related.iter().any(|name| compare(name, value, *op))
                };
                matched != *negated
            }
            Predicate::Active { active } => self.active == *active,
        }
    }

    pub fn matches_all(&self, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|p| self.matches(p))
    }

    fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.name.as_str()];
        parts.extend(self.email.as_deref());
        parts.extend(self.phone.as_deref());
        parts.extend(self.fields.values().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

fn compare(actual: &str, expected: &str, op: MatchOp) -> bool {
    match op {
        MatchOp::Equals => actual.to_lowercase() == expected.to_lowercase(),
        MatchOp::Contains => actual.to_lowercase().contains(&expected.to_lowercase()),
    }
}
