use super::export::write_records_csv;
use super::gateway::{Delivery, EmailMessage, GatewayError, NotificationGateway};
use super::record::{Record, RecordId};
use super::repository::{Repository, RepositoryError, SearchRequest};
use crate::query::{
    IgnoredOffset, MatchOp, ParsedQuery, Predicate, SearchError, SearchFields, TranslateOptions,
    translate,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Contact {0} not found")]
    NotFound(RecordId),

    #[error("Contact {id} has no {detail}")]
    MissingContactDetail { id: RecordId, detail: &'static str },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to write export: {0}")]
    Export(#[from] csv::Error),
}

/// Grouping used by [`ContactHandler::count`] when none is given
pub const DEFAULT_GROUP_BY: &str = "status";

/// Result of a filtered listing
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub query: ParsedQuery,
    pub records: Vec<Record>,
    pub ignored: Vec<IgnoredOffset>,
}

/// Changes applied by [`ContactHandler::update`]
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
    pub fields: BTreeMap<String, String>,
    /// Each listed relation is replaced wholesale
    pub relations: BTreeMap<String, Vec<String>>,
}

/// Only the non-empty parts of a submitted record; the rest is left as stored.
impl From<Record> for RecordUpdate {
    fn from(record: Record) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            name: present(Some(record.name)),
            email: present(record.email),
            phone: present(record.phone),
            active: Some(record.active),
            fields: record
                .fields
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect(),
            relations: record
                .relations
                .into_iter()
                .filter(|(_, names)| !names.is_empty())
                .collect(),
        }
    }
}

/// Contact endpoints with their collaborators injected
pub struct ContactHandler<R, G> {
    repository: R,
    gateway: G,
    fields: SearchFields,
    options: TranslateOptions,
}

impl<R: Repository, G: NotificationGateway> ContactHandler<R, G> {
    pub fn new(repository: R, gateway: G, fields: SearchFields) -> Self {
        Self {
            repository,
            gateway,
            fields,
            options: TranslateOptions::default(),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Filtered listing, newest first
    pub fn index(
        &self,
        search_string: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<IndexResponse, HandlerError> {
        let query = ParsedQuery::parse_with_fields(search_string, &self.fields);
        let translation = translate(&query, &self.fields, self.options)?;
        let request = SearchRequest {
            predicates: translation.predicates,
            modified_since,
        };
        let records = self.repository.search(&request)?;
        tracing::debug!(
            search_string,
            matched = records.len(),
            ignored = translation.ignored.len(),
            "contact index"
        );

        Ok(IndexResponse {
            query,
            records,
            ignored: translation.ignored,
        })
    }

    pub fn show(&self, id: RecordId) -> Result<Record, HandlerError> {
        self.repository
            .find(id)?
            .ok_or(HandlerError::NotFound(id))
    }

    /// Create a contact, or update the existing one with the same email.
    ///
    /// An existing contact is updated with the non-empty parts of `record`;
    /// values it leaves out (phone, custom fields, relations) are kept.
    pub fn store(&mut self, mut record: Record) -> Result<Record, HandlerError> {
        if let Some(email) = record.email.as_deref().filter(|e| !e.is_empty()) {
            let request = SearchRequest {
                predicates: vec![Predicate::Field {
                    field: "email".to_string(),
                    value: email.to_string(),
                    op: MatchOp::Equals,
                    negated: false,
                }],
                modified_since: None,
            };
            if let Some(existing) = self.repository.search(&request)?.into_iter().next() {
                tracing::info!(id = existing.id, email, "contact exists, updating");
                return self.update(existing.id, RecordUpdate::from(record));
            }
        }

        record.id = 0;
        record.updated_at = Utc::now();
        let id = self.repository.save(record)?;
        self.show(id)
    }

    pub fn destroy(&mut self, id: RecordId) -> Result<(), HandlerError> {
        match self.repository.delete(id) {
            Ok(_) => {
                tracing::info!(id, "contact deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound(id)) => Err(HandlerError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Number of contacts per value of `group_by` (a relation, a field or
    /// `active`), limited to contacts assigned to `assignee` when given.
    ///
    /// Contacts without a value are not counted; a contact related to
    /// several names is counted once under each.
    pub fn count(
        &self,
        group_by: &str,
        assignee: Option<&str>,
    ) -> Result<BTreeMap<String, usize>, HandlerError> {
        let records = self.repository.search(&SearchRequest::default())?;
        let mut counts = BTreeMap::new();

        for record in records.iter().filter(|record| {
            assignee.is_none_or(|name| {
                record
                    .related("assignee")
                    .iter()
                    .any(|a| a.eq_ignore_ascii_case(name))
            })
        }) {
            for value in record.group_values(group_by) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        Ok(counts)
    }

    /// Write the filtered listing as CSV, returning the number of rows
    pub fn export<W: Write>(
        &self,
        search_string: &str,
        modified_since: Option<DateTime<Utc>>,
        out: W,
    ) -> Result<usize, HandlerError> {
        let response = self.index(search_string, modified_since)?;
        write_records_csv(&response.records, out)?;
        tracing::info!(search_string, rows = response.records.len(), "contacts exported");
        Ok(response.records.len())
    }

    pub fn update(&mut self, id: RecordId, update: RecordUpdate) -> Result<Record, HandlerError> {
        let mut record = self.show(id)?;

        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(email) = update.email {
            record.email = Some(email);
        }
        if let Some(phone) = update.phone {
            record.phone = Some(phone);
        }
        if let Some(active) = update.active {
            record.active = active;
        }
        record.fields.extend(update.fields);
        record.updated_at = Utc::now();
        self.repository.save(record)?;

        for (relation, names) in &update.relations {
            self.repository.sync_relations(id, relation, names)?;
        }

        self.show(id)
    }

    pub fn email(&mut self, id: RecordId, subject: &str, body: &str) -> Result<Delivery, HandlerError> {
        let record = self.show(id)?;
        let to = record
            .email
            .filter(|e| !e.is_empty())
            .ok_or(HandlerError::MissingContactDetail { id, detail: "email" })?;

        let message = EmailMessage {
            to,
            subject: subject.to_string(),
            body: body.to_string(),
            ..EmailMessage::default()
        };
        Ok(self.gateway.send_email(&message)?)
    }

    pub fn sms(&mut self, id: RecordId, body: &str) -> Result<Delivery, HandlerError> {
        let to = self.phone_of(id)?;
        Ok(self.gateway.send_sms(&to, body)?)
    }

    pub fn call(&mut self, id: RecordId) -> Result<Delivery, HandlerError> {
        let to = self.phone_of(id)?;
        let delivery = self.gateway.place_call(&to)?;
        tracing::info!(id, reference = %delivery.reference, "phone call placed");
        Ok(delivery)
    }

    fn phone_of(&self, id: RecordId) -> Result<String, HandlerError> {
        self.show(id)?
            .phone
            .filter(|p| !p.is_empty())
            .ok_or(HandlerError::MissingContactDetail { id, detail: "phone" })
    }
}
