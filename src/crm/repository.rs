use super::record::{Record, RecordId};
use crate::query::Predicate;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record {0} not found")]
    NotFound(RecordId),

    #[error("Invalid record: {0}")]
    Invalid(String),

    #[error("Failed to read records file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse records file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Filters for a listing query
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub predicates: Vec<Predicate>,
    pub modified_since: Option<DateTime<Utc>>,
}

/// Data-access capability used by request handlers
pub trait Repository {
    fn find(&self, id: RecordId) -> Result<Option<Record>, RepositoryError>;

    /// Insert (id 0) or replace a record, returning its id
    fn save(&mut self, record: Record) -> Result<RecordId, RepositoryError>;

    /// Replace the related names of one relation
    fn sync_relations(
        &mut self,
        id: RecordId,
        relation: &str,
        related: &[String],
    ) -> Result<(), RepositoryError>;

    /// Remove a record, returning it
    fn delete(&mut self, id: RecordId) -> Result<Record, RepositoryError>;

    /// Matching records, newest id first
    fn search(&self, request: &SearchRequest) -> Result<Vec<Record>, RepositoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    records: BTreeMap<RecordId, Record>,
    next_id: RecordId,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self, RepositoryError> {
        let mut repo = Self::new();
        for record in records {
            repo.save(record)?;
        }
        Ok(repo)
    }

    /// Load a JSON array of records
    pub fn load(path: &Path) -> Result<Self, RepositoryError> {
        let path_display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| RepositoryError::Read {
            path: path_display.clone(),
            source,
        })?;
        let records: Vec<Record> =
            serde_json::from_str(&raw).map_err(|source| RepositoryError::Parse {
                path: path_display,
                source,
            })?;
        Self::from_records(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Repository for InMemoryRepository {
    fn find(&self, id: RecordId) -> Result<Option<Record>, RepositoryError> {
        Ok(self.records.get(&id).cloned())
    }

    fn save(&mut self, mut record: Record) -> Result<RecordId, RepositoryError> {
        if record.name.trim().is_empty() {
            return Err(RepositoryError::Invalid("name must not be empty".to_string()));
        }

        if record.id == 0 {
            self.next_id += 1;
            record.id = self.next_id;
        } else {
            self.next_id = self.next_id.max(record.id);
        }

        let id = record.id;
        self.records.insert(id, record);
        Ok(id)
    }

    fn sync_relations(
        &mut self,
        id: RecordId,
        relation: &str,
        related: &[String],
    ) -> Result<(), RepositoryError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;

        let mut names: Vec<String> = Vec::with_capacity(related.len());
        for name in related {
            if !name.is_empty() && !names.contains(name) {
                names.push(name.clone());
            }
        }

        if names.is_empty() {
            record.relations.remove(relation);
        } else {
            record.relations.insert(relation.to_string(), names);
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    fn delete(&mut self, id: RecordId) -> Result<Record, RepositoryError> {
        self.records.remove(&id).ok_or(RepositoryError::NotFound(id))
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<Record>, RepositoryError> {
        Ok(self
            .records
            .values()
            .rev()
            .filter(|record| {
                request
                    .modified_since
                    .is_none_or(|since| record.updated_at > since)
            })
            .filter(|record| record.matches_all(&request.predicates))
            .cloned()
            .collect())
    }
}
