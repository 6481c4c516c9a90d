use thiserror::Error;

/// Errors raised when a parsed query is translated in strict mode
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error(
        "Unknown search keyword: '{0}'. Valid keywords are the relation keywords (assignee, status, stage, tag, opportunity, contact, company, active) or a configured field alias"
    )]
    UnknownKeyword(String),

    #[error("Field '{0}' is not searchable")]
    NotSearchable(String),

    #[error("Invalid active value: '{0}'. Valid values are: true, false")]
    InvalidActiveValue(String),
}
