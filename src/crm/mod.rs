//! CRM collaborators of the search layer
//!
//! Storage and outbound messaging are capabilities ([`Repository`],
//! [`NotificationGateway`]) handed to [`ContactHandler`] by the caller.

pub mod export;
pub mod gateway;
pub mod handler;
pub mod record;
pub mod repository;

pub use gateway::{Channel, Delivery, EmailMessage, GatewayError, LoggingGateway, NotificationGateway};
pub use export::write_records_csv;
pub use handler::{ContactHandler, DEFAULT_GROUP_BY, HandlerError, IndexResponse, RecordUpdate};
pub use record::{Record, RecordId};
pub use repository::{InMemoryRepository, Repository, RepositoryError, SearchRequest};
