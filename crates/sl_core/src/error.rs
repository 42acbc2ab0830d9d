//! Error taxonomy for the league engine.
//!
//! Every mutating operation classifies its failures into one of the variants
//! below so callers can map them onto a transport of their choice. Validation
//! failures always carry the offending field; store failures carry the
//! operation and collection that affected zero documents.

use thiserror::Error;

use crate::models::user::Role;
use crate::store::SnapshotError;

pub type Result<T> = std::result::Result<T, LeagueError>;

#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("{resource_type} with id '{resource_id}' not found")]
    ResourceNotFound {
        resource_type: &'static str,
        resource_id: String,
        context: Option<String>,
    },

    #[error("validation error on field '{field}': {message}")]
    Validation {
        field: &'static str,
        message: String,
        context: Option<String>,
    },

    #[error("operation '{operation}' on '{collection}' modified no documents")]
    DatabaseOperation {
        operation: &'static str,
        collection: &'static str,
        context: Option<String>,
    },

    #[error("insufficient permissions: {message}")]
    Authorization {
        message: String,
        required: Vec<Role>,
        held: Vec<Role>,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl LeagueError {
    pub fn not_found(resource_type: &'static str, resource_id: impl Into<String>) -> Self {
        LeagueError::ResourceNotFound {
            resource_type,
            resource_id: resource_id.into(),
            context: None,
        }
    }

    pub fn not_found_in(
        resource_type: &'static str,
        resource_id: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        LeagueError::ResourceNotFound {
            resource_type,
            resource_id: resource_id.into(),
            context: Some(context.into()),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LeagueError::Validation { field, message: message.into(), context: None }
    }

    pub fn validation_in(
        field: &'static str,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        LeagueError::Validation {
            field,
            message: message.into(),
            context: Some(context.into()),
        }
    }

    pub fn database(operation: &'static str, collection: &'static str) -> Self {
        LeagueError::DatabaseOperation { operation, collection, context: None }
    }

    pub fn database_in(
        operation: &'static str,
        collection: &'static str,
        context: impl Into<String>,
    ) -> Self {
        LeagueError::DatabaseOperation {
            operation,
            collection,
            context: Some(context.into()),
        }
    }

    pub fn forbidden(message: impl Into<String>, required: &[Role], held: &[Role]) -> Self {
        LeagueError::Authorization {
            message: message.into(),
            required: required.to_vec(),
            held: held.to_vec(),
        }
    }

    /// Whether a caller could succeed by re-fetching state and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LeagueError::DatabaseOperation { .. })
    }
}
