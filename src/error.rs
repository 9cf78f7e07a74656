//! Error taxonomy for the discovery core.
//!
//! Every fault raised synchronously by the engine is a `DiscoveryError`.
//! Faults that happen after a discovery thread has been launched never reach
//! the caller; they are recorded through report status and the log.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Coarse classification of a fault, used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    Connectivity,
    Configuration,
    Plugin,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Plugin => "plugin",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Discovery engine {engine} is not initialized")]
    EngineNotInitialized { engine: String },

    #[error("No discovery service is registered for request type {0}")]
    UnknownRequestType(String),

    #[error("User {user} is not authorized to call {operation}")]
    UserNotAuthorized { user: String, operation: String },

    #[error("Metadata store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{kind} {guid} not found")]
    NotFound { kind: String, guid: String },

    #[error("Property {name} holds a {actual} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Property {name} carries unknown {enum_type} ordinal {ordinal}")]
    UnknownOrdinal {
        name: String,
        enum_type: String,
        ordinal: i32,
    },

    #[error("Required property {name} is missing from {type_name}")]
    MissingProperty { name: String, type_name: String },

    #[error("Report {report} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        report: String,
        from: String,
        to: String,
    },

    #[error("Annotation {annotation} does not belong to report {report}")]
    AnnotationNotInReport { annotation: String, report: String },

    #[error("Connector {connector} does not provide the discovery service capability")]
    NotDiscoveryService { connector: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Discovery service {service} failed: {source:#}")]
    ServiceFailed {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to launch discovery thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiscoveryError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        DiscoveryError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &str, guid: &str) -> Self {
        DiscoveryError::NotFound {
            kind: kind.to_string(),
            guid: guid.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::InvalidParameter { .. }
            | DiscoveryError::EngineNotInitialized { .. }
            | DiscoveryError::UnknownRequestType(_)
            | DiscoveryError::NotFound { .. }
            | DiscoveryError::TypeMismatch { .. }
            | DiscoveryError::UnknownOrdinal { .. }
            | DiscoveryError::MissingProperty { .. }
            | DiscoveryError::InvalidStatusTransition { .. }
            | DiscoveryError::AnnotationNotInReport { .. }
            | DiscoveryError::Json(_) => ErrorKind::Validation,
            DiscoveryError::UserNotAuthorized { .. } => ErrorKind::Authorization,
            DiscoveryError::StoreUnavailable(_) | DiscoveryError::Spawn(_) => {
                ErrorKind::Connectivity
            }
            DiscoveryError::NotDiscoveryService { .. } | DiscoveryError::Configuration(_) => {
                ErrorKind::Configuration
            }
            DiscoveryError::ServiceFailed { .. } => ErrorKind::Plugin,
        }
    }
}
