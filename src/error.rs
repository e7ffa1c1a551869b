//! Error types for Stockflow.
//!
//! All errors in Stockflow are represented by the `FlowError` enum,
//! which provides specific variants for different error categories.

use std::{io::ErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Stockflow operations.
///
/// Each variant represents a specific category of error that can occur
/// during flow definition, execution, or storage operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Engine-level errors (configuration, wiring).
    #[error("{0}")]
    Engine(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, etc.).
    #[error("{0}")]
    Convert(String),

    /// Flow definition errors (missing trigger node, dangling edges).
    #[error("{0}")]
    Definition(String),

    /// Missing or malformed action configuration detected at execution time.
    #[error("{0}")]
    Validation(String),

    /// Unrecognized action type in a node definition.
    #[error("unknown action type: {0}")]
    UnknownAction(String),

    /// Iteration cap exceeded while revisiting a node within one run.
    #[error("loop limit exceeded at node {node_id} after {iterations} iterations")]
    LoopLimit {
        node_id: String,
        iterations: u32,
    },

    /// Runtime execution errors.
    #[error("{0}")]
    Runtime(String),

    /// Storage collaborator errors.
    #[error("{0}")]
    Store(String),

    /// Delivery collaborator errors (mail, SMS, HTTP, push).
    #[error("{0}")]
    Delivery(String),

    /// Node definition or parsing errors.
    #[error("{0}")]
    Node(String),

    /// Edge definition errors.
    #[error("{0}")]
    Edge(String),
}

impl From<FlowError> for String {
    fn from(val: FlowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FlowError {
    fn from(error: std::io::Error) -> Self {
        FlowError::Engine(error.to_string())
    }
}

impl From<FlowError> for std::io::Error {
    fn from(val: FlowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for FlowError {
    fn from(_: FromUtf8Error) -> Self {
        FlowError::Runtime("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(error: serde_json::Error) -> Self {
        FlowError::Convert(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for FlowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FlowError::Node(error.to_string())
    }
}
