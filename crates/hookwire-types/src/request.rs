//! Per-request context types.
//!
//! `RequestContext` is the snapshot of an inbound request that templates are
//! resolved against; `ExecutionScope` is the descriptor handed to the
//! executor alongside each resolved action.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of one inbound request, created per dispatch and read-only for
/// its duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Parsed request body (any JSON value, `null` when absent).
    #[serde(default)]
    pub body: Value,
    /// Query string parameters.
    #[serde(default)]
    pub query: HashMap<String, String>,
    /// Request headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    /// Build a context from its parts.
    pub fn new(body: Value, query: HashMap<String, String>, headers: HashMap<String, String>) -> Self {
        Self { body, query, headers }
    }
}

/// Execution descriptor handed to the executor with each resolved action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionScope {
    /// Working directory for the execution.
    pub cwd: PathBuf,
    /// The triggering request body.
    pub data: Value,
}
