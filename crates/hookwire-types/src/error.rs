use thiserror::Error;

use crate::trigger::ActionKind;

/// Errors related to hooks-file loading.
///
/// An absent file is not an error: the registry loads empty. Only a file
/// that exists but cannot be read or parsed surfaces here.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Failures that escape the per-action boundary inside a dispatched trigger.
///
/// These are caught by the per-trigger task wrapper and logged as unhandled
/// dispatch errors; they never reach the caller of dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("action of type '{kind}' in trigger '{trigger}' has no '{kind}' template field")]
    MissingTemplate { trigger: String, kind: ActionKind },
}

/// Failures from the external action executor.
///
/// Caught at the per-action boundary: logged with the trigger name, then
/// execution continues with the next action in the same trigger.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("spawn failed: {0}")]
    Spawn(String),

    #[error("execution failed: {0}")]
    Failed(String),
}
