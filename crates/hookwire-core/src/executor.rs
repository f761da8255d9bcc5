//! Action executor port.
//!
//! The dispatch engine produces a resolved action and an execution scope;
//! actually running the work (spawning processes, starting agent jobs)
//! belongs to implementors of `ActionExecutor`. The engine ships one
//! implementor, `DryRunExecutor`, which only logs what it would run.

use hookwire_types::error::ExecuteError;
use hookwire_types::request::ExecutionScope;
use hookwire_types::trigger::Action;

/// Port for the external execution backend.
///
/// `execute` receives the cloned action with its template field already
/// resolved, plus the scope descriptor. It may return an output string for
/// logging. Failures are caught by the dispatcher at the per-action
/// boundary; implementors should not panic.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ActionExecutor: Send + Sync {
    fn execute(
        &self,
        action: Action,
        scope: ExecutionScope,
    ) -> impl std::future::Future<Output = Result<Option<String>, ExecuteError>> + Send;
}

/// Executor that logs resolved actions instead of running them.
///
/// Reference implementation of the port, used by the CLI `fire` command to
/// preview what a hooks file would do for a given request.
#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl ActionExecutor for DryRunExecutor {
    async fn execute(
        &self,
        action: Action,
        scope: ExecutionScope,
    ) -> Result<Option<String>, ExecuteError> {
        let rendered = action.template().unwrap_or("").to_string();
        tracing::info!(
            kind = %action.kind,
            cwd = %scope.cwd.display(),
            resolved = %rendered,
            "dry-run: would execute action"
        );
        Ok(Some(rendered))
    }
}
