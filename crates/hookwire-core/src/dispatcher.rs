//! Fire-and-forget action dispatch with per-action error isolation.
//!
//! `dispatch` maps an inbound request path to its registered triggers and
//! spawns one background task per matched trigger. The call returns before
//! any action runs; nothing that happens afterwards can reach the caller.
//!
//! Within one trigger, actions run strictly in declaration order, each
//! awaited to completion before the next begins -- later actions may depend
//! on earlier side effects. Across triggers there is no ordering.
//!
//! Two failure boundaries exist, both terminating in a log line:
//! - per action: an executor failure is logged and the loop continues with
//!   the next action in the same trigger;
//! - per trigger: anything escaping the action loop (a resolution-stage
//!   failure such as a missing template field) is logged by the task
//!   wrapper as an unhandled dispatch error.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use std::collections::HashMap;

use hookwire_types::error::DispatchError;
use hookwire_types::request::{ExecutionScope, RequestContext};
use hookwire_types::trigger::{Action, ActionKind, Trigger};

use crate::executor::ActionExecutor;
use crate::registry::TriggerRegistry;
use crate::template;

/// Dispatches inbound requests to the actions of their matching triggers.
///
/// Holds the immutable registry, the execution backend, and the working
/// directory recorded in each `ExecutionScope`.
pub struct ActionDispatcher<E> {
    registry: Arc<TriggerRegistry>,
    executor: Arc<E>,
    cwd: PathBuf,
}

impl<E> ActionDispatcher<E>
where
    E: ActionExecutor + 'static,
{
    /// Create a dispatcher over a loaded registry and an execution backend.
    pub fn new(registry: Arc<TriggerRegistry>, executor: Arc<E>, cwd: PathBuf) -> Self {
        Self {
            registry,
            executor,
            cwd,
        }
    }

    /// Fire every trigger registered on `path` with the given request data.
    ///
    /// Returns immediately: matched triggers run as independent background
    /// tasks and no failure, however severe, propagates to the caller. An
    /// unmatched path is a complete no-op -- no logs, no executor calls.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(
        &self,
        path: &str,
        body: Value,
        query: HashMap<String, String>,
        headers: HashMap<String, String>,
    ) {
        let matched = self.registry.lookup(path);
        if matched.is_empty() {
            return;
        }

        let ctx = Arc::new(RequestContext::new(body, query, headers));

        for trigger in matched.iter().cloned() {
            let executor = Arc::clone(&self.executor);
            let ctx = Arc::clone(&ctx);
            let cwd = self.cwd.clone();
            let name = trigger.name.clone();

            tokio::spawn(async move {
                if let Err(e) = run_trigger(trigger, ctx, executor, cwd).await {
                    tracing::error!(trigger = %name, error = %e, "unhandled dispatch error");
                }
            });
        }
    }
}

/// Run one trigger's action sequence to completion.
///
/// Executor failures are contained here, per action. Resolution failures
/// return `Err` and are logged by the spawned task's wrapper.
async fn run_trigger<E: ActionExecutor>(
    trigger: Trigger,
    ctx: Arc<RequestContext>,
    executor: Arc<E>,
    cwd: PathBuf,
) -> Result<(), DispatchError> {
    for action in &trigger.actions {
        let resolved = resolve_action(&trigger.name, action, &ctx)?;
        let scope = ExecutionScope {
            cwd: cwd.clone(),
            data: ctx.body.clone(),
        };

        match executor.execute(resolved, scope).await {
            Ok(output) => {
                tracing::info!(
                    trigger = %trigger.name,
                    kind = %action.kind,
                    output = output.as_deref().unwrap_or(""),
                    "action completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    trigger = %trigger.name,
                    kind = %action.kind,
                    error = %e,
                    "action execution failed"
                );
            }
        }
    }
    Ok(())
}

/// Clone an action and resolve its template field against the request.
///
/// The escaping mode is decided here, from the action kind alone: command
/// templates become shell-safe single-quoted arguments, job templates stay
/// verbatim conversational text.
fn resolve_action(
    trigger: &str,
    action: &Action,
    ctx: &RequestContext,
) -> Result<Action, DispatchError> {
    let template = action.template().ok_or_else(|| DispatchError::MissingTemplate {
        trigger: trigger.to_string(),
        kind: action.kind,
    })?;

    let escape = action.kind == ActionKind::Command;
    let rendered = template::resolve(template, ctx, escape);

    let mut resolved = action.clone();
    resolved.set_template(rendered);
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hookwire_types::error::ExecuteError;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    /// Executor that reports every call over a channel. Templates containing
    /// `slow` are delayed before reporting; templates containing `boom` fail
    /// after reporting.
    struct RecordingExecutor {
        tx: mpsc::UnboundedSender<String>,
    }

    impl ActionExecutor for RecordingExecutor {
        async fn execute(
            &self,
            action: Action,
            _scope: ExecutionScope,
        ) -> Result<Option<String>, ExecuteError> {
            let rendered = action.template().unwrap_or("").to_string();
            if rendered.contains("slow") {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            self.tx.send(rendered.clone()).unwrap();
            if rendered.contains("boom") {
                return Err(ExecuteError::Failed("exit status 1".to_string()));
            }
            Ok(None)
        }
    }

    fn command(template: &str) -> Action {
        Action {
            kind: ActionKind::Command,
            command: Some(template.to_string()),
            job: None,
            extra: HashMap::new(),
        }
    }

    fn job(template: &str) -> Action {
        Action {
            kind: ActionKind::Job,
            command: None,
            job: Some(template.to_string()),
            extra: HashMap::new(),
        }
    }

    fn trigger(name: &str, path: &str, enabled: bool, actions: Vec<Action>) -> Trigger {
        Trigger {
            name: name.to_string(),
            watch_path: path.to_string(),
            enabled,
            actions,
        }
    }

    fn dispatcher(
        triggers: Vec<Trigger>,
    ) -> (ActionDispatcher<RecordingExecutor>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = ActionDispatcher::new(
            Arc::new(TriggerRegistry::from_triggers(triggers)),
            Arc::new(RecordingExecutor { tx }),
            PathBuf::from("/srv/hooks"),
        );
        (dispatcher, rx)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("executor call within deadline")
            .expect("channel open")
    }

    // -------------------------------------------------------------------
    // Routing
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_unmatched_path_is_noop() {
        let (dispatcher, mut rx) = dispatcher(vec![trigger(
            "a",
            "/hooks/x",
            true,
            vec![job("hello")],
        )]);

        dispatcher.dispatch("/hooks/other", json!({}), HashMap::new(), HashMap::new());

        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
            "no executor call expected"
        );
    }

    #[tokio::test]
    async fn test_all_enabled_triggers_on_path_fire() {
        let (dispatcher, mut rx) = dispatcher(vec![
            trigger("a", "/hooks/x", true, vec![job("from-a")]),
            trigger("b", "/hooks/x", true, vec![job("from-b")]),
            trigger("c", "/hooks/x", false, vec![job("from-c")]),
        ]);

        dispatcher.dispatch("/hooks/x", json!({}), HashMap::new(), HashMap::new());

        let mut seen = vec![recv(&mut rx).await, recv(&mut rx).await];
        seen.sort();
        assert_eq!(seen, ["from-a", "from-b"]);
        // The disabled trigger never reaches the executor.
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    // -------------------------------------------------------------------
    // Ordering and isolation
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_actions_run_in_declaration_order() {
        // The first action is artificially slow; strict sequencing means it
        // still reports before the second starts.
        let (dispatcher, mut rx) = dispatcher(vec![trigger(
            "ordered",
            "/hooks/x",
            true,
            vec![job("slow first"), job("second")],
        )]);

        dispatcher.dispatch("/hooks/x", json!({}), HashMap::new(), HashMap::new());

        assert_eq!(recv(&mut rx).await, "slow first");
        assert_eq!(recv(&mut rx).await, "second");
    }

    #[tokio::test]
    async fn test_failing_action_does_not_stop_siblings() {
        let (dispatcher, mut rx) = dispatcher(vec![trigger(
            "fragile",
            "/hooks/x",
            true,
            vec![job("boom"), job("survivor")],
        )]);

        dispatcher.dispatch("/hooks/x", json!({}), HashMap::new(), HashMap::new());

        assert_eq!(recv(&mut rx).await, "boom");
        assert_eq!(recv(&mut rx).await, "survivor");
    }

    #[tokio::test]
    async fn test_failing_trigger_does_not_affect_others() {
        // "broken" has a command action with no command template: a
        // resolution-stage failure that aborts that trigger only.
        let broken_action = Action {
            kind: ActionKind::Command,
            command: None,
            job: None,
            extra: HashMap::new(),
        };
        let (dispatcher, mut rx) = dispatcher(vec![
            trigger("broken", "/hooks/x", true, vec![broken_action, job("unreached")]),
            trigger("healthy", "/hooks/x", true, vec![job("ran")]),
        ]);

        dispatcher.dispatch("/hooks/x", json!({}), HashMap::new(), HashMap::new());

        assert_eq!(recv(&mut rx).await, "ran");
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    // -------------------------------------------------------------------
    // Resolution and escaping
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_command_actions_resolve_escaped() {
        let (dispatcher, mut rx) = dispatcher(vec![trigger(
            "esc",
            "/hooks/x",
            true,
            vec![command("notify {{body.author}}"), job("tell {{body.author}}")],
        )]);

        dispatcher.dispatch(
            "/hooks/x",
            json!({"author": "O'Brien"}),
            HashMap::new(),
            HashMap::new(),
        );

        assert_eq!(recv(&mut rx).await, "notify 'O'\\''Brien'");
        assert_eq!(recv(&mut rx).await, "tell O'Brien");
    }

    #[tokio::test]
    async fn test_pass_through_fields_reach_executor() {
        let mut action = job("{{body.msg}}");
        action.extra.insert("channel".to_string(), json!("#deploys"));

        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        struct CaptureExecutor {
            tx: mpsc::UnboundedSender<Action>,
        }
        impl ActionExecutor for CaptureExecutor {
            async fn execute(
                &self,
                action: Action,
                _scope: ExecutionScope,
            ) -> Result<Option<String>, ExecuteError> {
                self.tx.send(action).unwrap();
                Ok(None)
            }
        }

        let dispatcher = ActionDispatcher::new(
            Arc::new(TriggerRegistry::from_triggers(vec![trigger(
                "t",
                "/hooks/x",
                true,
                vec![action],
            )])),
            Arc::new(CaptureExecutor { tx }),
            PathBuf::from("/srv/hooks"),
        );

        dispatcher.dispatch("/hooks/x", json!({"msg": "hi"}), HashMap::new(), HashMap::new());

        let received = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(received.template(), Some("hi"));
        assert_eq!(received.extra.get("channel"), Some(&json!("#deploys")));
    }

    #[tokio::test]
    async fn test_scope_carries_cwd_and_body() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ExecutionScope>();
        struct ScopeExecutor {
            tx: mpsc::UnboundedSender<ExecutionScope>,
        }
        impl ActionExecutor for ScopeExecutor {
            async fn execute(
                &self,
                _action: Action,
                scope: ExecutionScope,
            ) -> Result<Option<String>, ExecuteError> {
                self.tx.send(scope).unwrap();
                Ok(None)
            }
        }

        let dispatcher = ActionDispatcher::new(
            Arc::new(TriggerRegistry::from_triggers(vec![trigger(
                "t",
                "/hooks/x",
                true,
                vec![job("noop")],
            )])),
            Arc::new(ScopeExecutor { tx }),
            PathBuf::from("/srv/hooks"),
        );

        dispatcher.dispatch("/hooks/x", json!({"n": 1}), HashMap::new(), HashMap::new());

        let scope = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(scope.cwd, PathBuf::from("/srv/hooks"));
        assert_eq!(scope.data, json!({"n": 1}));
    }

    // -------------------------------------------------------------------
    // resolve_action
    // -------------------------------------------------------------------

    #[test]
    fn test_resolve_action_missing_template_errors() {
        let action = Action {
            kind: ActionKind::Command,
            command: None,
            job: Some("wrong field".to_string()),
            extra: HashMap::new(),
        };
        let ctx = RequestContext::default();
        let err = resolve_action("t", &action, &ctx).unwrap_err();
        assert!(matches!(err, DispatchError::MissingTemplate { .. }));
    }

    #[test]
    fn test_resolve_action_keeps_unrelated_fields() {
        let mut action = command("run {{query.ref}}");
        action.extra.insert("timeout".to_string(), json!(5));
        let ctx = RequestContext::new(
            json!(null),
            HashMap::from([("ref".to_string(), "main".to_string())]),
            HashMap::new(),
        );
        let resolved = resolve_action("t", &action, &ctx).unwrap();
        assert_eq!(resolved.template(), Some("run 'main'"));
        assert_eq!(resolved.extra.get("timeout"), Some(&json!(5)));
    }
}
