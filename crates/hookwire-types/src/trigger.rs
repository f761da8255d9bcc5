//! Trigger and action domain types for Hookwire.
//!
//! A `Trigger` binds a watch path to an ordered sequence of `Action`s. The
//! hooks file is an ordered list of trigger records; both representations
//! (YAML on disk, in-memory construction for tests) deserialize into these
//! types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// A named binding from a watch path to an ordered sequence of actions.
///
/// Declaration order is significant: triggers sharing a path fire in file
/// order, and each trigger's actions run strictly in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    /// Human-readable identifier, used in log lines.
    pub name: String,
    /// Routing key; matched by exact string equality against an inbound
    /// request path.
    pub watch_path: String,
    /// Disabled triggers never enter the registry index.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ordered list of actions to run when the trigger fires.
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_enabled() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The destination an action's resolved template is handed to.
///
/// The kind decides the escaping policy at dispatch time: `Command` templates
/// are rendered as shell-safe single-quoted arguments, `Job` templates are
/// rendered verbatim because they become conversational text for a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Shell command execution.
    Command,
    /// Conversational agent job. The default when `type` is absent.
    #[default]
    Job,
}

impl ActionKind {
    /// The field name the action's template lives under, matching the wire
    /// representation (`command` or `job`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Command => "command",
            ActionKind::Job => "job",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work within a trigger.
///
/// Carries a template field named after its kind plus arbitrary pass-through
/// fields that the engine never interprets -- they are forwarded untouched to
/// the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// The action kind (`command` or `job`). Absent means `job`.
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    /// Shell command template, consulted when `kind` is `Command`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Conversational job template, consulted when `kind` is `Job`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    /// Opaque pass-through fields consumed by the executor.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Action {
    /// The template field matching this action's kind, if present.
    pub fn template(&self) -> Option<&str> {
        match self.kind {
            ActionKind::Command => self.command.as_deref(),
            ActionKind::Job => self.job.as_deref(),
        }
    }

    /// Replace the template field matching this action's kind.
    pub fn set_template(&mut self, rendered: String) {
        match self.kind {
            ActionKind::Command => self.command = Some(rendered),
            ActionKind::Job => self.job = Some(rendered),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
