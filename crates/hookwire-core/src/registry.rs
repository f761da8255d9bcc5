//! Path-keyed trigger registry, loaded once from the hooks file.
//!
//! The registry is constructed at process start and read-only afterwards:
//! there is no mutation API, so concurrent dispatches share it behind an
//! `Arc` without locking. An absent hooks file is not an error -- the
//! registry is simply empty.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use hookwire_types::error::ConfigError;
use hookwire_types::trigger::Trigger;

/// Immutable index from watch path to the ordered triggers registered on it.
///
/// Declaration order is preserved both across triggers sharing a path and
/// within each trigger's action list. Disabled triggers are excluded at
/// build time and can never match.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    routes: HashMap<String, Vec<Trigger>>,
}

impl TriggerRegistry {
    /// Load the registry from a hooks file.
    ///
    /// An absent file yields an empty registry (logged, not an error). A
    /// present file must parse as an ordered list of trigger records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no hooks file found, trigger registry is empty");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let triggers: Vec<Trigger> =
            serde_yaml_ng::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self::from_triggers(triggers))
    }

    /// Build the registry from an in-memory trigger list.
    ///
    /// This is the seam tests and embedders use instead of a hooks file;
    /// it applies the same enabled filter, ordering, and load logging.
    pub fn from_triggers(triggers: Vec<Trigger>) -> Self {
        let mut routes: HashMap<String, Vec<Trigger>> = HashMap::new();

        for trigger in triggers {
            if !trigger.enabled {
                tracing::debug!(
                    name = %trigger.name,
                    path = %trigger.watch_path,
                    "skipping disabled trigger"
                );
                continue;
            }

            let kinds: BTreeSet<&str> = trigger.actions.iter().map(|a| a.kind.as_str()).collect();
            tracing::info!(
                name = %trigger.name,
                path = %trigger.watch_path,
                actions = %kinds.into_iter().collect::<Vec<_>>().join(", "),
                "registered trigger"
            );

            routes
                .entry(trigger.watch_path.clone())
                .or_default()
                .push(trigger);
        }

        Self { routes }
    }

    /// Triggers registered on `path`, in declaration order.
    ///
    /// Exact string match only; no glob or wildcard semantics. An unmatched
    /// path returns an empty slice.
    pub fn lookup(&self, path: &str) -> &[Trigger] {
        self.routes.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any trigger is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total number of registered (enabled) triggers.
    pub fn trigger_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// All watch paths with at least one trigger.
    pub fn paths(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
