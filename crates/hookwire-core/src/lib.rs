//! Trigger/action dispatch engine for Hookwire.
//!
//! This crate contains the "brain" of the hook system:
//! - `template` -- placeholder substitution with context-sensitive escaping
//! - `registry` -- path-keyed trigger index, loaded once from the hooks file
//! - `executor` -- the `ActionExecutor` port the execution backend implements
//! - `dispatcher` -- fire-and-forget dispatch with per-action error isolation
//!
//! It depends only on `hookwire-types` -- never on an HTTP framework or any
//! execution backend.

pub mod dispatcher;
pub mod executor;
pub mod registry;
pub mod template;
