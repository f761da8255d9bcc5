//! Shared domain types for Hookwire.
//!
//! This crate contains the core domain types used across the Hookwire engine:
//! Trigger, Action, RequestContext, ExecutionScope, and their associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod error;
pub mod request;
pub mod trigger;
