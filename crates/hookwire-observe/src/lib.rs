//! Observability setup for Hookwire.
//!
//! The dispatch engine is deliberately one-way and best-effort: every
//! failure terminates in a log line, so structured logging is the only
//! externally visible state. This crate owns subscriber initialization.

pub mod tracing_setup;
