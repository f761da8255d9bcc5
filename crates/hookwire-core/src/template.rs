//! Placeholder substitution with context-sensitive escaping.
//!
//! Templates contain `{{source}}` or `{{source.field}}` placeholders where
//! `source` is one of `body`, `query`, `headers` and both tokens are
//! identifiers (letters, digits, underscore). Resolution is pure: the same
//! template, context, and escape mode always produce the same string.
//!
//! Unknown sources, malformed placeholders, and absent fields pass through
//! as literal text. This is deliberate: a bad placeholder surfaces visibly
//! in the output instead of silently disappearing or raising.

use hookwire_types::request::RequestContext;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Substitute placeholders in `template` using `ctx`.
///
/// When `escape` is true every substituted value is wrapped as a single
/// shell argument via [`shell_quote`]. Unresolved placeholders are never
/// escaped -- they stay literal. The escape mode is chosen by the caller
/// from the action kind, never from template content.
pub fn resolve(template: &str, ctx: &RequestContext, escape: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        match parse_placeholder(after) {
            Some((source, field, consumed)) => {
                let literal = &rest[open..open + 2 + consumed];
                match lookup(ctx, source, field) {
                    Some(value) => {
                        if escape {
                            out.push_str(&shell_quote(&value));
                        } else {
                            out.push_str(&value);
                        }
                    }
                    // Unknown source or absent field: literal passthrough.
                    None => out.push_str(literal),
                }
                rest = &rest[open + 2 + consumed..];
            }
            // Not a placeholder; emit the braces and rescan after them.
            None => {
                out.push_str("{{");
                rest = &rest[open + 2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Wrap `value` for safe inclusion as a single shell argument.
///
/// The value is enclosed in single quotes; each embedded single quote is
/// replaced by `'\''` (close the quote, emit an escaped quote, reopen).
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

// ---------------------------------------------------------------------------
// Placeholder scanner
// ---------------------------------------------------------------------------

/// Parse `source[.field]}}` at the start of `input` (the text immediately
/// after an opening `{{`).
///
/// Returns the source token, optional field token, and the number of bytes
/// consumed including the closing `}}`. Returns `None` when the text does
/// not match the placeholder grammar.
fn parse_placeholder(input: &str) -> Option<(&str, Option<&str>, usize)> {
    let source_len = ident_len(input);
    if source_len == 0 {
        return None;
    }
    let source = &input[..source_len];
    let mut pos = source_len;

    let field = if input[pos..].starts_with('.') {
        let field_len = ident_len(&input[pos + 1..]);
        if field_len == 0 {
            return None;
        }
        let field = &input[pos + 1..pos + 1 + field_len];
        pos += 1 + field_len;
        Some(field)
    } else {
        None
    };

    if !input[pos..].starts_with("}}") {
        return None;
    }
    Some((source, field, pos + 2))
}

/// Length in bytes of the identifier prefix of `input`.
fn ident_len(input: &str) -> usize {
    input
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count()
}

// ---------------------------------------------------------------------------
// Value extraction
// ---------------------------------------------------------------------------

/// Extract the substitution value for `source[.field]` from the context.
///
/// `None` means the placeholder stays literal: unknown source, or a field
/// absent from the source value.
fn lookup(ctx: &RequestContext, source: &str, field: Option<&str>) -> Option<String> {
    match source {
        "body" => match field {
            None => Some(stringify(&ctx.body)),
            Some(f) => ctx.body.get(f).map(stringify),
        },
        "query" => match field {
            None => Some(stringify_map(&ctx.query)),
            Some(f) => ctx.query.get(f).cloned(),
        },
        "headers" => match field {
            None => Some(stringify_map(&ctx.headers)),
            Some(f) => ctx.headers.get(f).cloned(),
        },
        _ => None,
    }
}

/// Convert a JSON value to its substitution string: strings verbatim,
/// everything else as canonical indented JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Serialize a whole string map the same way non-string body values are.
fn stringify_map(map: &std::collections::HashMap<String, String>) -> String {
    serde_json::to_string_pretty(map).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
