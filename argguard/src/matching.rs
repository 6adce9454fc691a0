//! Schema matching and multi-schema resolution
//!
//! [`match_schema`] walks one schema against the call values, [`resolve_schemas`] runs it
//! over every candidate of a schema list and keeps the most relevant outcome. Neither
//! raises validation failures: they are reported in the returned [`MatchResult`] and
//! only the guard boundary decides what a failure means.
use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    call::{CallView, Slot},
    error::{GuardError, GuardResult},
    expr::Verdict,
    magic::PREVIEW_MAX_CHARS,
    registry::MatcherRegistry,
    schema::{Schema, Schemas},
    value::Value,
};

/// Validated arguments keyed by schema name, in schema order.
pub type ParsedArgs = IndexMap<String, Value>;

/// Outcome of matching call values against a schema (or the best of several).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub parsed: ParsedArgs,
    /// Reason of the first failure, if any.
    pub fail: Option<String>,
    /// Call-value slots consumed before success or the first failure. Optional entries
    /// evaluated past the end of the call values count as well.
    pub consumed: usize,
}

impl MatchResult {
    pub fn is_success(&self) -> bool {
        self.fail.is_none()
    }
}

/// Quote `value` for an "unexpected argument" message.
fn preview(value: &Value) -> String {
    let text = value.to_string();
    match text.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((cut, _)) => format!("{}..", &text[..cut]),
        None => text,
    }
}

fn unexpected(call: &CallView<'_>, position: usize) -> String {
    match call.slot(position) {
        Some(Slot::Key(key)) => format!("Unexpected `{}` argument", key),
        _ => format!("Unexpected argument \"{}\"", preview(call.value_at(position))),
    }
}

/// Walk `schema` in declaration order against `call`.
///
/// Each entry sees the value under the cursor (`Undefined` past the end). Accepted values
/// are recorded and advance the cursor, skipped optionals leave it in place, and the first
/// rejection stops the walk. In strict mode a successful walk that leaves call values
/// behind fails on the first leftover one.
pub fn match_schema(
    registry: &MatcherRegistry,
    schema: &Schema,
    call: &CallView<'_>,
    strict: bool,
) -> MatchResult {
    let mut parsed = ParsedArgs::with_capacity(schema.len());
    let mut cursor = 0usize;
    let mut fail = None;

    for (name, expr) in schema.iter() {
        let value = call.value_at(cursor);
        match expr.evaluate(registry, name, value) {
            Verdict::Accepted => {
                parsed.insert(name.to_string(), value.clone());
                cursor += 1;
            }
            Verdict::Skipped => {
                trace!("Optional `{}` ({}) skipped at slot {}", name, expr, cursor);
            }
            Verdict::Rejected(reason) => {
                trace!("`{}` ({}) rejected at slot {}: {}", name, expr, cursor, reason);
                fail = Some(reason);
                break;
            }
        }
    }

    if strict && fail.is_none() && cursor < call.len() {
        fail = Some(unexpected(call, cursor));
    }

    MatchResult {
        parsed,
        fail,
        consumed: cursor,
    }
}

/// Resolve call values against one schema or a list of candidates.
///
/// Every candidate is matched independently against the same call values. Candidates
/// are ranked by consumed count, highest first, keeping list order among ties; the first
/// successful one wins, and when all fail the one that progressed furthest is returned.
/// Empty lists, at any nesting level, are usage errors.
pub fn resolve_schemas(
    registry: &MatcherRegistry,
    schemas: &Schemas,
    call: &CallView<'_>,
    strict: bool,
) -> GuardResult<MatchResult> {
    let candidates = match schemas {
        Schemas::Single(schema) => return Ok(match_schema(registry, schema, call, strict)),
        Schemas::AnyOf(candidates) if candidates.is_empty() => {
            return Err(GuardError::EmptySchemaList);
        }
        Schemas::AnyOf(candidates) => candidates,
    };

    let mut results = candidates
        .iter()
        .map(|candidate| resolve_schemas(registry, candidate, call, strict))
        .collect::<GuardResult<Vec<_>>>()?;

    // `sort_by` is stable: equal counts keep list order.
    results.sort_by(|a, b| b.consumed.cmp(&a.consumed));

    let picked = results.iter().position(MatchResult::is_success).unwrap_or(0);
    debug!(
        "Resolved {} candidate schemas, picked one consuming {} of {} values ({})",
        results.len(),
        results[picked].consumed,
        call.len(),
        results[picked].fail.as_deref().unwrap_or("success")
    );
    Ok(results.swap_remove(picked))
}
