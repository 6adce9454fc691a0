//! Schemas
//!
//! A [`Schema`] is an ordered mapping from argument name to type expression; the order
//! is the order in which call values are consumed. [`Schemas`] is what the resolver
//! consumes: a single schema or a list of candidates, where a candidate may itself be a
//! list.
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    error::{GuardError, GuardResult},
    expr::{ExprCache, TypeExpr},
    magic::{ARGUMENTS_OBJECT_KEY, PLAIN_OBJECT_MATCHER},
    value::{Record, Value},
};

/// Build a [`Schema`] from `name: "type expression"` pairs.
///
/// ```rust
/// let schema = argguard::schema! { one: "string", two: "opt number array" };
/// assert_eq!(schema.len(), 2);
/// ```
#[macro_export]
macro_rules! schema {
    ( $( $name:ident : $expr:expr ),* $(,)? ) => {
        $crate::schema::Schema::new() $( .arg(stringify!($name), $expr) )*
    };
}

/// Ordered argument names and their parsed type expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: IndexMap<String, Arc<TypeExpr>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reserved single-entry schema telling the guard to accept a record and validate
    /// it again as call values of its own.
    pub fn arguments_object() -> Self {
        Self::new().arg(ARGUMENTS_OBJECT_KEY, PLAIN_OBJECT_MATCHER)
    }

    pub fn is_arguments_object(&self) -> bool {
        self.entries.len() == 1 && self.entries.contains_key(ARGUMENTS_OBJECT_KEY)
    }

    /// Append an argument. Redeclaring a name replaces its expression in place.
    pub fn arg(mut self, name: impl Into<String>, expr: &str) -> Self {
        self.insert(name, expr);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, expr: &str) {
        self.insert_in(ExprCache::global(), name, expr);
    }

    /// Like [`Schema::insert`], interning the parsed expression in `cache`.
    pub fn insert_in(&mut self, cache: &ExprCache, name: impl Into<String>, expr: &str) {
        self.entries.insert(name.into(), cache.search_or_insert(expr));
    }

    /// Build a schema from a record of type-expression strings.
    pub fn from_record(record: &Record) -> GuardResult<Self> {
        Self::from_record_in(record, ExprCache::global())
    }

    pub fn from_record_in(record: &Record, cache: &ExprCache) -> GuardResult<Self> {
        let mut schema = Self::new();
        for (name, expr) in record {
            match expr {
                Value::String(expr) => schema.insert_in(cache, name.clone(), expr),
                other => {
                    return Err(GuardError::InvalidTypeExpression {
                        name: name.clone(),
                        found: other.kind(),
                    });
                }
            }
        }
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&TypeExpr> {
        self.entries.get(name).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeExpr)> {
        self.entries.iter().map(|(name, expr)| (name.as_str(), expr.as_ref()))
    }
}

impl<N: Into<String>, E: AsRef<str>> FromIterator<(N, E)> for Schema {
    fn from_iter<I: IntoIterator<Item = (N, E)>>(iter: I) -> Self {
        let mut schema = Self::new();
        for (name, expr) in iter {
            schema.insert(name, expr.as_ref());
        }
        schema
    }
}

/// One schema or a list of candidate schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schemas {
    Single(Schema),
    /// Candidates tried independently; see [`crate::matching::resolve_schemas`].
    AnyOf(Vec<Schemas>),
}

impl Schemas {
    /// Interpret a dynamic value: a record is a schema, a list is a list of candidates
    /// (lists may nest). Emptiness of lists is only checked when resolving.
    pub fn from_value(value: &Value) -> GuardResult<Self> {
        Self::from_value_in(value, ExprCache::global())
    }

    /// Like [`Schemas::from_value`], parsing type expressions into `cache` instead of the
    /// process-wide one.
    pub fn from_value_in(value: &Value, cache: &ExprCache) -> GuardResult<Self> {
        match value {
            Value::Object(record) => Schema::from_record_in(record, cache).map(Schemas::Single),
            Value::Array(items) => items
                .iter()
                .map(|item| Schemas::from_value_in(item, cache))
                .collect::<GuardResult<Vec<_>>>()
                .map(Schemas::AnyOf),
            other => Err(GuardError::InvalidSchema { found: other.kind() }),
        }
    }

    /// Candidates `schemas` followed by the arguments-object marker.
    pub fn or_arguments_object(self) -> Self {
        match self {
            Schemas::AnyOf(mut list) => {
                list.push(Schemas::Single(Schema::arguments_object()));
                Schemas::AnyOf(list)
            }
            single => Schemas::AnyOf(vec![single, Schemas::Single(Schema::arguments_object())]),
        }
    }
}

impl From<Schema> for Schemas {
    fn from(value: Schema) -> Self {
        Schemas::Single(value)
    }
}

impl From<Vec<Schema>> for Schemas {
    fn from(value: Vec<Schema>) -> Self {
        Schemas::AnyOf(value.into_iter().map(Schemas::Single).collect())
    }
}

impl From<Vec<Schemas>> for Schemas {
    fn from(value: Vec<Schemas>) -> Self {
        Schemas::AnyOf(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_keeps_declaration_order() {
        let schema = schema! { zeta: "string", alpha: "opt number", mid: "num arr" };
        let names: Vec<_> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(schema.get("alpha").unwrap().is_optional());
    }

    #[test]
    fn shared_sources_share_parsed_trees() {
        let a = Schema::new().arg("x", "opt str or num");
        let b = Schema::new().arg("y", "opt str or num");
        assert!(Arc::ptr_eq(&a.entries["x"], &b.entries["y"]));
    }

    #[test]
    fn from_value_accepts_records_and_nested_lists() {
        let one: Value = [("one", "string")].into_iter().collect();
        let nested = Value::Array(vec![Value::Array(vec![one.clone()]), one.clone()]);

        assert_eq!(
            Schemas::from_value(&one).unwrap(),
            Schemas::Single(schema! { one: "string" })
        );
        let Schemas::AnyOf(list) = Schemas::from_value(&nested).unwrap() else {
            panic!("expected a schema list");
        };
        assert_eq!(list.len(), 2);
        assert!(matches!(&list[0], Schemas::AnyOf(inner) if inner.len() == 1));
        assert_eq!(Schemas::from_value(&Value::Array(vec![])).unwrap(), Schemas::AnyOf(vec![]));
    }

    #[test]
    fn from_value_in_uses_the_given_cache() {
        let cache = ExprCache::new();
        let value: Value = [("one", "opt from_value_in_only arr")].into_iter().collect();
        let schemas = Schemas::from_value_in(&Value::Array(vec![value.clone(), value]), &cache)
            .unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.get("opt from_value_in_only arr").is_some());
        assert!(ExprCache::global().get("opt from_value_in_only arr").is_none());
        assert!(matches!(schemas, Schemas::AnyOf(list) if list.len() == 2));
    }

    #[test]
    fn from_value_rejects_other_shapes() {
        for value in [Value::Null, Value::from("string"), Value::from(1), Value::Undefined] {
            let err = Schemas::from_value(&value).unwrap_err();
            assert!(err.is_invalid_schema(), "{err}");
            assert!(err.to_string().contains("schema"));
        }

        let bad: Value = [("one", 1)].into_iter().collect();
        assert!(Schemas::from_value(&bad).unwrap_err().is_invalid_type_expression());
    }

    #[test]
    fn arguments_object_marker() {
        assert!(Schema::arguments_object().is_arguments_object());
        assert!(!schema! { one: "Object" }.is_arguments_object());

        let Schemas::AnyOf(list) = Schemas::from(schema! { one: "str" }).or_arguments_object() else {
            panic!("expected a schema list");
        };
        assert!(matches!(&list[1], Schemas::Single(s) if s.is_arguments_object()));
    }
}
