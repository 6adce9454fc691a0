//! Type expressions
//!
//! A type expression is a short string such as `"opt number or number array"` describing
//! the values accepted for one argument. It is decomposed outer to inner:
//!
//! 1. optional prefix: `opt <inner>` / `optional <inner>`
//! 2. union infix: `<left> or <right>` (the left side is the longest possible prefix, so
//!    `a or b or c` reads as `(a or b) or c`)
//! 3. array suffix: `<member> a` / `<member> arr` / `<member> array`, re-applied to the
//!    member so `num arr arr` is an array of arrays of numbers. The container is checked
//!    with whatever `array` resolves to; members are only checked for values that have
//!    elements, so an `array` override accepting e.g. records makes `T array` accept any
//!    record as is.
//! 4. otherwise a leaf name looked up in the [`MatcherRegistry`].
//!
//! The `opt`/`optional` and array keywords are case-insensitive; everything else is
//! case-sensitive. Parsing never fails: anything that is not a compound form is a leaf,
//! and an unknown leaf only rejects values at evaluation time.
//!
//! Parsed trees are interned in an [`ExprCache`] so a schema string is decomposed once.
use std::{collections::HashMap, fmt, sync::Arc};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use regex::Regex;
use strum::EnumIs;

use crate::{magic::ARRAY_MATCHER, registry::MatcherRegistry, value::Value};

static OPTIONAL_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:opt(?:ional)?) (.+)$").expect("valid optional pattern"));
static UNION_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+) or (.+)$").expect("valid union pattern"));
static ARRAY_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+) (?i:a(?:rr(?:ay)?)?)$").expect("valid array pattern"));

static GLOBAL_CACHE: Lazy<ExprCache> = Lazy::new(ExprCache::new);

/// Structure of a [`TypeExpr`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// A registry name; the name is the expression source.
    Leaf,
    Optional(Box<TypeExpr>),
    Union(Box<TypeExpr>, Box<TypeExpr>),
    ArrayOf(Box<TypeExpr>),
}

/// A decomposed type expression. Every node keeps its source text, which failure
/// messages quote verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    source: Box<str>,
    kind: ExprKind,
}

/// Result of evaluating a type expression against one value.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum Verdict {
    /// The value matches and occupies the argument slot.
    Accepted,
    /// An optional expression did not match a present value. Nothing is consumed and the
    /// value is left for the next schema entry.
    Skipped,
    /// Hard failure with its reason.
    Rejected(String),
}

impl Verdict {
    /// `true` unless rejected. Union branches and array members only care about this.
    #[inline]
    pub fn passes(&self) -> bool {
        !self.is_rejected()
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

impl TypeExpr {
    pub fn parse(source: &str) -> Self {
        let kind = if let Some(caps) = OPTIONAL_RX.captures(source) {
            ExprKind::Optional(Box::new(Self::parse(&caps[1])))
        } else if let Some(caps) = UNION_RX.captures(source) {
            ExprKind::Union(
                Box::new(Self::parse(&caps[1])),
                Box::new(Self::parse(&caps[2])),
            )
        } else if let Some(caps) = ARRAY_RX.captures(source) {
            ExprKind::ArrayOf(Box::new(Self::parse(&caps[1])))
        } else {
            ExprKind::Leaf
        };

        Self {
            source: source.into(),
            kind,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// `true` when the outermost form is `opt ...`.
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, ExprKind::Optional(_))
    }

    /// Evaluate this expression for the argument `arg_name` holding `value`.
    pub fn evaluate(&self, registry: &MatcherRegistry, arg_name: &str, value: &Value) -> Verdict {
        match &self.kind {
            ExprKind::Optional(inner) => {
                if inner.evaluate(registry, arg_name, value).passes() || value.is_nullish() {
                    Verdict::Accepted
                } else {
                    Verdict::Skipped
                }
            }
            ExprKind::Union(left, right) => {
                if left.evaluate(registry, arg_name, value).passes()
                    || right.evaluate(registry, arg_name, value).passes()
                {
                    Verdict::Accepted
                } else {
                    Verdict::Rejected(format!(
                        "`{}` is neither a {} nor {}",
                        arg_name, left.source, right.source
                    ))
                }
            }
            ExprKind::ArrayOf(member) => {
                let container = registry.resolve(ARRAY_MATCHER);
                if !container.matches(value) {
                    return Verdict::Rejected(format!("`{}` is not {}", arg_name, container.name()));
                }

                // The first offending element decides; the rest are not looked at. Values
                // without elements have no members to check.
                let elements = value.elements().unwrap_or_default();
                if elements
                    .iter()
                    .any(|element| !member.evaluate(registry, arg_name, element).passes())
                {
                    Verdict::Rejected(format!(
                        "`{}` element is falsy or not a {}",
                        arg_name, member.source
                    ))
                } else {
                    Verdict::Accepted
                }
            }
            ExprKind::Leaf => {
                let resolution = registry.resolve(&self.source);
                if resolution.matches(value) {
                    Verdict::Accepted
                } else {
                    Verdict::Rejected(format!("`{}` is not {}", arg_name, resolution.name()))
                }
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Interner for parsed type expressions, keyed by source string.
///
/// Readers share the lock; parsing a new string upgrades to a write lock only for the
/// insertion.
#[derive(Default)]
pub struct ExprCache {
    exprs: RwLock<HashMap<Box<str>, Arc<TypeExpr>>>,
}

impl ExprCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by [`crate::schema::Schema`] builders that take no cache.
    ///
    /// Entries live until [`ExprCache::clear`]; every distinct expression string parsed
    /// through it stays resident. Schemas built from untrusted or generated input should
    /// go through a cache of their own (`Schemas::from_value_in`).
    pub fn global() -> &'static ExprCache {
        &GLOBAL_CACHE
    }

    /// Drop every cached tree. Schemas already built keep theirs.
    pub fn clear(&self) {
        let mut exprs = self.exprs.write();
        debug!("Clearing {} cached type expressions", exprs.len());
        exprs.clear();
    }

    pub fn get(&self, source: &str) -> Option<Arc<TypeExpr>> {
        self.exprs.read().get(source).cloned()
    }

    /// Return the cached tree for `source`, parsing and inserting it on first use.
    pub fn search_or_insert(&self, source: &str) -> Arc<TypeExpr> {
        let exprs = self.exprs.upgradable_read();
        if let Some(expr) = exprs.get(source) {
            return Arc::clone(expr);
        }

        let expr = Arc::new(TypeExpr::parse(source));
        debug!("Parsed type expression `{}` into {:?}", source, expr.kind);

        let mut exprs = RwLockUpgradableReadGuard::upgrade(exprs);
        Arc::clone(exprs.entry(source.into()).or_insert(expr))
    }

    pub fn len(&self) -> usize {
        self.exprs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.read().is_empty()
    }
}
