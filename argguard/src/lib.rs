//! Runtime argument validation against declarative type-expression schemas.
//!
//! A schema maps argument names, in order, to small type expressions such as
//! `"opt string or number array"`. A [`Guard`] matches the values of a call against one
//! or several schemas and returns the validated arguments by name, or the reason the
//! call does not fit.
//!
//! ```rust
//! use argguard::{schema, Guard, Value};
//!
//! let guard = Guard::new();
//! let values = Value::Array(vec!["hi".into(), Value::Array(vec![1.into(), 2.into()])]);
//! let parsed = guard
//!     .check(&values, &schema! { one: "string", two: "number array" }.into())
//!     .unwrap();
//! assert_eq!(parsed["one"], Value::from("hi"));
//!
//! let err = guard
//!     .check(&Value::Array(vec!["x".into()]), &schema! { one: "number" }.into())
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "`one` is not number");
//! ```

pub mod call;
pub mod config;
pub mod error;
pub mod expr;
pub mod guard;
pub mod magic;
pub mod matching;
pub mod registry;
pub mod schema;
pub mod value;

pub use config::GuardConfig;
pub use error::{GuardError, GuardResult};
pub use guard::{Assertion, Guard, LogAssertion, RaiseAssertion};
pub use matching::{MatchResult, ParsedArgs};
pub use registry::{Matcher, MatcherRegistry, MatcherSet};
pub use schema::{Schema, Schemas};
pub use value::{Record, Value};
