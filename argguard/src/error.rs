use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, EnumIs, Error)]
pub enum GuardError {
    /// The call values are neither a sequence, an arguments capture nor a record.
    #[error("`arguments` argument should be function arguments, array or object, got {found}")]
    InvalidCallValues { found: &'static str },

    /// A schema given as a dynamic value is neither a record nor a list.
    #[error("`schema` should be an array or an object, got {found}")]
    InvalidSchema { found: &'static str },

    /// A schema entry does not hold a type-expression string.
    #[error("`schema` entry `{name}` should be a type expression string, got {found}")]
    InvalidTypeExpression { name: String, found: &'static str },

    /// A schema list (possibly nested) without any candidate.
    #[error("`schema` list is empty, called with empty schema list")]
    EmptySchemaList,

    /// A matcher set given as a dynamic value is not a record of alias names.
    #[error("`checkers` argument must to be an object of alias names, got {found}")]
    InvalidMatcherSet { found: &'static str },

    /// Validation failure raised at the guard boundary. Displays as the bare reason.
    #[error("{reason}")]
    Validation { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },
}

impl GuardError {
    /// Returns `true` for errors caused by misuse of the engine itself, as opposed to
    /// data that failed validation or configuration that could not be loaded.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            GuardError::InvalidCallValues { .. }
                | GuardError::InvalidSchema { .. }
                | GuardError::InvalidTypeExpression { .. }
                | GuardError::EmptySchemaList
                | GuardError::InvalidMatcherSet { .. }
        )
    }

    /// The validation reason, if this is a validation failure.
    pub fn reason(&self) -> Option<&str> {
        match self {
            GuardError::Validation { reason } => Some(reason),
            _ => None,
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
