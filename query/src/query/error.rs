//! Error type for query conversion
//!
//! Every variant is a client mistake in the submitted conditions. Callers
//! surface them as "bad request" failures, using [`QueryError::code`] as the
//! machine-readable error code.

use thiserror::Error;

/// Errors raised while converting columns into a MongoDB filter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Column has no field name
    #[error("field 'name' cannot be empty")]
    EmptyName,

    /// Column value is missing or null
    #[error("field 'value' of column '{name}' cannot be nil")]
    NilValue { name: String },

    /// Column name is not in the configured whitelist
    #[error("field name '{name}' is not allowed")]
    DisallowedName { name: String },

    /// Operator token is not recognized
    #[error("unsupported exp type '{exp}' on column '{name}'")]
    UnknownOperator { name: String, exp: String },

    /// Logic token is not recognized
    #[error("unknown logic type '{logic}' on column '{name}'")]
    UnknownLogic { name: String, logic: String },

    /// `in`/`nin` received a value that is not a comma-separated string
    #[error("invalid value type '{value}' on column '{name}': '{exp}' expects a comma-separated string")]
    InvalidSetValue {
        name: String,
        exp: String,
        value: String,
    },

    /// Caller-supplied validate hook rejected the column list
    #[error("column validation failed: {0}")]
    ValidationFailed(String),

    /// Condition list without any column
    #[error("field 'columns' cannot be empty")]
    EmptyColumns,

    /// Input document could not be decoded
    #[error("invalid query input: {0}")]
    InvalidInput(String),
}

impl QueryError {
    pub(crate) fn nil_value(name: &str) -> Self {
        Self::NilValue {
            name: name.to_string(),
        }
    }

    pub(crate) fn disallowed_name(name: &str) -> Self {
        Self::DisallowedName {
            name: name.to_string(),
        }
    }

    pub(crate) fn unknown_operator(name: &str, exp: &str) -> Self {
        Self::UnknownOperator {
            name: name.to_string(),
            exp: exp.to_string(),
        }
    }

    pub(crate) fn unknown_logic(name: &str, logic: &str) -> Self {
        Self::UnknownLogic {
            name: name.to_string(),
            logic: logic.to_string(),
        }
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_FILTER_COLUMN",
            Self::NilValue { .. } => "MISSING_FILTER_VALUE",
            Self::DisallowedName { .. } => "INVALID_FILTER_COLUMN",
            Self::UnknownOperator { .. } => "INVALID_FILTER_OPERATOR",
            Self::UnknownLogic { .. } => "INVALID_FILTER_LOGIC",
            Self::InvalidSetValue { .. } => "INVALID_FILTER_VALUE",
            Self::ValidationFailed(_) => "FILTER_VALIDATION_FAILED",
            Self::EmptyColumns => "EMPTY_FILTER",
            Self::InvalidInput(_) => "INVALID_FILTER_JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_offending_column() {
        let err = QueryError::unknown_operator("x", "between");
        assert_eq!(err.to_string(), "unsupported exp type 'between' on column 'x'");

        let err = QueryError::disallowed_name("b");
        assert_eq!(err.to_string(), "field name 'b' is not allowed");
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            QueryError::EmptyName,
            QueryError::nil_value("a"),
            QueryError::disallowed_name("a"),
            QueryError::unknown_operator("a", "?"),
            QueryError::unknown_logic("a", "?"),
            QueryError::InvalidSetValue {
                name: "a".into(),
                exp: "in".into(),
                value: "1".into(),
            },
            QueryError::ValidationFailed("nope".into()),
            QueryError::EmptyColumns,
            QueryError::InvalidInput("eof".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(QueryError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
