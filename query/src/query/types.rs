//! Query parameter types
//!
//! Defines the request-side shapes (columns, params, conditions) and the
//! operator and logic vocabularies they use.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::QueryError;

/// Comparison operator of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    NotIn,
}

impl Operator {
    /// Look up an operator token exactly as written
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" | "=" => Some(Self::Eq),
            "neq" | "!=" => Some(Self::Neq),
            "gt" | ">" => Some(Self::Gt),
            "gte" | ">=" => Some(Self::Gte),
            "lt" | "<" => Some(Self::Lt),
            "lte" | "<=" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "in" => Some(Self::In),
            "nin" | "notin" | "not in" => Some(Self::NotIn),
            _ => None,
        }
    }

    /// Normalize a user token: empty means equal, matching ignores case
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            return Some(Self::Eq);
        }
        Self::from_token(&token.to_lowercase())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "nin",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a column combines with the next one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "and" | "&" | "&&" => Some(Self::And),
            "or" | "|" | "||" => Some(Self::Or),
            _ => None,
        }
    }

    /// Normalize a user token: empty means AND, matching ignores case
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            return Some(Self::And);
        }
        Self::from_token(&token.to_lowercase())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filter clause as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Field name
    #[serde(default)]
    pub name: String,
    /// Operator token, empty means equal
    #[serde(default)]
    pub exp: String,
    /// Operand; `null` or absent is treated as missing
    #[serde(default)]
    pub value: JsonValue,
    /// Logic token towards the next column, empty means AND
    #[serde(default)]
    pub logic: String,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        exp: impl Into<String>,
        value: impl Into<JsonValue>,
        logic: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            exp: exp.into(),
            value: value.into(),
            logic: logic.into(),
        }
    }

    /// Structural check shared by conversion and [`Conditions::check_valid`]
    pub(crate) fn check_valid(&self) -> Result<(), QueryError> {
        if self.name.is_empty() {
            return Err(QueryError::EmptyName);
        }
        if self.value.is_null() {
            return Err(QueryError::nil_value(&self.name));
        }
        Ok(())
    }
}

/// Paged query with filter columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Page number, starting at 0
    #[serde(default)]
    pub page: i64,
    /// Rows per page
    #[serde(default)]
    pub limit: i64,
    /// Comma-separated sort fields, `-` prefix for descending
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sort: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    /// Deprecated alias of `limit`, only read when `limit` is unset
    #[serde(default, skip_serializing_if = "is_zero")]
    pub size: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl Params {
    pub(crate) fn effective_limit(&self) -> i64 {
        if self.limit == 0 && self.size != 0 {
            self.size
        } else {
            self.limit
        }
    }
}

/// Bare list of filter columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Conditions {
    /// Check every column without converting it
    ///
    /// Operator and logic tokens must match the known spelling exactly.
    pub fn check_valid(&self) -> Result<(), QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::EmptyColumns);
        }

        for column in &self.columns {
            column.check_valid()?;
            if !column.exp.is_empty() && Operator::from_token(&column.exp).is_none() {
                return Err(QueryError::unknown_operator(&column.name, &column.exp));
            }
            if !column.logic.is_empty() && Logic::from_token(&column.logic).is_none() {
                return Err(QueryError::unknown_logic(&column.name, &column.logic));
            }
        }

        Ok(())
    }
}
