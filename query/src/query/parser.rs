//! Query input parsing
//!
//! Decodes JSON query documents with a size bound.

use serde::de::DeserializeOwned;

use super::error::QueryError;
use super::types::{Conditions, Params};

/// Maximum size of query JSON in bytes (64KB)
pub const MAX_QUERY_JSON_SIZE: usize = 64 * 1024;

fn parse_json<T: DeserializeOwned>(json_str: &str) -> Result<T, QueryError> {
    if json_str.len() > MAX_QUERY_JSON_SIZE {
        return Err(QueryError::InvalidInput(format!(
            "query JSON exceeds maximum size of {} bytes",
            MAX_QUERY_JSON_SIZE
        )));
    }

    serde_json::from_str(json_str).map_err(|e| QueryError::InvalidInput(e.to_string()))
}

/// Parse a paged query document
pub fn parse_params(json_str: &str) -> Result<Params, QueryError> {
    parse_json(json_str)
}

/// Parse a bare conditions document
pub fn parse_conditions(json_str: &str) -> Result<Conditions, QueryError> {
    parse_json(json_str)
}
