//! MongoDB query conditions
//!
//! Converts client-supplied filter columns into nested MongoDB filter
//! documents and paging parameters into sort/limit/skip.
//!
//! ## Usage
//!
//! ```no_run
//! use mgo_query::query::{PageOptions, RulerOptions, parse_params};
//!
//! let json_str = r#"{"page": 0, "limit": 10, "columns": [{"name": "age", "exp": ">", "value": 18}]}"#;
//! let params = parse_params(json_str).unwrap();
//! let filter = params
//!     .convert_to_mongo_filter(&RulerOptions::new().with_whitelist(["age"]))
//!     .unwrap();
//! let page = params.convert_to_page(&PageOptions::default());
//! assert!(filter.contains_key("age"));
//! assert_eq!(page.limit, 10);
//! ```

mod builder;
mod condition;
mod error;
mod page;
mod parser;
mod types;

pub use builder::{FilterNode, FilterTree, RulerOptions, ValidateFn, build_filter};
pub use condition::{Condition, OID_SUFFIX, PRIMARY_KEY, Predicate};
pub use error::QueryError;
pub use page::{
    DEFAULT_MAX_LIMIT, DEFAULT_PAGE_LIMIT, MIN_MAX_LIMIT, Page, PageOptions, PageSpec, parse_sort,
};
pub use parser::{MAX_QUERY_JSON_SIZE, parse_conditions, parse_params};
pub use types::{Column, Conditions, Logic, Operator, Params};
