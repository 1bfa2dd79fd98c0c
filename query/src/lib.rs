//! MongoDB query conditions for CRUD services
//!
//! Turns client-supplied filter columns and paging parameters into MongoDB
//! filter, sort, limit and skip values. See [`query`] for the library API;
//! the `mgo-query` binary wraps it for the command line.

pub mod app;
pub mod core;
pub mod query;
pub mod utils;
