//! Utility functions

pub mod document;
