//! MongoDB filter builder
//!
//! Groups normalized columns into a nested AND/OR tree and renders it as a
//! filter document. The logic token of column `i` joins it with column
//! `i + 1`; the last column's logic is validated but never consulted.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use bson::{Bson, Document};

use super::condition::Predicate;
use super::error::QueryError;
use super::types::{Column, Conditions, Logic, Params};

/// Hook run over the raw column list before any conversion
pub type ValidateFn = Arc<dyn Fn(&[Column]) -> Result<(), String> + Send + Sync>;

/// Options controlling which columns are accepted
#[derive(Clone, Default)]
pub struct RulerOptions {
    whitelist: Option<HashSet<String>>,
    validate_fn: Option<ValidateFn>,
}

impl RulerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only allow these column names
    pub fn with_whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Run `f` over the raw columns first; an `Err` aborts the conversion
    pub fn with_validate_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Column]) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate_fn = Some(Arc::new(f));
        self
    }

    pub fn whitelist(&self) -> Option<&HashSet<String>> {
        self.whitelist.as_ref()
    }
}

impl fmt::Debug for RulerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulerOptions")
            .field("whitelist", &self.whitelist)
            .field("validate_fn", &self.validate_fn.is_some())
            .finish()
    }
}

/// Node of a filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(Predicate),
    /// All children must match
    And(Vec<FilterNode>),
    /// Any child must match
    Or(Vec<FilterNode>),
}

impl FilterNode {
    pub fn to_document(&self) -> Document {
        match self {
            Self::Leaf(predicate) => predicate.to_document(),
            Self::And(children) => group_document("$and", children),
            Self::Or(children) => group_document("$or", children),
        }
    }
}

fn group_document(key: &str, children: &[FilterNode]) -> Document {
    let docs: Vec<Bson> = children
        .iter()
        .map(|child| Bson::Document(child.to_document()))
        .collect();
    let mut doc = Document::new();
    doc.insert(key, docs);
    doc
}

/// Result of a conversion; empty matches every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTree {
    root: Option<FilterNode>,
}

impl FilterTree {
    pub fn root(&self) -> Option<&FilterNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn to_document(&self) -> Document {
        self.root
            .as_ref()
            .map(FilterNode::to_document)
            .unwrap_or_default()
    }
}

/// How a column list is combined
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Grouping {
    /// Zero or one column
    Single,
    AllAnd,
    AllOr,
    /// Contiguous runs, each closed by an OR-marked column
    Mixed(Vec<Vec<usize>>),
}

pub(crate) fn grouping(logics: &[Logic]) -> Grouping {
    let n = logics.len();
    if n <= 1 {
        return Grouping::Single;
    }

    let or_indexes: Vec<usize> = logics[..n - 1]
        .iter()
        .enumerate()
        .filter(|(_, logic)| **logic == Logic::Or)
        .map(|(i, _)| i)
        .collect();

    if or_indexes.is_empty() {
        return Grouping::AllAnd;
    }
    if or_indexes.len() == n - 1 {
        return Grouping::AllOr;
    }

    let mut runs: Vec<Vec<usize>> = Vec::with_capacity(or_indexes.len() + 1);
    let mut start = 0;
    for index in or_indexes {
        runs.push((start..=index).collect());
        start = index + 1;
    }
    runs.push((start..n).collect());
    Grouping::Mixed(runs)
}

fn run_node(run: Vec<FilterNode>) -> FilterNode {
    match <[FilterNode; 1]>::try_from(run) {
        Ok([node]) => node,
        Err(run) => FilterNode::And(run),
    }
}

/// Convert columns into a filter tree
///
/// Runs the validate hook, checks every name against the whitelist, then
/// normalizes each column. The first failure aborts the whole conversion.
pub fn build_filter(columns: &[Column], options: &RulerOptions) -> Result<FilterTree, QueryError> {
    if let Some(validate) = &options.validate_fn {
        validate(columns).map_err(|e| {
            tracing::debug!(error = %e, "Column validation hook rejected input");
            QueryError::ValidationFailed(e)
        })?;
    }

    if let Some(whitelist) = &options.whitelist {
        for column in columns {
            column.check_name(whitelist)?;
        }
    }

    let mut predicates = Vec::with_capacity(columns.len());
    let mut logics = Vec::with_capacity(columns.len());
    for column in columns {
        let (predicate, logic) = column.convert().inspect_err(|e| {
            tracing::debug!(column = %column.name, error = %e, "Rejected filter column");
        })?;
        predicates.push(predicate);
        logics.push(logic);
    }

    let shape = grouping(&logics);
    tracing::debug!(columns = columns.len(), grouping = ?shape, "Building mongo filter");

    let mut leaves = predicates.into_iter().map(FilterNode::Leaf);
    let root = match shape {
        Grouping::Single => leaves.next(),
        Grouping::AllAnd => Some(FilterNode::And(leaves.collect())),
        Grouping::AllOr => Some(FilterNode::Or(leaves.collect())),
        Grouping::Mixed(runs) => Some(FilterNode::Or(
            runs.iter()
                .map(|run| run_node(leaves.by_ref().take(run.len()).collect()))
                .collect(),
        )),
    };

    Ok(FilterTree { root })
}

impl Params {
    pub fn build_filter(&self, options: &RulerOptions) -> Result<FilterTree, QueryError> {
        build_filter(&self.columns, options)
    }

    /// Convert the columns into a MongoDB filter document
    pub fn convert_to_mongo_filter(&self, options: &RulerOptions) -> Result<Document, QueryError> {
        Ok(self.build_filter(options)?.to_document())
    }
}

impl Conditions {
    pub fn convert_to_mongo(&self, options: &RulerOptions) -> Result<Document, QueryError> {
        Ok(build_filter(&self.columns, options)?.to_document())
    }
}
