//! Assembly of the per-fragment query text sent to the backend.

use crate::catalog::TupleDescriptor;
use crate::partition::{Boundary, Fragment, PlanningResult};

/// Base `SELECT` over every column of the descriptor, `*` when it has none.
pub fn select_query(source: &str, tuple: &TupleDescriptor) -> String {
    if tuple.is_empty() {
        return format!("SELECT * FROM {}", source);
    }
    let columns: Vec<&str> = tuple
        .columns()
        .iter()
        .map(|column| column.column_name.as_str())
        .collect();
    format!("SELECT {} FROM {}", columns.join(", "), source)
}

/// Combines a base query, the pushed-down filter and a fragment's boundary.
#[derive(Debug, Clone, Copy)]
pub struct QueryAssembler<'a> {
    base: &'a str,
    filter: Option<&'a str>,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(base: &'a str) -> Self {
        Self { base, filter: None }
    }

    /// WHERE-clause body produced by the translator, if any.
    pub fn with_filter(mut self, filter: Option<&'a str>) -> Self {
        self.filter = filter;
        self
    }

    pub fn assemble(&self, boundary: &Boundary) -> String {
        let mut query = String::from(self.base);
        if let Some(filter) = self.filter {
            query.push_str(" WHERE ");
            query.push_str(filter);
        }
        if let Some(predicate) = boundary.predicate() {
            query.push_str(if self.filter.is_some() { " AND " } else { " WHERE " });
            query.push_str(&predicate);
        }
        query
    }

    pub fn assemble_fragment(&self, fragment: &Fragment) -> PlanningResult<String> {
        Ok(self.assemble(&fragment.boundary()?))
    }
}
