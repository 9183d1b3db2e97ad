//! Defines the shape of a key-only query against the store.

use crate::query::ast::filter::{Column, KeyFilter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Which rows to return.
    pub filter: KeyFilter,

    /// Projected columns. Purge queries never need more than the keys.
    pub select: Vec<Column>,

    /// Cap on the number of rows returned across all pages.
    pub top: Option<usize>,
}

impl QueryDescriptor {
    pub fn projects(&self, column: Column) -> bool {
        self.select.contains(&column)
    }
}
