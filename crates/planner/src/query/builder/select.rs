use crate::query::ast::{
    filter::{Column, KeyFilter},
    select::QueryDescriptor,
};

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    ast: QueryDescriptor,
}

impl SelectBuilder {
    pub fn new(filter: KeyFilter) -> Self {
        Self {
            ast: QueryDescriptor {
                filter,
                select: Vec::new(),
                top: None,
            },
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        if !self.ast.select.contains(&column) {
            self.ast.select.push(column);
        }
        self
    }

    pub fn keys(self) -> Self {
        self.column(Column::PartitionKey).column(Column::RowKey)
    }

    pub fn top(mut self, top: usize) -> Self {
        self.ast.top = Some(top);
        self
    }

    pub fn build(self) -> QueryDescriptor {
        self.ast
    }
}
