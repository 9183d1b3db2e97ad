use crate::query::{
    ast::select::QueryDescriptor,
    renderer::{Render, Renderer},
};

impl Render for QueryDescriptor {
    fn render(&self, r: &mut Renderer) {
        r.out.push_str("$filter=");
        self.filter.render(r);

        if !self.select.is_empty() {
            r.out.push_str("&$select=");
            let columns = self
                .select
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(",");
            r.out.push_str(&columns);
        }

        if let Some(top) = self.top {
            r.out.push_str(&format!("&$top={top}"));
        }
    }
}

impl std::fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::query::renderer::render(self))
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::filter::{Column, KeyFilter},
        builder::select::SelectBuilder,
    };

    #[test]
    fn test_render_select() {
        let ast = SelectBuilder::new(KeyFilter::NotEmpty)
            .column(Column::PartitionKey)
            .top(1)
            .build();

        assert_eq!(
            ast.to_string(),
            "$filter=PartitionKey ne ''&$select=PartitionKey&$top=1"
        );
    }
}
