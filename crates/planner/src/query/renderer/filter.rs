use crate::query::{
    ast::filter::{Column, KeyFilter},
    renderer::{Render, Renderer},
};

impl Render for KeyFilter {
    fn render(&self, r: &mut Renderer) {
        let pk = Column::PartitionKey.as_str();
        match self {
            KeyFilter::NotEmpty => {
                r.out.push_str(pk);
                r.out.push_str(" ne ");
                r.push_literal("");
            }
            KeyFilter::Range { from, to } => {
                r.out.push_str(pk);
                r.out.push_str(" ge ");
                r.push_literal(from);
                r.out.push_str(" and ");
                r.out.push_str(pk);
                r.out.push_str(" lt ");
                r.push_literal(to);
            }
        }
    }
}
