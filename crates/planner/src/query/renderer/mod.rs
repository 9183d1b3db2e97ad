//! Renders query descriptors into the store's OData-style query options.

pub mod filter;
pub mod select;

pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

#[derive(Debug, Default)]
pub struct Renderer {
    pub out: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// Writes a quoted string literal. Embedded quotes are doubled.
    pub fn push_literal(&mut self, value: &str) {
        self.out.push('\'');
        self.out.push_str(&value.replace('\'', "''"));
        self.out.push('\'');
    }
}

/// Renders any node to a fresh string.
pub fn render<T: Render + ?Sized>(node: &T) -> String {
    let mut renderer = Renderer::new();
    node.render(&mut renderer);
    renderer.finish()
}
