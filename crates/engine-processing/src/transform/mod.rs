pub mod chunker;
pub mod grouper;
