pub mod consumer;
pub mod error;
pub mod pipeline;
pub mod producer;
pub mod transform;
