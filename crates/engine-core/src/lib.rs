pub mod channel;
pub mod context;
pub mod metrics;
pub mod stage;
