pub mod core;
pub mod execution;
pub mod keys;
pub mod records;
pub mod time;
