pub mod executor;
pub mod window;

pub use executor::{PurgeExecutor, purge, purge_within};
