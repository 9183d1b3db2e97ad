pub mod batch;
pub mod group;
pub mod row;
