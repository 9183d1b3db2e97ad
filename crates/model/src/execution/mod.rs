pub mod outcome;
pub mod result;
