use crate::error::ProducerError;
use model::records::row::Row;

pub mod pages;

/// One page of rows, or the error that ended the stream.
pub type PageResult = Result<Vec<Row>, ProducerError>;
