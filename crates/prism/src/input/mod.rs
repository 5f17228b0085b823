//! Data ingestion: parsing, dataset model, column profiling.

mod parser;
mod source;
mod typing;

pub use parser::{Parser, ParserConfig};
pub use source::{Column, ColumnType, Dataset, SourceMetadata};
pub use typing::{profile_column, profile_columns};
