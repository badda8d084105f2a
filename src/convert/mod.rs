//! CSV conversion: parse stored CSV text into Arrow record batches, then
//! serialize them as Parquet or render them as an HTML table.
//!
//! Parsing is strict: a row whose field count differs from the header is a
//! parse error rather than being padded or truncated.

mod columnar;
mod html;

use std::io::Cursor;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use thiserror::Error;

pub use self::columnar::{read_columnar, to_columnar};
pub use self::html::{escape_html, to_html_table};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No columns to parse from file")]
    Empty,
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] ArrowError),
    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),
}

/// A parsed table: one schema shared by every batch.
#[derive(Debug, Clone)]
pub struct Table {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl Table {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }
}

/// Parse CSV text with a header row, inferring each column's type from all rows.
pub fn parse_csv(csv_text: &str) -> Result<Table, ConvertError> {
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(Cursor::new(csv_text.as_bytes()), None)?;
    if schema.fields().is_empty() {
        return Err(ConvertError::Empty);
    }
    let schema = Arc::new(schema);

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_batch_size(8_192)
        .build(Cursor::new(csv_text.as_bytes()))?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(Table { schema, batches })
}
