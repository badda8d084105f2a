use std::sync::Arc;

use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use super::{parse_csv, ConvertError, Table};

/// Convert CSV text to a Parquet file held in memory.
///
/// The Arrow schema is embedded in the file metadata so a reader gets back the
/// inferred column types. No row index column is written.
pub fn to_columnar(csv_text: &str) -> Result<Bytes, ConvertError> {
    let table = parse_csv(csv_text)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(Vec::new(), Arc::clone(&table.schema), Some(props))?;
    for batch in &table.batches {
        writer.write(batch)?;
    }
    let buf = writer.into_inner()?;

    tracing::debug!(
        rows = table.num_rows(),
        columns = table.schema.fields().len(),
        bytes = buf.len(),
        "Wrote parquet"
    );
    Ok(Bytes::from(buf))
}

/// Read a Parquet file back into a table.
pub fn read_columnar(data: Bytes) -> Result<Table, ConvertError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(Table { schema, batches })
}
