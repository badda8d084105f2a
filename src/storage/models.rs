use serde::{Deserialize, Serialize};

/// Description stored when an upload arrives without one.
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Listing projection of a record, also the value stored in the `records` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: u64,
    pub filename: String,
    pub description: String,
}

/// An uploaded CSV file with its payload in both encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub id: u64,
    pub filename: String,
    pub description: String,
    pub raw_bytes: Vec<u8>,
    pub raw_text: String,
}

impl CsvRecord {
    /// Download name for the Parquet conversion: the filename's stem plus `.parquet`.
    pub fn parquet_filename(&self) -> String {
        let stem = std::path::Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename);
        format!("{stem}.parquet")
    }
}
