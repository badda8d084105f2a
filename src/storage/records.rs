use redb::ReadableTable;
use thiserror::Error;

use super::db::{Database, DatabaseError};
use super::models::{CsvRecord, RecordSummary, DEFAULT_DESCRIPTION};
use super::tables::*;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record {0} not found")]
    NotFound(u64),
    #[error("File is not valid UTF-8 text: {0}")]
    Decode(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl Database {
    // ========================================================================
    // Record operations
    // ========================================================================

    /// Store a new upload and return its id.
    ///
    /// The payload is decoded before anything is written, so a non-UTF-8
    /// upload leaves the store untouched. An absent or empty description is
    /// replaced by [`DEFAULT_DESCRIPTION`].
    pub fn create_record(
        &self,
        filename: &str,
        description: Option<&str>,
        bytes: &[u8],
    ) -> Result<u64, StoreError> {
        let text = std::str::from_utf8(bytes)?;
        let description = match description {
            Some(d) if !d.is_empty() => d,
            _ => DEFAULT_DESCRIPTION,
        };
        Ok(self.insert_record(filename, description, bytes, text)?)
    }

    /// Get a record with both payload columns
    pub fn get_record(&self, id: u64) -> Result<CsvRecord, StoreError> {
        self.read_record(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Get a record's metadata without touching its payload
    pub fn get_summary(&self, id: u64) -> Result<RecordSummary, StoreError> {
        self.read_summary(id)?.ok_or(StoreError::NotFound(id))
    }

    /// List every record in id order. Payload tables are not read.
    pub fn list_records(&self) -> Result<Vec<RecordSummary>, StoreError> {
        Ok(self.read_summaries()?)
    }

    /// Overwrite a record's description. Concurrent writers race; the last
    /// commit wins.
    pub fn update_description(&self, id: u64, description: &str) -> Result<(), StoreError> {
        if self.write_description(id, description)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    /// Delete a record and its payloads. Returns whether anything was removed;
    /// an unknown id is not an error.
    pub fn delete_record(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.remove_record(id)?)
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    fn insert_record(
        &self,
        filename: &str,
        description: &str,
        bytes: &[u8],
        text: &str,
    ) -> Result<u64, DatabaseError> {
        let write_txn = self.begin_write()?;
        let id = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = sequences
                .get(RECORD_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0)
                + 1;
            sequences.insert(RECORD_SEQUENCE, id)?;

            let summary = RecordSummary {
                id,
                filename: filename.to_string(),
                description: description.to_string(),
            };
            let data = rmp_serde::to_vec_named(&summary)?;

            let mut records = write_txn.open_table(RECORDS)?;
            records.insert(id, data.as_slice())?;

            let mut raw_bytes = write_txn.open_table(RECORD_BYTES)?;
            raw_bytes.insert(id, bytes)?;

            let mut raw_text = write_txn.open_table(RECORD_TEXT)?;
            raw_text.insert(id, text)?;

            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    fn read_summary(&self, id: u64) -> Result<Option<RecordSummary>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(RECORDS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    fn read_summaries(&self) -> Result<Vec<RecordSummary>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(RECORDS)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let summary: RecordSummary = rmp_serde::from_slice(value.value())?;
            records.push(summary);
        }

        Ok(records)
    }

    fn read_record(&self, id: u64) -> Result<Option<CsvRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let records = read_txn.open_table(RECORDS)?;

        let summary: RecordSummary = match records.get(id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(None),
        };

        // Payloads are written in the same transaction as the summary
        let raw_bytes = read_txn
            .open_table(RECORD_BYTES)?
            .get(id)?
            .map(|v| v.value().to_vec())
            .ok_or(DatabaseError::MissingPayload(id))?;
        let raw_text = read_txn
            .open_table(RECORD_TEXT)?
            .get(id)?
            .map(|v| v.value().to_string())
            .ok_or(DatabaseError::MissingPayload(id))?;

        Ok(Some(CsvRecord {
            id,
            filename: summary.filename,
            description: summary.description,
            raw_bytes,
            raw_text,
        }))
    }

    fn write_description(&self, id: u64, description: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(RECORDS)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let summary: RecordSummary = rmp_serde::from_slice(data.value())?;
                    Some(summary)
                }
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut summary) => {
                summary.description = description.to_string();
                let serialized = rmp_serde::to_vec_named(&summary)?;
                let mut table = write_txn.open_table(RECORDS)?;
                table.insert(id, serialized.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    fn remove_record(&self, id: u64) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut records = write_txn.open_table(RECORDS)?;
            let deleted = records.remove(id)?.is_some();

            let mut raw_bytes = write_txn.open_table(RECORD_BYTES)?;
            raw_bytes.remove(id)?;

            let mut raw_text = write_txn.open_table(RECORD_TEXT)?;
            raw_text.remove(id)?;

            deleted
        };
        write_txn.commit()?;
        Ok(deleted)
    }
}
