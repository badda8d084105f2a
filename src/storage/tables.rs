use redb::TableDefinition;

/// Record metadata: id -> RecordSummary (msgpack)
pub const RECORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("records");

/// Uploaded payloads exactly as received: id -> bytes
pub const RECORD_BYTES: TableDefinition<u64, &[u8]> = TableDefinition::new("record_bytes");

/// Uploaded payloads decoded as UTF-8: id -> text
pub const RECORD_TEXT: TableDefinition<u64, &str> = TableDefinition::new("record_text");

/// Id sequences: name -> last assigned id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Sequence key for record ids
pub const RECORD_SEQUENCE: &str = "records";
