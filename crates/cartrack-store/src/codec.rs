//! CSV encoding of whole tables.
//!
//! The header row is always written, even for an empty table, so a freshly
//! bootstrapped file already documents its columns.

use crate::table::Record;
use crate::StoreError;
use tracing::warn;

pub fn encode_rows<R: Record>(rows: &[R]) -> Result<Vec<u8>, StoreError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(R::TABLE.columns())?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| StoreError::Io(e.into_error()))
}

/// Decode every well-formed row. Malformed rows are logged and skipped.
pub fn decode_rows<R: Record>(data: &[u8]) -> Result<Vec<R>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);
    rdr.headers()?;

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<R>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                // +2: 1-based, after the header line
                warn!("skipping malformed row {} in {}: {e}", idx + 2, R::TABLE);
            }
        }
    }
    Ok(rows)
}
