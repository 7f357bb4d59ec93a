//! Writer stage: serializes normalized rows to CSV.

use crate::domain::model::NormalizedRow;
use crate::utils::error::{EtlError, Result};

pub fn to_csv(columns: &[String], rows: &[NormalizedRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
