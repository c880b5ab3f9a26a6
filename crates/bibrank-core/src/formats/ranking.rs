use csv::{ByteRecord, ReaderBuilder};
use tracing::debug;

use crate::config::RankingConfig;
use crate::error::{BibrankError, Result};
use crate::models::RankingEntry;

/// Parses a delimited, latin-1 encoded ranking export (SCImago layout).
///
/// Only the title and categories columns are kept; their names and the
/// delimiter come from `config`.
pub fn read_ranking(bytes: &[u8], config: &RankingConfig) -> Result<Vec<RankingEntry>> {
    let delimiter = config.delimiter_byte()?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.byte_headers()?.clone();
    let title_idx = column_index(&headers, &config.title_column)?;
    let categories_idx = column_index(&headers, &config.categories_column)?;

    let mut entries = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let title = record.get(title_idx).map(decode_latin1).unwrap_or_default();
        let categories = record
            .get(categories_idx)
            .map(decode_latin1)
            .unwrap_or_default();
        entries.push(RankingEntry::new(&title, categories.trim()));
    }

    debug!(rows = entries.len(), "read ranking table");
    Ok(entries)
}

fn column_index(headers: &ByteRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| decode_latin1(header).trim() == name)
        .ok_or_else(|| BibrankError::Parse(format!("ranking CSV is missing column '{name}'")))
}

/// Latin-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
