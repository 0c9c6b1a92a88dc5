//! CSV text encoding of [`DataTable`].
//!
//! The header row lists key fields then value fields. The first header cell
//! carries the key-field count as a suffix, so `id<1>,price` is a table
//! keyed by `id`. A table without columns encodes as the single cell `<0>`.
//! Cells are quoted per RFC 4180 where needed.

use csv::{ReaderBuilder, Terminator, WriterBuilder};

use crate::error::{TableError, TableResult};
use crate::table::DataTable;

/// Encode a table as CSV text.
pub fn encode(table: &DataTable) -> TableResult<String> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header: Vec<String> = table.columns().map(String::from).collect();
    let marker = format!("<{}>", table.key_fields.len());
    match header.first_mut() {
        Some(first) => first.push_str(&marker),
        None => header.push(marker),
    }
    writer.write_record(&header)?;
    for row in table.rows() {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TableError::Encoding(e.to_string()))
}

/// Decode a table from its CSV text encoding.
pub fn decode(text: &str) -> TableResult<DataTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = records
        .next()
        .ok_or_else(|| TableError::MalformedHeader("missing header row".into()))??;
    let mut columns: Vec<String> = header.iter().map(String::from).collect();
    let first = columns
        .first_mut()
        .ok_or_else(|| TableError::MalformedHeader("empty header row".into()))?;
    let (name, keys) = split_marker(first)?;
    *first = name;
    if first.is_empty() && columns.len() == 1 {
        columns.clear();
    }
    if keys > columns.len() {
        return Err(TableError::MalformedHeader(format!(
            "{keys} key fields declared but only {} columns",
            columns.len()
        )));
    }

    let fields = columns.split_off(keys);
    let mut table = DataTable::new(columns, fields);
    for record in records {
        let record = record?;
        table.push_row(record.iter().map(String::from).collect())?;
    }
    Ok(table)
}

/// Split `name<k>` into the name and `k`.
fn split_marker(cell: &str) -> TableResult<(String, usize)> {
    let malformed = || TableError::MalformedHeader(format!("no key count marker in {cell:?}"));
    let body = cell.strip_suffix('>').ok_or_else(malformed)?;
    let open = body.rfind('<').ok_or_else(malformed)?;
    let keys = body[open + 1..].parse::<usize>().map_err(|_| malformed())?;
    Ok((body[..open].to_string(), keys))
}
