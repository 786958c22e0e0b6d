//! Assay CSV parsing.
//!
//! Columns are looked up by header name. Malformed cells never abort the
//! parse: a missing or non-numeric IC50 becomes NaN and an unexpected
//! toxicity label is kept as `Toxicity::Unclassified`.

use molex_common::{AssayRecord, Dataset, MolexError, Toxicity};
use tracing::debug;

pub const COMPOUND_ID_COLUMN: &str = "Compound ID";
pub const IC50_COLUMN: &str = "IC50 (nM)";
pub const TOXICITY_COLUMN: &str = "Toxicity";

pub fn parse_assay_csv(text: &str) -> Result<Dataset, MolexError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| MolexError::Csv(e.to_string()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let id_col = column(COMPOUND_ID_COLUMN);
    let ic50_col = column(IC50_COLUMN);
    let tox_col = column(TOXICITY_COLUMN);

    if id_col.is_none() || ic50_col.is_none() || tox_col.is_none() {
        debug!("Assay CSV is missing expected columns; headers: {:?}", headers);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| MolexError::Csv(e.to_string()))?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

        records.push(AssayRecord {
            compound_id: cell(id_col).to_string(),
            ic50: parse_ic50(cell(ic50_col)),
            toxicity: Toxicity::parse(cell(tox_col)),
        });
    }

    Ok(Dataset::new(records))
}

/// Parse the leading decimal number of a cell (`"12.5 nM"` → 12.5).
/// A signed `Infinity` prefix is accepted; anything else without a numeric
/// prefix is NaN.
pub fn parse_ic50(raw: &str) -> f64 {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    if unsigned.starts_with("Infinity") {
        return if negative { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    let prefix_len = raw
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    // Shrink until the prefix parses, e.g. "1e" or "3.-".
    (1..=prefix_len)
        .rev()
        .find_map(|len| raw[..len].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
