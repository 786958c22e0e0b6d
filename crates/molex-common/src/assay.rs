//! Assay records and the per-protein dataset.

use serde::{Deserialize, Serialize};

use crate::toxicity::Toxicity;

/// One row of compound assay data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssayRecord {
    pub compound_id: String,
    /// IC50 in nanomolar. NaN when the source cell was not numeric.
    pub ic50: f64,
    pub toxicity: Toxicity,
}

impl AssayRecord {
    pub fn new(compound_id: impl Into<String>, ic50: f64, toxicity: Toxicity) -> Self {
        Self {
            compound_id: compound_id.into(),
            ic50,
            toxicity,
        }
    }

    /// IC50 formatted with one decimal place; NaN renders as `NaN`.
    pub fn ic50_display(&self) -> String {
        format_one_decimal(self.ic50)
    }
}

/// One-decimal formatting that rounds exact ties away from zero
/// (`7.25` → `7.3`), as browsers do for `toFixed(1)`.
///
/// `{:.1}` rounds ties to even. A tie at one decimal is only possible for
/// odd multiples of 0.25, which are exact in binary, so those are nudged
/// before formatting and every other value goes through `{:.1}` unchanged.
pub fn format_one_decimal(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    if magnitude.is_infinite() {
        return format!("{sign}Infinity");
    }
    let quarters = magnitude * 4.0;
    let tie = quarters.fract() == 0.0 && quarters % 2.0 == 1.0;
    let magnitude = if tie { magnitude + 0.05 } else { magnitude };
    format!("{sign}{magnitude:.1}")
}

/// Ordered assay records for one protein, in CSV row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<AssayRecord>,
}

impl Dataset {
    pub fn new(records: Vec<AssayRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AssayRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssayRecord> {
        self.records.iter()
    }

    pub fn find(&self, compound_id: &str) -> Option<&AssayRecord> {
        self.records.iter().find(|r| r.compound_id == compound_id)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a AssayRecord;
    type IntoIter = std::slice::Iter<'a, AssayRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<AssayRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = AssayRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
