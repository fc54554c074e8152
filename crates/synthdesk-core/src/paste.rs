//! Clipboard text parsing: heterogeneous pasted lines onto a fixed column order.
//!
//! Pure functions only; appending the parsed rows to a table is the caller's
//! job ([`crate::TableModel::paste`]), which keeps the parse contract testable
//! without any table state.

use std::collections::BTreeMap;

use crate::schema::OPERATOR_FIELD;

/// Parse pasted clipboard text into one value map per non-blank line.
///
/// Contract:
/// - lines that are entirely whitespace are dropped;
/// - each line splits on tab if it contains one, otherwise on comma — the
///   choice is per line, so mixed pastes work;
/// - cells are trimmed and mapped positionally onto `columns`, skipping
///   `Operator`: that column is never paste-addressable and always carries
///   the current operator's name;
/// - cells beyond the addressable columns are discarded; missing cells keep
///   their default (empty string).
///
/// Empty text yields no rows. An empty column order disables parsing entirely.
pub fn parse_paste(
    text: &str,
    columns: &[String],
    operator: &str,
) -> Vec<BTreeMap<String, String>> {
    if columns.is_empty() {
        return Vec::new();
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut values = blank_values(columns, operator);
            let delimiter = if line.contains('\t') { '\t' } else { ',' };
            let addressable = columns.iter().filter(|c| c.as_str() != OPERATOR_FIELD);
            for (cell, column) in line.split(delimiter).zip(addressable) {
                values.insert(column.clone(), cell.trim().to_string());
            }
            values
        })
        .collect()
}

/// Default values for a fresh row: every column empty except `Operator`.
pub fn blank_values(columns: &[String], operator: &str) -> BTreeMap<String, String> {
    columns
        .iter()
        .map(|column| {
            let value = if column == OPERATOR_FIELD {
                operator.to_string()
            } else {
                String::new()
            };
            (column.clone(), value)
        })
        .collect()
}
