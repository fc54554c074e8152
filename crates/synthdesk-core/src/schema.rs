//! Field schemas and the fixed column ordering used for both rendering and paste mapping.

use thiserror::Error;

/// Field recording who entered the row. Always present, auto-filled.
pub const OPERATOR_FIELD: &str = "Operator";
/// Field recording when the row was entered. Always present.
pub const TIMESTAMP_FIELD: &str = "Timestamp";
/// When the schema defines this field it is pinned to the first column.
pub const SAMPLE_NAME_FIELD: &str = "Sample Name";
/// When the schema defines this field it is pinned to the last column.
pub const SAMPLE_DESCRIPTION_FIELD: &str = "Sample Description";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate field name in schema: {0}")]
    DuplicateField(String),
}

/// The ordered field list for one synthesis type, as supplied by the service.
///
/// Immutable once constructed; a new schema (and a new [`crate::TableModel`])
/// is built whenever the operator switches synthesis type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    synthesis_type: String,
    fields: Vec<String>,
}

impl FieldSchema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new(
        synthesis_type: impl Into<String>,
        fields: Vec<String>,
    ) -> Result<Self, SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(SchemaError::DuplicateField(field.clone()));
            }
        }
        Ok(Self {
            synthesis_type: synthesis_type.into(),
            fields,
        })
    }

    pub fn synthesis_type(&self) -> &str {
        &self.synthesis_type
    }

    /// Schema fields in the order the service supplied them.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// A schema with zero fields disables editing and paste entirely.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fixed display/paste column order.
    ///
    /// `Sample Name` (when defined) is first, then `Operator` and `Timestamp`,
    /// then the remaining schema fields in their original relative order, with
    /// `Sample Description` (when defined) pinned last. The result does not
    /// depend on where the anchors sit in the stored field list, so pasting and
    /// rendering always agree on the cell-to-field mapping.
    pub fn column_order(&self) -> Vec<String> {
        if self.fields.is_empty() {
            return Vec::new();
        }

        let has = |name: &str| self.fields.iter().any(|f| f == name);
        let mut columns = Vec::with_capacity(self.fields.len() + 2);

        if has(SAMPLE_NAME_FIELD) {
            columns.push(SAMPLE_NAME_FIELD.to_string());
        }
        columns.push(OPERATOR_FIELD.to_string());
        columns.push(TIMESTAMP_FIELD.to_string());
        for field in &self.fields {
            match field.as_str() {
                SAMPLE_NAME_FIELD | SAMPLE_DESCRIPTION_FIELD | OPERATOR_FIELD
                | TIMESTAMP_FIELD => {}
                _ => columns.push(field.clone()),
            }
        }
        if has(SAMPLE_DESCRIPTION_FIELD) {
            columns.push(SAMPLE_DESCRIPTION_FIELD.to_string());
        }

        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: &[&str]) -> FieldSchema {
        FieldSchema::new(
            "Solid Precursor",
            fields.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_fields() {
        let err = FieldSchema::new(
            "Thin Film",
            vec!["Substrate".into(), "Substrate".into()],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("Substrate".into()));
    }

    #[test]
    fn anchors_are_pinned() {
        let s = schema(&["Sample Name", "Sample Description", "Notes", "CAS", "Vendor"]);
        assert_eq!(
            s.column_order(),
            vec![
                "Sample Name",
                "Operator",
                "Timestamp",
                "Notes",
                "CAS",
                "Vendor",
                "Sample Description",
            ]
        );
    }

    #[test]
    fn ordering_invariant_under_anchor_permutation() {
        let a = schema(&["Sample Name", "Notes", "CAS", "Sample Description"]);
        let b = schema(&["Sample Description", "Notes", "Sample Name", "CAS"]);
        assert_eq!(a.column_order(), b.column_order());
    }

    #[test]
    fn other_fields_keep_relative_order() {
        let s = schema(&["Vendor", "Sample Name", "Notes"]);
        assert_eq!(
            s.column_order(),
            vec!["Sample Name", "Operator", "Timestamp", "Vendor", "Notes"]
        );
    }

    #[test]
    fn schema_without_anchors_still_gets_operator_and_timestamp() {
        let s = schema(&["Notes", "CAS"]);
        assert_eq!(
            s.column_order(),
            vec!["Operator", "Timestamp", "Notes", "CAS"]
        );
    }

    #[test]
    fn empty_schema_has_no_columns() {
        let s = schema(&[]);
        assert!(s.is_empty());
        assert!(s.column_order().is_empty());
    }
}
