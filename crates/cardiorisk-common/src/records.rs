//! Labelled patient record rows, as shown in the record table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub label: String,
    pub value: String,
}

/// Ordered (label, value) rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    rows: Vec<RecordRow>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.rows.push(RecordRow { label: label.into(), value: value.into() });
    }

    /// Builder-style variant of [`RecordTable::push`].
    pub fn with_row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(label, value);
        self
    }

    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    /// Value of the first row whose trimmed label contains `fragment`.
    pub fn value_for_label_containing(&self, fragment: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label.trim().contains(fragment))
            .map(|row| row.value.as_str())
    }

    /// Value of the row whose trimmed label equals `label` exactly.
    pub fn value_for(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label.trim() == label)
            .map(|row| row.value.as_str())
    }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for RecordTable {
    fn from_iter<T: IntoIterator<Item = (L, V)>>(iter: T) -> Self {
        let mut table = RecordTable::new();
        for (label, value) in iter {
            table.push(label, value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_containing_label_wins() {
        let table: RecordTable = [("Name", "Ann Lee"), (" Age ", "55"), ("Age at onset", "30")]
            .into_iter()
            .collect();
        assert_eq!(table.value_for_label_containing("Age"), Some("55"));
    }

    #[test]
    fn test_exact_lookup() {
        let table = RecordTable::new().with_row("HDL", "50.0 mg/dL").with_row("LDL", "99 mg/dL");
        assert_eq!(table.value_for("LDL"), Some("99 mg/dL"));
        assert_eq!(table.value_for("Glucose"), None);
    }
}
