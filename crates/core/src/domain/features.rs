use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::errors::ApplicationError;

pub const POST_OFFICE_COLUMN: &str = "Post Office Name";
pub const CLUSTER_COLUMN: &str = "cluster_label";

/// One post office in the clustered feature table.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRow {
    pub post_office: String,
    pub cluster_label: String,
    /// Aligned with [`FeatureTable::numeric_columns`].
    pub numeric: Vec<f64>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    numeric_columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(numeric_columns: Vec<String>, rows: Vec<FeatureRow>) -> Result<Self, ApplicationError> {
        if let Some(row) = rows.iter().find(|row| row.numeric.len() != numeric_columns.len()) {
            return Err(ApplicationError::Data(format!(
                "feature row `{}` has {} numeric values, expected {}",
                row.post_office,
                row.numeric.len(),
                numeric_columns.len()
            )));
        }
        Ok(Self { numeric_columns, rows })
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, post_office: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|row| row.post_office == post_office)
    }

    pub fn contains(&self, post_office: &str) -> bool {
        self.find(post_office).is_some()
    }

    pub fn cluster_members<'a>(&'a self, cluster_label: &'a str) -> impl Iterator<Item = &'a FeatureRow> {
        self.rows.iter().filter(move |row| row.cluster_label == cluster_label)
    }

    /// All columns of the post office except the cluster label.
    pub fn record(&self, post_office: &str) -> Option<Map<String, Value>> {
        let row = self.find(post_office)?;
        let mut record = Map::new();
        record.insert(POST_OFFICE_COLUMN.to_owned(), Value::String(row.post_office.clone()));
        for (column, value) in self.numeric_columns.iter().zip(&row.numeric) {
            let value = Number::from_f64(*value).map(Value::Number).unwrap_or(Value::Null);
            record.insert(column.clone(), value);
        }
        for (column, value) in &row.attributes {
            record.insert(column.clone(), Value::String(value.clone()));
        }
        Some(record)
    }
}
