use std::collections::BTreeMap;

pub const AREA_NAME_COLUMN: &str = "Area_Name";

/// Workforce indicators for one district, keyed by source column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistrictIndicators {
    pub area_name: String,
    pub values: BTreeMap<String, f64>,
}

impl DistrictIndicators {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistrictTable {
    rows: Vec<DistrictIndicators>,
}

impl DistrictTable {
    pub fn new(rows: Vec<DistrictIndicators>) -> Self {
        Self { rows }
    }

    /// First row whose `Area_Name` matches exactly.
    pub fn find(&self, area_name: &str) -> Option<&DistrictIndicators> {
        self.rows.iter().find(|row| row.area_name == area_name)
    }

    pub fn rows(&self) -> &[DistrictIndicators] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
