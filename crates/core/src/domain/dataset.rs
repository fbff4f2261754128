use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::demographics::{CropTable, DemographicsTable};
use crate::domain::district::DistrictTable;
use crate::domain::features::FeatureTable;
use crate::domain::scheme::{EnrollmentTable, SchemeFamily};
use crate::domain::series::TimeSeriesTable;

/// Column subsets each predictor consumes, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelColumns {
    pub dense: Vec<String>,
    pub branch: Vec<String>,
}

/// Everything the pipeline needs for one scheme family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FamilyData {
    pub series: TimeSeriesTable,
    pub columns: ModelColumns,
    pub past_enrollment: EnrollmentTable,
}

/// Read-only tables loaded once at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub features: FeatureTable,
    pub savings: FamilyData,
    pub insurance: FamilyData,
    pub demographics: DemographicsTable,
    pub crops: CropTable,
    pub districts: DistrictTable,
    pub scheme_details: BTreeMap<String, Value>,
}

impl Dataset {
    pub fn family(&self, family: SchemeFamily) -> &FamilyData {
        match family {
            SchemeFamily::Savings => &self.savings,
            SchemeFamily::Insurance => &self.insurance,
        }
    }

    pub fn scheme_details(&self, scheme: &str) -> Option<&Value> {
        self.scheme_details.get(scheme)
    }
}
