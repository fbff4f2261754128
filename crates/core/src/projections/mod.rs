use serde::{Deserialize, Serialize};

use crate::domain::district::DistrictTable;
use crate::errors::{ApplicationError, DomainError};

pub const PROJECTION_YEARS: u32 = 5;

/// One compounded indicator: output name, source column and annual growth rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndicatorRate {
    pub series: &'static str,
    pub column: &'static str,
    pub rate: f64,
}

pub const DEFAULT_RATES: [IndicatorRate; 5] = [
    IndicatorRate {
        series: "Workforce_Participation",
        column: "Workforce_Participation_Rate (%)",
        rate: 0.02,
    },
    IndicatorRate {
        series: "Projected_Workforce",
        column: "Projected_Workforce_Persons (5 Years)",
        rate: 0.05,
    },
    IndicatorRate { series: "Elderly_Workers", column: "Elderly_Workers_Projected", rate: 0.03 },
    IndicatorRate {
        series: "Urban_Workforce",
        column: "Projected_Urban_Workforce (5 Years)",
        rate: 0.02,
    },
    IndicatorRate {
        series: "Female_Workforce_Inclusion",
        column: "Projected_Female_Workforce_Inclusion",
        rate: 0.04,
    },
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "Years")]
    pub years: Vec<String>,
    #[serde(rename = "Workforce_Participation")]
    pub workforce_participation: Vec<f64>,
    #[serde(rename = "Projected_Workforce")]
    pub projected_workforce: Vec<f64>,
    #[serde(rename = "Elderly_Workers")]
    pub elderly_workers: Vec<f64>,
    #[serde(rename = "Urban_Workforce")]
    pub urban_workforce: Vec<f64>,
    #[serde(rename = "Female_Workforce_Inclusion")]
    pub female_workforce_inclusion: Vec<f64>,
}

/// `value * (1 + rate)^year` for years `0..PROJECTION_YEARS`.
pub fn compound(value: f64, rate: f64) -> Vec<f64> {
    (0..PROJECTION_YEARS).map(|year| value * (1.0 + rate).powi(year as i32)).collect()
}

pub fn project_district(
    district_name: &str,
    table: &DistrictTable,
    rates: &[IndicatorRate; 5],
) -> Result<Projection, ApplicationError> {
    let row = table
        .find(district_name)
        .ok_or_else(|| DomainError::DistrictNotFound(district_name.to_owned()))?;

    let series = |index: usize| -> Result<Vec<f64>, ApplicationError> {
        let indicator = rates[index];
        let value = row.value(indicator.column).ok_or_else(|| {
            ApplicationError::Data(format!(
                "district `{district_name}` has no value for `{}`",
                indicator.column
            ))
        })?;
        Ok(compound(value, indicator.rate))
    };

    Ok(Projection {
        years: (0..PROJECTION_YEARS).map(|year| format!("Year +{year}")).collect(),
        workforce_participation: series(0)?,
        projected_workforce: series(1)?,
        elderly_workers: series(2)?,
        urban_workforce: series(3)?,
        female_workforce_inclusion: series(4)?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{compound, project_district, DEFAULT_RATES};
    use crate::domain::district::{DistrictIndicators, DistrictTable};
    use crate::errors::{ApplicationError, DomainError};

    fn table() -> DistrictTable {
        let values = DEFAULT_RATES
            .iter()
            .map(|indicator| (indicator.column.to_owned(), 100.0))
            .collect::<BTreeMap<_, _>>();
        DistrictTable::new(vec![DistrictIndicators { area_name: "Ernakulam".to_owned(), values }])
    }

    #[test]
    fn compounds_five_years_from_the_base_value() {
        let values = compound(100.0, 0.05);
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], 100.0);
        assert!((values[4] - 100.0 * 1.05_f64.powi(4)).abs() < 1e-9);
    }

    #[test]
    fn projects_each_indicator_with_its_rate() {
        let projection = project_district("Ernakulam", &table(), &DEFAULT_RATES).expect("projection");

        assert_eq!(projection.years, vec!["Year +0", "Year +1", "Year +2", "Year +3", "Year +4"]);
        assert!((projection.workforce_participation[1] - 102.0).abs() < 1e-9);
        assert!((projection.projected_workforce[1] - 105.0).abs() < 1e-9);
        assert!((projection.elderly_workers[1] - 103.0).abs() < 1e-9);
        assert!((projection.female_workforce_inclusion[1] - 104.0).abs() < 1e-9);

        let json = serde_json::to_value(&projection).expect("json");
        assert!(json.get("Urban_Workforce").is_some());
        assert!(json.get("Years").is_some());
    }

    #[test]
    fn unknown_district_is_not_found() {
        let error = project_district("Atlantis", &table(), &DEFAULT_RATES).expect_err("missing");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::DistrictNotFound("Atlantis".to_owned()))
        );
    }

    #[test]
    fn missing_indicator_is_a_data_error() {
        let table = DistrictTable::new(vec![DistrictIndicators {
            area_name: "Thrissur".to_owned(),
            values: BTreeMap::new(),
        }]);
        let error = project_district("Thrissur", &table, &DEFAULT_RATES).expect_err("no values");
        assert!(matches!(error, ApplicationError::Data(_)));
    }
}
