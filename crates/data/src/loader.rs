use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use postwise_core::domain::dataset::{Dataset, FamilyData, ModelColumns};
use postwise_core::domain::demographics::{
    CropCalendar, CropTable, DemographicSegment, DemographicsTable,
};
use postwise_core::domain::district::{DistrictIndicators, DistrictTable, AREA_NAME_COLUMN};
use postwise_core::domain::features::{FeatureRow, FeatureTable, CLUSTER_COLUMN, POST_OFFICE_COLUMN};
use postwise_core::domain::scheme::{EnrollmentTable, SchemeFamily};
use postwise_core::domain::series::{MonthlyRecord, TimeSeriesTable, MONTH_COLUMN};
use postwise_core::ensemble::{BranchNetwork, DenseNetwork, FamilyModels, ModelBundle};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::DataError;
use crate::table::{parse_finite, RawTable};

pub const FEATURES_FILE: &str = "features.csv";
pub const DEMOGRAPHICS_FILE: &str = "demographics.csv";
pub const AGRICULTURE_FILE: &str = "agriculture.csv";
pub const DISTRICTS_FILE: &str = "districts.csv";
pub const SCHEME_DETAILS_FILE: &str = "scheme_details.json";
pub const SCHEME_COLUMN: &str = "Scheme";

/// File names for one scheme family inside the data and model directories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FamilyFiles {
    pub series: &'static str,
    pub columns: &'static str,
    pub past: &'static str,
    pub dense_model: &'static str,
    pub branch_model: &'static str,
}

pub fn family_files(family: SchemeFamily) -> FamilyFiles {
    match family {
        SchemeFamily::Savings => FamilyFiles {
            series: "savings_series.csv",
            columns: "savings_columns.json",
            past: "savings_past.csv",
            dense_model: "savings_dense.json",
            branch_model: "savings_branch.json",
        },
        SchemeFamily::Insurance => FamilyFiles {
            series: "insurance_series.csv",
            columns: "insurance_columns.json",
            past: "insurance_past.csv",
            dense_model: "insurance_dense.json",
            branch_model: "insurance_branch.json",
        },
    }
}

/// Reads every table of the data directory into memory.
pub fn load_dataset(data_dir: &Path, past_column: &str) -> Result<Dataset, DataError> {
    info!(
        event_name = "data.load.start",
        data_dir = %data_dir.display(),
        "loading dataset"
    );

    let features = load_features(&data_dir.join(FEATURES_FILE))?;
    let savings = load_family(data_dir, SchemeFamily::Savings, past_column)?;
    let insurance = load_family(data_dir, SchemeFamily::Insurance, past_column)?;
    let demographics = load_demographics(&data_dir.join(DEMOGRAPHICS_FILE))?;
    let crops = load_crops(&data_dir.join(AGRICULTURE_FILE))?;
    let districts = load_districts(&data_dir.join(DISTRICTS_FILE))?;
    let scheme_details: BTreeMap<String, serde_json::Value> =
        read_json(&data_dir.join(SCHEME_DETAILS_FILE))?;

    info!(
        event_name = "data.load.completed",
        post_offices = features.len(),
        savings_histories = savings.series.post_office_count(),
        insurance_histories = insurance.series.post_office_count(),
        demographic_offices = demographics.post_office_count(),
        crop_districts = crops.district_count(),
        districts = districts.len(),
        scheme_details = scheme_details.len(),
        "dataset loaded"
    );

    Ok(Dataset { features, savings, insurance, demographics, crops, districts, scheme_details })
}

/// Reads and shape-checks the four predictor artifacts.
pub fn load_models(models_dir: &Path) -> Result<ModelBundle, DataError> {
    let family_models = |family: SchemeFamily| -> Result<FamilyModels, DataError> {
        let files = family_files(family);
        let dense_path = models_dir.join(files.dense_model);
        let dense: DenseNetwork = read_json(&dense_path)?;
        dense.validate().map_err(|error| DataError::InvalidModel {
            path: dense_path.clone(),
            detail: error.to_string(),
        })?;
        let branch_path = models_dir.join(files.branch_model);
        let branch: BranchNetwork = read_json(&branch_path)?;
        branch.validate().map_err(|error| DataError::InvalidModel {
            path: branch_path.clone(),
            detail: error.to_string(),
        })?;
        Ok(FamilyModels { dense, branch })
    };

    let bundle = ModelBundle {
        savings: family_models(SchemeFamily::Savings)?,
        insurance: family_models(SchemeFamily::Insurance)?,
    };
    bundle.validate().map_err(|error| DataError::Bundle(error.to_string()))?;

    info!(
        event_name = "data.models.loaded",
        models_dir = %models_dir.display(),
        savings_dense_inputs = bundle.savings.dense.input_width(),
        insurance_dense_inputs = bundle.insurance.dense.input_width(),
        "model bundle loaded"
    );
    Ok(bundle)
}

pub fn load_features(path: &Path) -> Result<FeatureTable, DataError> {
    let table = RawTable::read(path)?;
    let name = table.column(POST_OFFICE_COLUMN)?;
    let cluster = table.column(CLUSTER_COLUMN)?;

    let mut numeric = Vec::new();
    let mut text = Vec::new();
    for (index, header) in table.headers().iter().enumerate() {
        if index == name || index == cluster {
            continue;
        }
        if table.is_numeric(index) {
            numeric.push((index, header.clone()));
        } else {
            text.push((index, header.clone()));
        }
    }

    let mut rows = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        let post_office = row.cells[name].clone();
        if rows.iter().any(|existing: &FeatureRow| existing.post_office == post_office) {
            return Err(DataError::InvalidRow {
                path: path.to_path_buf(),
                line: row.line,
                detail: format!("duplicate post office `{post_office}`"),
            });
        }
        rows.push(FeatureRow {
            post_office,
            cluster_label: row.cells[cluster].clone(),
            numeric: numeric
                .iter()
                .map(|(index, _)| table.number(row, *index))
                .collect::<Result<_, _>>()?,
            attributes: text
                .iter()
                .map(|(index, header)| (header.clone(), row.cells[*index].clone()))
                .collect(),
        });
    }

    FeatureTable::new(numeric.into_iter().map(|(_, header)| header).collect(), rows)
        .map_err(|error| invalid_table(path, error))
}

pub fn load_family(
    data_dir: &Path,
    family: SchemeFamily,
    past_column: &str,
) -> Result<FamilyData, DataError> {
    let files = family_files(family);
    let series_path = data_dir.join(files.series);
    let series = load_series(&series_path)?;
    let columns: ModelColumns = read_json(&data_dir.join(files.columns))?;
    for column in columns.dense.iter().chain(&columns.branch) {
        if !series.columns().contains(column) {
            return Err(DataError::MissingColumn { path: series_path, column: column.clone() });
        }
    }
    let past_enrollment = load_past_enrollment(&data_dir.join(files.past), past_column)?;
    Ok(FamilyData { series, columns, past_enrollment })
}

/// Monthly history. Only fully numeric columns are kept.
pub fn load_series(path: &Path) -> Result<TimeSeriesTable, DataError> {
    let table = RawTable::read(path)?;
    let name = table.column(POST_OFFICE_COLUMN)?;
    let month = table.column(MONTH_COLUMN)?;
    let numeric: Vec<usize> = (0..table.headers().len())
        .filter(|index| *index != name && *index != month && table.is_numeric(*index))
        .collect();

    let mut series =
        TimeSeriesTable::new(numeric.iter().map(|index| table.headers()[*index].clone()).collect());
    for row in table.rows() {
        let values =
            numeric.iter().map(|index| table.number(row, *index)).collect::<Result<_, _>>()?;
        series
            .push(row.cells[name].clone(), MonthlyRecord { month: row.cells[month].clone(), values })
            .map_err(|error| invalid_table(path, error))?;
    }
    Ok(series)
}

pub fn load_past_enrollment(path: &Path, past_column: &str) -> Result<EnrollmentTable, DataError> {
    let table = RawTable::read(path)?;
    let name = table.column(POST_OFFICE_COLUMN)?;
    let scheme = table.column(SCHEME_COLUMN)?;
    let count = table.column(past_column)?;

    let mut enrollment = EnrollmentTable::new();
    for row in table.rows() {
        enrollment.insert(row.cells[name].clone(), row.cells[scheme].clone(), table.number(row, count)?);
    }
    Ok(enrollment)
}

pub fn load_demographics(path: &Path) -> Result<DemographicsTable, DataError> {
    let table = RawTable::read(path)?;
    let name = table.column(POST_OFFICE_COLUMN)?;
    let district = table.column("District")?;
    let age = table.column("Age Group")?;
    let gender = table.column("Gender")?;
    let occupation = table.column("Occupation")?;
    let income = table.column("Income Level")?;
    let population = table.column("Population")?;

    let mut demographics = DemographicsTable::new();
    for row in table.rows() {
        demographics.push(
            row.cells[name].clone(),
            DemographicSegment {
                district: row.cells[district].clone(),
                age_group: row.cells[age].clone(),
                gender: row.cells[gender].clone(),
                occupation: row.cells[occupation].clone(),
                income_level: row.cells[income].clone(),
                population: table.number(row, population)?,
            },
        );
    }
    Ok(demographics)
}

pub fn load_crops(path: &Path) -> Result<CropTable, DataError> {
    let table = RawTable::read(path)?;
    let district = table.column("District")?;
    let crop = table.column("Crop")?;
    let sowing = table.column("Sowing Period Numeric")?;
    let harvest = table.column("Harvesting Period Numeric")?;

    let mut crops = CropTable::new();
    for row in table.rows() {
        crops.push(
            row.cells[district].clone(),
            CropCalendar {
                crop: row.cells[crop].clone(),
                sowing_month: table.month(row, sowing)?,
                harvest_month: table.month(row, harvest)?,
            },
        );
    }
    Ok(crops)
}

/// District indicators; cells that are not numbers are skipped.
pub fn load_districts(path: &Path) -> Result<DistrictTable, DataError> {
    let table = RawTable::read(path)?;
    let area = table.column(AREA_NAME_COLUMN)?;

    let rows = table
        .rows()
        .iter()
        .map(|row| DistrictIndicators {
            area_name: row.cells[area].clone(),
            values: table
                .headers()
                .iter()
                .zip(&row.cells)
                .enumerate()
                .filter(|(index, _)| *index != area)
                .filter_map(|(_, (header, cell))| {
                    parse_finite(cell).map(|value| (header.clone(), value))
                })
                .collect(),
        })
        .collect();
    Ok(DistrictTable::new(rows))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let raw = fs::read_to_string(path).map_err(|error| DataError::io(path, error))?;
    serde_json::from_str(&raw).map_err(|error| DataError::json(path, error))
}

fn invalid_table(path: &Path, error: impl ToString) -> DataError {
    DataError::InvalidTable { path: PathBuf::from(path), detail: error.to_string() }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use postwise_core::domain::scheme::SchemeFamily;

    use super::{load_districts, load_family, load_features, load_past_enrollment};
    use crate::error::DataError;

    #[test]
    fn features_split_numeric_and_text_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("features.csv");
        fs::write(
            &path,
            "Post Office Name,cluster_label,Population,State,Literacy\n\
             Aluva SO,0,1200,Kerala,0.9\n\
             Mala SO,1,800,Kerala,0.85\n",
        )
        .expect("write");

        let table = load_features(&path).expect("features");
        assert_eq!(table.numeric_columns(), &["Population".to_owned(), "Literacy".to_owned()]);
        let row = table.find("Mala SO").expect("row");
        assert_eq!(row.cluster_label, "1");
        assert_eq!(row.numeric, vec![800.0, 0.85]);
        assert_eq!(row.attributes.get("State").map(String::as_str), Some("Kerala"));
    }

    #[test]
    fn duplicate_post_offices_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("features.csv");
        fs::write(&path, "Post Office Name,cluster_label,x\nAluva SO,0,1\nAluva SO,0,2\n")
            .expect("write");

        let error = load_features(&path).expect_err("duplicate");
        assert!(matches!(error, DataError::InvalidRow { line: 3, .. }));
    }

    #[test]
    fn past_enrollment_uses_configured_column() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("past.csv");
        fs::write(
            &path,
            "Post Office Name,Scheme,Month_23,Month_24\nAluva SO,Kisan Vikas Patra (KVP),4,7\n",
        )
        .expect("write");

        let table = load_past_enrollment(&path, "Month_24").expect("past");
        let records = table.for_post_office("Aluva SO").expect("records");
        assert_eq!(records.get("Kisan Vikas Patra (KVP)"), Some(&7.0));
        assert!(matches!(
            load_past_enrollment(&path, "Month_30"),
            Err(DataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn family_columns_must_exist_in_series() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("savings_series.csv"),
            "Post Office Name,Month,Deposits\nAluva SO,1,10\n",
        )
        .expect("write");
        fs::write(
            dir.path().join("savings_columns.json"),
            r#"{"dense":["Deposits"],"branch":["Withdrawals"]}"#,
        )
        .expect("write");
        fs::write(dir.path().join("savings_past.csv"), "Post Office Name,Scheme,Month_24\n")
            .expect("write");

        let error =
            load_family(dir.path(), SchemeFamily::Savings, "Month_24").expect_err("missing column");
        assert!(matches!(error, DataError::MissingColumn { column, .. } if column == "Withdrawals"));
    }

    #[test]
    fn district_text_cells_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("districts.csv");
        fs::write(&path, "Area_Name,State,Elderly_Workers_Projected\nThrissur,Kerala,4200\n")
            .expect("write");

        let table = load_districts(&path).expect("districts");
        let row = table.find("Thrissur").expect("row");
        assert_eq!(row.value("Elderly_Workers_Projected"), Some(4200.0));
        assert_eq!(row.value("State"), None);
    }
}
