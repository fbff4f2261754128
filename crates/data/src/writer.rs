use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use csv::Writer;
use postwise_core::domain::dataset::Dataset;
use postwise_core::domain::district::AREA_NAME_COLUMN;
use postwise_core::domain::features::{CLUSTER_COLUMN, POST_OFFICE_COLUMN};
use postwise_core::domain::scheme::SchemeFamily;
use postwise_core::domain::series::MONTH_COLUMN;
use postwise_core::ensemble::ModelBundle;
use serde::Serialize;

use crate::error::DataError;
use crate::loader::{
    family_files, AGRICULTURE_FILE, DEMOGRAPHICS_FILE, DISTRICTS_FILE, FEATURES_FILE,
    SCHEME_COLUMN, SCHEME_DETAILS_FILE,
};

/// Writes a dataset in the layout `load_dataset` reads.
pub fn write_dataset(dataset: &Dataset, dir: &Path, past_column: &str) -> Result<(), DataError> {
    fs::create_dir_all(dir).map_err(|error| DataError::io(dir, error))?;

    let attribute_columns: BTreeSet<&str> = dataset
        .features
        .rows()
        .iter()
        .flat_map(|row| row.attributes.keys().map(String::as_str))
        .collect();
    let mut header = vec![POST_OFFICE_COLUMN, CLUSTER_COLUMN];
    header.extend(dataset.features.numeric_columns().iter().map(String::as_str));
    header.extend(attribute_columns.iter().copied());
    let rows = dataset.features.rows().iter().map(|row| {
        let mut cells = vec![row.post_office.clone(), row.cluster_label.clone()];
        cells.extend(row.numeric.iter().map(f64::to_string));
        cells.extend(
            attribute_columns
                .iter()
                .map(|column| row.attributes.get(*column).cloned().unwrap_or_default()),
        );
        cells
    });
    write_csv(&dir.join(FEATURES_FILE), &header, rows)?;

    for family in SchemeFamily::ALL {
        let data = dataset.family(family);
        let files = family_files(family);

        let mut header = vec![POST_OFFICE_COLUMN, MONTH_COLUMN];
        header.extend(data.series.columns().iter().map(String::as_str));
        let rows = data.series.iter().flat_map(|(post_office, history)| {
            history.iter().map(move |record| {
                let mut cells = vec![post_office.to_owned(), record.month.clone()];
                cells.extend(record.values.iter().map(f64::to_string));
                cells
            })
        });
        write_csv(&dir.join(files.series), &header, rows)?;
        write_json(&dir.join(files.columns), &data.columns)?;

        let rows = data.past_enrollment.iter().flat_map(|(post_office, records)| {
            records.iter().map(move |(scheme, count)| {
                vec![post_office.to_owned(), scheme.clone(), count.to_string()]
            })
        });
        write_csv(&dir.join(files.past), &[POST_OFFICE_COLUMN, SCHEME_COLUMN, past_column], rows)?;
    }

    let rows = dataset.demographics.iter().flat_map(|(post_office, segments)| {
        segments.iter().map(move |segment| {
            vec![
                post_office.to_owned(),
                segment.district.clone(),
                segment.age_group.clone(),
                segment.gender.clone(),
                segment.occupation.clone(),
                segment.income_level.clone(),
                segment.population.to_string(),
            ]
        })
    });
    write_csv(
        &dir.join(DEMOGRAPHICS_FILE),
        &[
            POST_OFFICE_COLUMN,
            "District",
            "Age Group",
            "Gender",
            "Occupation",
            "Income Level",
            "Population",
        ],
        rows,
    )?;

    let rows = dataset.crops.iter().flat_map(|(district, crops)| {
        crops.iter().map(move |crop| {
            vec![
                district.to_owned(),
                crop.crop.clone(),
                crop.sowing_month.to_string(),
                crop.harvest_month.to_string(),
            ]
        })
    });
    write_csv(
        &dir.join(AGRICULTURE_FILE),
        &["District", "Crop", "Sowing Period Numeric", "Harvesting Period Numeric"],
        rows,
    )?;

    let indicator_columns: BTreeSet<&str> = dataset
        .districts
        .rows()
        .iter()
        .flat_map(|row| row.values.keys().map(String::as_str))
        .collect();
    let mut header = vec![AREA_NAME_COLUMN];
    header.extend(indicator_columns.iter().copied());
    let rows = dataset.districts.rows().iter().map(|row| {
        let mut cells = vec![row.area_name.clone()];
        cells.extend(indicator_columns.iter().map(|column| {
            row.value(column).map(|value| value.to_string()).unwrap_or_default()
        }));
        cells
    });
    write_csv(&dir.join(DISTRICTS_FILE), &header, rows)?;

    write_json(&dir.join(SCHEME_DETAILS_FILE), &dataset.scheme_details)
}

/// Writes the four predictor artifacts in the layout `load_models` reads.
pub fn write_models(bundle: &ModelBundle, dir: &Path) -> Result<(), DataError> {
    fs::create_dir_all(dir).map_err(|error| DataError::io(dir, error))?;
    for family in SchemeFamily::ALL {
        let files = family_files(family);
        let models = bundle.family(family);
        write_json(&dir.join(files.dense_model), &models.dense)?;
        write_json(&dir.join(files.branch_model), &models.branch)?;
    }
    Ok(())
}

fn write_csv(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<(), DataError> {
    let mut writer = Writer::from_path(path).map_err(|error| DataError::csv(path, error))?;
    writer.write_record(header).map_err(|error| DataError::csv(path, error))?;
    for row in rows {
        writer.write_record(&row).map_err(|error| DataError::csv(path, error))?;
    }
    writer.flush().map_err(|error| DataError::io(path, error))
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), DataError> {
    let raw = serde_json::to_string_pretty(value).map_err(|error| DataError::json(path, error))?;
    fs::write(path, raw).map_err(|error| DataError::io(path, error))
}
