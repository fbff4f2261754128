use postwise_core::projections::{project_district, Projection, DEFAULT_RATES};
use serde::Serialize;

use crate::commands::{load_bundle, load_config, CommandResult};

pub fn run(district: &str) -> CommandResult {
    let config = match load_config("trends") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let (dataset, _) = match load_bundle("trends", &config) {
        Ok(bundle) => bundle,
        Err(result) => return result,
    };

    let projections = match project_district(district, &dataset.districts, &DEFAULT_RATES) {
        Ok(projections) => projections,
        Err(error) => return CommandResult::from_application("trends", error),
    };
    match serde_json::to_value(DistrictTrends { district_name: district, projections }) {
        Ok(data) => CommandResult::success_with_data(
            "trends",
            format!("five-year projections for `{district}`"),
            data,
        ),
        Err(error) => CommandResult::failure("trends", "serialization", error.to_string(), 6),
    }
}

#[derive(Serialize)]
struct DistrictTrends<'a> {
    district_name: &'a str,
    projections: Projection,
}
