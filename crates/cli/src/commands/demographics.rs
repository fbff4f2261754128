use postwise_core::errors::DomainError;
use serde_json::Value;

use crate::commands::{load_bundle, load_config, CommandResult};

pub fn run(post_office: &str) -> CommandResult {
    let config = match load_config("demographics") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let (dataset, _) = match load_bundle("demographics", &config) {
        Ok(bundle) => bundle,
        Err(result) => return result,
    };

    match dataset.features.record(post_office) {
        Some(record) => CommandResult::success_with_data(
            "demographics",
            format!("feature record for `{post_office}`"),
            Value::Array(vec![Value::Object(record)]),
        ),
        None => CommandResult::from_application(
            "demographics",
            DomainError::PostOfficeNotFound(post_office.to_string()).into(),
        ),
    }
}
