pub mod config;
pub mod demographics;
pub mod doctor;
pub mod recommend;
pub mod seed;
pub mod trends;

use postwise_core::config::{AppConfig, LoadOptions};
use postwise_core::domain::dataset::Dataset;
use postwise_core::ensemble::ModelBundle;
use postwise_core::errors::{ApplicationError, DomainError};
use postwise_data::{load_dataset, load_models};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::ok(command, message.into(), None)
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: Value) -> Self {
        Self::ok(command, message.into(), Some(data))
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Exit codes: 4 unknown post office/district, 5 invalid input, 6 anything else.
    pub fn from_application(command: &str, error: ApplicationError) -> Self {
        match &error {
            ApplicationError::Domain(
                DomainError::PostOfficeNotFound(_) | DomainError::DistrictNotFound(_),
            ) => Self::failure(command, "not_found", error.to_string(), 4),
            ApplicationError::Domain(_) => {
                Self::failure(command, "invalid_input", error.to_string(), 5)
            }
            _ => Self::failure(command, "internal", error.to_string(), 6),
        }
    }

    fn ok(command: &str, message: String, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn load_bundle(
    command: &str,
    config: &AppConfig,
) -> Result<(Dataset, ModelBundle), CommandResult> {
    let data_load = |error: postwise_data::DataError| {
        CommandResult::failure(command, "data_load", error.to_string(), 3)
    };
    let dataset =
        load_dataset(&config.data.dir, &config.data.past_enrollment_column).map_err(data_load)?;
    let models = load_models(&config.data.models_dir).map_err(data_load)?;
    Ok((dataset, models))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
