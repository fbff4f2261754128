use std::path::PathBuf;

use postwise_data::{write_demo_bundle, DEMO_PAST_COLUMN};

use crate::commands::{load_config, CommandResult};

/// Writes the deterministic demo bundle, defaulting to the configured directories.
pub fn run(data_dir: Option<PathBuf>, models_dir: Option<PathBuf>) -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let data_dir = data_dir.unwrap_or(config.data.dir);
    let models_dir = models_dir.unwrap_or(config.data.models_dir);

    if let Err(error) = write_demo_bundle(&data_dir, &models_dir) {
        return CommandResult::failure("seed", "seed_execution", error.to_string(), 5);
    }

    let mut message = format!(
        "demo dataset written to `{}` and predictors to `{}`",
        data_dir.display(),
        models_dir.display()
    );
    if config.data.past_enrollment_column != DEMO_PAST_COLUMN {
        message.push_str(&format!(
            "; set data.past_enrollment_column = \"{DEMO_PAST_COLUMN}\" to load it"
        ));
    }
    CommandResult::success("seed", message)
}
