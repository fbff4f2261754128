use std::sync::Arc;

use postwise_agent::{ChatCompletionClient, LlmClient, PromotionPlanner};
use postwise_core::config::{AppConfig, ConfigError, LoadOptions};
use postwise_core::errors::ApplicationError;
use postwise_data::{load_dataset, load_models, DataError};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("data load failed: {0}")]
    Data(#[from] DataError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] anyhow::Error),
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        data_dir = %config.data.dir.display(),
        models_dir = %config.data.models_dir.display(),
        "starting application bootstrap"
    );

    let dataset = load_dataset(&config.data.dir, &config.data.past_enrollment_column)?;
    let models = load_models(&config.data.models_dir)?;
    info!(
        event_name = "system.bootstrap.data_loaded",
        correlation_id = "bootstrap",
        post_offices = dataset.features.len(),
        districts = dataset.districts.len(),
        "dataset and predictors loaded"
    );

    let llm_ready = config.llm.is_ready();
    if !llm_ready {
        warn!(
            event_name = "system.bootstrap.llm_unconfigured",
            correlation_id = "bootstrap",
            provider = %config.llm.provider,
            "no llm api key configured; promotion plans will fail"
        );
    }
    let client: Arc<dyn LlmClient> =
        Arc::new(ChatCompletionClient::from_config(&config.llm).map_err(BootstrapError::Llm)?);
    let planner = PromotionPlanner::new(client)?;

    let state = AppState::new(dataset, models, config.pipeline.clone(), planner, llm_ready);
    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use postwise_core::config::{ConfigOverrides, LoadOptions};
    use postwise_data::write_demo_bundle;

    use crate::bootstrap::{bootstrap, BootstrapError};

    fn options(dir: &std::path::Path) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                data_dir: Some(dir.join("data")),
                models_dir: Some(dir.join("models")),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_loads_the_demo_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_demo_bundle(&dir.path().join("data"), &dir.path().join("models")).expect("bundle");

        let app = bootstrap(options(dir.path())).await.expect("bootstrap should succeed");

        assert_eq!(app.state.dataset().features.len(), 8);
        assert_eq!(app.state.pipeline().history_months, 23);
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_data_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");

        let result = bootstrap(options(dir.path())).await;

        assert!(matches!(result, Err(BootstrapError::Data(_))));
    }
}
