use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use postwise_core::domain::scheme::SchemeFamily;
use serde::Serialize;

use crate::api::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub dataset: HealthCheck,
    pub models: HealthCheck,
    pub llm: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let dataset = dataset_check(&state);
    let models = models_check(&state);
    let llm = if state.llm_ready() {
        HealthCheck { status: "ready", detail: "chat completion client configured".to_string() }
    } else {
        HealthCheck {
            status: "unconfigured",
            detail: "no API key; promotion plans will fail until one is set".to_string(),
        }
    };
    // Scoring does not need the LLM, so it never degrades readiness.
    let ready = dataset.status == "ready" && models.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "postwise-server runtime initialized".to_string(),
        },
        dataset,
        models,
        llm,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn dataset_check(state: &AppState) -> HealthCheck {
    let offices = state.dataset().features.len();
    if offices == 0 {
        return HealthCheck { status: "degraded", detail: "no post offices loaded".to_string() };
    }
    HealthCheck {
        status: "ready",
        detail: format!(
            "{offices} post offices, {} districts",
            state.dataset().districts.len()
        ),
    }
}

fn models_check(state: &AppState) -> HealthCheck {
    match state.models().validate() {
        Ok(()) => HealthCheck {
            status: "ready",
            detail: format!("{} scheme families loaded", SchemeFamily::ALL.len()),
        },
        Err(error) => HealthCheck { status: "degraded", detail: error.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::{extract::State, http::StatusCode, Json};
    use postwise_agent::{ChatMessage, LlmClient, PromotionPlanner};
    use postwise_core::config::PipelineConfig;
    use postwise_core::domain::dataset::Dataset;
    use postwise_data::{demo_dataset, demo_models};

    use crate::api::AppState;
    use crate::health::health;

    struct SilentLlm;

    #[async_trait]
    impl LlmClient for SilentLlm {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            Ok(String::new())
        }
    }

    fn state(dataset: Dataset, llm_ready: bool) -> AppState {
        let planner = PromotionPlanner::new(Arc::new(SilentLlm)).expect("planner");
        AppState::new(dataset, demo_models(), PipelineConfig::default(), planner, llm_ready)
    }

    #[tokio::test]
    async fn health_is_ready_with_loaded_data_even_without_llm() {
        let (status, Json(payload)) = health(State(state(demo_dataset(), false))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.dataset.status, "ready");
        assert_eq!(payload.models.status, "ready");
        assert_eq!(payload.llm.status, "unconfigured");
    }

    #[tokio::test]
    async fn health_is_unavailable_when_no_post_offices_are_loaded() {
        let (status, Json(payload)) = health(State(state(Dataset::default(), true))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.dataset.status, "degraded");
        assert_eq!(payload.llm.status, "ready");
    }
}
