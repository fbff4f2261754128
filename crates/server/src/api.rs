//! JSON API for scheme recommendation.
//!
//! Endpoints:
//! - `GET  /`                                  - welcome message
//! - `GET  /health`                            - dataset/model/LLM readiness
//! - `POST /plot_district_trends`              - five-year workforce projections
//! - `POST /predict_schemes`                   - savings and insurance recommendations
//! - `POST /promotion_plans`                   - LLM promotion plan per recommended scheme
//! - `GET  /demographics/{post_office_name}`   - feature record for one post office

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use postwise_agent::{PlanRequest, PromotionPlan, PromotionPlanner};
use postwise_core::config::PipelineConfig;
use postwise_core::domain::dataset::Dataset;
use postwise_core::ensemble::ModelBundle;
use postwise_core::errors::{ApplicationError, DomainError, InterfaceError};
use postwise_core::projections::{project_district, Projection, DEFAULT_RATES};
use postwise_core::recommend::{current_month, SchemeRecommender};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::health;

pub const WELCOME_MESSAGE: &str = "Welcome to the Post Office Scheme Recommendation API";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<ServiceContext>,
}

struct ServiceContext {
    dataset: Dataset,
    models: ModelBundle,
    pipeline: PipelineConfig,
    planner: PromotionPlanner,
    llm_ready: bool,
}

impl AppState {
    pub fn new(
        dataset: Dataset,
        models: ModelBundle,
        pipeline: PipelineConfig,
        planner: PromotionPlanner,
        llm_ready: bool,
    ) -> Self {
        Self { inner: Arc::new(ServiceContext { dataset, models, pipeline, planner, llm_ready }) }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.inner.dataset
    }

    pub fn models(&self) -> &ModelBundle {
        &self.inner.models
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.inner.pipeline
    }

    pub fn llm_ready(&self) -> bool {
        self.inner.llm_ready
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DistrictTrendsRequest {
    pub district_name: String,
}

#[derive(Debug, Serialize)]
pub struct DistrictTrendsResponse {
    pub district_name: String,
    pub projections: Projection,
}

#[derive(Debug, Deserialize)]
pub struct PredictSchemesRequest {
    pub post_office_name: String,
    pub top_n_schemes: Option<i64>,
    pub top_n_insurances: Option<i64>,
    #[serde(default)]
    pub include_neighbor_vote: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictSchemesResponse {
    pub post_office_name: String,
    pub recommended_schemes: Vec<String>,
    pub recommended_insurances: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromotionPlansRequest {
    pub post_office_name: String,
    pub top_n_schemes: Option<i64>,
    #[serde(default = "default_true")]
    pub include_neighbor_vote: bool,
}

#[derive(Debug, Serialize)]
pub struct PromotionPlansResponse {
    pub post_office_name: String,
    pub promotion_plans: Vec<PromotionPlan>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

fn default_true() -> bool {
    true
}

/// Failed request, already mapped to its client-facing class.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn from_application(error: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        match &error {
            ApplicationError::Domain(_) => warn!(
                event_name = "api.request.rejected",
                correlation_id = %correlation_id,
                error = %error,
                "request rejected"
            ),
            _ => error!(
                event_name = "api.request.failed",
                correlation_id = %correlation_id,
                error = %error,
                "request failed"
            ),
        }
        Self(error.into_interface(correlation_id))
    }

    fn invalid_body(rejection: JsonRejection) -> Self {
        Self::from_application(DomainError::InvalidInput(rejection.body_text()).into())
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self::from_application(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.user_message(),
            detail: self.0.client_detail(),
            correlation_id: self.0.correlation_id().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/plot_district_trends", post(plot_district_trends))
        .route("/predict_schemes", post(predict_schemes))
        .route("/promotion_plans", post(promotion_plans))
        .route("/demographics/{post_office_name}", get(demographics))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

async fn plot_district_trends(
    State(state): State<AppState>,
    payload: Result<Json<DistrictTrendsRequest>, JsonRejection>,
) -> Result<Json<DistrictTrendsResponse>, ApiError> {
    let Json(request) = payload.map_err(ApiError::invalid_body)?;
    let projections =
        project_district(&request.district_name, &state.dataset().districts, &DEFAULT_RATES)?;

    info!(
        event_name = "api.trends.completed",
        district = %request.district_name,
        "district trends projected"
    );
    Ok(Json(DistrictTrendsResponse { district_name: request.district_name, projections }))
}

async fn predict_schemes(
    State(state): State<AppState>,
    payload: Result<Json<PredictSchemesRequest>, JsonRejection>,
) -> Result<Json<PredictSchemesResponse>, ApiError> {
    let Json(request) = payload.map_err(ApiError::invalid_body)?;
    let pipeline = state.pipeline();
    let savings_top_n = top_n(request.top_n_schemes, pipeline.savings_top_n, "top_n_schemes")?;
    let insurance_top_n =
        top_n(request.top_n_insurances, pipeline.insurance_top_n, "top_n_insurances")?;

    let recommendation = SchemeRecommender::new(state.dataset(), state.models(), pipeline)
        .recommend_both(
            &request.post_office_name,
            savings_top_n,
            insurance_top_n,
            request.include_neighbor_vote,
            current_month(),
        )?;

    info!(
        event_name = "api.predict.completed",
        post_office = %request.post_office_name,
        voted = request.include_neighbor_vote,
        "schemes predicted"
    );
    Ok(Json(PredictSchemesResponse {
        post_office_name: request.post_office_name,
        recommended_schemes: recommendation.savings.schemes,
        recommended_insurances: recommendation.insurance.schemes,
    }))
}

async fn promotion_plans(
    State(state): State<AppState>,
    payload: Result<Json<PromotionPlansRequest>, JsonRejection>,
) -> Result<Json<PromotionPlansResponse>, ApiError> {
    let Json(request) = payload.map_err(ApiError::invalid_body)?;
    let top_n = top_n(request.top_n_schemes, state.pipeline().plan_top_n, "top_n_schemes")?;

    let promotion_plans = state
        .inner
        .planner
        .generate(
            state.dataset(),
            state.models(),
            state.pipeline(),
            PlanRequest {
                post_office: &request.post_office_name,
                top_n,
                include_neighbor_vote: request.include_neighbor_vote,
                current_month: current_month(),
            },
        )
        .await?;

    Ok(Json(PromotionPlansResponse { post_office_name: request.post_office_name, promotion_plans }))
}

async fn demographics(
    State(state): State<AppState>,
    Path(post_office_name): Path<String>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let record = state
        .dataset()
        .features
        .record(&post_office_name)
        .ok_or_else(|| ApplicationError::from(DomainError::PostOfficeNotFound(post_office_name)))?;
    Ok(Json(vec![record]))
}

fn top_n(requested: Option<i64>, default: usize, field: &str) -> Result<usize, ApplicationError> {
    let Some(value) = requested else {
        return Ok(default);
    };
    usize::try_from(value).ok().filter(|value| *value >= 1).ok_or_else(|| {
        DomainError::InvalidInput(format!("{field} must be at least 1, got {value}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::top_n;

    #[test]
    fn top_n_defaults_and_rejects_non_positive_values() {
        assert_eq!(top_n(None, 2, "top_n_schemes"), Ok(2));
        assert_eq!(top_n(Some(4), 2, "top_n_schemes"), Ok(4));
        assert!(top_n(Some(0), 2, "top_n_schemes").is_err());
        assert!(top_n(Some(-3), 2, "top_n_insurances").is_err());
    }
}
