use std::sync::Arc;

use postwise_core::config::PipelineConfig;
use postwise_core::domain::dataset::Dataset;
use postwise_core::domain::scheme::SchemeFamily;
use postwise_core::ensemble::ModelBundle;
use postwise_core::errors::{ApplicationError, DomainError};
use postwise_core::recommend::{RecommendOptions, SchemeRecommender};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm::{LlmClient, LlmError};
use crate::prompt::PromptRenderer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionPlan {
    pub scheme_name: String,
    pub plan: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanRequest<'a> {
    pub post_office: &'a str,
    pub top_n: usize,
    pub include_neighbor_vote: bool,
    pub current_month: u32,
}

/// Drafts one promotion plan per recommended savings scheme.
pub struct PromotionPlanner {
    llm: Arc<dyn LlmClient>,
    prompts: PromptRenderer,
}

impl PromotionPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Result<Self, ApplicationError> {
        let prompts = PromptRenderer::new()
            .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
        Ok(Self { llm, prompts })
    }

    pub async fn generate(
        &self,
        dataset: &Dataset,
        models: &ModelBundle,
        pipeline: &PipelineConfig,
        request: PlanRequest<'_>,
    ) -> Result<Vec<PromotionPlan>, ApplicationError> {
        let recommendation = SchemeRecommender::new(dataset, models, pipeline).recommend(
            request.post_office,
            SchemeFamily::Savings,
            RecommendOptions::new(request.top_n, request.include_neighbor_vote),
            request.current_month,
        )?;
        let record = dataset
            .features
            .record(request.post_office)
            .ok_or_else(|| DomainError::PostOfficeNotFound(request.post_office.to_owned()))?;
        let demographics = Value::Array(vec![Value::Object(record)]);

        let mut plans = Vec::with_capacity(recommendation.schemes.len());
        for scheme in &recommendation.schemes {
            let details = dataset.scheme_details(scheme).ok_or_else(|| {
                ApplicationError::Data(format!("no scheme details recorded for `{scheme}`"))
            })?;
            plans.push(self.plan_for(scheme, details, &demographics).await?);
        }

        info!(
            event_name = "agent.promotion.completed",
            post_office = %request.post_office,
            plans = plans.len(),
            "promotion plans generated"
        );
        Ok(plans)
    }

    pub async fn plan_for(
        &self,
        scheme_name: &str,
        scheme_details: &Value,
        demographics: &Value,
    ) -> Result<PromotionPlan, ApplicationError> {
        let messages = self
            .prompts
            .render(scheme_name, scheme_details, demographics)
            .map_err(|error| ApplicationError::Data(error.to_string()))?;

        let plan = self.llm.complete(&messages).await.map_err(|error| {
            warn!(
                event_name = "agent.promotion.llm_failed",
                scheme = %scheme_name,
                error = %error,
                "chat completion failed"
            );
            match error.downcast_ref::<LlmError>() {
                Some(LlmError::MissingApiKey(_)) => {
                    ApplicationError::Configuration(error.to_string())
                }
                _ => ApplicationError::Integration(format!("{error:#}")),
            }
        })?;

        Ok(PromotionPlan { scheme_name: scheme_name.to_owned(), plan })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use postwise_core::config::PipelineConfig;
    use postwise_core::errors::{ApplicationError, DomainError};
    use postwise_data::{demo_dataset, demo_models};
    use serde_json::json;

    use super::{PlanRequest, PromotionPlanner};
    use crate::llm::{ChatMessage, LlmClient, LlmError};

    #[derive(Default)]
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            let user = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            let mut prompts = self.prompts.lock().map_err(|_| anyhow!("poisoned"))?;
            prompts.push(user);
            Ok(format!("plan #{}", prompts.len()))
        }
    }

    struct FailingLlm(fn() -> anyhow::Error);

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            Err((self.0)())
        }
    }

    fn request(post_office: &str, top_n: usize) -> PlanRequest<'_> {
        PlanRequest { post_office, top_n, include_neighbor_vote: true, current_month: 7 }
    }

    #[tokio::test]
    async fn one_plan_per_recommended_scheme_in_order() {
        let llm = Arc::new(RecordingLlm::default());
        let planner = PromotionPlanner::new(llm.clone()).expect("planner");
        let dataset = demo_dataset();

        let plans = planner
            .generate(&dataset, &demo_models(), &PipelineConfig::default(), request("Aluva SO", 3))
            .await
            .expect("plans");

        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].plan, "plan #1");
        assert_eq!(plans[2].plan, "plan #3");
        let prompts = llm.prompts.lock().expect("lock");
        for (plan, prompt) in plans.iter().zip(prompts.iter()) {
            assert!(prompt.starts_with(&format!("Scheme Name: {}\n", plan.scheme_name)));
            assert!(prompt.contains("Aluva SO"));
        }
    }

    #[tokio::test]
    async fn unknown_office_is_not_found_before_any_llm_call() {
        let llm = Arc::new(RecordingLlm::default());
        let planner = PromotionPlanner::new(llm.clone()).expect("planner");

        let error = planner
            .generate(
                &demo_dataset(),
                &demo_models(),
                &PipelineConfig::default(),
                request("Nowhere BO", 3),
            )
            .await
            .expect_err("unknown office");

        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::PostOfficeNotFound("Nowhere BO".to_owned()))
        );
        assert!(llm.prompts.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn missing_scheme_details_is_a_data_error() {
        let planner = PromotionPlanner::new(Arc::new(RecordingLlm::default())).expect("planner");
        let mut dataset = demo_dataset();
        dataset.scheme_details.clear();

        let error = planner
            .generate(&dataset, &demo_models(), &PipelineConfig::default(), request("Mala BO", 1))
            .await
            .expect_err("no details");
        assert!(matches!(error, ApplicationError::Data(_)));
    }

    #[tokio::test]
    async fn llm_failures_are_classified() {
        let planner = PromotionPlanner::new(Arc::new(FailingLlm(|| {
            LlmError::MissingApiKey("groq".to_owned()).into()
        })))
        .expect("planner");
        let error = planner.plan_for("KVP", &json!({}), &json!([])).await.expect_err("no key");
        assert!(matches!(error, ApplicationError::Configuration(_)));

        let planner =
            PromotionPlanner::new(Arc::new(FailingLlm(|| anyhow!("connection refused"))))
                .expect("planner");
        let error = planner.plan_for("KVP", &json!({}), &json!([])).await.expect_err("down");
        assert!(matches!(error, ApplicationError::Integration(ref m) if m.contains("refused")));
    }
}
