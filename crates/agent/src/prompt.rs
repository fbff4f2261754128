use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};
use thiserror::Error;

use crate::llm::ChatMessage;

const SYSTEM_TEMPLATE: &str = "promotion/system";
const USER_TEMPLATE: &str = "promotion/user";

const SYSTEM_PROMPT: &str = r#"You are a strategic marketing assistant for postal schemes in rural and semi-urban regions.
Write a promotion plan tailored to the region described by the demographics and agriculture data.
Keep it practical and culturally relevant, give clear steps covering channels, partnerships and incentives, and make the benefits to each target group explicit.

Structure the plan exactly as follows:
1. **Scheme Overview**: what the scheme offers and why it matters for this region.
2. **Target Audience**: the groups to reach, such as farmers, salaried workers and retired residents.
3. **Promotion Strategies**:
   - Communication channels (community meetings, SMS, pamphlets)
   - Partnerships (agricultural cooperatives, schools, local businesses)
   - Incentives for early enrollment
4. **Execution Timeline**: phased activities aligned with local seasons.
5. **Key Metrics**: enrollments, awareness levels and community feedback."#;

const USER_PROMPT: &str = r#"Scheme Name: {{ scheme_name }}

Scheme Details: {{ scheme_details }}

Demographics and Agriculture Data:
{{ demographics }}"#;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt template failed: {0}")]
    Template(#[from] tera::Error),
    #[error("prompt data could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct UserPrompt<'a> {
    scheme_name: &'a str,
    scheme_details: String,
    demographics: String,
}

/// Renders the system/user message pair for one scheme.
pub struct PromptRenderer {
    tera: Tera,
}

impl PromptRenderer {
    pub fn new() -> Result<Self, PromptError> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_template(SYSTEM_TEMPLATE, SYSTEM_PROMPT)?;
        tera.add_raw_template(USER_TEMPLATE, USER_PROMPT)?;
        Ok(Self { tera })
    }

    pub fn render(
        &self,
        scheme_name: &str,
        scheme_details: &Value,
        demographics: &Value,
    ) -> Result<Vec<ChatMessage>, PromptError> {
        let prompt = UserPrompt {
            scheme_name,
            scheme_details: inline_value(scheme_details)?,
            demographics: serde_json::to_string_pretty(demographics)?,
        };
        let context = Context::from_serialize(&prompt)?;

        Ok(vec![
            ChatMessage::system(self.tera.render(SYSTEM_TEMPLATE, &Context::new())?),
            ChatMessage::user(self.tera.render(USER_TEMPLATE, &context)?),
        ])
    }
}

// Plain strings are inlined as-is; structured details stay JSON.
fn inline_value(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => serde_json::to_string(other),
    }
}
