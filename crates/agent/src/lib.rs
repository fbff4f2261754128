//! Promotion planning - LLM-drafted outreach plans for recommended schemes
//!
//! The agent turns a post office's recommended savings schemes into
//! natural-language promotion plans:
//! 1. **Recommendation** - the core pipeline ranks schemes for the office
//! 2. **Prompting** (`prompt`) - scheme details and the office's demographics
//!    are rendered into a fixed system/user message pair
//! 3. **Completion** (`llm`) - an OpenAI-compatible chat endpoint drafts the plan
//!
//! # Key Types
//!
//! - `PromotionPlanner` - orchestrates recommendation, prompting and completion
//! - `LlmClient` - pluggable trait; `ChatCompletionClient` talks to Groq/OpenAI/Ollama
//!
//! The LLM only writes prose. Which schemes get a plan is decided by the
//! deterministic scoring pipeline in `postwise-core`.

pub mod llm;
pub mod planner;
pub mod prompt;

pub use llm::{ChatCompletionClient, ChatMessage, ChatRole, LlmClient, LlmError};
pub use planner::{PlanRequest, PromotionPlan, PromotionPlanner};
pub use prompt::{PromptError, PromptRenderer};
