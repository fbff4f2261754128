use std::env;
use std::fs;
use std::path::Path;

use postwise_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_key, value) in effective_values(&config) {
        let source = field_source(
            key_path,
            env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

fn effective_values(config: &AppConfig) -> Vec<(&'static str, &'static str, String)> {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        ("data.dir", "POSTWISE_DATA_DIR", config.data.dir.display().to_string()),
        ("data.models_dir", "POSTWISE_MODELS_DIR", config.data.models_dir.display().to_string()),
        (
            "data.past_enrollment_column",
            "POSTWISE_PAST_ENROLLMENT_COLUMN",
            config.data.past_enrollment_column.clone(),
        ),
        (
            "pipeline.history_months",
            "POSTWISE_PIPELINE_HISTORY_MONTHS",
            config.pipeline.history_months.to_string(),
        ),
        (
            "pipeline.month_offset",
            "POSTWISE_PIPELINE_MONTH_OFFSET",
            config.pipeline.month_offset.to_string(),
        ),
        (
            "pipeline.neighbor_count",
            "POSTWISE_PIPELINE_NEIGHBOR_COUNT",
            config.pipeline.neighbor_count.to_string(),
        ),
        (
            "pipeline.savings_top_n",
            "POSTWISE_PIPELINE_SAVINGS_TOP_N",
            config.pipeline.savings_top_n.to_string(),
        ),
        (
            "pipeline.insurance_top_n",
            "POSTWISE_PIPELINE_INSURANCE_TOP_N",
            config.pipeline.insurance_top_n.to_string(),
        ),
        (
            "pipeline.plan_top_n",
            "POSTWISE_PIPELINE_PLAN_TOP_N",
            config.pipeline.plan_top_n.to_string(),
        ),
        ("llm.provider", "POSTWISE_LLM_PROVIDER", config.llm.provider.to_string()),
        ("llm.model", "POSTWISE_LLM_MODEL", config.llm.model.clone()),
        ("llm.base_url", "POSTWISE_LLM_BASE_URL", config.llm.effective_base_url().to_string()),
        ("llm.api_key", "POSTWISE_LLM_API_KEY", api_key),
        ("llm.timeout_secs", "POSTWISE_LLM_TIMEOUT_SECS", config.llm.timeout_secs.to_string()),
        ("llm.temperature", "POSTWISE_LLM_TEMPERATURE", config.llm.temperature.to_string()),
        ("llm.max_tokens", "POSTWISE_LLM_MAX_TOKENS", config.llm.max_tokens.to_string()),
        ("server.bind_address", "POSTWISE_SERVER_BIND_ADDRESS", config.server.bind_address.clone()),
        ("server.port", "POSTWISE_SERVER_PORT", config.server.port.to_string()),
        ("logging.level", "POSTWISE_LOGGING_LEVEL", config.logging.level.clone()),
        ("logging.format", "POSTWISE_LOGGING_FORMAT", format!("{:?}", config.logging.format)),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

// Keeps a provider prefix such as `gsk_` or `sk-` visible.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some(index) = trimmed.find(['_', '-']) {
        return format!("{}***", &trimmed[..=index]);
    }

    "<redacted>".to_string()
}
