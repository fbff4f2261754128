use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data: DataConfig,
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub models_dir: PathBuf,
    pub past_enrollment_column: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub history_months: usize,
    pub month_offset: usize,
    pub neighbor_count: usize,
    pub savings_top_n: usize,
    pub insurance_top_n: usize,
    pub plan_top_n: usize,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Groq,
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                dir: PathBuf::from("data"),
                models_dir: PathBuf::from("models"),
                past_enrollment_column: "Month_24".to_string(),
            },
            pipeline: PipelineConfig::default(),
            llm: LlmConfig {
                provider: LlmProvider::Groq,
                api_key: None,
                base_url: None,
                model: "llama-3.1-70b-versatile".to_string(),
                timeout_secs: 60,
                temperature: 1.0,
                max_tokens: 1024,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_months: 23,
            month_offset: 1,
            neighbor_count: 5,
            savings_top_n: 2,
            insurance_top_n: 1,
            plan_top_n: 3,
        }
    }
}

impl LlmProvider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn requires_api_key(self) -> bool {
        matches!(self, Self::Groq | Self::OpenAi)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LlmConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_else(|| self.provider.default_base_url())
    }

    /// True when a call can be attempted without failing on missing credentials.
    pub fn is_ready(&self) -> bool {
        if !self.provider.requires_api_key() {
            return true;
        }
        self.api_key.as_ref().map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false)
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected groq|openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("postwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(dir) = data.dir {
                self.data.dir = dir;
            }
            if let Some(models_dir) = data.models_dir {
                self.data.models_dir = models_dir;
            }
            if let Some(column) = data.past_enrollment_column {
                self.data.past_enrollment_column = column;
            }
        }

        if let Some(pipeline) = patch.pipeline {
            if let Some(history_months) = pipeline.history_months {
                self.pipeline.history_months = history_months;
            }
            if let Some(month_offset) = pipeline.month_offset {
                self.pipeline.month_offset = month_offset;
            }
            if let Some(neighbor_count) = pipeline.neighbor_count {
                self.pipeline.neighbor_count = neighbor_count;
            }
            if let Some(savings_top_n) = pipeline.savings_top_n {
                self.pipeline.savings_top_n = savings_top_n;
            }
            if let Some(insurance_top_n) = pipeline.insurance_top_n {
                self.pipeline.insurance_top_n = insurance_top_n;
            }
            if let Some(plan_top_n) = pipeline.plan_top_n {
                self.pipeline.plan_top_n = plan_top_n;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("POSTWISE_DATA_DIR") {
            self.data.dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("POSTWISE_MODELS_DIR") {
            self.data.models_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("POSTWISE_PAST_ENROLLMENT_COLUMN") {
            self.data.past_enrollment_column = value;
        }

        if let Some(value) = read_env("POSTWISE_PIPELINE_HISTORY_MONTHS") {
            self.pipeline.history_months = parse_usize("POSTWISE_PIPELINE_HISTORY_MONTHS", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_PIPELINE_MONTH_OFFSET") {
            self.pipeline.month_offset = parse_usize("POSTWISE_PIPELINE_MONTH_OFFSET", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_PIPELINE_NEIGHBOR_COUNT") {
            self.pipeline.neighbor_count = parse_usize("POSTWISE_PIPELINE_NEIGHBOR_COUNT", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_PIPELINE_SAVINGS_TOP_N") {
            self.pipeline.savings_top_n = parse_usize("POSTWISE_PIPELINE_SAVINGS_TOP_N", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_PIPELINE_INSURANCE_TOP_N") {
            self.pipeline.insurance_top_n =
                parse_usize("POSTWISE_PIPELINE_INSURANCE_TOP_N", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_PIPELINE_PLAN_TOP_N") {
            self.pipeline.plan_top_n = parse_usize("POSTWISE_PIPELINE_PLAN_TOP_N", &value)?;
        }

        if let Some(value) = read_env("POSTWISE_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("POSTWISE_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("POSTWISE_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("POSTWISE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("POSTWISE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("POSTWISE_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f64("POSTWISE_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("POSTWISE_LLM_MAX_TOKENS") {
            self.llm.max_tokens = parse_u32("POSTWISE_LLM_MAX_TOKENS", &value)?;
        }

        if let Some(value) = read_env("POSTWISE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("POSTWISE_SERVER_PORT") {
            self.server.port = parse_u16("POSTWISE_SERVER_PORT", &value)?;
        }

        let log_level =
            read_env("POSTWISE_LOGGING_LEVEL").or_else(|| read_env("POSTWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("POSTWISE_LOGGING_FORMAT").or_else(|| read_env("POSTWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data.dir = data_dir;
        }
        if let Some(models_dir) = overrides.models_dir {
            self.data.models_dir = models_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_pipeline(&self.pipeline)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("postwise.toml"), PathBuf::from("config/postwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    if data.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("data.dir must not be empty".to_string()));
    }
    if data.models_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("data.models_dir must not be empty".to_string()));
    }
    if data.past_enrollment_column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "data.past_enrollment_column must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_pipeline(pipeline: &PipelineConfig) -> Result<(), ConfigError> {
    let positive = [
        ("pipeline.history_months", pipeline.history_months),
        ("pipeline.neighbor_count", pipeline.neighbor_count),
        ("pipeline.savings_top_n", pipeline.savings_top_n),
        ("pipeline.insurance_top_n", pipeline.insurance_top_n),
        ("pipeline.plan_top_n", pipeline.plan_top_n),
    ];
    for (key, value) in positive {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{key} must be greater than zero")));
        }
    }
    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    if llm.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm.max_tokens must be greater than zero".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    let base_url = llm.effective_base_url();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    pipeline: Option<PipelinePatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    dir: Option<PathBuf>,
    models_dir: Option<PathBuf>,
    past_enrollment_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PipelinePatch {
    history_months: Option<usize>,
    month_offset: Option<usize>,
    neighbor_count: Option<usize>,
    savings_top_n: Option<usize>,
    insurance_top_n: Option<usize>,
    plan_top_n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
