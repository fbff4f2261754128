use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use postwise_cli::commands::recommend::{FamilyArg, RecommendArgs};
use postwise_cli::commands::{demographics, doctor, recommend, seed, trends};
use serde_json::Value;

#[test]
fn seed_then_recommend_both_families() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        let result = seed::run(None, None);
        assert_eq!(result.exit_code, 0, "expected seed success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let result = recommend::run(args("Aluva SO", FamilyArg::Both, None));
        assert_eq!(result.exit_code, 0, "expected recommend success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["month"], 7);
        assert_eq!(payload["data"]["savings"]["schemes"].as_array().map(Vec::len), Some(2));
        assert_eq!(payload["data"]["insurance"]["schemes"].as_array().map(Vec::len), Some(1));
    });
}

#[test]
fn recommend_single_family_honours_top_n() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        assert_eq!(seed::run(None, None).exit_code, 0);

        let result = recommend::run(args("Mala BO", FamilyArg::Insurance, Some(4)));
        assert_eq!(result.exit_code, 0, "{}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["insurance"]["schemes"].as_array().map(Vec::len), Some(4));
        assert!(payload["data"].get("savings").is_none());
    });
}

#[test]
fn recommend_reports_unknown_post_office() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        assert_eq!(seed::run(None, None).exit_code, 0);

        let result = recommend::run(args("Nowhere BO", FamilyArg::Savings, None));
        assert_eq!(result.exit_code, 4);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn recommend_without_data_is_a_load_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        let result = recommend::run(args("Aluva SO", FamilyArg::Both, None));
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "data_load");
    });
}

#[test]
fn invalid_env_override_is_a_config_failure() {
    with_env(&[("POSTWISE_PIPELINE_HISTORY_MONTHS", "many")], || {
        let result = recommend::run(args("Aluva SO", FamilyArg::Both, None));
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn trends_and_demographics_read_the_seeded_bundle() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        assert_eq!(seed::run(None, None).exit_code, 0);

        let result = demographics::run("Aluva SO");
        assert_eq!(result.exit_code, 0, "{}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"][0]["Post Office Name"], "Aluva SO");

        let district = postwise_data::demo_dataset().districts.rows()[0].area_name.clone();
        let result = trends::run(&district);
        assert_eq!(result.exit_code, 0, "{}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["projections"]["Years"].as_array().map(Vec::len), Some(5));

        assert_eq!(trends::run("Atlantis").exit_code, 4);
        assert_eq!(demographics::run("Nowhere BO").exit_code, 4);
    });
}

#[test]
fn doctor_passes_with_seeded_data_and_warns_on_llm() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        assert_eq!(seed::run(None, None).exit_code, 0);

        let report = parse_payload(&doctor::run(true));
        assert_eq!(report["overall_status"], "pass");
        let llm = report["checks"]
            .as_array()
            .and_then(|checks| checks.iter().find(|check| check["name"] == "llm_readiness"))
            .expect("llm check");
        assert_eq!(llm["status"], "warn");
    });
}

#[test]
fn doctor_fails_when_data_is_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env(&data_env(dir.path()), || {
        let output = doctor::run(false);
        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [fail] dataset_load:"));
    });
}

fn args(post_office: &str, family: FamilyArg, top_n: Option<usize>) -> RecommendArgs {
    RecommendArgs { post_office: post_office.to_string(), family, top_n, vote: true, month: Some(7) }
}

fn data_env(root: &Path) -> Vec<(&'static str, String)> {
    vec![
        ("POSTWISE_DATA_DIR", root.join("data").display().to_string()),
        ("POSTWISE_MODELS_DIR", root.join("models").display().to_string()),
    ]
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env<V: AsRef<str>>(vars: &[(&str, V)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "POSTWISE_DATA_DIR",
        "POSTWISE_MODELS_DIR",
        "POSTWISE_PAST_ENROLLMENT_COLUMN",
        "POSTWISE_PIPELINE_HISTORY_MONTHS",
        "POSTWISE_PIPELINE_MONTH_OFFSET",
        "POSTWISE_PIPELINE_NEIGHBOR_COUNT",
        "POSTWISE_PIPELINE_SAVINGS_TOP_N",
        "POSTWISE_PIPELINE_INSURANCE_TOP_N",
        "POSTWISE_PIPELINE_PLAN_TOP_N",
        "POSTWISE_LLM_PROVIDER",
        "POSTWISE_LLM_API_KEY",
        "POSTWISE_LLM_BASE_URL",
        "POSTWISE_LLM_MODEL",
        "POSTWISE_LLM_TIMEOUT_SECS",
        "POSTWISE_LLM_TEMPERATURE",
        "POSTWISE_LLM_MAX_TOKENS",
        "POSTWISE_SERVER_BIND_ADDRESS",
        "POSTWISE_SERVER_PORT",
        "POSTWISE_LOGGING_LEVEL",
        "POSTWISE_LOGGING_FORMAT",
        "POSTWISE_LOG_LEVEL",
        "POSTWISE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value.as_ref());
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
