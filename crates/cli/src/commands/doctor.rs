use postwise_core::config::{AppConfig, LoadOptions};
use postwise_core::domain::scheme::SchemeFamily;
use postwise_data::{load_dataset, load_models};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_dataset(&config));
            checks.push(check_models(&config));
            checks.push(check_llm(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["dataset_load", "model_load", "llm_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // An unconfigured LLM only blocks promotion plans, so it warns instead of failing.
    let failed = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_dataset(config: &AppConfig) -> DoctorCheck {
    match load_dataset(&config.data.dir, &config.data.past_enrollment_column) {
        Ok(dataset) => DoctorCheck {
            name: "dataset_load",
            status: CheckStatus::Pass,
            details: format!(
                "{} post offices, {} districts, {} scheme details from `{}`",
                dataset.features.len(),
                dataset.districts.len(),
                dataset.scheme_details.len(),
                config.data.dir.display()
            ),
        },
        Err(error) => DoctorCheck {
            name: "dataset_load",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_models(config: &AppConfig) -> DoctorCheck {
    match load_models(&config.data.models_dir) {
        Ok(models) => {
            let widths = SchemeFamily::ALL
                .iter()
                .map(|family| {
                    format!("{family}: dense input {}", models.family(*family).dense.input_width())
                })
                .collect::<Vec<_>>();
            DoctorCheck {
                name: "model_load",
                status: CheckStatus::Pass,
                details: widths.join(", "),
            }
        }
        Err(error) => {
            DoctorCheck { name: "model_load", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_llm(config: &AppConfig) -> DoctorCheck {
    if config.llm.is_ready() {
        DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Pass,
            details: format!("{} via {}", config.llm.model, config.llm.effective_base_url()),
        }
    } else {
        DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Warn,
            details: format!(
                "provider `{}` has no api key; promotion plans are unavailable",
                config.llm.provider
            ),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
