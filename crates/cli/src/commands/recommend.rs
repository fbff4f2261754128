use clap::ValueEnum;
use postwise_core::domain::scheme::SchemeFamily;
use postwise_core::recommend::{current_month, RecommendOptions, SchemeRecommender};
use serde_json::Value;

use crate::commands::{load_bundle, load_config, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    Savings,
    Insurance,
    Both,
}

#[derive(Clone, Debug)]
pub struct RecommendArgs {
    pub post_office: String,
    pub family: FamilyArg,
    pub top_n: Option<usize>,
    pub vote: bool,
    pub month: Option<u32>,
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let (dataset, models) = match load_bundle("recommend", &config) {
        Ok(bundle) => bundle,
        Err(result) => return result,
    };

    let recommender = SchemeRecommender::new(&dataset, &models, &config.pipeline);
    let month = args.month.unwrap_or_else(current_month);
    let families: &[SchemeFamily] = match args.family {
        FamilyArg::Savings => &[SchemeFamily::Savings],
        FamilyArg::Insurance => &[SchemeFamily::Insurance],
        FamilyArg::Both => &SchemeFamily::ALL,
    };

    let mut data = serde_json::Map::new();
    data.insert("post_office".to_string(), Value::String(args.post_office.clone()));
    data.insert("month".to_string(), Value::from(month));
    for family in families {
        let top_n = args.top_n.unwrap_or(match family {
            SchemeFamily::Savings => config.pipeline.savings_top_n,
            SchemeFamily::Insurance => config.pipeline.insurance_top_n,
        });
        let options = RecommendOptions::new(top_n, args.vote);
        match recommender.recommend(&args.post_office, *family, options, month) {
            Ok(recommendation) => match serde_json::to_value(&recommendation) {
                Ok(value) => {
                    data.insert(family.to_string(), value);
                }
                Err(error) => {
                    let message = error.to_string();
                    return CommandResult::failure("recommend", "serialization", message, 6);
                }
            },
            Err(error) => return CommandResult::from_application("recommend", error),
        }
    }

    CommandResult::success_with_data(
        "recommend",
        format!("recommendations computed for `{}`", args.post_office),
        Value::Object(data),
    )
}
