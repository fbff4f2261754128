use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::domain::dataset::Dataset;
use crate::domain::scheme::SchemeFamily;
use crate::domain::series::HistoryWindow;
use crate::ensemble::{EnsemblePredictor, ModelBundle};
use crate::errors::{ApplicationError, DomainError};
use crate::nbf::calculate_nbf;
use crate::neighbors::{find_similar_post_offices, Neighbor};
use crate::ranking::{neighbor_weight, rank, score_schemes, SchemeScore, VoteTally, OWN_VOTE};

/// Calendar month (1-12) used for the agriculture score of live requests.
pub fn current_month() -> u32 {
    Local::now().month()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendOptions {
    pub top_n: usize,
    pub include_neighbor_vote: bool,
}

impl RecommendOptions {
    pub fn new(top_n: usize, include_neighbor_vote: bool) -> Self {
        Self { top_n, include_neighbor_vote }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub post_office: String,
    pub family: SchemeFamily,
    /// Final ordered list, after voting when enabled.
    pub schemes: Vec<String>,
    /// The office's own ranking, best first.
    pub scores: Vec<SchemeScore>,
    pub neighbors: Vec<Neighbor>,
    pub voted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecommendation {
    pub post_office: String,
    pub savings: Recommendation,
    pub insurance: Recommendation,
}

/// Runs neighbor search, ensemble prediction, NBF scoring, growth ranking and
/// optional neighbor voting over a loaded dataset.
pub struct SchemeRecommender<'a> {
    dataset: &'a Dataset,
    models: &'a ModelBundle,
    window: HistoryWindow,
    neighbor_count: usize,
}

impl<'a> SchemeRecommender<'a> {
    pub fn new(dataset: &'a Dataset, models: &'a ModelBundle, pipeline: &PipelineConfig) -> Self {
        Self {
            dataset,
            models,
            window: HistoryWindow { months: pipeline.history_months, offset: pipeline.month_offset },
            neighbor_count: pipeline.neighbor_count,
        }
    }

    pub fn recommend(
        &self,
        post_office: &str,
        family: SchemeFamily,
        options: RecommendOptions,
        current_month: u32,
    ) -> Result<Recommendation, ApplicationError> {
        if options.top_n == 0 {
            return Err(DomainError::InvalidInput("top_n must be at least 1".to_owned()).into());
        }
        if !self.dataset.features.contains(post_office) {
            return Err(DomainError::PostOfficeNotFound(post_office.to_owned()).into());
        }

        let neighbors =
            find_similar_post_offices(&self.dataset.features, post_office, self.neighbor_count)?;
        let scores = self.rank_family(post_office, family, &neighbors, current_month)?;
        let own_top: Vec<String> =
            scores.iter().take(options.top_n).map(|score| score.scheme.clone()).collect();

        let schemes = if options.include_neighbor_vote {
            self.vote(&own_top, &neighbors, family, options.top_n, current_month)?
        } else {
            own_top
        };

        debug!(
            event_name = "pipeline.recommend.completed",
            post_office = %post_office,
            family = %family,
            neighbors = neighbors.len(),
            voted = options.include_neighbor_vote,
            "recommendation computed"
        );

        Ok(Recommendation {
            post_office: post_office.to_owned(),
            family,
            schemes,
            scores,
            neighbors,
            voted: options.include_neighbor_vote,
        })
    }

    /// Savings and insurance lists for one office.
    pub fn recommend_both(
        &self,
        post_office: &str,
        savings_top_n: usize,
        insurance_top_n: usize,
        include_neighbor_vote: bool,
        current_month: u32,
    ) -> Result<CombinedRecommendation, ApplicationError> {
        let savings = self.recommend(
            post_office,
            SchemeFamily::Savings,
            RecommendOptions::new(savings_top_n, include_neighbor_vote),
            current_month,
        )?;
        let insurance = self.recommend(
            post_office,
            SchemeFamily::Insurance,
            RecommendOptions::new(insurance_top_n, include_neighbor_vote),
            current_month,
        )?;
        Ok(CombinedRecommendation { post_office: post_office.to_owned(), savings, insurance })
    }

    fn rank_family(
        &self,
        post_office: &str,
        family: SchemeFamily,
        neighbors: &[Neighbor],
        current_month: u32,
    ) -> Result<Vec<SchemeScore>, ApplicationError> {
        let data = self.dataset.family(family);
        let peers: Vec<String> = neighbors.iter().map(|n| n.post_office.clone()).collect();

        let predictions =
            EnsemblePredictor::new(family, data, self.models.family(family), self.window)
                .predict(post_office, &peers)?;
        let past = data
            .past_enrollment
            .for_post_office(post_office)
            .ok_or_else(|| DomainError::MissingEnrollment(post_office.to_owned()))?;
        let nbf = calculate_nbf(
            &self.dataset.demographics,
            &self.dataset.crops,
            post_office,
            family,
            current_month,
        )?;

        Ok(rank(score_schemes(family.schemes(), &predictions, past, &nbf)))
    }

    fn vote(
        &self,
        own_top: &[String],
        neighbors: &[Neighbor],
        family: SchemeFamily,
        top_n: usize,
        current_month: u32,
    ) -> Result<Vec<String>, ApplicationError> {
        let mut tally = VoteTally::new();
        for scheme in own_top {
            tally.add(scheme, OWN_VOTE);
        }

        for neighbor in neighbors {
            let ranked = find_similar_post_offices(
                &self.dataset.features,
                &neighbor.post_office,
                self.neighbor_count,
            )
            .and_then(|peers| {
                self.rank_family(&neighbor.post_office, family, &peers, current_month)
            });
            let ranked = match ranked {
                Ok(ranked) => ranked,
                Err(ApplicationError::Domain(error)) => {
                    warn!(
                        event_name = "pipeline.vote.neighbor_skipped",
                        neighbor = %neighbor.post_office,
                        family = %family,
                        error = %error,
                        "neighbor excluded from voting"
                    );
                    continue;
                }
                Err(error) => return Err(error),
            };

            let weight = neighbor_weight(neighbor.distance);
            for score in ranked.iter().take(top_n) {
                tally.add(&score.scheme, weight);
            }
        }

        Ok(tally.top(top_n))
    }
}
