use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const VOTE_EPSILON: f64 = 1e-6;
pub const OWN_VOTE: f64 = 1.0;

/// Score breakdown for one scheme at one post office.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemeScore {
    pub scheme: String,
    pub prediction: f64,
    pub past_enrollment: f64,
    pub growth_rate: f64,
    pub nbf: f64,
    pub score: f64,
}

/// `(prediction - past) / past`, with a past of zero treated as one.
pub fn growth_rate(prediction: f64, past: f64) -> f64 {
    let denominator = if past == 0.0 { 1.0 } else { past };
    (prediction - past) / denominator
}

/// Scores every scheme in `schemes` order. Missing past enrollment counts as 0 and a
/// missing NBF as 1.
pub fn score_schemes(
    schemes: &[&str],
    predictions: &[f64],
    past_enrollment: &BTreeMap<String, f64>,
    nbf: &BTreeMap<String, f64>,
) -> Vec<SchemeScore> {
    schemes
        .iter()
        .zip(predictions)
        .map(|(scheme, prediction)| {
            let past = past_enrollment.get(*scheme).copied().unwrap_or(0.0);
            let nbf = nbf.get(*scheme).copied().unwrap_or(1.0);
            let growth_rate = growth_rate(*prediction, past);
            SchemeScore {
                scheme: (*scheme).to_owned(),
                prediction: *prediction,
                past_enrollment: past,
                growth_rate,
                nbf,
                score: growth_rate * nbf,
            }
        })
        .collect()
}

/// Highest score first. Stable, with non-finite scores last.
pub fn rank(mut scores: Vec<SchemeScore>) -> Vec<SchemeScore> {
    scores.sort_by(|left, right| descending_finite_first(left.score, right.score));
    scores
}

fn descending_finite_first(left: f64, right: f64) -> Ordering {
    match (left.is_finite(), right.is_finite()) {
        (true, true) => right.total_cmp(&left),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

pub fn neighbor_weight(distance: f64) -> f64 {
    1.0 / (distance + VOTE_EPSILON)
}

/// Accumulated vote weight per scheme, remembering first-insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoteTally {
    votes: Vec<(String, f64)>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, scheme: &str, weight: f64) {
        match self.votes.iter_mut().find(|(existing, _)| existing == scheme) {
            Some((_, total)) => *total += weight,
            None => self.votes.push((scheme.to_owned(), weight)),
        }
    }

    pub fn total(&self, scheme: &str) -> Option<f64> {
        self.votes.iter().find(|(existing, _)| existing == scheme).map(|(_, total)| *total)
    }

    /// Schemes by total vote descending; ties keep insertion order.
    pub fn top(&self, count: usize) -> Vec<String> {
        let mut ranked = self.votes.clone();
        ranked.sort_by(|left, right| descending_finite_first(left.1, right.1));
        ranked.into_iter().take(count).map(|(scheme, _)| scheme).collect()
    }
}
