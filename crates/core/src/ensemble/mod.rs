pub mod network;

use serde::{Deserialize, Serialize};

use crate::domain::dataset::FamilyData;
use crate::domain::scheme::SchemeFamily;
use crate::domain::series::{HistoryWindow, Matrix, TimeSeriesTable};
use crate::errors::{ApplicationError, DomainError};

pub use network::{Activation, BranchNetwork, DenseLayer, DenseNetwork, NetworkError, RecurrentEncoder};

pub const DENSE_WEIGHT: f64 = 0.7;
pub const BRANCH_WEIGHT: f64 = 0.3;

/// The two predictors trained for one scheme family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyModels {
    pub dense: DenseNetwork,
    pub branch: BranchNetwork,
}

impl FamilyModels {
    /// Both networks must be well formed and emit one score per scheme.
    pub fn validate(&self, family: SchemeFamily) -> Result<(), ApplicationError> {
        self.dense.validate().map_err(|error| model_error(family, "dense", error))?;
        self.branch.validate().map_err(|error| model_error(family, "branch", error))?;
        let expected = family.schemes().len();
        for (name, width) in
            [("dense", self.dense.output_width()), ("branch", self.branch.output_width())]
        {
            if width != expected {
                return Err(ApplicationError::Model(format!(
                    "{family} {name} model emits {width} scores for {expected} schemes"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub savings: FamilyModels,
    pub insurance: FamilyModels,
}

impl ModelBundle {
    pub fn family(&self, family: SchemeFamily) -> &FamilyModels {
        match family {
            SchemeFamily::Savings => &self.savings,
            SchemeFamily::Insurance => &self.insurance,
        }
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        for family in SchemeFamily::ALL {
            self.family(family).validate(family)?;
        }
        Ok(())
    }
}

/// Window matrices for one post office and its peer average.
#[derive(Clone, Debug, PartialEq)]
pub struct EnsembleInputs {
    pub dense_own: Matrix,
    pub dense_neighbors: Matrix,
    pub branch_own: Matrix,
    pub branch_neighbors: Matrix,
    pub qualifying_peers: usize,
}

impl EnsembleInputs {
    /// Own and peer-average rows side by side per month, flattened row-major.
    pub fn dense_input(&self) -> Result<Vec<f64>, ApplicationError> {
        Ok(self.dense_own.hstack(&self.dense_neighbors)?.as_slice().to_vec())
    }
}

/// Builds predictor inputs. Peers without a full window are ignored; when none
/// qualify the peer average is all zeros.
pub fn assemble_inputs(
    data: &FamilyData,
    post_office: &str,
    peers: &[String],
    window: HistoryWindow,
) -> Result<EnsembleInputs, ApplicationError> {
    let series = &data.series;
    let dense_columns = series.column_indices(&data.columns.dense)?;
    let branch_columns = series.column_indices(&data.columns.branch)?;

    let own = |columns: &[usize]| {
        series.window(post_office, columns, window).ok_or_else(|| {
            ApplicationError::from(DomainError::InsufficientHistory {
                post_office: post_office.to_owned(),
                required: window.months,
                available: series.history(post_office).len(),
            })
        })
    };
    let dense_own = own(&dense_columns)?;
    let branch_own = own(&branch_columns)?;

    let qualifying: Vec<&str> = peers
        .iter()
        .map(String::as_str)
        .filter(|peer| *peer != post_office && series.history(peer).len() >= window.months)
        .collect();

    Ok(EnsembleInputs {
        dense_neighbors: peer_average(series, &qualifying, &dense_columns, window),
        branch_neighbors: peer_average(series, &qualifying, &branch_columns, window),
        dense_own,
        branch_own,
        qualifying_peers: qualifying.len(),
    })
}

fn peer_average(
    series: &TimeSeriesTable,
    peers: &[&str],
    columns: &[usize],
    window: HistoryWindow,
) -> Matrix {
    let windows: Vec<Matrix> =
        peers.iter().filter_map(|peer| series.window(peer, columns, window)).collect();
    Matrix::mean(&windows).unwrap_or_else(|| Matrix::zeros(window.months, columns.len()))
}

/// Blends the dense and branch predictors for one scheme family.
pub struct EnsemblePredictor<'a> {
    family: SchemeFamily,
    data: &'a FamilyData,
    models: &'a FamilyModels,
    window: HistoryWindow,
}

impl<'a> EnsemblePredictor<'a> {
    pub fn new(
        family: SchemeFamily,
        data: &'a FamilyData,
        models: &'a FamilyModels,
        window: HistoryWindow,
    ) -> Self {
        Self { family, data, models, window }
    }

    /// One score per scheme, in the family's scheme order.
    pub fn predict(&self, post_office: &str, peers: &[String]) -> Result<Vec<f64>, ApplicationError> {
        let inputs = assemble_inputs(self.data, post_office, peers, self.window)?;

        let dense = self
            .models
            .dense
            .forward(&inputs.dense_input()?)
            .map_err(|error| model_error(self.family, "dense", error))?;
        let branch = self
            .models
            .branch
            .forward(
                inputs.branch_own.as_slice(),
                inputs.branch_neighbors.as_slice(),
                &inputs.branch_own,
            )
            .map_err(|error| model_error(self.family, "branch", error))?;

        let expected = self.family.schemes().len();
        if dense.len() != expected || branch.len() != expected {
            return Err(ApplicationError::Model(format!(
                "{} predictors returned {} and {} scores for {expected} schemes",
                self.family,
                dense.len(),
                branch.len()
            )));
        }

        Ok(dense.iter().zip(&branch).map(|(a, b)| DENSE_WEIGHT * a + BRANCH_WEIGHT * b).collect())
    }
}

fn model_error(family: SchemeFamily, name: &str, error: NetworkError) -> ApplicationError {
    ApplicationError::Model(format!("{family} {name} model: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{assemble_inputs, EnsemblePredictor, FamilyModels};
    use crate::domain::dataset::{FamilyData, ModelColumns};
    use crate::domain::scheme::{EnrollmentTable, SchemeFamily};
    use crate::domain::series::{HistoryWindow, MonthlyRecord, TimeSeriesTable};
    use crate::ensemble::network::{
        Activation, BranchNetwork, DenseLayer, DenseNetwork, RecurrentEncoder,
    };
    use crate::errors::{ApplicationError, DomainError};

    const WINDOW: HistoryWindow = HistoryWindow { months: 2, offset: 1 };

    fn family_data() -> FamilyData {
        let mut series = TimeSeriesTable::new(vec!["a".to_owned(), "b".to_owned()]);
        for (office, months, scale) in
            [("Alpha SO", 3, 1.0), ("Beta BO", 3, 2.0), ("Gamma BO", 3, 4.0), ("Short BO", 1, 9.0)]
        {
            for month in 1..=months {
                let m = f64::from(month);
                series
                    .push(
                        office,
                        MonthlyRecord { month: month.to_string(), values: vec![m * scale, -m] },
                    )
                    .expect("push");
            }
        }
        FamilyData {
            series,
            columns: ModelColumns { dense: vec!["a".to_owned()], branch: vec!["b".to_owned()] },
            past_enrollment: EnrollmentTable::new(),
        }
    }

    /// Dense sums its inputs into every scheme; branch returns a constant 10.
    fn models() -> FamilyModels {
        let schemes = SchemeFamily::Savings.schemes().len();
        let dense = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0; schemes]; 4],
            bias: vec![0.0; schemes],
            activation: Activation::Linear,
        }])
        .expect("dense");
        let zero = |inputs: usize| {
            DenseNetwork::new(vec![DenseLayer {
                weights: vec![vec![0.0]; inputs],
                bias: vec![0.0],
                activation: Activation::Linear,
            }])
            .expect("branch part")
        };
        let branch = BranchNetwork {
            main: zero(2),
            neighbor: zero(2),
            series: RecurrentEncoder {
                input_weights: vec![vec![0.0]],
                recurrent_weights: vec![vec![0.0]],
                bias: vec![0.0],
            },
            head: DenseNetwork::new(vec![DenseLayer {
                weights: vec![vec![0.0; schemes]; 3],
                bias: vec![10.0; schemes],
                activation: Activation::Linear,
            }])
            .expect("head"),
        };
        FamilyModels { dense, branch }
    }

    #[test]
    fn peer_average_ignores_short_histories() {
        let peers = vec!["Beta BO".to_owned(), "Gamma BO".to_owned(), "Short BO".to_owned()];
        let inputs = assemble_inputs(&family_data(), "Alpha SO", &peers, WINDOW).expect("inputs");

        assert_eq!(inputs.qualifying_peers, 2);
        assert_eq!(inputs.dense_own.as_slice(), &[1.0, 2.0]);
        // mean of Beta [2, 4] and Gamma [4, 8]
        assert_eq!(inputs.dense_neighbors.as_slice(), &[3.0, 6.0]);
        assert_eq!(inputs.dense_input().expect("dense input"), vec![1.0, 3.0, 2.0, 6.0]);
    }

    #[test]
    fn no_qualifying_peers_yields_zero_average() {
        let inputs = assemble_inputs(&family_data(), "Alpha SO", &["Short BO".to_owned()], WINDOW)
            .expect("inputs");
        assert_eq!(inputs.qualifying_peers, 0);
        assert_eq!(inputs.branch_neighbors.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn short_target_history_is_insufficient() {
        let error = assemble_inputs(&family_data(), "Short BO", &[], WINDOW).expect_err("short");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::InsufficientHistory {
                post_office: "Short BO".to_owned(),
                required: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn blends_dense_and_branch_scores() {
        let data = family_data();
        let models = models();
        models.validate(SchemeFamily::Savings).expect("valid models");

        let predictor = EnsemblePredictor::new(SchemeFamily::Savings, &data, &models, WINDOW);
        let scores = predictor.predict("Alpha SO", &["Beta BO".to_owned()]).expect("predict");

        // dense input [1, 2, 2, 4] sums to 9
        let expected = 0.7 * 9.0 + 0.3 * 10.0;
        assert_eq!(scores.len(), 10);
        assert!(scores.iter().all(|score| (score - expected).abs() < 1e-9));
    }

    #[test]
    fn validation_rejects_wrong_scheme_count() {
        let models = models();
        assert!(models.validate(SchemeFamily::Savings).is_ok());

        let mut narrow = models;
        narrow.dense = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0]; 4],
            bias: vec![0.0],
            activation: Activation::Linear,
        }])
        .expect("dense");
        assert!(matches!(narrow.validate(SchemeFamily::Savings), Err(ApplicationError::Model(_))));
    }
}
