//! Inference-only networks loaded from JSON artifacts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::series::Matrix;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("network has no layers")]
    Empty,
    #[error("layer {layer}: {detail}")]
    LayerShape { layer: usize, detail: String },
    #[error("expected input width {expected}, got {actual}")]
    InputWidth { expected: usize, actual: usize },
    #[error("branch shapes do not line up: {0}")]
    BranchShape(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Relu => value.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-value).exp()),
            Self::Tanh => value.tanh(),
        }
    }
}

/// Fully connected layer. `weights` is indexed `[input][output]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn input_width(&self) -> usize {
        self.weights.len()
    }

    pub fn output_width(&self) -> usize {
        self.bias.len()
    }

    fn validate(&self, layer: usize) -> Result<(), NetworkError> {
        if self.weights.is_empty() || self.bias.is_empty() {
            return Err(NetworkError::LayerShape {
                layer,
                detail: "weights and bias must be non-empty".to_owned(),
            });
        }
        if let Some(row) = self.weights.iter().position(|row| row.len() != self.bias.len()) {
            return Err(NetworkError::LayerShape {
                layer,
                detail: format!(
                    "weight row {row} has {} columns but bias has {}",
                    self.weights[row].len(),
                    self.bias.len()
                ),
            });
        }
        Ok(())
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut output = self.bias.clone();
        for (value, row) in input.iter().zip(&self.weights) {
            for (slot, weight) in output.iter_mut().zip(row) {
                *slot += value * weight;
            }
        }
        output.into_iter().map(|value| self.activation.apply(value)).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, NetworkError> {
        let network = Self { layers };
        network.validate()?;
        Ok(network)
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.layers.is_empty() {
            return Err(NetworkError::Empty);
        }
        for (index, layer) in self.layers.iter().enumerate() {
            layer.validate(index)?;
        }
        for (index, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_width() != pair[1].input_width() {
                return Err(NetworkError::LayerShape {
                    layer: index + 1,
                    detail: format!(
                        "expects {} inputs but previous layer emits {}",
                        pair[1].input_width(),
                        pair[0].output_width()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn input_width(&self) -> usize {
        self.layers.first().map(DenseLayer::input_width).unwrap_or(0)
    }

    pub fn output_width(&self) -> usize {
        self.layers.last().map(DenseLayer::output_width).unwrap_or(0)
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.input_width() {
            return Err(NetworkError::InputWidth {
                expected: self.input_width(),
                actual: input.len(),
            });
        }
        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        Ok(activations)
    }
}

/// Elman recurrent encoder returning the final hidden state:
/// `h_t = tanh(x_t * W_x + h_(t-1) * W_h + b)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurrentEncoder {
    pub input_weights: Vec<Vec<f64>>,
    pub recurrent_weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl RecurrentEncoder {
    pub fn input_width(&self) -> usize {
        self.input_weights.len()
    }

    pub fn hidden_width(&self) -> usize {
        self.bias.len()
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        let hidden = self.hidden_width();
        if hidden == 0 || self.input_weights.is_empty() {
            return Err(NetworkError::BranchShape("recurrent encoder is empty".to_owned()));
        }
        if self.input_weights.iter().any(|row| row.len() != hidden) {
            return Err(NetworkError::BranchShape(format!(
                "input weights must have {hidden} columns"
            )));
        }
        if self.recurrent_weights.len() != hidden
            || self.recurrent_weights.iter().any(|row| row.len() != hidden)
        {
            return Err(NetworkError::BranchShape(format!(
                "recurrent weights must be {hidden}x{hidden}"
            )));
        }
        Ok(())
    }

    pub fn encode(&self, series: &Matrix) -> Result<Vec<f64>, NetworkError> {
        if series.cols() != self.input_width() {
            return Err(NetworkError::InputWidth {
                expected: self.input_width(),
                actual: series.cols(),
            });
        }
        let mut hidden = vec![0.0; self.hidden_width()];
        for step in 0..series.rows() {
            let mut next = self.bias.clone();
            for (value, row) in series.row(step).iter().zip(&self.input_weights) {
                for (slot, weight) in next.iter_mut().zip(row) {
                    *slot += value * weight;
                }
            }
            for (value, row) in hidden.iter().zip(&self.recurrent_weights) {
                for (slot, weight) in next.iter_mut().zip(row) {
                    *slot += value * weight;
                }
            }
            hidden = next.into_iter().map(f64::tanh).collect();
        }
        Ok(hidden)
    }
}

/// Three-branch network: own history, neighbor average and the raw sequence,
/// joined by a dense head.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchNetwork {
    pub main: DenseNetwork,
    pub neighbor: DenseNetwork,
    pub series: RecurrentEncoder,
    pub head: DenseNetwork,
}

impl BranchNetwork {
    pub fn validate(&self) -> Result<(), NetworkError> {
        self.main.validate()?;
        self.neighbor.validate()?;
        self.series.validate()?;
        self.head.validate()?;
        let joined =
            self.main.output_width() + self.neighbor.output_width() + self.series.hidden_width();
        if joined != self.head.input_width() {
            return Err(NetworkError::BranchShape(format!(
                "head expects {} inputs but branches emit {joined}",
                self.head.input_width()
            )));
        }
        Ok(())
    }

    pub fn output_width(&self) -> usize {
        self.head.output_width()
    }

    pub fn forward(
        &self,
        own: &[f64],
        neighbor_average: &[f64],
        series: &Matrix,
    ) -> Result<Vec<f64>, NetworkError> {
        let mut joined = self.main.forward(own)?;
        joined.extend(self.neighbor.forward(neighbor_average)?);
        joined.extend(self.series.encode(series)?);
        self.head.forward(&joined)
    }
}
