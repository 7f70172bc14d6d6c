//! The opaque trained model behind a fit/predict contract.
//!
//! The pipeline never inspects model internals: it hands a feature row to
//! [`WeatherModel::predict_raw`] and gets raw numeric output back, so any
//! conforming learner can be substituted. The default implementation is a
//! normalized linear model trained by batch gradient descent, with a
//! multi-output least-squares head for the regression kind and a logistic
//! head for the rain classifier.

pub mod error;

use crate::model::error::ModelError;
use serde::{Deserialize, Serialize};

/// Which trained artifact kind is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Multi-target regression: temperature, rainfall, wind, humidity.
    Regression,
    /// Binary rain/no-rain classifier.
    Classification,
}

/// Raw model output before any numeric interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawOutput {
    Regression {
        /// °C, unadjusted.
        temperature: f64,
        rainfall: f64,
        /// m/s, the model's native unit.
        wind_speed: f64,
        humidity: f64,
    },
    Classification {
        label: bool,
        probability: f64,
    },
}

/// The fit/predict capability the pipeline composes against.
pub trait WeatherModel {
    fn kind(&self) -> ModelKind;

    /// Number of feature columns the fitted state expects.
    fn n_features(&self) -> usize;

    /// Pure pass-through to the fitted state; performs no unit conversion
    /// or clamping. Fails only on a feature-shape mismatch.
    fn predict_raw(&self, features: &[f64]) -> Result<RawOutput, ModelError>;
}

const EPOCHS: usize = 300;
const LEARNING_RATE: f64 = 0.1;
const REGRESSION_TARGETS: usize = 4;

/// Normalized linear model: z-scored inputs, one weight vector and bias per
/// target, fitted with batch gradient descent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    kind: ModelKind,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
    /// weights[target][feature]
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl LinearModel {
    /// Fits the multi-target regression kind on (rows, targets) where each
    /// target row is [temperature, rainfall, wind m/s, humidity].
    pub fn fit_regression(
        rows: &[Vec<f64>],
        targets: &[[f64; REGRESSION_TARGETS]],
    ) -> Result<Self, ModelError> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let (means, stds) = column_stats(rows);
        let normalized: Vec<Vec<f64>> = rows.iter().map(|r| z_score(r, &means, &stds)).collect();

        let mut weights = vec![vec![0.0; means.len()]; REGRESSION_TARGETS];
        let mut biases = [0.0; REGRESSION_TARGETS];
        // Start each bias at the target mean; gradient descent then refines
        // the weights around it.
        for t in 0..REGRESSION_TARGETS {
            biases[t] = targets.iter().map(|y| y[t]).sum::<f64>() / targets.len() as f64;
        }

        let n = rows.len() as f64;
        for _ in 0..EPOCHS {
            let mut grad_w = vec![vec![0.0; means.len()]; REGRESSION_TARGETS];
            let mut grad_b = [0.0; REGRESSION_TARGETS];
            for (row, target) in normalized.iter().zip(targets) {
                for t in 0..REGRESSION_TARGETS {
                    let predicted = dot(&weights[t], row) + biases[t];
                    let error = predicted - target[t];
                    for (g, x) in grad_w[t].iter_mut().zip(row) {
                        *g += error * x;
                    }
                    grad_b[t] += error;
                }
            }
            for t in 0..REGRESSION_TARGETS {
                for (w, g) in weights[t].iter_mut().zip(&grad_w[t]) {
                    *w -= LEARNING_RATE * g / n;
                }
                biases[t] -= LEARNING_RATE * grad_b[t] / n;
            }
        }

        Ok(LinearModel {
            kind: ModelKind::Regression,
            feature_means: means,
            feature_stds: stds,
            weights,
            biases: biases.to_vec(),
        })
    }

    /// Fits the logistic rain classifier on (rows, rain-tomorrow labels).
    pub fn fit_classification(rows: &[Vec<f64>], labels: &[bool]) -> Result<Self, ModelError> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let (means, stds) = column_stats(rows);
        let normalized: Vec<Vec<f64>> = rows.iter().map(|r| z_score(r, &means, &stds)).collect();

        let mut weights = vec![0.0; means.len()];
        let mut bias = 0.0;
        let n = rows.len() as f64;
        for _ in 0..EPOCHS {
            let mut grad_w = vec![0.0; means.len()];
            let mut grad_b = 0.0;
            for (row, &label) in normalized.iter().zip(labels) {
                let error = sigmoid(dot(&weights, row) + bias) - if label { 1.0 } else { 0.0 };
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += error * x;
                }
                grad_b += error;
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= LEARNING_RATE * g / n;
            }
            bias -= LEARNING_RATE * grad_b / n;
        }

        Ok(LinearModel {
            kind: ModelKind::Classification,
            feature_means: means,
            feature_stds: stds,
            weights: vec![weights],
            biases: vec![bias],
        })
    }

    fn check_shape(&self, features: &[f64]) -> Result<(), ModelError> {
        if features.len() != self.feature_means.len() {
            return Err(ModelError::FeatureShapeMismatch {
                expected: self.feature_means.len(),
                found: features.len(),
            });
        }
        Ok(())
    }
}

impl WeatherModel for LinearModel {
    fn kind(&self) -> ModelKind {
        self.kind
    }

    fn n_features(&self) -> usize {
        self.feature_means.len()
    }

    fn predict_raw(&self, features: &[f64]) -> Result<RawOutput, ModelError> {
        self.check_shape(features)?;
        let row = z_score(features, &self.feature_means, &self.feature_stds);
        match self.kind {
            ModelKind::Regression => Ok(RawOutput::Regression {
                temperature: dot(&self.weights[0], &row) + self.biases[0],
                rainfall: dot(&self.weights[1], &row) + self.biases[1],
                wind_speed: dot(&self.weights[2], &row) + self.biases[2],
                humidity: dot(&self.weights[3], &row) + self.biases[3],
            }),
            ModelKind::Classification => {
                let probability = sigmoid(dot(&self.weights[0], &row) + self.biases[0]);
                Ok(RawOutput::Classification {
                    label: probability >= 0.5,
                    probability,
                })
            }
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn column_stats(rows: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let width = rows[0].len();
    let n = rows.len() as f64;
    let mut means = vec![0.0; width];
    for row in rows {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut means {
        *m /= n;
    }
    let mut stds = vec![0.0; width];
    for row in rows {
        for ((s, x), m) in stds.iter_mut().zip(row).zip(&means) {
            *s += (x - m) * (x - m);
        }
    }
    for s in &mut stds {
        // Constant columns get unit spread so z-scoring stays finite.
        *s = (*s / n).sqrt().max(1e-9);
    }
    (means, stds)
}

fn z_score(row: &[f64], means: &[f64], stds: &[f64]) -> Vec<f64> {
    row.iter()
        .zip(means)
        .zip(stds)
        .map(|((x, m), s)| (x - m) / s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_recovers_a_linear_relation() {
        // temperature = 20 + 2 * x0, everything else constant.
        let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64, 1.0]).collect();
        let targets: Vec<[f64; 4]> = (0..50)
            .map(|i| [20.0 + 2.0 * i as f64, 5.0, 3.0, 60.0])
            .collect();
        let model = LinearModel::fit_regression(&rows, &targets).unwrap();

        let out = model.predict_raw(&[25.0, 1.0]).unwrap();
        match out {
            RawOutput::Regression {
                temperature,
                rainfall,
                wind_speed,
                humidity,
            } => {
                assert!((temperature - 70.0).abs() < 2.0, "temperature {temperature}");
                assert!((rainfall - 5.0).abs() < 0.5);
                assert!((wind_speed - 3.0).abs() < 0.5);
                assert!((humidity - 60.0).abs() < 1.0);
            }
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn classification_separates_obvious_classes() {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let wet = i % 2 == 0;
            rows.push(vec![if wet { 9.0 } else { 1.0 }, 0.5]);
            labels.push(wet);
        }
        let model = LinearModel::fit_classification(&rows, &labels).unwrap();

        let RawOutput::Classification { probability: wet_p, label: wet_label } =
            model.predict_raw(&[9.0, 0.5]).unwrap()
        else {
            panic!("wrong output kind")
        };
        let RawOutput::Classification { probability: dry_p, .. } =
            model.predict_raw(&[1.0, 0.5]).unwrap()
        else {
            panic!("wrong output kind")
        };
        assert!(wet_label);
        assert!(wet_p > 0.7, "wet probability {wet_p}");
        assert!(dry_p < 0.3, "dry probability {dry_p}");
        assert!((0.0..=1.0).contains(&wet_p));
    }

    #[test]
    fn shape_mismatch_is_a_hard_error() {
        let rows = vec![vec![1.0, 2.0, 3.0]];
        let targets = vec![[1.0, 2.0, 3.0, 4.0]];
        let model = LinearModel::fit_regression(&rows, &targets).unwrap();
        assert!(matches!(
            model.predict_raw(&[1.0, 2.0]),
            Err(ModelError::FeatureShapeMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn empty_training_set_is_rejected() {
        assert!(matches!(
            LinearModel::fit_regression(&[], &[]),
            Err(ModelError::EmptyTrainingSet)
        ));
        assert!(matches!(
            LinearModel::fit_classification(&[], &[]),
            Err(ModelError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn fitted_state_round_trips_through_serde() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 4.0]];
        let targets = vec![[20.0, 1.0, 3.0, 60.0]; 3];
        let model = LinearModel::fit_regression(&rows, &targets).unwrap();
        let bytes = serde_json::to_vec(&model).unwrap();
        let restored: LinearModel = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(model, restored);
    }
}
