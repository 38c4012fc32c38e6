//! Serialized model artifacts and the narrow inference interfaces over them.
//!
//! Artifacts are JSON documents tagged by `kind`. Training happens elsewhere;
//! this module only evaluates the exported parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Inference interfaces
// ---------------------------------------------------------------------------

/// A class label as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Integer(i64),
    Text(String),
}

impl ClassLabel {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ClassLabel::Integer(v) => Some(*v),
            ClassLabel::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Integer(v) => write!(f, "{v}"),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

/// A probabilistic classifier.
pub trait Classifier: Send + Sync {
    /// Labels in the same order as the columns of [`Classifier::predict_proba`].
    fn classes(&self) -> &[ClassLabel];

    /// Class membership probabilities for one feature vector.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, CoreError>;

    /// The most probable label.
    fn predict(&self, features: &[f64]) -> Result<ClassLabel, CoreError> {
        let proba = self.predict_proba(features)?;
        let best = argmax(&proba)
            .ok_or_else(|| CoreError::Internal("classifier produced no probabilities".into()))?;
        Ok(self.classes()[best].clone())
    }
}

/// A (possibly multi-output) regressor.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, CoreError>;

    /// Relative importance of each input feature, if the artifact carries it.
    fn feature_importances(&self) -> Option<&[f64]>;
}

/// Additive per-feature explanation of a regressor output.
pub trait Explainer: Send + Sync {
    fn expected_value(&self) -> f64;

    fn contributions(&self, features: &[f64]) -> Result<Vec<f64>, CoreError>;
}

// ---------------------------------------------------------------------------
// Artifact document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    GaussianNb(GaussianNb),
    LinearRegression(LinearRegression),
    LinearExplainer(LinearExplainer),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
            ModelArtifact::GaussianNb(_) => "gaussian_nb",
            ModelArtifact::LinearRegression(_) => "linear_regression",
            ModelArtifact::LinearExplainer(_) => "linear_explainer",
        }
    }

    /// Check internal shape consistency once, at load time.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ModelArtifact::LogisticRegression(m) => m.validate(),
            ModelArtifact::GaussianNb(m) => m.validate(),
            ModelArtifact::LinearRegression(m) => m.validate(),
            ModelArtifact::LinearExplainer(m) => m.validate(),
        }
    }

    pub fn as_classifier(&self) -> Option<&dyn Classifier> {
        match self {
            ModelArtifact::LogisticRegression(m) => Some(m),
            ModelArtifact::GaussianNb(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_regressor(&self) -> Option<&dyn Regressor> {
        match self {
            ModelArtifact::LinearRegression(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_explainer(&self) -> Option<&dyn Explainer> {
        match self {
            ModelArtifact::LinearExplainer(m) => Some(m),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Logistic regression
// ---------------------------------------------------------------------------

/// Multinomial logistic regression.
///
/// With two classes a single coefficient row is accepted and interpreted as
/// the log-odds of the second class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<ClassLabel>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        let binary_row = self.classes.len() == 2 && self.coef.len() == 1;
        if self.classes.len() < 2 {
            return Err("logistic regression needs at least two classes".into());
        }
        if !binary_row && self.coef.len() != self.classes.len() {
            return Err(format!(
                "{} coefficient rows for {} classes",
                self.coef.len(),
                self.classes.len()
            ));
        }
        if self.intercept.len() != self.coef.len() {
            return Err("intercept length must match coefficient rows".into());
        }
        uniform_width(&self.coef)
    }
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, CoreError> {
        check_width(self.coef[0].len(), features)?;
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| dot(row, features) + b)
            .collect();
        let scores = finite(scores)?;

        if scores.len() == 1 {
            let p = 1.0 / (1.0 + (-scores[0]).exp());
            return Ok(vec![1.0 - p, p]);
        }
        Ok(softmax(&scores))
    }
}

// ---------------------------------------------------------------------------
// Gaussian naive Bayes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianNb {
    pub classes: Vec<ClassLabel>,
    /// Per-class feature means.
    pub theta: Vec<Vec<f64>>,
    /// Per-class feature variances.
    pub var: Vec<Vec<f64>>,
    pub class_prior: Vec<f64>,
}

impl GaussianNb {
    fn validate(&self) -> Result<(), String> {
        let n = self.classes.len();
        if n == 0 || self.theta.len() != n || self.var.len() != n || self.class_prior.len() != n
        {
            return Err("gaussian_nb parameters must have one entry per class".into());
        }
        uniform_width(&self.theta)?;
        if self.var.iter().any(|row| row.len() != self.theta[0].len()) {
            return Err("variance rows must match mean rows".into());
        }
        if self.var.iter().flatten().any(|v| *v <= 0.0) {
            return Err("variances must be positive".into());
        }
        if self.class_prior.iter().any(|p| *p <= 0.0) {
            return Err("class priors must be positive".into());
        }
        Ok(())
    }
}

impl Classifier for GaussianNb {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, CoreError> {
        check_width(self.theta[0].len(), features)?;
        let joint: Vec<f64> = self
            .theta
            .iter()
            .zip(&self.var)
            .zip(&self.class_prior)
            .map(|((means, vars), prior)| {
                let log_likelihood: f64 = features
                    .iter()
                    .zip(means)
                    .zip(vars)
                    .map(|((x, mu), var)| {
                        -0.5 * (2.0 * std::f64::consts::PI * var).ln()
                            - (x - mu).powi(2) / (2.0 * var)
                    })
                    .sum();
                prior.ln() + log_likelihood
            })
            .collect();
        Ok(softmax(&finite(joint)?))
    }
}

// ---------------------------------------------------------------------------
// Linear regression
// ---------------------------------------------------------------------------

/// Linear regression with one coefficient row per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl LinearRegression {
    fn validate(&self) -> Result<(), String> {
        if self.coef.is_empty() {
            return Err("linear regression needs at least one output".into());
        }
        if self.intercept.len() != self.coef.len() {
            return Err("intercept length must match coefficient rows".into());
        }
        uniform_width(&self.coef)?;
        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.coef[0].len() {
                return Err("feature_importances length must match feature count".into());
            }
        }
        Ok(())
    }
}

impl Regressor for LinearRegression {
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, CoreError> {
        check_width(self.coef[0].len(), features)?;
        finite(
            self.coef
                .iter()
                .zip(&self.intercept)
                .map(|(row, b)| dot(row, features) + b)
                .collect(),
        )
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Linear explainer
// ---------------------------------------------------------------------------

/// Exact additive attributions for a linear model: `coef * (x - mean)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearExplainer {
    pub expected_value: f64,
    pub coef: Vec<f64>,
    pub feature_means: Vec<f64>,
}

impl LinearExplainer {
    fn validate(&self) -> Result<(), String> {
        if self.coef.is_empty() || self.coef.len() != self.feature_means.len() {
            return Err("coef and feature_means must be non-empty and equal length".into());
        }
        Ok(())
    }
}

impl Explainer for LinearExplainer {
    fn expected_value(&self) -> f64 {
        self.expected_value
    }

    fn contributions(&self, features: &[f64]) -> Result<Vec<f64>, CoreError> {
        check_width(self.coef.len(), features)?;
        finite(
            features
                .iter()
                .zip(&self.coef)
                .zip(&self.feature_means)
                .map(|((x, w), mean)| w * (x - mean))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if *v <= b => best,
            _ => Some((i, *v)),
        })
        .map(|(i, _)| i)
}

fn check_width(expected: usize, features: &[f64]) -> Result<(), CoreError> {
    if features.len() != expected {
        return Err(CoreError::Internal(format!(
            "model expects {expected} features, got {}",
            features.len()
        )));
    }
    if features.iter().any(|f| !f.is_finite()) {
        return Err(CoreError::Validation("features must be finite numbers".into()));
    }
    Ok(())
}

/// Finite inputs can still overflow a model's arithmetic.
fn finite(values: Vec<f64>) -> Result<Vec<f64>, CoreError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(values)
    } else {
        Err(CoreError::Validation("input out of range".into()))
    }
}

fn uniform_width(rows: &[Vec<f64>]) -> Result<(), String> {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err("coefficient rows must not be empty".into());
    }
    if rows.iter().any(|r| r.len() != width) {
        return Err("coefficient rows have inconsistent widths".into());
    }
    Ok(())
}
