//! Classifier artifacts exported from the training notebook.
//!
//! `heart_disease_model.json` holds either a logistic regression or a random
//! forest in scikit-learn's array layout, tagged by `kind`.

use serde::{Deserialize, Serialize};

use crate::domain::{HeartDiseaseClass, PredictError};
use crate::ports::Classifier;

/// Marker scikit-learn uses for "no child" in `children_left`/`children_right`.
const TREE_LEAF: i64 = -1;

/// Serialized classifier, dispatched on `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl ClassifierArtifact {
    /// Structural checks run once at load time.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::LogisticRegression(m) => m.validate(),
            Self::RandomForest(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::LogisticRegression(m) => m,
            Self::RandomForest(m) => m,
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.inner().feature_names()
    }

    fn predict(&self, row: &[f64]) -> Result<HeartDiseaseClass, PredictError> {
        self.inner().predict(row)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictError> {
        self.inner().predict_proba(row)
    }
}

fn check_width(expected: usize, row: &[f64]) -> Result<(), PredictError> {
    if row.len() != expected {
        return Err(PredictError::ClassifierShapeMismatch {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

fn check_feature_names(names: Option<&Vec<String>>, n: usize) -> Result<(), String> {
    match names {
        Some(names) if names.len() != n => Err(format!(
            "feature_names has {} entries, model has {n} features",
            names.len()
        )),
        _ => Ok(()),
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Binary logistic regression: `p1 = sigmoid(w . x + b)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("coefficients must not be empty".into());
        }
        if self.coefficients.iter().any(|w| !w.is_finite()) || !self.intercept.is_finite() {
            return Err("coefficients and intercept must be finite".into());
        }
        check_feature_names(self.feature_names.as_ref(), self.coefficients.len())
    }

    fn decision_function(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, row: &[f64]) -> Result<HeartDiseaseClass, PredictError> {
        check_width(self.n_features(), row)?;
        Ok(if self.decision_function(row) > 0.0 {
            HeartDiseaseClass::HeartDisease
        } else {
            HeartDiseaseClass::NoHeartDisease
        })
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictError> {
        check_width(self.n_features(), row)?;
        let p1 = sigmoid(self.decision_function(row));
        Ok([1.0 - p1, p1])
    }
}

/// One fitted tree in scikit-learn's parallel-array layout.
///
/// Node `i` is a leaf when `children_left[i] == -1`. Otherwise a row goes
/// left when `row[feature[i]] <= threshold[i]`. `value[i]` holds the class
/// weights reaching node `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree arrays have different lengths".into());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(format!("node {i} has only one child"));
                }
                let [c0, c1] = self.value[i];
                if !(c0.is_finite() && c1.is_finite()) || c0 < 0.0 || c1 < 0.0 || c0 + c1 <= 0.0 {
                    return Err(format!("leaf {i} has invalid class weights"));
                }
                continue;
            }

            // Children always come after their parent, which rules out cycles.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {i} has out-of-order child {child}"));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!("node {i} splits on unknown feature {feature}"));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {i} has a non-finite threshold"));
            }
        }
        Ok(())
    }

    /// Normalised class weights of the leaf `row` falls into.
    fn leaf_distribution(&self, row: &[f64]) -> [f64; 2] {
        let mut idx = 0usize;
        while self.children_left[idx] != TREE_LEAF {
            let x = row[self.feature[idx] as usize];
            idx = if x <= self.threshold[idx] {
                self.children_left[idx] as usize
            } else {
                self.children_right[idx] as usize
            };
        }
        let [c0, c1] = self.value[idx];
        let total = c0 + c1;
        [c0 / total, c1 / total]
    }
}

/// Random forest: leaf distributions averaged over all trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be positive".into());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        check_feature_names(self.feature_names.as_ref(), self.n_features)
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, row: &[f64]) -> Result<HeartDiseaseClass, PredictError> {
        let proba = self.predict_proba(row)?;
        Ok(HeartDiseaseClass::argmax(proba))
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictError> {
        check_width(self.n_features, row)?;
        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let [p0, p1] = tree.leaf_distribution(row);
            sum[0] += p0;
            sum[1] += p1;
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}
