//! Random forest backend over flattened decision trees.
//!
//! Trees use the array layout common to exported tree ensembles: node `i`
//! is a leaf when `children_left[i] == -1`, otherwise samples with
//! `row[feature[i]] <= threshold[i]` go to `children_left[i]` and the rest
//! to `children_right[i]`. `value[i]` holds the per-class sample weights
//! that reached the node.

use serde::{Deserialize, Serialize};

use crate::classifier::{check_row, ClassLabel, ClassProbabilities, Classifier};
use crate::error::ModelError;

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
    /// Node impurity, needed only to derive feature importances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impurity: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_n_node_samples: Option<Vec<f64>>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Check array shapes, child links and leaf distributions.
    ///
    /// Children must come after their parent, which is how exported trees
    /// are laid out and guarantees traversal terminates.
    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ModelError::artifact("tree has no nodes"));
        }
        let lengths = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(ModelError::artifact(format!(
                "tree arrays disagree on node count ({n} vs {lengths:?})"
            )));
        }
        for (name, extra) in [
            ("impurity", &self.impurity),
            ("weighted_n_node_samples", &self.weighted_n_node_samples),
        ] {
            if let Some(values) = extra {
                if values.len() != n {
                    return Err(ModelError::artifact(format!(
                        "tree {name} has {} entries for {n} nodes",
                        values.len()
                    )));
                }
                if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(ModelError::artifact(format!(
                        "tree {name} must be finite and non-negative"
                    )));
                }
            }
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == LEAF {
                if right != LEAF {
                    return Err(ModelError::artifact(format!(
                        "node {node} has a right child but no left child"
                    )));
                }
                let [neg, pos] = self.value[node];
                if !(neg.is_finite() && pos.is_finite() && neg >= 0.0 && pos >= 0.0)
                    || neg + pos <= 0.0
                {
                    return Err(ModelError::artifact(format!(
                        "leaf {node} has an invalid class distribution [{neg}, {pos}]"
                    )));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ModelError::artifact(format!(
                        "node {node} links to out-of-order child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(ModelError::artifact(format!(
                    "node {node} splits on feature {feature}, model has {n_features}"
                )));
            }
            if !self.threshold[node].is_finite() {
                return Err(ModelError::artifact(format!(
                    "node {node} has a non-finite threshold"
                )));
            }
        }
        Ok(())
    }

    /// Index of the leaf a row lands in.
    ///
    /// Links are checked on the way down, so a tree that skipped
    /// [`validate`](Self::validate) fails instead of looping or panicking.
    fn leaf_for(&self, row: &[f64]) -> Result<usize, ModelError> {
        let n = self.node_count();
        let mut node = 0;
        while node < n && !self.is_leaf(node) {
            let split = self
                .feature
                .get(node)
                .zip(self.threshold.get(node))
                .zip(self.children_right.get(node));
            let Some(((&feature, &threshold), &right)) = split else {
                return Err(ModelError::artifact(format!("node {node} is incomplete")));
            };
            let Some(&x) = usize::try_from(feature).ok().and_then(|f| row.get(f)) else {
                return Err(ModelError::artifact(format!(
                    "node {node} splits on missing feature {feature}"
                )));
            };
            let child = if x <= threshold {
                self.children_left[node]
            } else {
                right
            };
            if child <= node as i64 || child >= n as i64 {
                return Err(ModelError::artifact(format!(
                    "node {node} links to out-of-order child {child}"
                )));
            }
            node = child as usize;
        }
        if node >= n {
            return Err(ModelError::artifact("tree has no nodes"));
        }
        Ok(node)
    }

    /// Normalized class distribution of the leaf the row lands in.
    fn distribution(&self, row: &[f64]) -> Result<[f64; 2], ModelError> {
        let leaf = self.leaf_for(row)?;
        let [neg, pos] = self.value.get(leaf).copied().ok_or_else(|| {
            ModelError::artifact(format!("leaf {leaf} has no class distribution"))
        })?;
        let total = neg + pos;
        if !(total > 0.0 && total.is_finite()) {
            return Err(ModelError::artifact(format!(
                "leaf {leaf} has an invalid class distribution [{neg}, {pos}]"
            )));
        }
        Ok([neg / total, pos / total])
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.
    ///
    /// `None` when the tree was exported without impurity statistics or the
    /// statistics do not line up with the nodes.
    fn impurity_importances(&self, n_features: usize) -> Option<Vec<f64>> {
        let impurity = self.impurity.as_ref()?;
        let weights = self.weighted_n_node_samples.as_ref()?;
        let weighted = |node: usize| Some(weights.get(node)? * impurity.get(node)?);
        let mut scores = vec![0.0; n_features];
        for node in 0..self.node_count() {
            if self.is_leaf(node) {
                continue;
            }
            let left = usize::try_from(self.children_left[node]).ok()?;
            let right = usize::try_from(*self.children_right.get(node)?).ok()?;
            let decrease = weighted(node)? - weighted(left)? - weighted(right)?;
            let feature = usize::try_from(*self.feature.get(node)?).ok()?;
            *scores.get_mut(feature)? += decrease;
        }
        let total: f64 = scores.iter().sum();
        if total > 0.0 {
            for score in &mut scores {
                *score /= total;
            }
        }
        Some(scores)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
    /// Importances exported alongside the trees; take precedence over
    /// values derived from tree impurity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::artifact("forest declares zero features"));
        }
        if self.trees.is_empty() {
            return Err(ModelError::artifact("forest has no trees"));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ModelError::artifact(format!("tree {idx}: {e}")))?;
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.n_features {
                return Err(ModelError::artifact(format!(
                    "{} feature importances for {} features",
                    importances.len(),
                    self.n_features
                )));
            }
            if importances.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(ModelError::artifact(
                    "feature importances must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    fn derived_importances(&self) -> Option<Vec<f64>> {
        let mut total = vec![0.0; self.n_features];
        let mut contributing = 0usize;
        for tree in &self.trees {
            let scores = tree.impurity_importances(self.n_features)?;
            // Single-leaf trees carry no split information.
            if scores.iter().sum::<f64>() <= 0.0 {
                continue;
            }
            for (acc, score) in total.iter_mut().zip(scores) {
                *acc += score;
            }
            contributing += 1;
        }
        if contributing == 0 {
            return Some(total);
        }
        let sum: f64 = total.iter().sum();
        for value in &mut total {
            *value /= sum;
        }
        Some(total)
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, row: &[f64]) -> Result<ClassLabel, ModelError> {
        Ok(self.predict_proba(row)?.argmax())
    }

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities, ModelError> {
        check_row(self.n_features, row)?;
        let mut acc = [0.0_f64; 2];
        for tree in &self.trees {
            let [neg, pos] = tree.distribution(row)?;
            acc[0] += neg;
            acc[1] += pos;
        }
        let n_trees = self.trees.len() as f64;
        ClassProbabilities::new(acc[0] / n_trees, acc[1] / n_trees)
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        match &self.feature_importances {
            Some(explicit) => Some(explicit.clone()),
            None => self.derived_importances(),
        }
    }
}
