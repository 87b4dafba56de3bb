//! Top-K selection and confidence annotation.

use serde::{Deserialize, Serialize};

use crate::catalog::LabelCatalog;

pub const LOW_CONFIDENCE_WARNING: &str = "Low confidence - might not be a mushroom or unclear image";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub label: String,
    /// Rounded to 4 decimal places.
    pub confidence: f64,
    /// Always serialized; `null` when the prediction is confident.
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predictions: Vec<PredictionEntry>,
}

/// Selects the `top_k` most probable classes, highest first.
///
/// Ties keep catalog order (lower index first) and NaN sorts below every
/// number, so the output is a pure function of the input. When fewer than
/// `top_k` classes exist, all of them are returned. Entries whose raw
/// probability is below `threshold` carry [`LOW_CONFIDENCE_WARNING`], even
/// when the reported confidence rounds up to it.
pub fn rank(
    probabilities: &[f64],
    catalog: &LabelCatalog,
    top_k: usize,
    threshold: f64,
) -> PredictionResponse {
    let n = probabilities.len().min(catalog.len());
    let score = |i: usize| {
        let p = probabilities[i];
        if p.is_nan() { f64::NEG_INFINITY } else { p }
    };

    let mut order: Vec<usize> = (0..n).collect();
    // sort_by is stable: equal scores stay in ascending index order.
    order.sort_by(|&a, &b| score(b).total_cmp(&score(a)));
    order.truncate(top_k);

    let predictions = order
        .into_iter()
        .map(|i| {
            let p = probabilities[i];
            PredictionEntry {
                label: catalog.get(i).unwrap_or_default().to_owned(),
                confidence: round_confidence(p),
                warning: (p < threshold).then(|| LOW_CONFIDENCE_WARNING.to_owned()),
            }
        })
        .collect();

    PredictionResponse { predictions }
}

/// Four decimal places, halves rounded away from zero.
pub fn round_confidence(p: f64) -> f64 {
    (p * 10_000.0).round() / 10_000.0
}
