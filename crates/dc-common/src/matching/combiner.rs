use serde::Serialize;
use tracing::debug;

use super::scoring::ComponentScores;
use super::weights::{
    BIN_SCORES, COMPONENT_WEIGHTS, ComponentWeights, ENSEMBLE_BLEND, UNKNOWN_BIN_SCORE,
    WEIGHTED_BLEND,
};
use crate::classifier::EnsembleBins;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedScore {
    /// Weighted sum of the component scores.
    pub weighted_score: f64,
    /// Ensemble estimate, present only when the classifier path contributed.
    pub ml_score: Option<f64>,
    pub overall_score: u8,
}

pub fn weighted_score(scores: &ComponentScores, weights: &ComponentWeights) -> f64 {
    scores.skill_match * weights.skill_match
        + scores.experience_fit * weights.experience_fit
        + scores.portfolio_quality * weights.portfolio_quality
        + scores.proposal_quality * weights.proposal_quality
        + scores.rate_fit * weights.rate_fit
}

pub fn bin_score(bin: u8) -> f64 {
    BIN_SCORES
        .get(bin as usize)
        .copied()
        .unwrap_or(UNKNOWN_BIN_SCORE)
}

/// Mean of the two mapped bin scores.
pub fn ensemble_score(bins: EnsembleBins) -> f64 {
    (bin_score(bins.primary) + bin_score(bins.secondary)) / 2.0
}

fn to_overall(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

/// Applies the fixed weighting policy and, when bins are available, blends in
/// the ensemble estimate.
pub fn combine(scores: &ComponentScores, bins: Option<EnsembleBins>) -> CombinedScore {
    let weighted = weighted_score(scores, &COMPONENT_WEIGHTS);

    let Some(bins) = bins else {
        return CombinedScore {
            weighted_score: weighted,
            ml_score: None,
            overall_score: to_overall(weighted),
        };
    };

    let ml_score = ensemble_score(bins);
    let blended = weighted * WEIGHTED_BLEND + ml_score * ENSEMBLE_BLEND;
    debug!(
        weighted,
        ml_score,
        primary_bin = bins.primary,
        secondary_bin = bins.secondary,
        blended,
        "blended ensemble estimate"
    );

    CombinedScore {
        weighted_score: weighted,
        ml_score: Some(ml_score),
        overall_score: to_overall(blended),
    }
}
