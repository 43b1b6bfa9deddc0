use serde::Serialize;

use crate::classifier::BIN_COUNT;

/// Fixed weighting policy over the five component scores.
pub const COMPONENT_WEIGHTS: ComponentWeights = ComponentWeights {
    skill_match: 0.35,
    experience_fit: 0.25,
    portfolio_quality: 0.20,
    proposal_quality: 0.15,
    rate_fit: 0.05,
};

/// Share of the weighted score kept when the classifier ensemble contributes.
pub const WEIGHTED_BLEND: f64 = 0.7;
/// Share given to the ensemble estimate.
pub const ENSEMBLE_BLEND: f64 = 0.3;

/// Score assigned to each ordinal classifier bin.
pub const BIN_SCORES: [f64; BIN_COUNT] = [25.0, 50.0, 75.0, 95.0];
/// Used if a classifier ever reports a bin outside `BIN_SCORES`.
pub const UNKNOWN_BIN_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentWeights {
    pub skill_match: f64,
    pub experience_fit: f64,
    pub portfolio_quality: f64,
    pub proposal_quality: f64,
    pub rate_fit: f64,
}

impl ComponentWeights {
    pub fn sum(&self) -> f64 {
        self.skill_match
            + self.experience_fit
            + self.portfolio_quality
            + self.proposal_quality
            + self.rate_fit
    }
}
