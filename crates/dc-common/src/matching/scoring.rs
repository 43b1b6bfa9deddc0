use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{SkillSets, budget_midpoint, effective_success_rate, proposed_rate, word_count};
use crate::skill_normalizer::SkillSet;
use crate::{Application, CandidateProfile, Project};

/// Score used when a component has nothing to measure against.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// The five sub-scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub skill_match: f64,
    pub experience_fit: f64,
    pub portfolio_quality: f64,
    pub proposal_quality: f64,
    pub rate_fit: f64,
}

impl ComponentScores {
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("skill_match", self.skill_match),
            ("experience_fit", self.experience_fit),
            ("portfolio_quality", self.portfolio_quality),
            ("proposal_quality", self.proposal_quality),
            ("rate_fit", self.rate_fit),
        ]
    }
}

fn bounded(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Share of required skills the candidate has; neutral when nothing is required.
pub fn score_skill_match(required: &SkillSet, possessed: &SkillSet) -> f64 {
    if required.is_empty() {
        return NEUTRAL_SCORE;
    }
    let matched = required.intersection(possessed).count() as f64;
    bounded(matched / required.len() as f64 * 100.0)
}

/// Ten points per year, saturating at ten years.
pub fn score_experience_fit(years_experience: u32) -> f64 {
    bounded((years_experience as f64 * 10.0).min(100.0))
}

/// Rating 50%, success rate 30%, completed-project volume 20%.
pub fn score_portfolio_quality(rating: f64, success_rate: Option<f64>, total_projects: u32) -> f64 {
    let rating_part = rating / 5.0 * 100.0;
    let success_part = effective_success_rate(success_rate);
    let volume_part = (total_projects as f64 * 5.0).min(100.0);

    bounded(rating_part * 0.5 + success_part * 0.3 + volume_part * 0.2)
}

/// Piecewise on cover-letter word count:
/// - under 50 words: 0.8 per word (0-40)
/// - 50 to 99 words: 40 plus 0.8 per word over 50 (40-80)
/// - 100 words and up: 80 plus one point per ten words over 100, capped at 100
pub fn score_proposal_quality(words: usize) -> f64 {
    let w = words as f64;
    let score = if words < 50 {
        w * 0.8
    } else if words < 100 {
        40.0 + (w - 50.0) * 0.8
    } else {
        (80.0 + (w - 100.0) / 10.0).min(100.0)
    };
    bounded(score)
}

/// 100 at or under the budget midpoint, minus one point per percent over it.
/// Neutral without a proposed rate or a positive midpoint.
pub fn score_rate_fit(proposed: Option<f64>, budget_mid: f64) -> f64 {
    match proposed {
        Some(rate) if budget_mid > 0.0 => {
            if rate <= budget_mid {
                100.0
            } else {
                let overage_pct = (rate - budget_mid) / budget_mid;
                bounded(100.0 - overage_pct * 100.0)
            }
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Computes every component straight from the records, independent of the
/// feature vector, so this path alone yields a usable score.
pub fn calculate_component_scores(
    project: &Project,
    candidate: &CandidateProfile,
    application: &Application,
    skills: &SkillSets,
) -> ComponentScores {
    let scores = ComponentScores {
        skill_match: score_skill_match(&skills.required, &skills.possessed),
        experience_fit: score_experience_fit(candidate.years_experience),
        portfolio_quality: score_portfolio_quality(
            candidate.rating,
            candidate.success_rate,
            candidate.total_projects,
        ),
        proposal_quality: score_proposal_quality(word_count(&application.cover_letter)),
        rate_fit: score_rate_fit(proposed_rate(application), budget_midpoint(project)),
    };

    debug!(
        application_id = application.id,
        skill = scores.skill_match,
        experience = scores.experience_fit,
        portfolio = scores.portfolio_quality,
        proposal = scores.proposal_quality,
        rate = scores.rate_fit,
        "component scores"
    );

    scores
}
