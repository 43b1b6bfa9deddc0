use serde::Serialize;
use tracing::warn;

use crate::embedding::{EmbeddingError, TextEmbedder};
use crate::skill_normalizer::{SkillSet, normalize_skill_set, normalize_skills};
use crate::{Application, CandidateProfile, Project};

/// Similarity assumed when it cannot be computed (no embedder, no history,
/// embedder failure). Neutral so that missing enrichment does not penalize.
pub const NEUTRAL_SIMILARITY: f64 = 0.5;
/// Budget midpoint used when the project has no usable maximum budget.
pub const DEFAULT_BUDGET_MID: f64 = 1000.0;
/// Success rate assumed for candidates without one.
pub const DEFAULT_SUCCESS_RATE: f64 = 50.0;
/// At most this many past project descriptions feed the history text.
pub const HISTORY_LIMIT: usize = 10;
/// Cover letters longer than this many words count as detailed.
pub const DETAILED_PROPOSAL_WORDS: usize = 50;

pub const FEATURE_COUNT: usize = 14;

/// Column names of `FeatureVector::to_array`, in order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "project_candidate_similarity",
    "project_proposal_similarity",
    "project_history_similarity",
    "skill_overlap",
    "missing_skill_ratio",
    "extra_skill_ratio",
    "experience_normalized",
    "experience_score",
    "proposal_length_normalized",
    "proposal_detailed",
    "proposal_quality_signal",
    "rating_score",
    "success_rate_score",
    "rate_fit",
];

/// Texts compared by the embedder.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTexts {
    pub project: String,
    pub candidate: String,
    pub proposal: String,
    /// `None` when the candidate has no selected past projects.
    pub history: Option<String>,
}

impl ComparisonTexts {
    pub fn build(
        project: &Project,
        candidate: &CandidateProfile,
        application: &Application,
        history: &[String],
    ) -> Self {
        let history_text = history
            .iter()
            .take(HISTORY_LIMIT)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            project: format!(
                "{} {} {}",
                project.title,
                project.description,
                project.tech_stack.join(" ")
            ),
            candidate: format!(
                "{} {} {}",
                candidate.title,
                candidate.bio,
                candidate.skills.to_text()
            ),
            proposal: application.cover_letter.clone(),
            history: (!history_text.is_empty()).then_some(history_text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Similarities {
    pub project_candidate: f64,
    pub project_proposal: f64,
    pub project_history: f64,
}

impl Similarities {
    pub fn neutral() -> Self {
        Self {
            project_candidate: NEUTRAL_SIMILARITY,
            project_proposal: NEUTRAL_SIMILARITY,
            project_history: NEUTRAL_SIMILARITY,
        }
    }

    /// Embeds the texts and compares each against the project text.
    /// Any embedder failure makes all three neutral.
    pub fn compute(embedder: Option<&dyn TextEmbedder>, texts: &ComparisonTexts) -> Self {
        let Some(embedder) = embedder else {
            return Self::neutral();
        };

        match Self::try_compute(embedder, texts) {
            Ok(similarities) => similarities,
            Err(err) => {
                warn!(
                    embedder = embedder.name(),
                    error = %err,
                    "embedding failed; using neutral similarities"
                );
                Self::neutral()
            }
        }
    }

    fn try_compute(
        embedder: &dyn TextEmbedder,
        texts: &ComparisonTexts,
    ) -> Result<Self, EmbeddingError> {
        let project_candidate = embedder.text_similarity(&texts.project, &texts.candidate)?;
        let project_proposal = embedder.text_similarity(&texts.project, &texts.proposal)?;
        let project_history = match texts.history.as_deref() {
            Some(history) => embedder.text_similarity(&texts.project, history)? as f64,
            None => NEUTRAL_SIMILARITY,
        };

        Ok(Self {
            project_candidate: project_candidate as f64,
            project_proposal: project_proposal as f64,
            project_history,
        })
    }
}

/// Normalized signals for the classifier path, one field per column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub project_candidate_similarity: f64,
    pub project_proposal_similarity: f64,
    pub project_history_similarity: f64,
    pub skill_overlap: f64,
    pub missing_skill_ratio: f64,
    pub extra_skill_ratio: f64,
    pub experience_normalized: f64,
    pub experience_score: f64,
    pub proposal_length_normalized: f64,
    pub proposal_detailed: f64,
    pub proposal_quality_signal: f64,
    pub rating_score: f64,
    pub success_rate_score: f64,
    pub rate_fit: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.project_candidate_similarity,
            self.project_proposal_similarity,
            self.project_history_similarity,
            self.skill_overlap,
            self.missing_skill_ratio,
            self.extra_skill_ratio,
            self.experience_normalized,
            self.experience_score,
            self.proposal_length_normalized,
            self.proposal_detailed,
            self.proposal_quality_signal,
            self.rating_score,
            self.success_rate_score,
            self.rate_fit,
        ]
    }
}

pub fn required_skills(project: &Project) -> SkillSet {
    normalize_skill_set(&project.tech_stack)
}

pub fn candidate_skills(candidate: &CandidateProfile) -> SkillSet {
    normalize_skills(&candidate.skills)
}

/// Both normalized skill sets of one project/candidate pair, computed once per score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillSets {
    pub required: SkillSet,
    pub possessed: SkillSet,
}

impl SkillSets {
    pub fn of(project: &Project, candidate: &CandidateProfile) -> Self {
        Self {
            required: required_skills(project),
            possessed: candidate_skills(candidate),
        }
    }
}

/// Success rate used for scoring. Unset and zero rates (new freelancers) both
/// count as `DEFAULT_SUCCESS_RATE`.
pub fn effective_success_rate(success_rate: Option<f64>) -> f64 {
    success_rate
        .filter(|rate| *rate > 0.0)
        .unwrap_or(DEFAULT_SUCCESS_RATE)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reference rate for a project: the budget midpoint, or `DEFAULT_BUDGET_MID`
/// when no positive maximum is set. Non-finite amounts count as absent.
pub fn budget_midpoint(project: &Project) -> f64 {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    match finite(project.budget_max) {
        Some(max) if max > 0.0 => (finite(project.budget_min).unwrap_or(0.0) + max) / 2.0,
        _ => DEFAULT_BUDGET_MID,
    }
}

/// Positive proposed rate, if any. Zero, negative or non-finite rates are absent.
pub fn proposed_rate(application: &Application) -> Option<f64> {
    application
        .proposed_rate
        .filter(|rate| rate.is_finite() && *rate > 0.0)
}

/// Rate fit in [0, 1]: 1 at or under the midpoint, falling linearly to 0 at
/// twice the midpoint. Neutral 0.5 without a rate or a positive midpoint.
pub fn rate_fit_ratio(proposed: Option<f64>, budget_mid: f64) -> f64 {
    match proposed {
        Some(rate) if budget_mid > 0.0 => {
            if rate <= budget_mid {
                1.0
            } else {
                (1.0 - (rate - budget_mid) / budget_mid).max(0.0)
            }
        }
        _ => NEUTRAL_SIMILARITY,
    }
}

/// Derives the feature vector. Never fails; similarities come pre-computed so
/// the embedder decision stays with the caller.
pub fn extract_features(
    project: &Project,
    candidate: &CandidateProfile,
    application: &Application,
    skills: &SkillSets,
    similarities: Similarities,
) -> FeatureVector {
    let SkillSets { required, possessed } = skills;

    let required_len = required.len().max(1) as f64;
    let possessed_len = possessed.len().max(1) as f64;
    let overlap = required.intersection(possessed).count() as f64;
    let missing = required.difference(possessed).count() as f64;
    let extra = possessed.difference(required).count() as f64;

    let years = candidate.years_experience as f64;
    let words = word_count(&application.cover_letter);

    FeatureVector {
        project_candidate_similarity: similarities.project_candidate,
        project_proposal_similarity: similarities.project_proposal,
        project_history_similarity: similarities.project_history,
        skill_overlap: overlap / required_len,
        missing_skill_ratio: missing / required_len,
        extra_skill_ratio: extra / possessed_len,
        experience_normalized: years / 20.0,
        experience_score: (years / 10.0).min(1.0),
        proposal_length_normalized: words as f64 / 1000.0,
        proposal_detailed: if words > DETAILED_PROPOSAL_WORDS { 1.0 } else { 0.0 },
        proposal_quality_signal: (words as f64 / 500.0).min(1.0),
        rating_score: candidate.rating / 5.0,
        success_rate_score: effective_success_rate(candidate.success_rate) / 100.0,
        rate_fit: rate_fit_ratio(proposed_rate(application), budget_midpoint(project)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Skills;
    use crate::embedding::HashEmbedder;

    fn project() -> Project {
        Project {
            id: 1,
            title: "Marketplace dashboard".into(),
            description: "React dashboard with a Node API".into(),
            tech_stack: vec!["React".into(), "Node".into()],
            budget_min: Some(800.0),
            budget_max: Some(1200.0),
            ..Project::default()
        }
    }

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: 7,
            name: "Ada".into(),
            title: "Frontend engineer".into(),
            bio: "I build React apps".into(),
            skills: Skills::Text("react, python, css".into()),
            years_experience: 4,
            rating: 4.0,
            total_projects: 10,
            success_rate: None,
        }
    }

    fn application(words: usize, rate: Option<f64>) -> Application {
        Application {
            id: 3,
            cover_letter: vec!["word"; words].join(" "),
            proposed_rate: rate,
            ..Application::default()
        }
    }

    #[test]
    fn extracts_fourteen_ordered_features() {
        let features = extract_features(
            &project(),
            &candidate(),
            &application(60, Some(900.0)),
            &SkillSets::of(&project(), &candidate()),
            Similarities::neutral(),
        );

        assert_eq!(
            features.to_array(),
            [
                0.5,
                0.5,
                0.5,
                0.5,
                0.5,
                2.0 / 3.0,
                0.2,
                0.4,
                0.06,
                1.0,
                0.12,
                0.8,
                0.5,
                1.0,
            ]
        );
        assert_eq!(FEATURE_NAMES.len(), features.to_array().len());
    }

    #[test]
    fn empty_skill_sets_use_floored_denominators() {
        let mut project = project();
        project.tech_stack.clear();
        let mut candidate = candidate();
        candidate.skills = Skills::List(vec![]);

        let features = extract_features(
            &project,
            &candidate,
            &application(0, None),
            &SkillSets::of(&project, &candidate),
            Similarities::neutral(),
        );

        assert_eq!(features.skill_overlap, 0.0);
        assert_eq!(features.missing_skill_ratio, 0.0);
        assert_eq!(features.extra_skill_ratio, 0.0);
        assert_eq!(features.proposal_detailed, 0.0);
        assert_eq!(features.rate_fit, 0.5);
    }

    #[test]
    fn budget_midpoint_defaults_without_positive_maximum() {
        let mut project = project();
        assert_eq!(budget_midpoint(&project), 1000.0);

        project.budget_max = None;
        assert_eq!(budget_midpoint(&project), DEFAULT_BUDGET_MID);

        project.budget_max = Some(0.0);
        assert_eq!(budget_midpoint(&project), DEFAULT_BUDGET_MID);

        project.budget_max = Some(f64::NAN);
        assert_eq!(budget_midpoint(&project), DEFAULT_BUDGET_MID);

        project.budget_min = None;
        project.budget_max = Some(400.0);
        assert_eq!(budget_midpoint(&project), 200.0);
    }

    #[test]
    fn rate_fit_ratio_declines_past_midpoint() {
        assert_eq!(rate_fit_ratio(Some(500.0), 1000.0), 1.0);
        assert_eq!(rate_fit_ratio(Some(1500.0), 1000.0), 0.5);
        assert_eq!(rate_fit_ratio(Some(2500.0), 1000.0), 0.0);
        assert_eq!(rate_fit_ratio(None, 1000.0), 0.5);
        assert_eq!(rate_fit_ratio(Some(100.0), -50.0), 0.5);
    }

    #[test]
    fn zero_success_rate_counts_as_default() {
        let mut fresh = candidate();
        fresh.success_rate = Some(0.0);
        let mut unset = candidate();
        unset.success_rate = None;
        let score = |c: &CandidateProfile| {
            extract_features(
                &project(),
                c,
                &application(10, None),
                &SkillSets::of(&project(), c),
                Similarities::neutral(),
            )
            .success_rate_score
        };

        assert_eq!(effective_success_rate(Some(0.0)), DEFAULT_SUCCESS_RATE);
        assert_eq!(effective_success_rate(Some(72.0)), 72.0);
        assert_eq!(score(&fresh), 0.5);
        assert_eq!(score(&fresh), score(&unset));
    }

    #[test]
    fn non_positive_rates_count_as_absent() {
        assert_eq!(proposed_rate(&application(1, Some(0.0))), None);
        assert_eq!(proposed_rate(&application(1, Some(-20.0))), None);
        assert_eq!(proposed_rate(&application(1, Some(f64::INFINITY))), None);
        assert_eq!(proposed_rate(&application(1, Some(35.0))), Some(35.0));
    }

    #[test]
    fn history_text_is_capped_and_optional() {
        let history: Vec<String> = (0..15).map(|i| format!("project-{i}")).collect();
        let texts = ComparisonTexts::build(&project(), &candidate(), &application(5, None), &history);

        let joined = texts.history.unwrap();
        assert!(joined.contains("project-9"));
        assert!(!joined.contains("project-10"));

        let without = ComparisonTexts::build(&project(), &candidate(), &application(5, None), &[]);
        assert!(without.history.is_none());
    }

    #[test]
    fn similarities_are_neutral_without_embedder() {
        let texts = ComparisonTexts::build(&project(), &candidate(), &application(5, None), &[]);

        assert_eq!(Similarities::compute(None, &texts), Similarities::neutral());
    }

    #[test]
    fn missing_history_stays_neutral_with_embedder() {
        let embedder = HashEmbedder::new(1024);
        let texts = ComparisonTexts::build(&project(), &candidate(), &application(5, None), &[]);

        let similarities = Similarities::compute(Some(&embedder as &dyn TextEmbedder), &texts);

        assert_eq!(similarities.project_history, NEUTRAL_SIMILARITY);
        assert!(similarities.project_candidate > 0.0);
        assert!((-1.0..=1.0).contains(&similarities.project_proposal));
    }
}
