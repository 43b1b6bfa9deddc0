use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::backend::{ArtifactBackend, ComponentOnlyBackend, ScoringBackend};
use super::combiner::combine;
use super::explain::{MatchDetails, SkillDelta, narrative};
use super::features::{ComparisonTexts, FEATURE_COUNT, Similarities, SkillSets, extract_features};
use super::scoring::{ComponentScores, calculate_component_scores};
use crate::classifier::{ClassifierEnsemble, load_ensemble};
use crate::config::EngineConfig;
use crate::embedding::{TextEmbedder, create_embedder};
use crate::{Application, ApplicationRecord, ApplicationStatus, CandidateProfile, Project, RecordError};

pub const DEFAULT_TOP_N: usize = 5;

/// Scoring outcome for one application. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub application_id: i64,
    pub overall_score: u8,
    pub component_scores: ComponentScores,
    pub weighted_score: f64,
    pub ml_score: Option<f64>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub extra_skills: Vec<String>,
    pub narrative: String,
}

/// Shortlist entry returned by `rank_applications`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedApplication {
    pub application_id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub candidate_title: String,
    pub overall_score: u8,
    pub component_scores: ComponentScores,
    pub years_experience: u32,
    pub rating: f64,
    pub total_projects: u32,
    pub success_rate: Option<f64>,
    pub proposed_rate: Option<f64>,
    pub estimated_duration: String,
    pub applied_at: Option<DateTime<Utc>>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub extra_skills: Vec<String>,
    pub narrative: String,
}

impl RankedApplication {
    fn new(result: MatchResult, candidate: &CandidateProfile, application: &Application) -> Self {
        Self {
            application_id: result.application_id,
            candidate_id: candidate.id,
            candidate_name: candidate.name.clone(),
            candidate_title: candidate.title.clone(),
            overall_score: result.overall_score,
            component_scores: result.component_scores,
            years_experience: candidate.years_experience,
            rating: candidate.rating,
            total_projects: candidate.total_projects,
            success_rate: candidate.success_rate,
            proposed_rate: application.proposed_rate,
            estimated_duration: application.estimated_duration.clone(),
            applied_at: application.applied_at,
            matching_skills: result.matching_skills,
            missing_skills: result.missing_skills,
            extra_skills: result.extra_skills,
            narrative: result.narrative,
        }
    }
}

/// Score descending; ties go to the earlier application (undated last), then
/// the lower application id.
fn rank_order(a: &RankedApplication, b: &RankedApplication) -> Ordering {
    b.overall_score
        .cmp(&a.overall_score)
        .then_with(|| {
            (a.applied_at.is_none(), a.applied_at).cmp(&(b.applied_at.is_none(), b.applied_at))
        })
        .then_with(|| a.application_id.cmp(&b.application_id))
}

/// Scores and ranks applications. Artifacts are fixed at construction and the
/// engine holds no mutable state, so one instance can be shared across threads.
pub struct MatchEngine {
    backend: Box<dyn ScoringBackend>,
    default_top_n: usize,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::component_only()
    }
}

impl MatchEngine {
    pub fn new(backend: Box<dyn ScoringBackend>) -> Self {
        Self {
            backend,
            default_top_n: DEFAULT_TOP_N,
        }
    }

    pub fn component_only() -> Self {
        Self::new(Box::new(ComponentOnlyBackend))
    }

    pub fn with_artifacts(
        embedder: Option<Box<dyn TextEmbedder>>,
        ensemble: Option<ClassifierEnsemble>,
    ) -> Self {
        if embedder.is_none() && ensemble.is_none() {
            return Self::component_only();
        }
        Self::new(Box::new(ArtifactBackend::new(embedder, ensemble)))
    }

    /// Loads whatever artifacts the config names. Load failures are logged and
    /// leave the engine on the component-only path for its whole lifetime.
    pub fn from_config(config: &EngineConfig) -> Self {
        let embedder = create_embedder(&config.embedder, config.embedding_dimension);
        if let Some(embedder) = embedder.as_deref() {
            info!(
                embedder = embedder.name(),
                version = embedder.version(),
                dimension = embedder.dimension(),
                "text embedder enabled"
            );
        }

        let ensemble = config.model_dir.as_deref().and_then(|dir| {
            match load_ensemble(dir, FEATURE_COUNT) {
                Ok((ensemble, metadata)) => {
                    let configured = embedder.as_deref().map(|e| e.name());
                    if let Some(trained_with) = metadata.embedding_model_name.as_deref() {
                        if configured != Some(trained_with) {
                            warn!(
                                model_version = %metadata.version,
                                trained_with,
                                configured = configured.unwrap_or("none"),
                                "classifier was fitted on a different embedder; similarity features may drift"
                            );
                        }
                    }
                    Some(ensemble)
                }
                Err(err) => {
                    warn!(
                        model_dir = %dir.display(),
                        error = %err,
                        "classifier artifacts unavailable; using component scoring"
                    );
                    None
                }
            }
        });

        let engine = Self::with_artifacts(embedder, ensemble).with_default_top_n(config.default_top_n);
        info!(
            backend = engine.backend_name(),
            default_top_n = engine.default_top_n,
            "match engine ready"
        );
        engine
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    /// Scores one application regardless of its status. Inputs are read only.
    pub fn score_application(
        &self,
        project: &Project,
        candidate: &CandidateProfile,
        application: &Application,
        history: &[String],
    ) -> MatchResult {
        let skills = SkillSets::of(project, candidate);
        let component_scores = calculate_component_scores(project, candidate, application, &skills);

        let texts = ComparisonTexts::build(project, candidate, application, history);
        let similarities = Similarities::compute(self.backend.embedder(), &texts);
        let features = extract_features(project, candidate, application, &skills, similarities);
        let combined = combine(&component_scores, self.backend.predict_bins(&features));

        let delta = SkillDelta::between(&skills.required, &skills.possessed);
        let narrative = narrative(combined.overall_score, &delta);

        debug!(
            application_id = application.id,
            weighted = combined.weighted_score,
            ml_score = ?combined.ml_score,
            overall = combined.overall_score,
            "scored application"
        );

        MatchResult {
            application_id: application.id,
            overall_score: combined.overall_score,
            component_scores,
            weighted_score: combined.weighted_score,
            ml_score: combined.ml_score,
            matching_skills: delta.matching,
            missing_skills: delta.missing,
            extra_skills: delta.extra,
            narrative,
        }
    }

    /// Ranks the pending records of a project and keeps the best `top_n`.
    /// Malformed records are logged and skipped; a project with a malformed
    /// budget ranks to an empty list.
    #[instrument(skip_all, fields(project_id = project.id, records = records.len(), top_n = top_n))]
    pub fn rank_applications(
        &self,
        project: &Project,
        records: &[ApplicationRecord],
        top_n: usize,
    ) -> Vec<RankedApplication> {
        if let Err(err) = project.validate() {
            warn!(error = %err, skipped = records.len(), "malformed project budget; nothing ranked");
            return Vec::new();
        }

        let mut ranked = Vec::with_capacity(records.len());
        let mut skipped = 0usize;

        for record in records {
            let application = &record.application;
            if application.status != ApplicationStatus::Pending {
                debug!(
                    application_id = application.id,
                    status = application.status.as_str(),
                    "ignoring non-pending application"
                );
                continue;
            }

            let candidate = match record.validate() {
                Ok(candidate) => candidate,
                Err(err) => {
                    skipped += 1;
                    warn!(
                        application_id = application.id,
                        error = %err,
                        "skipping malformed application"
                    );
                    continue;
                }
            };

            let result = self.score_application(project, candidate, application, &record.history);
            ranked.push(RankedApplication::new(result, candidate, application));
        }

        let scored = ranked.len();
        ranked.sort_by(rank_order);
        ranked.truncate(top_n);

        info!(
            backend = self.backend_name(),
            scored,
            skipped,
            returned = ranked.len(),
            "ranked applications"
        );

        ranked
    }

    /// `rank_applications` with the engine's default shortlist length.
    pub fn shortlist(&self, project: &Project, records: &[ApplicationRecord]) -> Vec<RankedApplication> {
        self.rank_applications(project, records, self.default_top_n)
    }

    /// Full explanation for one application, independent of ranking.
    pub fn explain_application(
        &self,
        project: &Project,
        record: &ApplicationRecord,
    ) -> Result<MatchDetails, RecordError> {
        project.validate()?;
        let candidate = record.validate()?;
        let result = self.score_application(project, candidate, &record.application, &record.history);

        Ok(MatchDetails {
            result,
            candidate_info: candidate.into(),
            project_info: project.into(),
        })
    }
}
