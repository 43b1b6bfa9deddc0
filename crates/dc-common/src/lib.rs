pub mod classifier;
pub mod config;
pub mod embedding;
pub mod logging;
pub mod matching;
pub mod skill_normalizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use matching::pipeline::MatchEngine;

// Records supplied by the marketplace backend. The engine only reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub category: Option<String>,
    pub complexity: Option<String>,
}

/// Skills as entered on a profile: either one delimited string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    Text(String),
    List(Vec<String>),
}

impl Default for Skills {
    fn default() -> Self {
        Skills::List(Vec::new())
    }
}

impl Skills {
    /// Raw text form, used when building the candidate comparison text.
    pub fn to_text(&self) -> String {
        match self {
            Skills::Text(text) => text.clone(),
            Skills::List(items) => items.join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub skills: Skills,
    pub years_experience: u32,
    pub rating: f64,
    pub total_projects: u32,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Shortlisted,
    Rejected,
    Selected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Selected => "selected",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub id: i64,
    pub cover_letter: String,
    pub proposed_rate: Option<f64>,
    pub estimated_duration: String,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

/// One application as handed over for ranking, together with the applicant's
/// profile and the descriptions of projects they were previously selected for
/// (most recent first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationRecord {
    pub application: Application,
    pub candidate: Option<CandidateProfile>,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("application {application_id} has no candidate profile")]
    MissingCandidate { application_id: i64 },
    #[error("application {application_id}: {field} is out of range ({value})")]
    OutOfRange {
        application_id: i64,
        field: &'static str,
        value: f64,
    },
    #[error("project {project_id}: {field} must be a non-negative amount ({value})")]
    InvalidBudget {
        project_id: i64,
        field: &'static str,
        value: f64,
    },
}

impl Project {
    /// Budget bounds may be absent, but a present bound must be finite and non-negative.
    pub fn validate(&self) -> Result<(), RecordError> {
        for (field, bound) in [("budget_min", self.budget_min), ("budget_max", self.budget_max)] {
            if let Some(value) = bound.filter(|v| !v.is_finite() || *v < 0.0) {
                return Err(RecordError::InvalidBudget {
                    project_id: self.id,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl ApplicationRecord {
    pub fn new(application: Application, candidate: CandidateProfile) -> Self {
        Self {
            application,
            candidate: Some(candidate),
            history: Vec::new(),
        }
    }

    /// Boundary check run once before a record enters the scoring core.
    pub fn validate(&self) -> Result<&CandidateProfile, RecordError> {
        let application_id = self.application.id;
        let candidate = self
            .candidate
            .as_ref()
            .ok_or(RecordError::MissingCandidate { application_id })?;

        let out_of_range = |field: &'static str, value: f64| RecordError::OutOfRange {
            application_id,
            field,
            value,
        };

        if !(0.0..=5.0).contains(&candidate.rating) {
            return Err(out_of_range("rating", candidate.rating));
        }
        if let Some(rate) = candidate.success_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(out_of_range("success_rate", rate));
            }
        }
        // A zero rate means "not quoted" and is scored neutrally.
        if let Some(rate) = self.application.proposed_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(out_of_range("proposed_rate", rate));
            }
        }

        Ok(candidate)
    }
}
