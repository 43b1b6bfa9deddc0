use serde::{Deserialize, Serialize};

use super::pipeline::MatchResult;
use crate::skill_normalizer::SkillSet;
use crate::{CandidateProfile, Project};

/// Skill-set differences between a project and a candidate, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDelta {
    /// required ∩ candidate
    pub matching: Vec<String>,
    /// required − candidate
    pub missing: Vec<String>,
    /// candidate − required
    pub extra: Vec<String>,
}

impl SkillDelta {
    pub fn between(required: &SkillSet, possessed: &SkillSet) -> Self {
        Self {
            matching: required.intersection(possessed).cloned().collect(),
            missing: required.difference(possessed).cloned().collect(),
            extra: possessed.difference(required).cloned().collect(),
        }
    }

    pub fn required_count(&self) -> usize {
        self.matching.len() + self.missing.len()
    }
}

/// One-line summary of the overall score and skill coverage.
pub fn narrative(overall_score: u8, delta: &SkillDelta) -> String {
    let required = delta.required_count();
    if required == 0 {
        return format!("Overall match {overall_score}/100; the project lists no required skills");
    }

    let mut line = format!(
        "Overall match {overall_score}/100; {} of {required} required skills matched",
        delta.matching.len()
    );
    if !delta.missing.is_empty() {
        line.push_str(&format!(" (missing: {})", delta.missing.join(", ")));
    }
    line
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub years_experience: u32,
    pub rating: f64,
    pub total_projects: u32,
    pub success_rate: Option<f64>,
}

impl From<&CandidateProfile> for CandidateInfo {
    fn from(candidate: &CandidateProfile) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            title: candidate.title.clone(),
            years_experience: candidate.years_experience,
            rating: candidate.rating,
            total_projects: candidate.total_projects,
            success_rate: candidate.success_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: i64,
    pub title: String,
    pub category: Option<String>,
    pub complexity: Option<String>,
    pub tech_stack: Vec<String>,
}

impl From<&Project> for ProjectInfo {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            category: project.category.clone(),
            complexity: project.complexity.clone(),
            tech_stack: project.tech_stack.clone(),
        }
    }
}

/// "Explain this match" payload for a single application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetails {
    #[serde(flatten)]
    pub result: MatchResult,
    pub candidate_info: CandidateInfo,
    pub project_info: ProjectInfo,
}
