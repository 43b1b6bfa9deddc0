use std::fs;
use std::path::Path;

use dc_common::classifier::BIN_COUNT;
use dc_common::classifier::artifacts::{METADATA_FILE, PRIMARY_FILE, SCALER_FILE, SECONDARY_FILE};
use dc_common::config::EngineConfig;
use dc_common::matching::features::FEATURE_COUNT;
use dc_common::matching::weights::{COMPONENT_WEIGHTS, ComponentWeights};
use dc_common::{
    Application, ApplicationRecord, ApplicationStatus, CandidateProfile, MatchEngine, Project,
    Skills,
};

fn project(tech_stack: &[&str]) -> Project {
    Project {
        id: 1,
        title: "Marketplace dashboard".into(),
        description: "Admin dashboard in React backed by a Node service".into(),
        tech_stack: tech_stack.iter().map(|s| s.to_string()).collect(),
        budget_min: Some(1000.0),
        budget_max: Some(1000.0),
        ..Project::default()
    }
}

struct Applicant {
    skills: &'static str,
    years: u32,
    rating: f64,
    success_rate: f64,
    projects: u32,
    words: usize,
    rate: Option<f64>,
}

fn record(id: i64, a: Applicant) -> ApplicationRecord {
    ApplicationRecord::new(
        Application {
            id,
            cover_letter: vec!["word"; a.words].join(" "),
            proposed_rate: a.rate,
            estimated_duration: "1 month".into(),
            ..Application::default()
        },
        CandidateProfile {
            id: 1000 + id,
            name: format!("Freelancer {id}"),
            title: "Full-stack developer".into(),
            bio: "Builds web products".into(),
            skills: Skills::Text(a.skills.into()),
            years_experience: a.years,
            rating: a.rating,
            total_projects: a.projects,
            success_rate: Some(a.success_rate),
        },
    )
}

/// Weighted 71.3: skill 50, experience 100, portfolio 70, proposal 82, rate 50.
fn seventy_one(id: i64) -> ApplicationRecord {
    record(
        id,
        Applicant {
            skills: "react, python",
            years: 12,
            rating: 4.0,
            success_rate: 80.0,
            projects: 6,
            words: 120,
            rate: Some(1500.0),
        },
    )
}

fn ninety_five(id: i64) -> ApplicationRecord {
    record(
        id,
        Applicant {
            skills: "React, Node",
            years: 10,
            rating: 5.0,
            success_rate: 100.0,
            projects: 10,
            words: 100,
            rate: Some(800.0),
        },
    )
}

fn forty(id: i64) -> ApplicationRecord {
    record(
        id,
        Applicant {
            skills: "php",
            years: 10,
            rating: 3.0,
            success_rate: 50.0,
            projects: 4,
            words: 25,
            rate: None,
        },
    )
}

fn score(engine: &MatchEngine, project: &Project, rec: &ApplicationRecord) -> dc_common::matching::MatchResult {
    engine.score_application(
        project,
        rec.candidate.as_ref().expect("fixture has a profile"),
        &rec.application,
        &rec.history,
    )
}

#[test]
fn empty_tech_stack_gives_neutral_skill_match() {
    let engine = MatchEngine::component_only();
    let result = score(&engine, &project(&[]), &seventy_one(1));

    assert_eq!(result.component_scores.skill_match, 50.0);
    assert!(result.missing_skills.is_empty());
    assert!(result.narrative.contains("no required skills"));
}

#[test]
fn missing_proposed_rate_gives_neutral_rate_fit() {
    let engine = MatchEngine::component_only();
    let result = score(&engine, &project(&["react"]), &forty(1));

    assert_eq!(result.component_scores.rate_fit, 50.0);
}

#[test]
fn new_freelancer_with_zero_success_rate_is_not_penalized() {
    let engine = MatchEngine::component_only();
    let project = project(&["React", "Node"]);
    let mut fresh = seventy_one(1);
    fresh.candidate.as_mut().unwrap().success_rate = Some(0.0);
    let mut unset = seventy_one(2);
    unset.candidate.as_mut().unwrap().success_rate = None;

    let fresh = score(&engine, &project, &fresh);
    let unset = score(&engine, &project, &unset);

    assert_eq!(fresh.component_scores, unset.component_scores);
    assert_eq!(fresh.overall_score, unset.overall_score);
}

#[test]
fn scenario_component_values() {
    let engine = MatchEngine::component_only();
    let result = score(&engine, &project(&["React", "Node"]), &seventy_one(1));
    let c = result.component_scores;

    assert_eq!(c.skill_match, 50.0);
    assert_eq!(c.experience_fit, 100.0);
    assert!((c.portfolio_quality - 70.0).abs() < 1e-9);
    assert!((c.proposal_quality - 82.0).abs() < 1e-9);
    assert_eq!(c.rate_fit, 50.0);
    assert!((result.weighted_score - 71.3).abs() < 1e-9);
    assert_eq!(result.overall_score, 71);
}

#[test]
fn ranking_keeps_top_two_in_descending_order() {
    let engine = MatchEngine::component_only();
    let project = project(&["React", "Node"]);
    let records = vec![forty(1), ninety_five(2), seventy_one(3)];

    let scores: Vec<u8> = records
        .iter()
        .map(|r| score(&engine, &project, r).overall_score)
        .collect();
    assert_eq!(scores, vec![40, 95, 71]);

    let ranked = engine.rank_applications(&project, &records, 2);

    let ids: Vec<i64> = ranked.iter().map(|r| r.application_id).collect();
    let top: Vec<u8> = ranked.iter().map(|r| r.overall_score).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(top, vec![95, 71]);
}

#[test]
fn ranking_never_returns_more_than_pending() {
    let engine = MatchEngine::component_only();
    let project = project(&["React"]);
    let mut selected = ninety_five(2);
    selected.application.status = ApplicationStatus::Selected;
    let records = vec![forty(1), selected, seventy_one(3)];

    let ranked = engine.rank_applications(&project, &records, 10);

    assert_eq!(ranked.len(), 2);
    assert!(ranked.windows(2).all(|w| w[0].overall_score >= w[1].overall_score));
}

#[test]
fn skill_lists_partition_required_and_candidate_sets() {
    let engine = MatchEngine::component_only();
    let result = score(&engine, &project(&["React", "Node", "GraphQL"]), &seventy_one(1));

    let mut required: Vec<String> = result
        .matching_skills
        .iter()
        .chain(&result.missing_skills)
        .cloned()
        .collect();
    required.sort();
    assert_eq!(required, vec!["graphql", "node", "react"]);

    let mut possessed: Vec<String> = result
        .matching_skills
        .iter()
        .chain(&result.extra_skills)
        .cloned()
        .collect();
    possessed.sort();
    assert_eq!(possessed, vec!["python", "react"]);
}

#[test]
fn weights_are_a_convex_combination() {
    let ComponentWeights {
        skill_match,
        experience_fit,
        portfolio_quality,
        proposal_quality,
        rate_fit,
    } = COMPONENT_WEIGHTS;

    assert!((skill_match + experience_fit + portfolio_quality + proposal_quality + rate_fit - 1.0).abs() < 1e-12);
}

fn write_json(dir: &Path, file: &str, value: serde_json::Value) {
    fs::write(dir.join(file), value.to_string()).unwrap();
}

fn write_constant_bundle(dir: &Path, bin: usize) {
    let mut bias = vec![0.0; BIN_COUNT];
    bias[bin] = 1.0;
    let linear = serde_json::json!({
        "kind": "linear",
        "weights": vec![vec![0.0; FEATURE_COUNT]; BIN_COUNT],
        "bias": bias,
    });

    write_json(
        dir,
        METADATA_FILE,
        serde_json::json!({ "n_features": FEATURE_COUNT, "version": "v3", "embedding_model_name": "hash" }),
    );
    write_json(
        dir,
        SCALER_FILE,
        serde_json::json!({ "mean": vec![0.0; FEATURE_COUNT], "scale": vec![1.0; FEATURE_COUNT] }),
    );
    write_json(dir, PRIMARY_FILE, linear.clone());
    write_json(dir, SECONDARY_FILE, linear);
}

#[test]
fn engine_from_config_blends_loaded_ensemble() {
    let dir = tempfile::tempdir().unwrap();
    write_constant_bundle(dir.path(), 2);
    let config = EngineConfig {
        model_dir: Some(dir.path().to_path_buf()),
        embedder: "hash".into(),
        ..EngineConfig::default()
    };

    let engine = MatchEngine::from_config(&config);
    let result = score(&engine, &project(&["React", "Node"]), &seventy_one(1));

    assert_eq!(engine.backend_name(), "embedding+ensemble");
    assert_eq!(result.ml_score, Some(75.0));
    // 71.3 * 0.7 + 75 * 0.3 = 72.41
    assert_eq!(result.overall_score, 72);
}

#[test]
fn ensemble_loads_even_when_fitted_on_another_embedder() {
    let dir = tempfile::tempdir().unwrap();
    write_constant_bundle(dir.path(), 3);
    let config = EngineConfig {
        model_dir: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    };

    let engine = MatchEngine::from_config(&config);
    let result = score(&engine, &project(&["React", "Node"]), &seventy_one(1));

    assert_eq!(engine.backend_name(), "ensemble");
    assert_eq!(result.ml_score, Some(95.0));
}

#[test]
fn unusable_artifacts_fall_back_to_weighted_score() {
    let dir = tempfile::tempdir().unwrap();
    write_json(dir.path(), METADATA_FILE, serde_json::json!({ "n_features": 3 }));
    let config = EngineConfig {
        model_dir: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    };

    let engine = MatchEngine::from_config(&config);
    let fallback = score(&engine, &project(&["React", "Node"]), &seventy_one(1));
    let plain = score(&MatchEngine::component_only(), &project(&["React", "Node"]), &seventy_one(1));

    assert_eq!(engine.backend_name(), "component_only");
    assert_eq!(fallback, plain);
    assert_eq!(fallback.overall_score as f64, fallback.weighted_score.round());
}

#[test]
fn explain_serializes_flat_result_with_context() {
    let engine = MatchEngine::component_only();
    let details = engine
        .explain_application(&project(&["React", "Node"]), &seventy_one(7))
        .unwrap();

    let value = serde_json::to_value(&details).unwrap();

    assert_eq!(value["application_id"], 7);
    assert_eq!(value["overall_score"], 71);
    assert_eq!(value["candidate_info"]["name"], "Freelancer 7");
    assert_eq!(value["project_info"]["title"], "Marketplace dashboard");
}

#[test]
fn request_json_deserializes_with_defaults() {
    let raw = r#"{
        "application": { "id": 3, "cover_letter": "Happy to help", "applied_at": "2024-05-01T10:00:00Z" },
        "candidate": { "id": 9, "name": "Ada", "skills": ["Rust", "Go"], "rating": 4.5 }
    }"#;

    let record: ApplicationRecord = serde_json::from_str(raw).unwrap();

    assert_eq!(record.application.status, ApplicationStatus::Pending);
    assert!(record.history.is_empty());
    let candidate = record.validate().unwrap();
    assert_eq!(candidate.skills, Skills::List(vec!["Rust".into(), "Go".into()]));
    assert_eq!(candidate.success_rate, None);
}
