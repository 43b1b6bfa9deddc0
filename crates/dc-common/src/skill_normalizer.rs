use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

use crate::Skills;

/// Ordered set of normalized skill tokens. Ordering keeps every derived
/// sequence (matching / missing / extra) sorted without an extra pass.
pub type SkillSet = BTreeSet<String>;

fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

/// Normalizes a single skill token: NFKC, trimmed, lowercased.
pub fn normalize_skill(skill: &str) -> String {
    nfkc_lower_trim(skill)
}

/// Normalizes list entries as whole tokens. Blank entries are dropped.
pub fn normalize_skill_set(skills: &[String]) -> SkillSet {
    skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalizes a delimited skill string.
///
/// Splits on commas first; when that leaves a single token, the token is split
/// again on whitespace so "react node" and "react, node" agree.
pub fn normalize_skill_text(text: &str) -> SkillSet {
    let segments: Vec<&str> = text
        .split(|c: char| c == ',' || c == '，')
        .filter(|s| !s.trim().is_empty())
        .collect();

    if segments.len() == 1 {
        return segments[0]
            .split_whitespace()
            .map(normalize_skill)
            .filter(|s| !s.is_empty())
            .collect();
    }

    segments
        .into_iter()
        .map(normalize_skill)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalizes whichever form a profile carries.
pub fn normalize_skills(skills: &Skills) -> SkillSet {
    match skills {
        Skills::Text(text) => normalize_skill_text(text),
        Skills::List(items) => normalize_skill_set(items),
    }
}
