pub mod backend;
pub mod combiner;
pub mod explain;
pub mod features;
pub mod pipeline;
pub mod scoring;
pub mod weights;

pub use backend::{ArtifactBackend, ComponentOnlyBackend, ScoringBackend};
pub use explain::{MatchDetails, SkillDelta};
pub use pipeline::{DEFAULT_TOP_N, MatchEngine, MatchResult, RankedApplication};
pub use scoring::ComponentScores;
