use serde::Serialize;

use super::analysis::PeerReviewAnalysis;
use super::recalculate::GraderScoreChange;
use crate::workflows::canvas::ColumnStrategy;

/// The current analysis together with where it came from and what the last
/// keyword re-scoring changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub source: String,
    pub column_strategy: ColumnStrategy,
    pub analysis: PeerReviewAnalysis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub last_changes: Vec<GraderScoreChange>,
}

/// Storage abstraction so the service can be exercised in isolation. Holds at
/// most one analysis; saving replaces it wholesale.
pub trait AnalysisStore: Send + Sync {
    fn load(&self) -> Result<Option<AnalysisRecord>, StoreError>;
    fn save(&self, record: AnalysisRecord) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("analysis store unavailable: {0}")]
    Unavailable(String),
}
