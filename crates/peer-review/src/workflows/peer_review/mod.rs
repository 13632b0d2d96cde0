//! Peer-review scoring engine.
//!
//! Reviews flow strictly forward: aggregate, score, flag. Keyword re-scoring
//! and the statistics reducers run on demand over the finished entity maps.

pub mod aggregate;
pub mod analysis;
pub mod domain;
pub mod flags;
pub mod inconsistency;
pub mod quality;
pub mod recalculate;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, AggregatedEntities, MAX_MISSING_COMMENTS};
pub use analysis::{analyze, AnalysisConfig, PeerReviewAnalysis};
pub use domain::{
    BonusScore, Criterion, CriterionComments, Flag, FlagKind, Grader, Participant, PenaltyScore,
    PeerReviewScore, Review, ReviewDetail, ReviewId, Severity, Student, WorkScore,
    CRITERIA_COUNT, RUBRIC_MAX,
};
pub use flags::{flagged_graders, flagged_students, grader_flags, student_flags};
pub use inconsistency::{detect_inconsistencies, Inconsistency, InconsistencyKind};
pub use quality::{
    assess, classify, CommentVerdict, KeywordIndex, KeywordUsage, KeywordVerdict,
    KeywordVerdicts, QualityPolicy, QualityReason, ReviewAssessment,
};
pub use recalculate::{recalculate, GraderScoreChange, Recalculation};
pub use repository::{AnalysisRecord, AnalysisStore, StoreError};
pub use router::peer_review_router;
pub use scoring::{
    score_work, BonusScheme, PenaltyScheme, SchemeKind, ScoringScheme, PENALTY_PER_REVIEW,
    RELIABLE_MIN_GRADERS, RELIABLE_STD_DEV,
};
pub use service::{FlagReport, PeerReviewService, PeerReviewServiceError};
pub use statistics::{
    group_statistics, ClassStatistics, GradeBand, GradeLevel, GroupAssignment, GroupStatistics,
    ReviewStats,
};
