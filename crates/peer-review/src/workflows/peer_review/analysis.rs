use super::aggregate::aggregate;
use super::domain::{Grader, Review, Student};
use super::flags::{grader_flags, student_flags};
use super::inconsistency::{detect_inconsistencies, Inconsistency};
use super::quality::{KeywordIndex, KeywordVerdicts, QualityPolicy};
use super::recalculate::{recalculate, GraderScoreChange};
use super::scoring::{score_work, SchemeKind};
use super::statistics::{group_statistics, ClassStatistics, GroupAssignment, GroupStatistics, ReviewStats};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Policy applied when turning parsed reviews into scored entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub scheme: SchemeKind,
    pub quality_policy: QualityPolicy,
    pub expected_review_load: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::Bonus,
            quality_policy: QualityPolicy::Lenient,
            expected_review_load: 3,
        }
    }
}

/// The `{students, graders, reviews, stats}` bundle for one export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerReviewAnalysis {
    pub scheme: SchemeKind,
    pub students: BTreeMap<String, Student>,
    pub graders: BTreeMap<String, Grader>,
    pub reviews: Vec<Review>,
    pub stats: ReviewStats,
    pub keyword_verdicts: KeywordVerdicts,
}

/// Full forward pipeline: aggregate, score, flag. Pure; no keyword overrides
/// are in effect on a fresh analysis.
pub fn analyze(reviews: Vec<Review>, config: &AnalysisConfig) -> PeerReviewAnalysis {
    let verdicts = KeywordVerdicts::default();
    let entities = aggregate(&reviews, &verdicts, config.quality_policy);
    let mut students = entities.students;
    let mut graders = entities.graders;

    for student in students.values_mut() {
        student.work_score = score_work(student);
        student.flags = student_flags(student);
    }

    let scheme = config.scheme.scheme();
    for grader in graders.values_mut() {
        grader.peer_review_score = scheme.score(grader, &grader.details);
        grader.flags = grader_flags(grader, config.expected_review_load);
    }

    let stats = ReviewStats::collect(
        &reviews,
        &students,
        &graders,
        &verdicts,
        config.quality_policy,
    );

    info!(
        reviews = stats.total_reviews,
        students = stats.total_students,
        graders = stats.total_graders,
        scheme = config.scheme.label(),
        "peer review analysis complete"
    );

    PeerReviewAnalysis {
        scheme: config.scheme,
        students,
        graders,
        reviews,
        stats,
        keyword_verdicts: verdicts,
    }
}

impl PeerReviewAnalysis {
    /// Applies keyword overrides and rescores every grader with the penalty
    /// scheme. Students are untouched.
    pub fn recalculate(
        &self,
        verdicts: KeywordVerdicts,
        config: &AnalysisConfig,
    ) -> (Self, Vec<GraderScoreChange>) {
        let outcome = recalculate(
            &self.reviews,
            &self.graders,
            &verdicts,
            config.quality_policy,
            config.expected_review_load,
        );
        let stats = ReviewStats::collect(
            &self.reviews,
            &self.students,
            &outcome.graders,
            &verdicts,
            config.quality_policy,
        );

        let updated = Self {
            scheme: SchemeKind::Penalty,
            students: self.students.clone(),
            graders: outcome.graders,
            reviews: self.reviews.clone(),
            stats,
            keyword_verdicts: verdicts,
        };
        (updated, outcome.changes)
    }

    pub fn keyword_index(&self) -> KeywordIndex {
        KeywordIndex::build(self.graders.values(), &self.keyword_verdicts)
    }

    pub fn inconsistencies(&self) -> Vec<Inconsistency> {
        detect_inconsistencies(self.graders.values(), &self.reviews)
    }

    pub fn class_statistics(&self) -> Option<ClassStatistics> {
        ClassStatistics::compute(self.students.values())
    }

    pub fn group_statistics(&self, assignment: &GroupAssignment) -> Vec<GroupStatistics> {
        group_statistics(&self.students, &self.graders, assignment)
    }
}
