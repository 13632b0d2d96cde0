use super::domain::{Grader, Review, ReviewDetail, Student};
use super::quality::{assess, KeywordVerdicts, QualityPolicy, ReviewAssessment};
use std::collections::BTreeMap;

/// A review counts as complete when no more than this many criteria lack a comment.
pub const MAX_MISSING_COMMENTS: usize = 3;

/// Students and graders folded from the review stream, before scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedEntities {
    pub students: BTreeMap<String, Student>,
    pub graders: BTreeMap<String, Grader>,
}

/// Single linear pass over the reviews. Counts and grade lists are
/// order-independent; the review id lists keep encounter order.
pub fn aggregate(
    reviews: &[Review],
    verdicts: &KeywordVerdicts,
    policy: QualityPolicy,
) -> AggregatedEntities {
    let mut entities = AggregatedEntities::default();

    for review in reviews {
        let student = entities
            .students
            .entry(review.student.display_name.clone())
            .or_insert_with(|| Student::new(&review.student));

        student.graders_assigned += 1;
        student.reviews_received.push(review.id.clone());
        if let Some(grade) = review.grade_given {
            student.graders_completed += 1;
            student.grades_received.push(grade);
        }

        let Some(participant) = review.grader.as_ref().filter(|p| !p.display_name.is_empty())
        else {
            continue;
        };

        let grader = entities
            .graders
            .entry(participant.display_name.clone())
            .or_insert_with(|| Grader::new(participant));

        grader.assigned_reviews += 1;
        grader.reviews_made.push(review.id.clone());

        if let Some(grade) = review.grade_given {
            grader.completed_reviews += 1;
            let assessment = assess(review, verdicts, policy);
            for keyword in &assessment.keywords {
                if !grader.keywords.contains(keyword) {
                    grader.keywords.push(keyword.clone());
                }
            }
            grader.details.push(review_detail(review, grade, assessment));
        }
    }

    entities
}

pub(crate) fn review_detail(review: &Review, grade: f64, assessment: ReviewAssessment) -> ReviewDetail {
    let missing_comments = assessment.missing_comments();
    ReviewDetail {
        review_id: review.id.clone(),
        student_reviewed: review.student.display_name.clone(),
        student_id: review.student.id.clone(),
        grade_given: grade,
        valid_comment_count: assessment.has_comment_count,
        missing_comments,
        quality_count: assessment.quality_count,
        is_complete: missing_comments <= MAX_MISSING_COMMENTS,
        has_all_quality: assessment.has_all_quality(),
        keywords: assessment.keywords,
    }
}
