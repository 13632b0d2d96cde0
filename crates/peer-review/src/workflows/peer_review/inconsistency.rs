//! Lexical grade-versus-sentiment scan over grader comments.
//!
//! Heuristic and advisory only: the output is never stored on an entity and
//! never feeds a score.

use super::domain::{Grader, Review, ReviewId};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const HIGH_GRADE_THRESHOLD: f64 = 11.0;
pub const LOW_GRADE_THRESHOLD: f64 = 6.0;
/// Concatenated comments shorter than this are ignored by the high-grade check.
pub const MIN_CRITICAL_TEXT_CHARS: usize = 20;

static NEGATIVE_TERMS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
static POSITIVE_TERMS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn compile(terms: &[&'static str]) -> Vec<(&'static str, Regex)> {
    terms
        .iter()
        .map(|term| {
            let escaped = regex::escape(term);
            let pattern = if term.is_ascii() {
                format!(r"(?i)\b{escaped}\b")
            } else {
                escaped
            };
            (*term, Regex::new(&pattern).expect("term pattern compiles"))
        })
        .collect()
}

fn negative_terms() -> &'static [(&'static str, Regex)] {
    NEGATIVE_TERMS.get_or_init(|| {
        compile(&[
            "not",
            "missing",
            "needs improvement",
            "lacking",
            "unclear",
            "no audio",
            "too long",
            "ไม่",
            "ขาด",
            "ควรปรับปรุง",
            "ไม่ชัด",
            "ไม่มี",
        ])
    })
}

fn positive_terms() -> &'static [(&'static str, Regex)] {
    POSITIVE_TERMS.get_or_init(|| {
        compile(&[
            "excellent",
            "great",
            "perfect",
            "very good",
            "outstanding",
            "ดีมาก",
            "ยอดเยี่ยม",
            "สมบูรณ์",
            "ครบถ้วน",
        ])
    })
}

fn matched(terms: &[(&'static str, Regex)], text: &str) -> Vec<String> {
    terms
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(term, _)| term.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    HighGradeCriticalComments,
    LowGradePositiveComments,
}

impl InconsistencyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighGradeCriticalComments => "high grade with critical comments",
            Self::LowGradePositiveComments => "low grade with praising comments",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inconsistency {
    pub kind: InconsistencyKind,
    pub grader_name: String,
    pub grader_id: String,
    pub review_id: ReviewId,
    pub student_reviewed: String,
    pub grade_given: f64,
    pub matched_terms: Vec<String>,
}

/// Scans every completed review detail against its source comments.
/// Details whose review can no longer be found are skipped.
pub fn detect_inconsistencies<'a, I>(graders: I, reviews: &[Review]) -> Vec<Inconsistency>
where
    I: IntoIterator<Item = &'a Grader>,
{
    let by_id: HashMap<&ReviewId, &Review> =
        reviews.iter().map(|review| (&review.id, review)).collect();
    let mut findings = Vec::new();

    for grader in graders {
        for detail in &grader.details {
            let Some(review) = by_id.get(&detail.review_id) else {
                continue;
            };
            let text = review.comments.joined();
            let negatives = matched(negative_terms(), &text);

            let finding = if detail.grade_given >= HIGH_GRADE_THRESHOLD
                && !negatives.is_empty()
                && text.trim().chars().count() > MIN_CRITICAL_TEXT_CHARS
            {
                Some((InconsistencyKind::HighGradeCriticalComments, negatives))
            } else if detail.grade_given <= LOW_GRADE_THRESHOLD && negatives.is_empty() {
                let positives = matched(positive_terms(), &text);
                (!positives.is_empty())
                    .then_some((InconsistencyKind::LowGradePositiveComments, positives))
            } else {
                None
            };

            if let Some((kind, matched_terms)) = finding {
                findings.push(Inconsistency {
                    kind,
                    grader_name: grader.grader_name.clone(),
                    grader_id: grader.grader_id.clone(),
                    review_id: detail.review_id.clone(),
                    student_reviewed: detail.student_reviewed.clone(),
                    grade_given: detail.grade_given,
                    matched_terms,
                });
            }
        }
    }

    findings
}
