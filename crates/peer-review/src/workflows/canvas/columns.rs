use crate::workflows::peer_review::domain::CRITERIA_COUNT;
use serde::{Deserialize, Serialize};

/// First criterion comment column. Criteria are always read positionally
/// from here so the rubric order can never be shuffled by header text.
pub const CRITERIA_OFFSET: usize = 5;

/// How column positions are resolved from the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDetection {
    /// Fixed Canvas layout only.
    Positional,
    /// Header substring match, falling back to the fixed layout.
    #[default]
    HeaderMatch,
}

impl ColumnDetection {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "positional" => Some(Self::Positional),
            "header_match" | "header" => Some(Self::HeaderMatch),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::HeaderMatch => "header_match",
        }
    }
}

/// The strategy that actually produced a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStrategy {
    Positional,
    HeaderMatch,
    /// Header matching was requested but a required header was missing.
    PositionalFallback,
}

impl ColumnStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::HeaderMatch => "header_match",
            Self::PositionalFallback => "positional_fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Student,
    Grader,
    Grade,
    GradeAverage,
    SubmissionComment,
}

impl ColumnRole {
    const fn ordered() -> [Self; 5] {
        [
            Self::Student,
            Self::Grader,
            Self::Grade,
            Self::GradeAverage,
            Self::SubmissionComment,
        ]
    }

    const fn header_fragment(self) -> &'static str {
        match self {
            Self::Student => "student name",
            Self::Grader => "review assigned",
            Self::Grade => "review completed",
            Self::GradeAverage => "grade average",
            Self::SubmissionComment => "submission comment",
        }
    }

    const fn position(self) -> usize {
        match self {
            Self::Student => 0,
            Self::Grader => 1,
            Self::Grade => 2,
            Self::GradeAverage => 3,
            Self::SubmissionComment => 4,
        }
    }

    const fn required(self) -> bool {
        matches!(self, Self::Student | Self::Grader | Self::Grade)
    }
}

/// Column indices resolved once per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub student: usize,
    pub grader: usize,
    pub grade: usize,
    pub grade_average: usize,
    pub submission_comment: usize,
    pub criteria: [usize; CRITERIA_COUNT],
    pub strategy: ColumnStrategy,
}

impl ColumnSchema {
    pub fn positional(strategy: ColumnStrategy) -> Self {
        Self {
            student: ColumnRole::Student.position(),
            grader: ColumnRole::Grader.position(),
            grade: ColumnRole::Grade.position(),
            grade_average: ColumnRole::GradeAverage.position(),
            submission_comment: ColumnRole::SubmissionComment.position(),
            criteria: std::array::from_fn(|index| CRITERIA_OFFSET + index),
            strategy,
        }
    }

    /// `headers` must already be cleaned of byte-order marks and padding.
    pub fn resolve(headers: &[String], detection: ColumnDetection) -> Self {
        if detection == ColumnDetection::Positional {
            return Self::positional(ColumnStrategy::Positional);
        }

        let lowered: Vec<String> = headers
            .iter()
            .map(|header| header.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .collect();
        let find = |role: ColumnRole| {
            lowered
                .iter()
                .position(|header| header.contains(role.header_fragment()))
        };

        if ColumnRole::ordered()
            .into_iter()
            .filter(|role| role.required())
            .any(|role| find(role).is_none())
        {
            return Self::positional(ColumnStrategy::PositionalFallback);
        }

        let index = |role: ColumnRole| find(role).unwrap_or(role.position());
        Self {
            student: index(ColumnRole::Student),
            grader: index(ColumnRole::Grader),
            grade: index(ColumnRole::Grade),
            grade_average: index(ColumnRole::GradeAverage),
            submission_comment: index(ColumnRole::SubmissionComment),
            criteria: std::array::from_fn(|index| CRITERIA_OFFSET + index),
            strategy: ColumnStrategy::HeaderMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn header_match_finds_shuffled_identity_columns() {
        let schema = ColumnSchema::resolve(
            &headers(&[
                "Review assigned",
                "Student  Name",
                "Review Completed",
                "Grade Average",
                "Submission Comments",
            ]),
            ColumnDetection::HeaderMatch,
        );

        assert_eq!(schema.strategy, ColumnStrategy::HeaderMatch);
        assert_eq!(schema.student, 1);
        assert_eq!(schema.grader, 0);
        assert_eq!(schema.grade, 2);
        assert_eq!(schema.criteria[0], CRITERIA_OFFSET);
        assert_eq!(schema.criteria[8], CRITERIA_OFFSET + 8);
    }

    #[test]
    fn missing_required_header_falls_back_to_positions() {
        let schema = ColumnSchema::resolve(
            &headers(&["Name", "Reviewer", "Score"]),
            ColumnDetection::HeaderMatch,
        );
        assert_eq!(schema.strategy, ColumnStrategy::PositionalFallback);
        assert_eq!((schema.student, schema.grader, schema.grade), (0, 1, 2));
    }

    #[test]
    fn detection_labels_parse() {
        assert_eq!(
            ColumnDetection::from_label("Header-Match"),
            Some(ColumnDetection::HeaderMatch)
        );
        assert_eq!(
            ColumnDetection::from_label("positional"),
            Some(ColumnDetection::Positional)
        );
        assert_eq!(ColumnDetection::from_label("guess"), None);
    }
}
