use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Highest grade the rubric can award.
pub const RUBRIC_MAX: f64 = 12.0;

/// Number of criterion comment columns in a Canvas peer-review export.
pub const CRITERIA_COUNT: usize = 9;

/// Rubric criteria in export column order. The order is significant: column
/// 5 + position holds the comment for the criterion at that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    FileAccess,
    CreatorInfo,
    Duration,
    Appearance,
    Demo,
    Benefits,
    Weaknesses,
    SimilarTools,
    Quality,
}

impl Criterion {
    pub const fn ordered() -> [Self; CRITERIA_COUNT] {
        [
            Self::FileAccess,
            Self::CreatorInfo,
            Self::Duration,
            Self::Appearance,
            Self::Demo,
            Self::Benefits,
            Self::Weaknesses,
            Self::SimilarTools,
            Self::Quality,
        ]
    }

    pub const fn position(self) -> usize {
        match self {
            Self::FileAccess => 0,
            Self::CreatorInfo => 1,
            Self::Duration => 2,
            Self::Appearance => 3,
            Self::Demo => 4,
            Self::Benefits => 5,
            Self::Weaknesses => 6,
            Self::SimilarTools => 7,
            Self::Quality => 8,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::FileAccess => "file_access",
            Self::CreatorInfo => "creator_info",
            Self::Duration => "duration",
            Self::Appearance => "appearance",
            Self::Demo => "demo",
            Self::Benefits => "benefits",
            Self::Weaknesses => "weaknesses",
            Self::SimilarTools => "similar_tools",
            Self::Quality => "quality",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FileAccess => "File access",
            Self::CreatorInfo => "Creator info",
            Self::Duration => "Clip duration",
            Self::Appearance => "Presenter appearance",
            Self::Demo => "Demonstration",
            Self::Benefits => "Benefits",
            Self::Weaknesses => "Weaknesses",
            Self::SimilarTools => "Similar tools",
            Self::Quality => "Audio/video quality",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::FileAccess => "Link lives in OneDrive and opens",
            Self::CreatorInfo => "Shows full name and faculty",
            Self::Duration => "No longer than 5 minutes",
            Self::Appearance => "Presenter visible in the clip",
            Self::Demo => "Includes a screen capture",
            Self::Benefits => "States the benefits clearly",
            Self::Weaknesses => "Names at least two weaknesses",
            Self::SimilarTools => "Gives examples of similar tools",
            Self::Quality => "Picture and sound are clear",
        }
    }

    pub const fn max_points(self) -> u8 {
        match self {
            Self::FileAccess | Self::Weaknesses | Self::SimilarTools => 2,
            _ => 1,
        }
    }
}

/// Free-text comments keyed by criterion, always holding all nine slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriterionComments([String; CRITERIA_COUNT]);

impl CriterionComments {
    pub fn new(comments: [String; CRITERIA_COUNT]) -> Self {
        Self(comments)
    }

    pub fn get(&self, criterion: Criterion) -> &str {
        &self.0[criterion.position()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &str)> + '_ {
        Criterion::ordered()
            .into_iter()
            .map(move |criterion| (criterion, self.get(criterion)))
    }

    /// All comments joined with a single space, in rubric order.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

impl Serialize for CriterionComments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CRITERIA_COUNT))?;
        for (criterion, comment) in self.iter() {
            map.serialize_entry(criterion.key(), comment)?;
        }
        map.end()
    }
}

/// Identifier derived from the data row that produced a review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn for_row(index: usize) -> Self {
        Self(format!("review_{index}"))
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An "id fullname" cell split into its parts. `display_name` is the raw
/// trimmed cell and is the entity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub display_name: String,
    pub id: String,
    pub full_name: String,
}

impl Participant {
    pub fn from_cell(cell: &str) -> Self {
        let display_name = cell.trim();
        let (id, full_name) = match display_name.find(char::is_whitespace) {
            Some(split) => (&display_name[..split], display_name[split..].trim_start()),
            None => (display_name, ""),
        };

        Self {
            display_name: display_name.to_string(),
            id: id.to_string(),
            full_name: full_name.to_string(),
        }
    }
}

/// One data row of the export. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub student: Participant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grader: Option<Participant>,
    pub grade_given: Option<f64>,
    pub grade_average: Option<f64>,
    pub submission_comment: String,
    pub comments: CriterionComments,
    pub is_completed: bool,
}

impl Review {
    pub fn new(
        id: ReviewId,
        student: Participant,
        grader: Option<Participant>,
        grade_given: Option<f64>,
        comments: CriterionComments,
    ) -> Self {
        let grade_given = grade_given.filter(|grade| grade.is_finite());
        Self {
            id,
            student,
            grader,
            is_completed: grade_given.is_some(),
            grade_given,
            grade_average: None,
            submission_comment: String::new(),
            comments,
        }
    }

    pub fn with_grade_average(mut self, grade_average: Option<f64>) -> Self {
        self.grade_average = grade_average;
        self
    }

    pub fn with_submission_comment(mut self, comment: impl Into<String>) -> Self {
        self.submission_comment = comment.into();
        self
    }

    pub fn grader_name(&self) -> Option<&str> {
        self.grader
            .as_ref()
            .map(|grader| grader.display_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Alert,
    Warning,
    Info,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    ScoreOverMax,
    ScoreUnderMin,
    HighVariance,
    ExtremeRange,
    LowScore,
    InsufficientGraders,
    NoReviewDone,
    IncompleteComments,
    IncompleteReview,
    UnusualAssignment,
    GaveScoreOverMax,
}

/// Advisory warning attached to a student or grader after scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub message: String,
    pub severity: Severity,
}

impl Flag {
    pub fn new(kind: FlagKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
        }
    }
}

/// Summary of the grades a submission received.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkScore {
    pub average: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub range: f64,
    pub std_dev: f64,
    pub grades: Vec<f64>,
    pub grader_count: usize,
    pub is_reliable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reliability_issues: Vec<String>,
}

/// Submission owner, keyed by display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub student_name: String,
    pub student_id: String,
    pub full_name: String,
    pub graders_assigned: usize,
    pub graders_completed: usize,
    pub grades_received: Vec<f64>,
    pub reviews_received: Vec<ReviewId>,
    pub work_score: WorkScore,
    pub flags: Vec<Flag>,
}

impl Student {
    pub fn new(participant: &Participant) -> Self {
        Self {
            student_name: participant.display_name.clone(),
            student_id: participant.id.clone(),
            full_name: participant.full_name.clone(),
            graders_assigned: 0,
            graders_completed: 0,
            grades_received: Vec::new(),
            reviews_received: Vec::new(),
            work_score: WorkScore::default(),
            flags: Vec::new(),
        }
    }
}

/// One completed review as seen from the grader's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDetail {
    pub review_id: ReviewId,
    pub student_reviewed: String,
    pub student_id: String,
    pub grade_given: f64,
    pub valid_comment_count: usize,
    pub missing_comments: usize,
    pub quality_count: usize,
    pub is_complete: bool,
    pub has_all_quality: bool,
    pub keywords: Vec<String>,
}

/// Scheme A: one point per completed review minus a flat penalty per review
/// lacking full-quality comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PenaltyScore {
    pub full_score: f64,
    pub earned_score: f64,
    pub penalty: f64,
    pub net_score: f64,
    pub penalized_reviews: usize,
}

/// Scheme B: one point per reviewed item plus a single completion bonus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BonusScore {
    pub base_score: u32,
    pub bonus: u32,
    pub net_score: u32,
    pub full_score: u32,
    pub reviewed_count: u32,
    pub complete_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PeerReviewScore {
    Penalty(PenaltyScore),
    Bonus(BonusScore),
}

impl Default for PeerReviewScore {
    fn default() -> Self {
        Self::Bonus(BonusScore::default())
    }
}

impl PeerReviewScore {
    pub fn net_score(&self) -> f64 {
        match self {
            Self::Penalty(score) => score.net_score,
            Self::Bonus(score) => f64::from(score.net_score),
        }
    }

    pub fn full_score(&self) -> f64 {
        match self {
            Self::Penalty(score) => score.full_score,
            Self::Bonus(score) => f64::from(score.full_score),
        }
    }

    /// Penalty deducted under Scheme A; always zero under Scheme B.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::Penalty(score) => score.penalty,
            Self::Bonus(_) => 0.0,
        }
    }
}

/// Reviewer, keyed by display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grader {
    pub grader_name: String,
    pub grader_id: String,
    pub full_name: String,
    pub assigned_reviews: usize,
    pub completed_reviews: usize,
    pub reviews_made: Vec<ReviewId>,
    pub details: Vec<ReviewDetail>,
    pub keywords: Vec<String>,
    pub peer_review_score: PeerReviewScore,
    pub flags: Vec<Flag>,
}

impl Grader {
    pub fn new(participant: &Participant) -> Self {
        Self {
            grader_name: participant.display_name.clone(),
            grader_id: participant.id.clone(),
            full_name: participant.full_name.clone(),
            assigned_reviews: 0,
            completed_reviews: 0,
            reviews_made: Vec::new(),
            details: Vec::new(),
            keywords: Vec::new(),
            peer_review_score: PeerReviewScore::default(),
            flags: Vec::new(),
        }
    }
}

/// Rounds to `places` decimals, half away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
