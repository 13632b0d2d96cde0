//! Comment quality classification and keyword extraction.

mod keywords;
mod patterns;

pub use keywords::{extract_keywords, KeywordIndex, KeywordUsage, KeywordVerdict};

use super::domain::{Criterion, Review, CRITERIA_COUNT};
use serde::{Deserialize, Serialize};

/// Minimum comment length, in characters, under the length-sensitive policy.
pub const MIN_QUALITY_LENGTH: usize = 5;

/// Whether the 5-character floor gates quality in addition to the
/// low-content pattern list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPolicy {
    #[default]
    Lenient,
    LengthSensitive,
}

impl QualityPolicy {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "lenient" => Some(Self::Lenient),
            "length_sensitive" | "strict" => Some(Self::LengthSensitive),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::LengthSensitive => "length_sensitive",
        }
    }
}

/// Admin-curated keyword overrides. Entries are stored trimmed and lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordVerdicts {
    #[serde(default)]
    approved: Vec<String>,
    #[serde(default)]
    rejected: Vec<String>,
}

impl KeywordVerdicts {
    pub fn new<A, R>(approved: A, rejected: R) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        Self {
            approved: normalize_keywords(approved),
            rejected: normalize_keywords(rejected),
        }
    }

    pub fn approved(&self) -> &[String] {
        &self.approved
    }

    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty() && self.rejected.is_empty()
    }

    /// Case-insensitive substring match against the approved list.
    fn approves(&self, lowered: &str) -> bool {
        self.approved
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()))
    }

    /// Case-insensitive exact match against the rejected list.
    fn rejects(&self, lowered: &str) -> bool {
        self.rejected.iter().any(|keyword| keyword == lowered)
    }

    pub fn verdict_for(&self, keyword: &str) -> Option<KeywordVerdict> {
        let lowered = keyword.trim().to_lowercase();
        if self.approved.contains(&lowered) {
            Some(KeywordVerdict::Approved)
        } else if self.rejected.contains(&lowered) {
            Some(KeywordVerdict::Rejected)
        } else {
            None
        }
    }
}

fn normalize_keywords<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim().to_lowercase();
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityReason {
    Empty,
    DashOnly,
    ApprovedKeyword,
    RejectedKeyword,
    LowContent,
    TooShort,
}

impl QualityReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "no comment",
            Self::DashOnly => "dash only, counted as no comment",
            Self::ApprovedKeyword => "matches an approved keyword",
            Self::RejectedKeyword => "matches a rejected keyword",
            Self::LowContent => "low-content filler",
            Self::TooShort => "shorter than the minimum length",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentVerdict {
    pub has_comment: bool,
    pub is_quality: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<QualityReason>,
}

impl CommentVerdict {
    const fn missing(reason: QualityReason) -> Self {
        Self {
            has_comment: false,
            is_quality: false,
            reason: Some(reason),
        }
    }

    const fn present(is_quality: bool, reason: Option<QualityReason>) -> Self {
        Self {
            has_comment: true,
            is_quality,
            reason,
        }
    }
}

/// Decides whether a single criterion comment counts as present and as a
/// quality comment. Keyword overrides win over the built-in heuristics.
pub fn classify(comment: &str, verdicts: &KeywordVerdicts, policy: QualityPolicy) -> CommentVerdict {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return CommentVerdict::missing(QualityReason::Empty);
    }
    if patterns::is_dash_run(trimmed) {
        return CommentVerdict::missing(QualityReason::DashOnly);
    }

    let lowered = trimmed.to_lowercase();
    if verdicts.approves(&lowered) {
        return CommentVerdict::present(true, Some(QualityReason::ApprovedKeyword));
    }
    if verdicts.rejects(&lowered) {
        return CommentVerdict::present(false, Some(QualityReason::RejectedKeyword));
    }
    if patterns::is_low_content(trimmed) {
        return CommentVerdict::present(false, Some(QualityReason::LowContent));
    }
    if policy == QualityPolicy::LengthSensitive && trimmed.chars().count() < MIN_QUALITY_LENGTH {
        return CommentVerdict::present(false, Some(QualityReason::TooShort));
    }

    CommentVerdict::present(true, None)
}

/// Per-review roll-up of the nine criterion verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAssessment {
    pub verdicts: Vec<(Criterion, CommentVerdict)>,
    pub has_comment_count: usize,
    pub quality_count: usize,
    pub keywords: Vec<String>,
}

impl ReviewAssessment {
    pub fn missing_comments(&self) -> usize {
        CRITERIA_COUNT - self.has_comment_count
    }

    pub fn has_all_quality(&self) -> bool {
        self.quality_count == CRITERIA_COUNT
    }
}

pub fn assess(review: &Review, verdicts: &KeywordVerdicts, policy: QualityPolicy) -> ReviewAssessment {
    let mut assessment = ReviewAssessment {
        verdicts: Vec::with_capacity(CRITERIA_COUNT),
        has_comment_count: 0,
        quality_count: 0,
        keywords: Vec::new(),
    };

    for (criterion, comment) in review.comments.iter() {
        let verdict = classify(comment, verdicts, policy);
        if verdict.has_comment {
            assessment.has_comment_count += 1;
        }
        if verdict.is_quality {
            assessment.quality_count += 1;
        }
        for keyword in extract_keywords(comment) {
            if !assessment.keywords.contains(&keyword) {
                assessment.keywords.push(keyword);
            }
        }
        assessment.verdicts.push((criterion, verdict));
    }

    assessment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(comment: &str) -> CommentVerdict {
        classify(comment, &KeywordVerdicts::default(), QualityPolicy::Lenient)
    }

    #[test]
    fn blank_and_dash_comments_are_missing() {
        for blank in ["", "   ", "-", "---", " -- "] {
            let verdict = lenient(blank);
            assert!(!verdict.has_comment, "{blank:?} should be missing");
            assert!(!verdict.is_quality);
        }
        assert_eq!(lenient("--").reason, Some(QualityReason::DashOnly));
    }

    #[test]
    fn filler_comments_count_as_present_but_not_quality() {
        let verdict = lenient("OK");
        assert!(verdict.has_comment);
        assert!(!verdict.is_quality);
        assert_eq!(verdict.reason, Some(QualityReason::LowContent));
    }

    #[test]
    fn length_floor_only_applies_when_policy_asks() {
        assert!(lenient("fine").is_quality);
        let strict = classify(
            "fine",
            &KeywordVerdicts::default(),
            QualityPolicy::LengthSensitive,
        );
        assert!(strict.has_comment);
        assert!(!strict.is_quality);
        assert_eq!(strict.reason, Some(QualityReason::TooShort));
    }

    #[test]
    fn approved_keywords_override_heuristics() {
        let verdicts = KeywordVerdicts::new(["OK"], Vec::<String>::new());
        let verdict = classify("ok", &verdicts, QualityPolicy::LengthSensitive);
        assert!(verdict.is_quality);
        assert_eq!(verdict.reason, Some(QualityReason::ApprovedKeyword));
    }

    #[test]
    fn rejected_keywords_require_exact_match() {
        let verdicts = KeywordVerdicts::new(Vec::<String>::new(), ["Looks fine"]);
        assert!(!classify("looks FINE", &verdicts, QualityPolicy::Lenient).is_quality);
        assert!(classify("looks fine overall", &verdicts, QualityPolicy::Lenient).is_quality);
    }

    #[test]
    fn keyword_lists_are_normalized_and_deduplicated() {
        let verdicts = KeywordVerdicts::new([" Clear ", "clear", ""], ["Meh"]);
        assert_eq!(verdicts.approved(), ["clear".to_string()]);
        assert_eq!(verdicts.verdict_for("MEH"), Some(KeywordVerdict::Rejected));
        assert_eq!(verdicts.verdict_for("other"), None);
    }

    #[test]
    fn policy_labels_round_trip() {
        for policy in [QualityPolicy::Lenient, QualityPolicy::LengthSensitive] {
            assert_eq!(QualityPolicy::from_label(policy.label()), Some(policy));
        }
        assert_eq!(
            QualityPolicy::from_label("Length-Sensitive"),
            Some(QualityPolicy::LengthSensitive)
        );
        assert_eq!(QualityPolicy::from_label("weighted"), None);
    }
}
