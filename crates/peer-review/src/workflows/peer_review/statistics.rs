use super::domain::{round_to, Grader, Review, Student, RUBRIC_MAX};
use super::quality::{assess, KeywordVerdicts, QualityPolicy};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Row-level counters reported with every analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewStats {
    pub total_reviews: usize,
    pub total_students: usize,
    pub total_graders: usize,
    pub completed_reviews: usize,
    pub incomplete_reviews: usize,
    pub reviews_with_quality_comments: usize,
    pub reviews_with_penalty: usize,
}

impl ReviewStats {
    pub fn collect(
        reviews: &[Review],
        students: &BTreeMap<String, Student>,
        graders: &BTreeMap<String, Grader>,
        verdicts: &KeywordVerdicts,
        policy: QualityPolicy,
    ) -> Self {
        let mut stats = Self {
            total_reviews: reviews.len(),
            total_students: students.len(),
            total_graders: graders.len(),
            ..Self::default()
        };

        for review in reviews {
            let all_quality = assess(review, verdicts, policy).has_all_quality();
            if review.is_completed {
                stats.completed_reviews += 1;
                if !all_quality {
                    stats.reviews_with_penalty += 1;
                }
            } else {
                stats.incomplete_reviews += 1;
            }
            if all_quality {
                stats.reviews_with_quality_comments += 1;
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GradeLevel {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl GradeLevel {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::A,
            Self::BPlus,
            Self::B,
            Self::CPlus,
            Self::C,
            Self::DPlus,
            Self::D,
            Self::F,
        ]
    }

    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => Self::A,
            p if p >= 80.0 => Self::BPlus,
            p if p >= 70.0 => Self::B,
            p if p >= 60.0 => Self::CPlus,
            p if p >= 50.0 => Self::C,
            p if p >= 40.0 => Self::DPlus,
            p if p >= 30.0 => Self::D,
            _ => Self::F,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeBand {
    pub level: GradeLevel,
    pub count: usize,
}

/// Population summary of student work-score averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStatistics {
    pub total_students: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub grade_distribution: Vec<GradeBand>,
}

impl ClassStatistics {
    /// Students without any completed review are left out. `None` when
    /// nobody has been graded yet.
    pub fn compute<'a, I>(students: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Student>,
    {
        let averages: Vec<f64> = students
            .into_iter()
            .filter(|student| student.work_score.grader_count > 0)
            .map(|student| student.work_score.average)
            .collect();
        if averages.is_empty() {
            return None;
        }

        let mut sorted = averages.clone();
        sorted.sort_by(f64::total_cmp);

        let count = averages.len() as f64;
        let mean = averages.iter().sum::<f64>() / count;
        let variance = averages.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;

        let mut counts: HashMap<GradeLevel, usize> = HashMap::new();
        for average in &averages {
            let level = GradeLevel::from_percentage(average / RUBRIC_MAX * 100.0);
            *counts.entry(level).or_default() += 1;
        }
        let grade_distribution = GradeLevel::ordered()
            .into_iter()
            .map(|level| GradeBand {
                level,
                count: counts.get(&level).copied().unwrap_or(0),
            })
            .collect();

        Some(Self {
            total_students: averages.len(),
            mean: round_to(mean, 2),
            median: nearest_rank(&sorted, 50.0),
            std_dev: round_to(variance.sqrt(), 2),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            grade_distribution,
        })
    }
}

fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let rank = (percentile / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Mapping from student id to group name for one group set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupAssignment {
    pub group_set: String,
    groups: BTreeMap<String, String>,
}

impl GroupAssignment {
    pub fn new(group_set: impl Into<String>) -> Self {
        Self {
            group_set: group_set.into(),
            groups: BTreeMap::new(),
        }
    }

    /// Blank group names are ignored.
    pub fn assign(&mut self, student_id: impl Into<String>, group: impl Into<String>) {
        let group = group.into();
        let group = group.trim();
        if !group.is_empty() {
            self.groups.insert(student_id.into(), group.to_string());
        }
    }

    pub fn group_of(&self, student_id: &str) -> Option<&str> {
        self.groups.get(student_id).map(String::as_str)
    }

    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.values().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub group: String,
    pub count: usize,
    pub grader_count: usize,
    pub avg_work_score: f64,
    pub avg_pr_score: f64,
    pub flagged_count: usize,
}

#[derive(Default)]
struct GroupAccumulator {
    count: usize,
    grader_count: usize,
    work_scores: Vec<f64>,
    pr_scores: Vec<f64>,
    flagged_count: usize,
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        round_to(values.iter().sum::<f64>() / values.len() as f64, 2)
    }
}

/// Per-group reduction over students (by student id) and graders (by grader
/// id). Entities outside the assignment are not counted anywhere.
pub fn group_statistics(
    students: &BTreeMap<String, Student>,
    graders: &BTreeMap<String, Grader>,
    assignment: &GroupAssignment,
) -> Vec<GroupStatistics> {
    let mut groups: BTreeMap<&str, GroupAccumulator> = assignment
        .group_names()
        .into_iter()
        .map(|name| (name, GroupAccumulator::default()))
        .collect();

    for student in students.values() {
        let Some(group) = assignment
            .group_of(&student.student_id)
            .and_then(|name| groups.get_mut(name))
        else {
            continue;
        };
        group.count += 1;
        if student.work_score.grader_count > 0 {
            group.work_scores.push(student.work_score.average);
        }
        if !student.flags.is_empty() {
            group.flagged_count += 1;
        }
    }

    for grader in graders.values() {
        let Some(group) = assignment
            .group_of(&grader.grader_id)
            .and_then(|name| groups.get_mut(name))
        else {
            continue;
        };
        group.grader_count += 1;
        group.pr_scores.push(grader.peer_review_score.net_score());
        if !grader.flags.is_empty() {
            group.flagged_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(name, group)| GroupStatistics {
            group: name.to_string(),
            count: group.count,
            grader_count: group.grader_count,
            avg_work_score: mean_or_zero(&group.work_scores),
            avg_pr_score: mean_or_zero(&group.pr_scores),
            flagged_count: group.flagged_count,
        })
        .collect()
}
