use crate::workflows::peer_review::domain::{round_to, Student, WorkScore, RUBRIC_MAX};

pub const RELIABLE_MIN_GRADERS: usize = 2;
pub const RELIABLE_STD_DEV: f64 = 3.0;

/// Mean, spread and reliability of the grades a student received. Out of
/// range grades are kept in every statistic; the flag pass reports them.
pub fn score_work(student: &Student) -> WorkScore {
    let grades: Vec<f64> = student
        .grades_received
        .iter()
        .copied()
        .filter(|grade| grade.is_finite())
        .collect();

    if grades.is_empty() {
        return WorkScore::default();
    }

    let count = grades.len() as f64;
    let mean = grades.iter().sum::<f64>() / count;
    let min = grades.iter().copied().fold(f64::INFINITY, f64::min);
    let max = grades.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = grades.iter().map(|grade| (grade - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();

    let enough_graders = grades.len() >= RELIABLE_MIN_GRADERS;
    let stable = std_dev < RELIABLE_STD_DEV;
    let in_range = min >= 0.0 && max <= RUBRIC_MAX;
    let is_reliable = enough_graders && stable && in_range;

    let mut reliability_issues = Vec::new();
    if !is_reliable {
        if !enough_graders {
            reliability_issues.push(format!("grader < {RELIABLE_MIN_GRADERS}"));
        }
        if !stable {
            reliability_issues.push(format!("high SD ({std_dev:.2})"));
        }
        if min < 0.0 {
            reliability_issues.push(format!("grade below 0 ({min})"));
        }
        if max > RUBRIC_MAX {
            reliability_issues.push(format!("grade above {RUBRIC_MAX} ({max})"));
        }
    }

    WorkScore {
        average: round_to(mean, 2),
        min: Some(min),
        max: Some(max),
        range: max - min,
        std_dev: round_to(std_dev, 2),
        grader_count: grades.len(),
        grades,
        is_reliable,
        reliability_issues,
    }
}
