use super::domain::{Flag, FlagKind, Grader, PeerReviewScore, Severity, Student, RUBRIC_MAX};
use super::scoring::{RELIABLE_MIN_GRADERS, RELIABLE_STD_DEV};

/// Grade span that counts as an extreme disagreement between graders.
pub const EXTREME_RANGE: f64 = 6.0;
/// Averages below this are reported as low scores.
pub const LOW_SCORE_THRESHOLD: f64 = 6.0;

/// Advisory flags for a scored student. Value checks only run when at least
/// one grade exists; the grader-count check always runs.
pub fn student_flags(student: &Student) -> Vec<Flag> {
    let score = &student.work_score;
    let mut flags = Vec::new();

    if let (Some(min), Some(max)) = (score.min, score.max) {
        let over_max: Vec<String> = score
            .grades
            .iter()
            .filter(|grade| **grade > RUBRIC_MAX)
            .map(|grade| grade.to_string())
            .collect();
        if !over_max.is_empty() {
            flags.push(Flag::new(
                FlagKind::ScoreOverMax,
                Severity::Alert,
                format!("grades above {RUBRIC_MAX}: {}", over_max.join(", ")),
            ));
        }

        let under_min: Vec<String> = score
            .grades
            .iter()
            .filter(|grade| **grade < 0.0)
            .map(|grade| grade.to_string())
            .collect();
        if !under_min.is_empty() {
            flags.push(Flag::new(
                FlagKind::ScoreUnderMin,
                Severity::Alert,
                format!("grades below 0: {}", under_min.join(", ")),
            ));
        }

        if score.std_dev >= RELIABLE_STD_DEV {
            flags.push(Flag::new(
                FlagKind::HighVariance,
                Severity::Warning,
                format!("high variance between graders (SD={:.2})", score.std_dev),
            ));
        }

        if max - min >= EXTREME_RANGE {
            flags.push(Flag::new(
                FlagKind::ExtremeRange,
                Severity::Warning,
                format!("extreme grade range: {min}-{max}"),
            ));
        }

        // Compared unrounded; the stored average is rounded to 2 decimals.
        let mean = score.grades.iter().sum::<f64>() / score.grades.len() as f64;
        if mean < LOW_SCORE_THRESHOLD {
            flags.push(Flag::new(
                FlagKind::LowScore,
                Severity::Alert,
                format!("low average score: {:.2}/{RUBRIC_MAX}", score.average),
            ));
        }
    }

    if score.grader_count < RELIABLE_MIN_GRADERS {
        flags.push(Flag::new(
            FlagKind::InsufficientGraders,
            Severity::Info,
            format!("insufficient graders: only {} graded", score.grader_count),
        ));
    }

    flags
}

/// Advisory flags for a scored grader. `expected_load` is the number of
/// assignments each grader normally receives.
pub fn grader_flags(grader: &Grader, expected_load: u32) -> Vec<Flag> {
    let mut flags = Vec::new();
    let assigned = grader.assigned_reviews;
    let reviewed = grader.details.len();
    let reviewed_all = assigned > 0 && reviewed == assigned;

    if assigned > 0 && grader.completed_reviews == 0 {
        flags.push(Flag::new(
            FlagKind::NoReviewDone,
            Severity::Alert,
            format!("assigned {assigned} reviews but completed none"),
        ));
    }

    if let PeerReviewScore::Bonus(score) = &grader.peer_review_score {
        if reviewed_all && score.complete_count < score.reviewed_count {
            flags.push(Flag::new(
                FlagKind::IncompleteComments,
                Severity::Warning,
                format!(
                    "reviewed everything but comments are incomplete ({}/{} reviews complete), bonus forfeited",
                    score.complete_count, score.reviewed_count
                ),
            ));
        }
    }

    if assigned > 0 && !reviewed_all {
        flags.push(Flag::new(
            FlagKind::IncompleteReview,
            Severity::Warning,
            format!("reviewed {reviewed}/{assigned} assignments"),
        ));
    }

    if assigned > 0 && assigned != expected_load as usize {
        flags.push(Flag::new(
            FlagKind::UnusualAssignment,
            Severity::Info,
            format!("assigned {assigned} reviews (expected {expected_load})"),
        ));
    }

    let over_max: Vec<String> = grader
        .details
        .iter()
        .filter(|detail| detail.grade_given > RUBRIC_MAX)
        .map(|detail| format!("{}: {}", detail.student_reviewed, detail.grade_given))
        .collect();
    if !over_max.is_empty() {
        flags.push(Flag::new(
            FlagKind::GaveScoreOverMax,
            Severity::Alert,
            format!("gave grades above {RUBRIC_MAX}: {}", over_max.join(", ")),
        ));
    }

    flags
}

fn most_severe(flags: &[Flag]) -> Option<Severity> {
    flags.iter().map(|flag| flag.severity).min()
}

/// Students carrying at least one flag, most severe first.
pub fn flagged_students<'a, I>(students: I) -> Vec<&'a Student>
where
    I: IntoIterator<Item = &'a Student>,
{
    let mut flagged: Vec<&Student> = students
        .into_iter()
        .filter(|student| !student.flags.is_empty())
        .collect();
    flagged.sort_by_key(|student| most_severe(&student.flags));
    flagged
}

/// Graders carrying at least one flag, most severe first.
pub fn flagged_graders<'a, I>(graders: I) -> Vec<&'a Grader>
where
    I: IntoIterator<Item = &'a Grader>,
{
    let mut flagged: Vec<&Grader> = graders
        .into_iter()
        .filter(|grader| !grader.flags.is_empty())
        .collect();
    flagged.sort_by_key(|grader| most_severe(&grader.flags));
    flagged
}
