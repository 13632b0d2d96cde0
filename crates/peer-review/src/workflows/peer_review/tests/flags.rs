use super::common::*;
use crate::workflows::canvas::{CanvasImporter, ColumnDetection};
use crate::workflows::peer_review::domain::{FlagKind, Severity};
use crate::workflows::peer_review::{analyze, flagged_graders, flagged_students, grader_flags};

fn kinds(flags: &[crate::workflows::peer_review::Flag]) -> Vec<FlagKind> {
    flags.iter().map(|flag| flag.kind).collect()
}

#[test]
fn disagreement_raises_variance_and_range_warnings() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(2.0), quality_comments()),
        review(1, "1 Ann", "8 Hana", Some(10.0), quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let ann = &analysis.students["1 Ann"];

    assert_eq!(ann.work_score.std_dev, 4.0);
    assert_eq!(
        kinds(&ann.flags),
        vec![FlagKind::HighVariance, FlagKind::ExtremeRange]
    );
    assert!(ann
        .flags
        .iter()
        .all(|flag| flag.severity == Severity::Warning));
}

#[test]
fn negative_grades_are_alerts() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(-1.0), quality_comments()),
        review(1, "1 Ann", "8 Hana", Some(1.0), quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let ann = &analysis.students["1 Ann"];

    assert_eq!(
        kinds(&ann.flags),
        vec![FlagKind::ScoreUnderMin, FlagKind::LowScore]
    );
    assert!(!ann.work_score.is_reliable);
}

#[test]
fn low_score_uses_the_unrounded_mean() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(5.99), quality_comments()),
        review(1, "1 Ann", "8 Hana", Some(6.0), quality_comments()),
        review(2, "1 Ann", "9 Ivy", Some(6.0), quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let ann = &analysis.students["1 Ann"];

    assert_eq!(ann.work_score.average, 6.0);
    assert_eq!(kinds(&ann.flags), vec![FlagKind::LowScore]);
}

#[test]
fn sample_class_flags_match_expectations() {
    let export = CanvasImporter::from_reader(sample_csv().as_bytes(), ColumnDetection::HeaderMatch)
        .expect("sample parses");
    let analysis = analyze(export.reviews, &analysis_config());

    assert!(analysis.students["101 Ann Lee"].flags.is_empty());
    assert!(analysis.students["103 Cat Diaz"].flags.is_empty());
    assert_eq!(
        kinds(&analysis.students["102 Ben Ray"].flags),
        vec![FlagKind::LowScore, FlagKind::InsufficientGraders]
    );

    assert_eq!(
        kinds(&analysis.graders["201 Gus Park"].flags),
        vec![FlagKind::UnusualAssignment]
    );
    assert_eq!(
        kinds(&analysis.graders["202 Hana Ito"].flags),
        vec![FlagKind::IncompleteComments, FlagKind::UnusualAssignment]
    );
    assert_eq!(
        kinds(&analysis.graders["203 Ivy Wu"].flags),
        vec![FlagKind::IncompleteReview, FlagKind::UnusualAssignment]
    );
}

#[test]
fn flagged_listings_sort_by_most_severe_flag() {
    let export = CanvasImporter::from_reader(sample_csv().as_bytes(), ColumnDetection::HeaderMatch)
        .expect("sample parses");
    let analysis = analyze(export.reviews, &analysis_config());

    let students: Vec<&str> = flagged_students(analysis.students.values())
        .into_iter()
        .map(|student| student.student_name.as_str())
        .collect();
    assert_eq!(students, vec!["102 Ben Ray"]);

    let graders: Vec<&str> = flagged_graders(analysis.graders.values())
        .into_iter()
        .map(|grader| grader.grader_name.as_str())
        .collect();
    assert_eq!(graders, vec!["202 Hana Ito", "203 Ivy Wu", "201 Gus Park"]);
}

#[test]
fn expected_load_controls_unusual_assignment() {
    let export = CanvasImporter::from_reader(sample_csv().as_bytes(), ColumnDetection::HeaderMatch)
        .expect("sample parses");
    let analysis = analyze(export.reviews, &analysis_config());
    let gus = &analysis.graders["201 Gus Park"];

    assert!(grader_flags(gus, 2).is_empty());
    assert_eq!(kinds(&grader_flags(gus, 4)), vec![FlagKind::UnusualAssignment]);
}
