use super::common::*;
use crate::workflows::peer_review::domain::{
    FlagKind, Grader, Participant, PeerReviewScore, Severity, WorkScore,
};
use crate::workflows::peer_review::scoring::{score_work, BonusScheme, PenaltyScheme, ScoringScheme};
use crate::workflows::peer_review::{analyze, AnalysisConfig, SchemeKind};

#[test]
fn out_of_range_grade_is_kept_and_flagged() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(8.0), quality_comments()),
        review(1, "1 Ann", "8 Hana", Some(9.0), quality_comments()),
        review(2, "1 Ann", "9 Ivy", Some(40.0), quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let ann = &analysis.students["1 Ann"];

    assert_eq!(ann.work_score.grades, vec![8.0, 9.0, 40.0]);
    assert_eq!(ann.work_score.average, 19.0);
    assert!(!ann.work_score.is_reliable);
    assert!(ann
        .work_score
        .reliability_issues
        .iter()
        .any(|issue| issue.contains("above 12")));

    let over_max = ann
        .flags
        .iter()
        .find(|flag| flag.kind == FlagKind::ScoreOverMax)
        .expect("score_over_max flag present");
    assert_eq!(over_max.severity, Severity::Alert);
    assert!(over_max.message.contains("40"));

    let ivy = &analysis.graders["9 Ivy"];
    assert!(ivy
        .flags
        .iter()
        .any(|flag| flag.kind == FlagKind::GaveScoreOverMax));
}

#[test]
fn work_score_uses_population_deviation() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(6.0), quality_comments()),
        review(1, "1 Ann", "8 Hana", Some(10.0), quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let score = &analysis.students["1 Ann"].work_score;

    assert_eq!(score.average, 8.0);
    assert_eq!(score.std_dev, 2.0);
    assert_eq!(score.range, 4.0);
    assert_eq!((score.min, score.max), (Some(6.0), Some(10.0)));
    assert!(score.is_reliable);
    assert!(score.reliability_issues.is_empty());
}

#[test]
fn ungraded_student_has_empty_work_score() {
    let reviews = vec![review(0, "1 Ann", "7 Gus", None, quality_comments())];
    let analysis = analyze(reviews, &analysis_config());
    let ann = &analysis.students["1 Ann"];

    assert_eq!(ann.graders_assigned, 1);
    assert_eq!(ann.graders_completed, 0);
    assert_eq!(ann.work_score.grader_count, 0);
    assert_eq!(ann.work_score.min, None);
    assert_eq!(ann.work_score, WorkScore::default());
    assert!(ann.work_score.reliability_issues.is_empty());
    assert_eq!(score_work(ann).average, 0.0);

    let kinds: Vec<FlagKind> = ann.flags.iter().map(|flag| flag.kind).collect();
    assert_eq!(kinds, vec![FlagKind::InsufficientGraders]);
}

#[test]
fn bonus_forfeited_when_one_review_is_incomplete() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(10.0), quality_comments()),
        review(1, "2 Ben", "7 Gus", Some(9.0), quality_comments()),
        review(2, "3 Cat", "7 Gus", Some(8.0), partial_comments(5, "")),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let gus = &analysis.graders["7 Gus"];

    assert_eq!(gus.details[2].missing_comments, 4);
    assert!(!gus.details[2].is_complete);
    match &gus.peer_review_score {
        PeerReviewScore::Bonus(score) => {
            assert_eq!(score.complete_count, 2);
            assert_eq!(score.reviewed_count, 3);
            assert_eq!(score.bonus, 0);
            assert_eq!(score.net_score, 3);
            assert_eq!(score.full_score, 4);
        }
        other => panic!("expected bonus score, got {other:?}"),
    }
    assert!(gus
        .flags
        .iter()
        .any(|flag| flag.kind == FlagKind::IncompleteComments));
}

#[test]
fn bonus_awarded_when_everything_is_complete() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(10.0), quality_comments()),
        review(1, "2 Ben", "7 Gus", Some(9.0), partial_comments(6, "-")),
        review(2, "3 Cat", "7 Gus", Some(0.0), uniform_comments("ok")),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let gus = &analysis.graders["7 Gus"];

    assert_eq!(gus.details[1].missing_comments, 3);
    assert!(gus.details[1].is_complete);
    assert_eq!(gus.peer_review_score.net_score(), 4.0);
    assert_eq!(gus.peer_review_score.full_score(), 4.0);
    assert!(gus.flags.is_empty(), "unexpected flags: {:?}", gus.flags);
}

#[test]
fn bonus_full_score_is_zero_without_assignments() {
    let grader = Grader::new(&Participant::from_cell("7 Gus"));
    match BonusScheme.score(&grader, &[]) {
        PeerReviewScore::Bonus(score) => {
            assert_eq!(score.full_score, 0);
            assert_eq!(score.net_score, 0);
        }
        other => panic!("expected bonus score, got {other:?}"),
    }
}

#[test]
fn penalty_scheme_deducts_per_review_without_full_quality() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", Some(10.0), quality_comments()),
        review(1, "2 Ben", "7 Gus", Some(9.0), quality_comments()),
        review(2, "3 Cat", "7 Gus", Some(8.0), quality_comments()),
        review(3, "4 Dan", "7 Gus", Some(8.0), partial_comments(8, "good")),
        review(4, "5 Eve", "7 Gus", Some(8.0), partial_comments(8, "")),
        review(5, "6 Fay", "7 Gus", None, quality_comments()),
    ];
    let config = AnalysisConfig {
        scheme: SchemeKind::Penalty,
        ..analysis_config()
    };
    let analysis = analyze(reviews, &config);
    let gus = &analysis.graders["7 Gus"];

    match &gus.peer_review_score {
        PeerReviewScore::Penalty(score) => {
            assert_eq!(score.earned_score, 5.0);
            assert_eq!(score.penalized_reviews, 2);
            assert_eq!(score.penalty, 0.4);
            assert_eq!(score.net_score, 4.6);
            assert_eq!(score.full_score, 6.0);
        }
        other => panic!("expected penalty score, got {other:?}"),
    }
    assert_eq!(analysis.scheme, SchemeKind::Penalty);
    assert_eq!(PenaltyScheme.kind(), SchemeKind::Penalty);
}

#[test]
fn grader_without_any_completed_review_is_alerted() {
    let reviews = vec![
        review(0, "1 Ann", "7 Gus", None, quality_comments()),
        review(1, "2 Ben", "7 Gus", None, quality_comments()),
        review(2, "3 Cat", "7 Gus", None, quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());
    let gus = &analysis.graders["7 Gus"];

    let kinds: Vec<FlagKind> = gus.flags.iter().map(|flag| flag.kind).collect();
    assert_eq!(kinds, vec![FlagKind::NoReviewDone, FlagKind::IncompleteReview]);
    assert_eq!(gus.peer_review_score.net_score(), 0.0);
    assert_eq!(gus.peer_review_score.full_score(), 4.0);
}

#[test]
fn reviews_without_grader_count_only_for_the_student() {
    let reviews = vec![
        review(0, "1 Ann", "", Some(7.0), quality_comments()),
        review(1, "1 Ann", "7 Gus", Some(9.0), quality_comments()),
    ];
    let analysis = analyze(reviews, &analysis_config());

    assert_eq!(analysis.graders.len(), 1);
    assert_eq!(analysis.students["1 Ann"].graders_completed, 2);
    assert_eq!(analysis.stats.total_graders, 1);
}
