use super::common::*;
use crate::workflows::canvas::{CanvasImporter, ColumnDetection};
use crate::workflows::peer_review::domain::{PeerReviewScore, ReviewId};
use crate::workflows::peer_review::{
    analyze, recalculate, KeywordVerdict, KeywordVerdicts, PeerReviewAnalysis, QualityPolicy,
    SchemeKind,
};

fn sample_analysis() -> PeerReviewAnalysis {
    let export = CanvasImporter::from_reader(sample_csv().as_bytes(), ColumnDetection::HeaderMatch)
        .expect("sample parses");
    analyze(export.reviews, &analysis_config())
}

#[test]
fn first_rescoring_switches_to_penalty_scheme() {
    let analysis = sample_analysis();
    let (updated, changes) = analysis.recalculate(KeywordVerdicts::default(), &analysis_config());

    assert_eq!(updated.scheme, SchemeKind::Penalty);
    assert!(changes.is_empty(), "scheme switch alone reported {changes:?}");

    match &updated.graders["201 Gus Park"].peer_review_score {
        PeerReviewScore::Penalty(score) => {
            assert_eq!(score.penalty, 0.2);
            assert_eq!(score.net_score, 1.8);
        }
        other => panic!("expected penalty score, got {other:?}"),
    }
    match &updated.graders["203 Ivy Wu"].peer_review_score {
        PeerReviewScore::Penalty(score) => assert_eq!(score.net_score, 1.0),
        other => panic!("expected penalty score, got {other:?}"),
    }
    assert_eq!(updated.students, analysis.students);
}

#[test]
fn bonus_baseline_diff_only_shows_keyword_effects() {
    let analysis = sample_analysis();
    let (_, changes) = analysis.recalculate(
        KeywordVerdicts::new(["good"], Vec::<String>::new()),
        &analysis_config(),
    );

    assert_eq!(changes.len(), 1);
    let gus = &changes[0];
    assert_eq!(gus.grader_name, "201 Gus Park");
    assert_eq!(gus.old_penalty, 0.2);
    assert_eq!(gus.old_net_score, 1.8);
    assert_eq!(gus.new_penalty, 0.0);
    assert_eq!(gus.new_net_score, 2.0);
    assert_eq!(gus.diff, 0.2);
}

#[test]
fn approving_a_filler_word_lifts_the_penalty() {
    let analysis = sample_analysis();
    let (penalized, _) = analysis.recalculate(KeywordVerdicts::default(), &analysis_config());
    let (approved, changes) =
        penalized.recalculate(KeywordVerdicts::new(["Good "], Vec::<String>::new()), &analysis_config());

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].grader_name, "201 Gus Park");
    assert_eq!(changes[0].old_penalty, 0.2);
    assert_eq!(changes[0].new_penalty, 0.0);
    assert_eq!(changes[0].diff, 0.2);
    assert!(approved.graders["201 Gus Park"].details[1].has_all_quality);
    assert_eq!(approved.stats.reviews_with_quality_comments, 4);
    assert_eq!(approved.stats.reviews_with_penalty, 1);

    let index = approved.keyword_index();
    let good = index
        .entries
        .iter()
        .find(|usage| usage.keyword == "good")
        .expect("good is indexed");
    assert_eq!(good.verdict, Some(KeywordVerdict::Approved));
}

#[test]
fn rejecting_a_full_comment_adds_a_penalty() {
    let analysis = sample_analysis();
    let (penalized, _) = analysis.recalculate(KeywordVerdicts::default(), &analysis_config());
    let (_, changes) = penalized.recalculate(
        KeywordVerdicts::new(Vec::<String>::new(), ["link opens"]),
        &analysis_config(),
    );

    let changed: Vec<&str> = changes
        .iter()
        .map(|change| change.grader_name.as_str())
        .collect();
    assert_eq!(changed, vec!["201 Gus Park", "202 Hana Ito", "203 Ivy Wu"]);
    assert!(changes.iter().all(|change| change.diff == -0.2));
}

#[test]
fn rescoring_is_idempotent() {
    let analysis = sample_analysis();
    let verdicts = KeywordVerdicts::new(["good"], ["sound clear"]);

    let (once, _) = analysis.recalculate(verdicts.clone(), &analysis_config());
    let (twice, changes) = once.recalculate(verdicts, &analysis_config());

    assert!(changes.is_empty());
    assert_eq!(once.graders, twice.graders);
    assert_eq!(once.stats, twice.stats);
}

#[test]
fn unresolvable_details_keep_their_stored_verdict() {
    let analysis = sample_analysis();
    let mut graders = analysis.graders.clone();
    let gus = graders.get_mut("201 Gus Park").expect("gus present");
    gus.details[1].review_id = ReviewId("review_missing".to_string());

    let outcome = recalculate(
        &analysis.reviews,
        &graders,
        &KeywordVerdicts::new(["good"], Vec::<String>::new()),
        QualityPolicy::Lenient,
        3,
    );

    let gus = &outcome.graders["201 Gus Park"];
    assert!(!gus.details[1].has_all_quality);
    match &gus.peer_review_score {
        PeerReviewScore::Penalty(score) => assert_eq!(score.penalty, 0.2),
        other => panic!("expected penalty score, got {other:?}"),
    }
}

#[test]
fn inputs_are_never_mutated() {
    let analysis = sample_analysis();
    let snapshot = analysis.clone();
    let _ = analysis.recalculate(KeywordVerdicts::new(["good"], ["link opens"]), &analysis_config());
    assert_eq!(analysis, snapshot);
}
