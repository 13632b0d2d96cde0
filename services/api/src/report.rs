use crate::infra::parse_scheme;
use clap::Args;
use peer_review::config::AppConfig;
use peer_review::error::AppError;
use peer_review::workflows::canvas::{CanvasImporter, ColumnStrategy, RosterImporter};
use peer_review::workflows::peer_review::{
    analyze, assess, flagged_graders, flagged_students, AnalysisConfig, Criterion,
    GraderScoreChange, GroupAssignment, GroupStatistics, KeywordVerdicts, PeerReviewAnalysis,
    QualityPolicy, QualityReason,
};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

const TOP_KEYWORDS: usize = 10;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Canvas peer-review export to score
    pub(crate) csv: PathBuf,
    /// Scoring scheme override (penalty or bonus)
    #[arg(long)]
    pub(crate) scheme: Option<String>,
    /// Print the full analysis as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RecalculateArgs {
    /// Canvas peer-review export to score
    pub(crate) csv: PathBuf,
    /// Keyword to accept as a quality comment (repeatable)
    #[arg(long = "approve")]
    pub(crate) approve: Vec<String>,
    /// Keyword to reject as a quality comment (repeatable)
    #[arg(long = "reject")]
    pub(crate) reject: Vec<String>,
    /// Print the score changes as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct GroupsArgs {
    /// Canvas peer-review export to score
    pub(crate) csv: PathBuf,
    /// Canvas roster export carrying the group-set columns
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Group set column to partition by (defaults to the first one)
    #[arg(long)]
    pub(crate) group_set: Option<String>,
    /// Print group statistics as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

/// Why comments for one rubric criterion fell short, across completed reviews.
pub(crate) struct CriterionGap {
    pub(crate) criterion: Criterion,
    pub(crate) reasons: Vec<(QualityReason, usize)>,
}

pub(crate) struct LoadedAnalysis {
    pub(crate) config: AnalysisConfig,
    pub(crate) column_strategy: ColumnStrategy,
    pub(crate) analysis: PeerReviewAnalysis,
}

pub(crate) fn load_analysis(csv: &Path, scheme: Option<&str>) -> Result<LoadedAnalysis, AppError> {
    let app_config = AppConfig::load()?;
    let mut config = app_config.scoring.analysis_config();
    if let Some(raw) = scheme {
        config.scheme = parse_scheme(raw)?;
    }

    let export = CanvasImporter::from_path(csv, app_config.scoring.column_detection)?;
    let analysis = analyze(export.reviews, &config);

    Ok(LoadedAnalysis {
        config,
        column_strategy: export.column_strategy,
        analysis,
    })
}

pub(crate) fn load_assignment(
    roster: &Path,
    group_set: Option<&str>,
) -> Result<GroupAssignment, AppError> {
    let roster = RosterImporter::from_path(roster)?;
    Ok(roster.assignment(group_set)?)
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs { csv, scheme, json } = args;
    let loaded = load_analysis(&csv, scheme.as_deref())?;

    if json {
        let payload = json!({
            "source": csv.display().to_string(),
            "column_strategy": loaded.column_strategy,
            "analysis": loaded.analysis,
            "class_statistics": loaded.analysis.class_statistics(),
            "inconsistencies": loaded.analysis.inconsistencies(),
        });
        return print_json(&payload);
    }

    render_report(&csv, &loaded);
    Ok(())
}

pub(crate) fn run_recalculate(args: RecalculateArgs) -> Result<(), AppError> {
    let RecalculateArgs {
        csv,
        approve,
        reject,
        json,
    } = args;

    let loaded = load_analysis(&csv, None)?;
    let verdicts = KeywordVerdicts::new(approve, reject);
    let (_, changes) = loaded.analysis.recalculate(verdicts, &loaded.config);

    if json {
        return print_json(&json!({ "changed": changes.len(), "changes": changes }));
    }

    render_changes(&changes);
    Ok(())
}

pub(crate) fn run_groups(args: GroupsArgs) -> Result<(), AppError> {
    let GroupsArgs {
        csv,
        roster,
        group_set,
        json,
    } = args;

    let loaded = load_analysis(&csv, None)?;
    let assignment = load_assignment(&roster, group_set.as_deref())?;
    let groups = loaded.analysis.group_statistics(&assignment);

    if json {
        return print_json(&groups);
    }

    render_groups(&assignment.group_set, &groups);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| AppError::Io(err.into()))?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn render_report(csv: &Path, loaded: &LoadedAnalysis) {
    let analysis = &loaded.analysis;
    let stats = &analysis.stats;

    println!("Peer review report");
    println!("Source: {}", csv.display());
    println!(
        "Scheme: {} | Columns: {}",
        analysis.scheme.label(),
        loaded.column_strategy.label()
    );

    println!("\nReviews");
    println!(
        "- {} total, {} completed, {} not graded",
        stats.total_reviews, stats.completed_reviews, stats.incomplete_reviews
    );
    println!(
        "- {} with full quality comments, {} penalized",
        stats.reviews_with_quality_comments, stats.reviews_with_penalty
    );
    println!(
        "- {} students, {} graders",
        stats.total_students, stats.total_graders
    );

    match analysis.class_statistics() {
        Some(class) => {
            println!("\nClass statistics ({} graded students)", class.total_students);
            println!(
                "Mean {:.2} | Median {:.2} | SD {:.2} | Min {:.2} | Max {:.2}",
                class.mean, class.median, class.std_dev, class.min, class.max
            );
            let distribution = class
                .grade_distribution
                .iter()
                .map(|band| format!("{} {}", band.level.label(), band.count))
                .collect::<Vec<_>>()
                .join(", ");
            println!("Grade distribution: {}", distribution);
        }
        None => println!("\nClass statistics: no graded students"),
    }

    let students = flagged_students(analysis.students.values());
    if students.is_empty() {
        println!("\nFlagged students: none");
    } else {
        println!("\nFlagged students");
        for student in students {
            println!(
                "- {} (avg {:.2} from {} graders)",
                student.student_name, student.work_score.average, student.work_score.grader_count
            );
            for flag in &student.flags {
                println!("  [{}] {}", flag.severity.label(), flag.message);
            }
        }
    }

    let graders = flagged_graders(analysis.graders.values());
    if graders.is_empty() {
        println!("\nFlagged graders: none");
    } else {
        println!("\nFlagged graders");
        for grader in graders {
            println!(
                "- {} ({}/{} completed, score {:.1}/{:.1})",
                grader.grader_name,
                grader.completed_reviews,
                grader.assigned_reviews,
                grader.peer_review_score.net_score(),
                grader.peer_review_score.full_score()
            );
            for flag in &grader.flags {
                println!("  [{}] {}", flag.severity.label(), flag.message);
            }
        }
    }

    let inconsistencies = analysis.inconsistencies();
    if inconsistencies.is_empty() {
        println!("\nGrade/comment inconsistencies: none");
    } else {
        println!("\nGrade/comment inconsistencies");
        for finding in &inconsistencies {
            println!(
                "- {} gave {} to {}: {} ({})",
                finding.grader_name,
                finding.grade_given,
                finding.student_reviewed,
                finding.kind.label(),
                finding.matched_terms.join(", ")
            );
        }
    }

    let gaps = criterion_gaps(analysis, loaded.config.quality_policy);
    if gaps.is_empty() {
        println!("\nComment gaps by criterion: none");
    } else {
        println!("\nComment gaps by criterion");
        for gap in &gaps {
            let reasons = gap
                .reasons
                .iter()
                .map(|(reason, count)| format!("{} {}", count, reason.label()))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "- {} ({}, {} pt): {}",
                gap.criterion.label(),
                gap.criterion.description(),
                gap.criterion.max_points(),
                reasons
            );
        }
    }

    let index = analysis.keyword_index();
    let unverified: Vec<_> = index.unverified().take(TOP_KEYWORDS).collect();
    if !unverified.is_empty() {
        println!("\nMost used unverified keywords");
        for usage in unverified {
            println!(
                "- {} x{} ({} graders)",
                usage.keyword,
                usage.count,
                usage.graders.len()
            );
        }
    }
}

/// Tallies non-quality comments per criterion, in rubric order. Criteria
/// without any gap are left out.
pub(crate) fn criterion_gaps(
    analysis: &PeerReviewAnalysis,
    policy: QualityPolicy,
) -> Vec<CriterionGap> {
    let mut gaps: Vec<CriterionGap> = Criterion::ordered()
        .into_iter()
        .map(|criterion| CriterionGap {
            criterion,
            reasons: Vec::new(),
        })
        .collect();

    for review in analysis.reviews.iter().filter(|review| review.is_completed) {
        let assessment = assess(review, &analysis.keyword_verdicts, policy);
        for (criterion, verdict) in assessment.verdicts {
            let Some(reason) = verdict.reason.filter(|_| !verdict.is_quality) else {
                continue;
            };
            let gap = &mut gaps[criterion.position()];
            match gap.reasons.iter_mut().find(|(seen, _)| *seen == reason) {
                Some((_, count)) => *count += 1,
                None => gap.reasons.push((reason, 1)),
            }
        }
    }

    gaps.retain(|gap| !gap.reasons.is_empty());
    gaps
}

fn render_changes(changes: &[GraderScoreChange]) {
    if changes.is_empty() {
        println!("No grader scores changed");
        return;
    }

    println!("{} grader scores changed", changes.len());
    for change in changes {
        println!(
            "- {}: {:.1} -> {:.1} ({:+.1}), penalty {:.1} -> {:.1}",
            change.grader_name,
            change.old_net_score,
            change.new_net_score,
            change.diff,
            change.old_penalty,
            change.new_penalty
        );
    }
}

fn render_groups(group_set: &str, groups: &[GroupStatistics]) {
    println!("Group statistics for {}", group_set);
    if groups.is_empty() {
        println!("No groups matched the analysis");
        return;
    }

    for group in groups {
        println!(
            "- {}: {} students, {} graders, avg work {:.2}, avg peer review {:.2}, {} flagged",
            group.group,
            group.count,
            group.grader_count,
            group.avg_work_score,
            group.avg_pr_score,
            group.flagged_count
        );
    }
}
