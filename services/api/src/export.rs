use crate::report::{load_analysis, load_assignment};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use peer_review::error::AppError;
use peer_review::workflows::peer_review::{GroupAssignment, PeerReviewAnalysis};
use std::path::PathBuf;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportKind {
    Students,
    Graders,
}

impl ExportKind {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Graders => "graders",
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Canvas peer-review export to score
    pub(crate) csv: PathBuf,
    /// Which score sheet to write
    #[arg(long, value_enum, default_value_t = ExportKind::Students)]
    pub(crate) kind: ExportKind,
    /// Output file or directory (defaults to a dated file in the working directory)
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Scoring scheme override (penalty or bonus)
    #[arg(long)]
    pub(crate) scheme: Option<String>,
    /// Canvas roster export used to add a Group column
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Group set column to read from the roster (defaults to the first one)
    #[arg(long)]
    pub(crate) group_set: Option<String>,
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        csv,
        kind,
        out,
        scheme,
        roster,
        group_set,
    } = args;

    let loaded = load_analysis(&csv, scheme.as_deref())?;
    let assignment = match roster {
        Some(path) => Some(load_assignment(&path, group_set.as_deref())?),
        None => None,
    };

    let bytes = render_csv(kind, &loaded.analysis, assignment.as_ref())?;
    let file_name = export_file_name(kind, Local::now().date_naive());
    let path = match out {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path,
        None => PathBuf::from(file_name),
    };

    std::fs::write(&path, bytes)?;
    let rows = match kind {
        ExportKind::Students => loaded.analysis.students.len(),
        ExportKind::Graders => loaded.analysis.graders.len(),
    };
    println!("Wrote {} {} to {}", rows, kind.label(), path.display());
    Ok(())
}

pub(crate) fn export_file_name(kind: ExportKind, date: NaiveDate) -> String {
    format!("peer-review-{}-{}.csv", kind.label(), date.format("%Y-%m-%d"))
}

/// Renders one score sheet as BOM-prefixed UTF-8.
pub(crate) fn render_csv(
    kind: ExportKind,
    analysis: &PeerReviewAnalysis,
    assignment: Option<&GroupAssignment>,
) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());

    match kind {
        ExportKind::Students => write_students(&mut writer, analysis, assignment)?,
        ExportKind::Graders => write_graders(&mut writer, analysis, assignment)?,
    }

    writer
        .into_inner()
        .map_err(|err| AppError::Io(err.into_error()))
}

fn write_students(
    writer: &mut csv::Writer<Vec<u8>>,
    analysis: &PeerReviewAnalysis,
    assignment: Option<&GroupAssignment>,
) -> Result<(), AppError> {
    let mut header = vec![
        "Student ID",
        "Student Name",
        "Graders Assigned",
        "Graders Completed",
        "Average",
        "Min",
        "Max",
        "Std Dev",
        "Reliable",
        "Flags",
    ];
    if assignment.is_some() {
        header.push("Group");
    }
    writer.write_record(&header).map_err(csv_error)?;

    for student in analysis.students.values() {
        let score = &student.work_score;
        let mut record = vec![
            student.student_id.clone(),
            student.full_name.clone(),
            student.graders_assigned.to_string(),
            student.graders_completed.to_string(),
            format!("{:.2}", score.average),
            optional_grade(score.min),
            optional_grade(score.max),
            format!("{:.2}", score.std_dev),
            yes_no(score.is_reliable).to_string(),
            student
                .flags
                .iter()
                .map(|flag| flag.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ];
        if let Some(assignment) = assignment {
            record.push(group_cell(assignment, &student.student_id));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }

    Ok(())
}

fn write_graders(
    writer: &mut csv::Writer<Vec<u8>>,
    analysis: &PeerReviewAnalysis,
    assignment: Option<&GroupAssignment>,
) -> Result<(), AppError> {
    let mut header = vec![
        "Grader ID",
        "Grader Name",
        "Assigned Reviews",
        "Completed Reviews",
        "Scheme",
        "Net Score",
        "Full Score",
        "Penalty",
        "Flags",
    ];
    if assignment.is_some() {
        header.push("Group");
    }
    writer.write_record(&header).map_err(csv_error)?;

    for grader in analysis.graders.values() {
        let score = &grader.peer_review_score;
        let mut record = vec![
            grader.grader_id.clone(),
            grader.full_name.clone(),
            grader.assigned_reviews.to_string(),
            grader.completed_reviews.to_string(),
            analysis.scheme.label().to_string(),
            format!("{:.1}", score.net_score()),
            format!("{:.1}", score.full_score()),
            format!("{:.1}", score.penalty()),
            grader
                .flags
                .iter()
                .map(|flag| flag.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ];
        if let Some(assignment) = assignment {
            record.push(group_cell(assignment, &grader.grader_id));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }

    Ok(())
}

fn optional_grade(value: Option<f64>) -> String {
    value.map(|grade| format!("{grade:.2}")).unwrap_or_default()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn group_cell(assignment: &GroupAssignment, id: &str) -> String {
    assignment.group_of(id).unwrap_or_default().to_string()
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::Io(err.into())
}
