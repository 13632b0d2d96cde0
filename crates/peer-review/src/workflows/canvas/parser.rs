use super::columns::{ColumnDetection, ColumnSchema};
use super::normalizer::{clean_header, is_blank_row, parse_grade};
use crate::workflows::peer_review::domain::{CriterionComments, Participant, Review, ReviewId};
use std::io::Read;
use tracing::debug;

pub(crate) struct ParsedExport {
    pub(crate) schema: ColumnSchema,
    pub(crate) reviews: Vec<Review>,
    pub(crate) data_rows: usize,
}

pub(crate) fn parse_export<R: Read>(
    reader: R,
    detection: ColumnDetection,
) -> Result<ParsedExport, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|cell| clean_header(&String::from_utf8_lossy(cell)))
        .collect();
    let schema = ColumnSchema::resolve(&headers, detection);

    let mut reviews = Vec::new();
    let mut data_rows = 0;

    for record in csv_reader.byte_records() {
        let record = record?;
        let cells: Vec<String> = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .collect();
        if is_blank_row(cells.iter().map(String::as_str)) {
            continue;
        }

        let index = data_rows;
        data_rows += 1;

        match parse_row(index, &cells, &schema) {
            Some(review) => reviews.push(review),
            None => debug!(row = index, "skipping row without a student name"),
        }
    }

    Ok(ParsedExport {
        schema,
        reviews,
        data_rows,
    })
}

/// Builds one review from a data row, or `None` when the row has no owner.
pub(crate) fn parse_row(index: usize, cells: &[String], schema: &ColumnSchema) -> Option<Review> {
    let cell = |position: usize| cells.get(position).map(String::as_str).unwrap_or("");

    let student_cell = cell(schema.student);
    if student_cell.trim().is_empty() {
        return None;
    }

    let grader_cell = cell(schema.grader);
    let grader = (!grader_cell.trim().is_empty()).then(|| Participant::from_cell(grader_cell));

    let raw_grade = cell(schema.grade);
    let grade_given = parse_grade(raw_grade);
    if grade_given.is_none() && !raw_grade.trim().is_empty() {
        debug!(row = index, value = raw_grade, "grade cell is not a number, treating as not reviewed");
    }

    let comments = CriterionComments::new(std::array::from_fn(|criterion| {
        cell(schema.criteria[criterion]).to_string()
    }));

    let review = Review::new(
        ReviewId::for_row(index),
        Participant::from_cell(student_cell),
        grader,
        grade_given,
        comments,
    )
    .with_grade_average(parse_grade(cell(schema.grade_average)))
    .with_submission_comment(cell(schema.submission_comment).trim());

    Some(review)
}
