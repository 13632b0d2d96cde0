use super::normalizer::clean_header;
use crate::workflows::peer_review::statistics::GroupAssignment;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const FIXED_COLUMNS: [&str; 6] = [
    "Student",
    "ID",
    "SIS User ID",
    "SIS Login ID",
    "Integration ID",
    "Section",
];

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    NoGroupSets,
    UnknownGroupSet(String),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::NoGroupSets => write!(f, "roster has no group set columns"),
            RosterImportError::UnknownGroupSet(name) => {
                write!(f, "roster has no group set named '{}'", name)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::NoGroupSets | RosterImportError::UnknownGroupSet(_) => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub student_name: String,
    pub section: String,
    pub groups: BTreeMap<String, String>,
}

/// Class roster with one column per Canvas group set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub group_sets: Vec<String>,
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    /// Group assignment for `group_set`, or the first group set when none is
    /// named.
    pub fn assignment(&self, group_set: Option<&str>) -> Result<GroupAssignment, RosterImportError> {
        let name = match group_set.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self
                .group_sets
                .iter()
                .find(|candidate| candidate.as_str() == name)
                .ok_or_else(|| RosterImportError::UnknownGroupSet(name.to_string()))?,
            None => self.group_sets.first().ok_or(RosterImportError::NoGroupSets)?,
        };

        let mut assignment = GroupAssignment::new(name.clone());
        for entry in &self.entries {
            if let Some(group) = entry.groups.get(name) {
                assignment.assign(entry.student_id.clone(), group.clone());
            }
        }
        Ok(assignment)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Roster, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows are keyed by `SIS User ID`, then `ID`; rows with neither are
    /// skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Roster, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(clean_header)
            .collect();
        let column = |name: &str| headers.iter().position(|header| header == name);
        let student_column = column("Student");
        let id_column = column("ID");
        let sis_column = column("SIS User ID");
        let section_column = column("Section");

        let group_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty() && !FIXED_COLUMNS.contains(&header.as_str()))
            .map(|(index, header)| (index, header.clone()))
            .collect();

        let mut entries = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let cell = |index: Option<usize>| {
                index
                    .and_then(|index| record.get(index))
                    .unwrap_or("")
                    .to_string()
            };

            let student_id = Some(cell(sis_column))
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| cell(id_column));
            if student_id.is_empty() {
                continue;
            }

            let groups = group_columns
                .iter()
                .map(|(index, name)| (name.clone(), cell(Some(*index))))
                .collect();

            entries.push(RosterEntry {
                student_id,
                student_name: cell(student_column),
                section: cell(section_column),
                groups,
            });
        }

        Ok(Roster {
            group_sets: group_columns.into_iter().map(|(_, name)| name).collect(),
            entries,
        })
    }
}
