use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    Application, ApplicationStatus, Competition, Heading, HeadingId, Priority, RatingPlace,
    ResultsBundle, Scenario, StudentId, UniversityCode,
};
use super::ranking::{cutoff_for, delta, passes};

/// One line of a section table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRow {
    pub priority: Priority,
    pub heading_id: HeadingId,
    pub heading_code: String,
    pub program_name: String,
    pub competition: Competition,
    pub score: u32,
    pub rating_place: RatingPlace,
    pub status: ApplicationStatus,
    /// `None` when the active scenario has no result for this heading.
    pub passes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
}

/// A student's applications to one institution, ordered by priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversitySection {
    pub university_code: UniversityCode,
    pub rows: Vec<ProgramRow>,
    pub highlight_priority: Option<Priority>,
}

impl UniversitySection {
    pub fn highlighted_row(&self) -> Option<&ProgramRow> {
        let priority = self.highlight_priority?;
        self.rows.iter().find(|row| row.priority == priority)
    }
}

/// Whether the passing section reflects an actual pass or is only the first section shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassingState {
    Passing,
    NotPassingAnywhere,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionOverview {
    pub student_id: StudentId,
    pub scenario: Scenario,
    pub passing_section: UniversitySection,
    pub passing_state: PassingState,
    pub secondary_sections: Vec<UniversitySection>,
}

impl AdmissionOverview {
    pub fn sections(&self) -> impl Iterator<Item = &UniversitySection> {
        std::iter::once(&self.passing_section).chain(self.secondary_sections.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("student has no applications")]
    NoApplications,
    #[error("none of the {skipped} application(s) reference a known heading")]
    NoResolvableHeadings { skipped: usize },
}

struct Group<'a> {
    university_code: UniversityCode,
    entries: Vec<(&'a Application, &'a Heading)>,
    /// Best priority among applications flagged `passing_now`.
    passing_priority: Option<Priority>,
}

/// Groups a student's applications by institution and evaluates them against `scenario`.
///
/// Applications whose heading is unknown are skipped with a warning. The passing section
/// is the one holding the most preferred application flagged `passing_now`, with ties
/// going to the earlier section; when nothing is flagged the first section stands in and the overview is marked [`PassingState::NotPassingAnywhere`].
pub fn aggregate_sections(
    student_id: &StudentId,
    applications: &[Application],
    headings: &HashMap<HeadingId, Heading>,
    results: &ResultsBundle,
    scenario: Scenario,
) -> Result<AdmissionOverview, AggregationError> {
    if applications.is_empty() {
        return Err(AggregationError::NoApplications);
    }

    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut positions: BTreeMap<&UniversityCode, usize> = BTreeMap::new();
    let mut skipped = 0usize;

    for application in applications {
        let Some(heading) = headings.get(&application.heading_id) else {
            warn!(
                student_id = %student_id,
                heading_id = %application.heading_id,
                "skipping application with unresolved heading"
            );
            skipped += 1;
            continue;
        };

        let index = match positions.get(&heading.university_code) {
            Some(index) => *index,
            None => {
                groups.push(Group {
                    university_code: heading.university_code.clone(),
                    entries: Vec::new(),
                    passing_priority: None,
                });
                positions.insert(&heading.university_code, groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        if application.passing_now {
            group.passing_priority = Some(match group.passing_priority {
                Some(current) => current.min(application.priority),
                None => application.priority,
            });
        }
        group.entries.push((application, heading));
    }

    if groups.is_empty() {
        return Err(AggregationError::NoResolvableHeadings { skipped });
    }

    let passing_index = groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| group.passing_priority.map(|priority| (priority, index)))
        .min()
        .map(|(_, index)| index);
    let passing_state = match passing_index {
        Some(_) => PassingState::Passing,
        None => PassingState::NotPassingAnywhere,
    };
    let passing_index = passing_index.unwrap_or(0);

    let mut sections: Vec<UniversitySection> = groups
        .into_iter()
        .map(|group| build_section(group, results, scenario))
        .collect();

    let passing_section = sections.remove(passing_index);

    Ok(AdmissionOverview {
        student_id: student_id.clone(),
        scenario,
        passing_section,
        passing_state,
        secondary_sections: sections,
    })
}

fn build_section(
    mut group: Group<'_>,
    results: &ResultsBundle,
    scenario: Scenario,
) -> UniversitySection {
    group
        .entries
        .sort_by_key(|(application, _)| application.priority);

    let rows: Vec<ProgramRow> = group
        .entries
        .iter()
        .map(|(application, heading)| program_row(application, heading, results, scenario))
        .collect();

    let highlight_priority = rows
        .iter()
        .find(|row| row.passes == Some(true))
        .map(|row| row.priority);

    UniversitySection {
        university_code: group.university_code,
        rows,
        highlight_priority,
    }
}

fn program_row(
    application: &Application,
    heading: &Heading,
    results: &ResultsBundle,
    scenario: Scenario,
) -> ProgramRow {
    let cutoff = cutoff_for(results, heading.id, scenario);
    if cutoff.is_none() {
        warn!(
            heading_id = %heading.id,
            %scenario,
            "no result for heading, rendering row without delta"
        );
    }

    ProgramRow {
        priority: application.priority,
        heading_id: heading.id,
        heading_code: heading.code.clone(),
        program_name: heading.name.clone(),
        competition: application.competition,
        score: application.score,
        rating_place: application.rating_place,
        status: application.status(),
        passes: cutoff.map(|cutoff| passes(application.rating_place, cutoff)),
        delta: cutoff.and_then(|cutoff| delta(application.rating_place, cutoff)),
    }
}
