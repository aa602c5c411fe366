use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{
    DrainPercent, Heading, HeadingId, PrimaryResult, Scenario, StudentId,
};
use super::drain_table::DrainTable;
use super::repository::{AdmissionRepository, DrainedSelector, RepositoryError, ResultsQuery};
use super::sections::{aggregate_sections, AdmissionOverview, AggregationError};

/// Service that fetches everything a view needs and then runs the pure aggregation steps.
pub struct AdmissionService<R> {
    repository: Arc<R>,
}

impl<R> AdmissionService<R>
where
    R: AdmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Builds the section overview for a student under `scenario`.
    pub fn lookup(
        &self,
        student_id: &StudentId,
        scenario: Scenario,
    ) -> Result<AdmissionOverview, AdmissionError> {
        let applications = self.repository.student_applications(student_id)?;
        if applications.is_empty() {
            return Err(AdmissionError::StudentNotFound(student_id.clone()));
        }

        let mut heading_ids: Vec<HeadingId> = Vec::new();
        for application in &applications {
            if !heading_ids.contains(&application.heading_id) {
                heading_ids.push(application.heading_id);
            }
        }

        let mut headings: HashMap<HeadingId, Heading> = HashMap::new();
        for heading_id in &heading_ids {
            match self.repository.heading_by_id(*heading_id) {
                Ok(Some(heading)) => {
                    headings.insert(heading.id, heading);
                }
                Ok(None) => {
                    warn!(%student_id, %heading_id, "heading not found");
                }
                Err(RepositoryError::Timeout) => return Err(AdmissionError::Timeout),
                Err(err) => {
                    warn!(%student_id, %heading_id, error = %err, "heading lookup failed");
                }
            }
        }

        let mut query = ResultsQuery::for_headings(heading_ids).with_primary();
        if let Scenario::Drained(percent) = scenario {
            query = query.with_drained(DrainedSelector::Percents(vec![percent]));
        }
        let results = self.repository.results(&query)?;

        debug!(
            %student_id,
            %scenario,
            applications = applications.len(),
            headings = headings.len(),
            "aggregating admission sections"
        );

        aggregate_sections(student_id, &applications, &headings, &results, scenario).map_err(
            |err| match err {
                AggregationError::NoApplications => {
                    AdmissionError::StudentNotFound(student_id.clone())
                }
                other => AdmissionError::DataError(other.to_string()),
            },
        )
    }

    /// Pivots the drain simulations of a heading. `percents` narrows the columns.
    pub fn drain_table(
        &self,
        heading_id: HeadingId,
        percents: Option<&[DrainPercent]>,
    ) -> Result<DrainTable, AdmissionError> {
        self.require_heading(heading_id)?;

        let selector = match percents {
            Some(percents) => DrainedSelector::Percents(percents.to_vec()),
            None => DrainedSelector::All,
        };
        let query = ResultsQuery::for_headings(vec![heading_id]).with_drained(selector);
        let results = self.repository.results(&query)?;

        Ok(DrainTable::build(&results, heading_id, percents))
    }

    /// Capacity, current cutoff and available drain steps for one heading.
    pub fn heading_summary(&self, heading_id: HeadingId) -> Result<HeadingSummary, AdmissionError> {
        let heading = self.require_heading(heading_id)?;

        let query = ResultsQuery::for_headings(vec![heading_id])
            .with_primary()
            .with_drained(DrainedSelector::All);
        let results = self.repository.results(&query)?;

        let primary = results.primary_for(heading_id).cloned();
        let mut drain_steps: Vec<DrainPercent> = match results.steps_for(heading_id) {
            Some(steps) => steps.to_vec(),
            None => results
                .drained
                .iter()
                .filter(|result| result.heading_id == heading_id)
                .map(|result| result.drained_percent)
                .collect(),
        };
        drain_steps.sort();
        drain_steps.dedup();

        Ok(HeadingSummary {
            total_capacity: heading.total_capacity(),
            heading,
            primary,
            drain_steps,
        })
    }

    fn require_heading(&self, heading_id: HeadingId) -> Result<Heading, AdmissionError> {
        self.repository
            .heading_by_id(heading_id)?
            .ok_or(AdmissionError::HeadingNotFound(heading_id))
    }
}

/// Heading details shown next to its ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingSummary {
    pub heading: Heading,
    pub total_capacity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<PrimaryResult>,
    pub drain_steps: Vec<DrainPercent>,
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("applicant {0} not found")]
    StudentNotFound(StudentId),
    #[error("heading {0} not found")]
    HeadingNotFound(HeadingId),
    #[error("failed to load admission data: {0}")]
    DataError(String),
    #[error("admission data request timed out")]
    Timeout,
}

impl AdmissionError {
    pub const fn kind(&self) -> &'static str {
        match self {
            AdmissionError::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            AdmissionError::HeadingNotFound(_) => "HEADING_NOT_FOUND",
            AdmissionError::DataError(_) => "DATA_ERROR",
            AdmissionError::Timeout => "TIMEOUT",
        }
    }
}

impl From<RepositoryError> for AdmissionError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Timeout => Self::Timeout,
            other => Self::DataError(other.to_string()),
        }
    }
}
