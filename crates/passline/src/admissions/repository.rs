use serde::{Deserialize, Serialize};

use super::domain::{Application, DrainPercent, Heading, HeadingId, ResultsBundle, StudentId};

/// Which primary results to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimarySelector {
    Latest,
}

/// Which drain simulations to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainedSelector {
    All,
    Percents(Vec<DrainPercent>),
}

impl DrainedSelector {
    pub fn includes(&self, percent: DrainPercent) -> bool {
        match self {
            DrainedSelector::All => true,
            DrainedSelector::Percents(percents) => percents.contains(&percent),
        }
    }
}

/// Filter passed to [`AdmissionRepository::results`]. `None` selectors skip that part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsQuery {
    pub heading_ids: Vec<HeadingId>,
    pub primary: Option<PrimarySelector>,
    pub drained: Option<DrainedSelector>,
}

impl ResultsQuery {
    pub fn for_headings(heading_ids: Vec<HeadingId>) -> Self {
        Self {
            heading_ids,
            ..Self::default()
        }
    }

    pub fn with_primary(mut self) -> Self {
        self.primary = Some(PrimarySelector::Latest);
        self
    }

    pub fn with_drained(mut self, selector: DrainedSelector) -> Self {
        self.drained = Some(selector);
        self
    }
}

/// Data source abstraction so the service can run against fixtures or a live backend.
///
/// An unknown student yields an empty list rather than an error.
pub trait AdmissionRepository: Send + Sync {
    fn student_applications(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn heading_by_id(&self, id: HeadingId) -> Result<Option<Heading>, RepositoryError>;
    fn results(&self, query: &ResultsQuery) -> Result<ResultsBundle, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository request timed out")]
    Timeout,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("repository returned malformed data: {0}")]
    Malformed(String),
}
