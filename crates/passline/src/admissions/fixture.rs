use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{Application, Heading, HeadingId, ResultsBundle, StudentId};
use super::dto::{ApplicationDto, DtoError, HeadingDto, ResultsDto};
use super::repository::{AdmissionRepository, RepositoryError, ResultsQuery};

/// JSON dataset in the backend wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureDataset {
    #[serde(default)]
    pub headings: Vec<HeadingDto>,
    #[serde(default)]
    pub applications: Vec<ApplicationDto>,
    #[serde(default)]
    pub results: ResultsDto,
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("fixture dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture dataset contains an invalid record: {0}")]
    Record(#[from] DtoError),
}

/// In-memory repository backed by a fixed dataset.
#[derive(Debug, Clone, Default)]
pub struct FixtureRepository {
    applications: Vec<Application>,
    headings: HashMap<HeadingId, Heading>,
    results: ResultsBundle,
}

impl FixtureRepository {
    pub fn new(
        applications: Vec<Application>,
        headings: Vec<Heading>,
        results: ResultsBundle,
    ) -> Self {
        let headings = headings
            .into_iter()
            .map(|heading| (heading.id, heading))
            .collect();
        Self {
            applications,
            headings,
            results,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FixtureError> {
        let dataset: FixtureDataset = serde_json::from_reader(reader)?;
        Self::from_dataset(dataset)
    }

    pub fn from_dataset(dataset: FixtureDataset) -> Result<Self, FixtureError> {
        let applications = dataset
            .applications
            .into_iter()
            .map(Application::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let headings = dataset.headings.into_iter().map(Heading::from).collect();
        let results = ResultsBundle::try_from(dataset.results)?;

        Ok(Self::new(applications, headings, results))
    }

    pub fn heading_count(&self) -> usize {
        self.headings.len()
    }

    pub fn student_ids(&self) -> Vec<StudentId> {
        let mut ids: Vec<StudentId> = self
            .applications
            .iter()
            .map(|application| application.student_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl AdmissionRepository for FixtureRepository {
    fn student_applications(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .applications
            .iter()
            .filter(|application| &application.student_id == student_id)
            .cloned()
            .collect())
    }

    fn heading_by_id(&self, id: HeadingId) -> Result<Option<Heading>, RepositoryError> {
        Ok(self.headings.get(&id).cloned())
    }

    fn results(&self, query: &ResultsQuery) -> Result<ResultsBundle, RepositoryError> {
        let wanted = |heading_id: &HeadingId| {
            query.heading_ids.is_empty() || query.heading_ids.contains(heading_id)
        };

        let primary = match query.primary {
            Some(_) => self
                .results
                .primary
                .iter()
                .filter(|result| wanted(&result.heading_id))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let drained = match &query.drained {
            Some(selector) => self
                .results
                .drained
                .iter()
                .filter(|result| {
                    wanted(&result.heading_id) && selector.includes(result.drained_percent)
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let steps = self
            .results
            .steps
            .iter()
            .filter(|(heading_id, _)| wanted(heading_id))
            .map(|(heading_id, percents)| (*heading_id, percents.clone()))
            .collect();

        Ok(ResultsBundle {
            primary,
            drained,
            steps,
        })
    }
}
