use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::admissions::domain::{
    Application, Competition, DrainPercent, DrainedResult, Heading, HeadingId, PrimaryResult,
    Priority, ResultsBundle, StudentId, UniversityCode,
};
use crate::admissions::fixture::FixtureRepository;
use crate::admissions::repository::{AdmissionRepository, RepositoryError, ResultsQuery};
use crate::admissions::service::AdmissionService;

pub(super) fn student() -> StudentId {
    StudentId("163-554-201 18".to_string())
}

pub(super) fn percent(value: u8) -> DrainPercent {
    DrainPercent::new(value).expect("valid drain percent")
}

pub(super) fn heading(id: u64, university: &str) -> Heading {
    Heading {
        id: HeadingId(id),
        code: format!("09.03.{id:02}"),
        name: format!("Program {id}"),
        university_code: UniversityCode(university.to_string()),
        regular_capacity: 120,
        target_quota_capacity: 10,
        dedicated_quota_capacity: 12,
        special_quota_capacity: 12,
    }
}

pub(super) fn application(
    heading_id: u64,
    priority: u32,
    rating_place: u32,
    passing_now: bool,
) -> Application {
    Application {
        student_id: student(),
        heading_id: HeadingId(heading_id),
        priority: Priority(priority),
        competition: Competition::Regular,
        rating_place,
        score: 270,
        original_submitted: false,
        original_quit: false,
        passing_to_more_priority: false,
        passing_now,
    }
}

pub(super) fn primary(heading_id: u64, last_admitted: u32) -> PrimaryResult {
    PrimaryResult {
        heading_id: HeadingId(heading_id),
        passing_score: 255,
        last_admitted_rating_place: last_admitted,
        calculated_at: None,
    }
}

pub(super) fn drained(heading_id: u64, drained_percent: u8, median_place: u32) -> DrainedResult {
    DrainedResult {
        heading_id: HeadingId(heading_id),
        drained_percent: percent(drained_percent),
        min_passing_score: 231,
        max_passing_score: 249,
        avg_passing_score: 240.25,
        med_passing_score: 241.0,
        min_last_admitted_rating_place: median_place.saturating_sub(6),
        max_last_admitted_rating_place: median_place + 9,
        avg_last_admitted_rating_place: f64::from(median_place) + 0.5,
        med_last_admitted_rating_place: median_place,
    }
}

pub(super) fn headings_by_id(headings: Vec<Heading>) -> HashMap<HeadingId, Heading> {
    headings
        .into_iter()
        .map(|heading| (heading.id, heading))
        .collect()
}

pub(super) fn results(primary: Vec<PrimaryResult>, drained: Vec<DrainedResult>) -> ResultsBundle {
    ResultsBundle {
        primary,
        drained,
        steps: BTreeMap::new(),
    }
}

/// Two institutions: ALPHA holds headings 1 and 3, BETA holds heading 2.
pub(super) fn repository() -> FixtureRepository {
    let applications = vec![
        application(1, 1, 10, false),
        application(2, 2, 10, true),
        application(3, 3, 40, false),
    ];
    let headings = vec![heading(1, "ALPHA"), heading(2, "BETA"), heading(3, "ALPHA")];
    let mut bundle = results(
        vec![primary(1, 5), primary(2, 20), primary(3, 60)],
        vec![
            drained(1, 33, 8),
            drained(1, 66, 12),
            drained(2, 33, 25),
            drained(2, 66, 31),
        ],
    );
    bundle
        .steps
        .insert(HeadingId(1), vec![percent(33), percent(66)]);

    FixtureRepository::new(applications, headings, bundle)
}

pub(super) fn build_service() -> AdmissionService<FixtureRepository> {
    AdmissionService::new(Arc::new(repository()))
}

pub(super) struct TimeoutRepository;

impl AdmissionRepository for TimeoutRepository {
    fn student_applications(
        &self,
        _student_id: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Timeout)
    }

    fn heading_by_id(&self, _id: HeadingId) -> Result<Option<Heading>, RepositoryError> {
        Err(RepositoryError::Timeout)
    }

    fn results(&self, _query: &ResultsQuery) -> Result<ResultsBundle, RepositoryError> {
        Err(RepositoryError::Timeout)
    }
}

/// Serves applications but fails every heading lookup except the listed ones.
pub(super) struct FlakyHeadingRepository {
    pub(super) inner: FixtureRepository,
    pub(super) healthy: Vec<HeadingId>,
}

impl AdmissionRepository for FlakyHeadingRepository {
    fn student_applications(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError> {
        self.inner.student_applications(student_id)
    }

    fn heading_by_id(&self, id: HeadingId) -> Result<Option<Heading>, RepositoryError> {
        if self.healthy.contains(&id) {
            self.inner.heading_by_id(id)
        } else {
            Err(RepositoryError::Unavailable("heading service offline".to_string()))
        }
    }

    fn results(&self, query: &ResultsQuery) -> Result<ResultsBundle, RepositoryError> {
        self.inner.results(query)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
