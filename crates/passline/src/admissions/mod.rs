//! Admission ranking lookups and drain-scenario projections.
//!
//! Data flows one way: a repository supplies applications, headings and results, the
//! service fetches everything a view needs, and the pure `ranking`, `sections` and
//! `drain_table` steps turn it into the structures served over HTTP and the CLI.

pub mod domain;
pub mod drain_table;
pub mod dto;
pub mod fixture;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod sections;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationStatus, Competition, DrainPercent, DrainedResult, Heading, HeadingId,
    PrimaryResult, Priority, RatingPlace, ResultsBundle, Scenario, ScenarioParseError, StudentId,
    UniversityCode,
};
pub use drain_table::{DrainMetric, DrainTable, DrainTableRow, PLACEHOLDER};
pub use fixture::{FixtureDataset, FixtureError, FixtureRepository};
pub use ranking::{cutoff_for, delta, passes};
pub use repository::{
    AdmissionRepository, DrainedSelector, PrimarySelector, RepositoryError, ResultsQuery,
};
pub use router::{admission_router, parse_percents};
pub use sections::{
    aggregate_sections, AdmissionOverview, AggregationError, PassingState, ProgramRow,
    UniversitySection,
};
pub use service::{AdmissionError, AdmissionService, HeadingSummary};
