use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an applicant as issued by the admissions office.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an academic program (heading).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HeadingId(pub u64);

impl fmt::Display for HeadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code of the institution that owns a heading.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniversityCode(pub String);

impl fmt::Display for UniversityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared priority of an application; 1 is the most wanted program.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Priority(pub u32);

/// Position in a heading's ranked competition list; lower is better.
pub type RatingPlace = u32;

/// Share of admitted students simulated as withdrawing, in percent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DrainPercent(u8);

impl DrainPercent {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DrainPercent {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("drain percent {value} outside 1..=100"))
    }
}

impl From<DrainPercent> for u8 {
    fn from(value: DrainPercent) -> Self {
        value.0
    }
}

impl fmt::Display for DrainPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Competition category an application is ranked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    Regular,
    TargetQuota,
    DedicatedQuota,
    SpecialQuota,
    Bvi,
}

impl Competition {
    pub const fn label(self) -> &'static str {
        match self {
            Competition::Regular => "regular",
            Competition::TargetQuota => "target_quota",
            Competition::DedicatedQuota => "dedicated_quota",
            Competition::SpecialQuota => "special_quota",
            Competition::Bvi => "bvi",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regular" | "common" => Some(Self::Regular),
            "target_quota" | "target" => Some(Self::TargetQuota),
            "dedicated_quota" | "dedicated" => Some(Self::DedicatedQuota),
            "special_quota" | "special" => Some(Self::SpecialQuota),
            "bvi" => Some(Self::Bvi),
            _ => None,
        }
    }
}

/// Display status derived from the original-certificate flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    SubmittedHere,
    Withdrawn,
    Unknown,
    PassingElsewhere,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::SubmittedHere => "submitted_here",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Unknown => "unknown",
            ApplicationStatus::PassingElsewhere => "passing_elsewhere",
        }
    }

    /// Withdrawal wins over everything; a submitted original wins over a
    /// higher-priority pass reported by the backend.
    pub const fn classify(
        original_submitted: bool,
        original_quit: bool,
        passing_to_more_priority: bool,
    ) -> Self {
        if original_quit {
            ApplicationStatus::Withdrawn
        } else if original_submitted {
            ApplicationStatus::SubmittedHere
        } else if passing_to_more_priority {
            ApplicationStatus::PassingElsewhere
        } else {
            ApplicationStatus::Unknown
        }
    }
}

/// One student's bid for one heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub student_id: StudentId,
    pub heading_id: HeadingId,
    pub priority: Priority,
    pub competition: Competition,
    pub rating_place: RatingPlace,
    pub score: u32,
    pub original_submitted: bool,
    pub original_quit: bool,
    pub passing_to_more_priority: bool,
    pub passing_now: bool,
}

impl Application {
    pub const fn status(&self) -> ApplicationStatus {
        ApplicationStatus::classify(
            self.original_submitted,
            self.original_quit,
            self.passing_to_more_priority,
        )
    }
}

/// An academic program offered by an institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub id: HeadingId,
    pub code: String,
    pub name: String,
    pub university_code: UniversityCode,
    pub regular_capacity: u32,
    pub target_quota_capacity: u32,
    pub dedicated_quota_capacity: u32,
    pub special_quota_capacity: u32,
}

impl Heading {
    /// Seats across all competitions, widened so backend-supplied counts cannot overflow.
    pub fn total_capacity(&self) -> u64 {
        [
            self.regular_capacity,
            self.target_quota_capacity,
            self.dedicated_quota_capacity,
            self.special_quota_capacity,
        ]
        .into_iter()
        .map(u64::from)
        .sum()
    }
}

/// Latest passing score and last admitted place under the current ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryResult {
    pub heading_id: HeadingId,
    pub passing_score: u32,
    pub last_admitted_rating_place: RatingPlace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_at: Option<DateTime<Utc>>,
}

/// Aggregated outcome of repeated drain simulations for one heading and percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainedResult {
    pub heading_id: HeadingId,
    pub drained_percent: DrainPercent,
    pub min_passing_score: u32,
    pub max_passing_score: u32,
    pub avg_passing_score: f64,
    pub med_passing_score: f64,
    pub min_last_admitted_rating_place: RatingPlace,
    pub max_last_admitted_rating_place: RatingPlace,
    pub avg_last_admitted_rating_place: f64,
    pub med_last_admitted_rating_place: RatingPlace,
}

/// Results fetched for a set of headings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsBundle {
    pub primary: Vec<PrimaryResult>,
    pub drained: Vec<DrainedResult>,
    pub steps: BTreeMap<HeadingId, Vec<DrainPercent>>,
}

impl ResultsBundle {
    pub fn primary_for(&self, heading_id: HeadingId) -> Option<&PrimaryResult> {
        self.primary
            .iter()
            .find(|result| result.heading_id == heading_id)
    }

    pub fn drained_for(
        &self,
        heading_id: HeadingId,
        percent: DrainPercent,
    ) -> Option<&DrainedResult> {
        self.drained
            .iter()
            .find(|result| result.heading_id == heading_id && result.drained_percent == percent)
    }

    pub fn steps_for(&self, heading_id: HeadingId) -> Option<&[DrainPercent]> {
        self.steps.get(&heading_id).map(Vec::as_slice)
    }
}

/// Which ranking a lookup is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scenario {
    #[default]
    Primary,
    Drained(DrainPercent),
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Primary => f.write_str("primary"),
            Scenario::Drained(percent) => write!(f, "drained-{}", percent.get()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario '{0}', expected 'primary' or 'drained-<1..=100>'")]
pub struct ScenarioParseError(pub String);

impl FromStr for Scenario {
    type Err = ScenarioParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim().to_ascii_lowercase();
        if trimmed.is_empty() || trimmed == "primary" {
            return Ok(Scenario::Primary);
        }

        trimmed
            .strip_prefix("drained-")
            .and_then(|raw| raw.parse::<u8>().ok())
            .and_then(DrainPercent::new)
            .map(Scenario::Drained)
            .ok_or_else(|| ScenarioParseError(value.to_string()))
    }
}

impl Serialize for Scenario {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scenario {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
