//! Wire representations returned by the admissions backend and their conversion into
//! domain types. Conversions validate every field the ranking code relies on.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Application, Competition, DrainPercent, DrainedResult, Heading, HeadingId, PrimaryResult,
    Priority, ResultsBundle, StudentId, UniversityCode,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDto {
    pub student_id: String,
    pub heading_id: u64,
    pub priority: u32,
    pub competition_type: String,
    pub rating_place: u32,
    pub score: u32,
    #[serde(default)]
    pub original_submitted: bool,
    #[serde(default)]
    pub original_quit: bool,
    #[serde(default)]
    pub passing_to_more_priority: bool,
    #[serde(default)]
    pub passing_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingDto {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub university_code: String,
    #[serde(default)]
    pub regular_capacity: u32,
    #[serde(default)]
    pub target_quota_capacity: u32,
    #[serde(default)]
    pub dedicated_quota_capacity: u32,
    #[serde(default)]
    pub special_quota_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryResultDto {
    pub heading_id: u64,
    pub passing_score: Option<u32>,
    pub last_admitted_rating_place: Option<u32>,
    #[serde(default)]
    pub calculated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainedResultDto {
    pub heading_id: u64,
    pub drained_percent: u8,
    pub min_passing_score: u32,
    pub max_passing_score: u32,
    pub avg_passing_score: f64,
    pub med_passing_score: f64,
    pub min_last_admitted_rating_place: u32,
    pub max_last_admitted_rating_place: u32,
    pub avg_last_admitted_rating_place: f64,
    pub med_last_admitted_rating_place: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsDto {
    #[serde(default)]
    pub primary: Vec<PrimaryResultDto>,
    #[serde(default)]
    pub drained: Vec<DrainedResultDto>,
    #[serde(default)]
    pub steps: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DtoError {
    #[error("application for heading {heading_id} has priority 0")]
    ZeroPriority { heading_id: u64 },
    #[error("application for heading {heading_id} has rating place 0")]
    ZeroRatingPlace { heading_id: u64 },
    #[error("unknown competition type '{0}'")]
    UnknownCompetition(String),
    #[error("drain percent {0} outside 1..=100")]
    DrainPercent(u8),
    #[error("primary result for heading {heading_id} is missing '{field}'")]
    MissingField {
        heading_id: u64,
        field: &'static str,
    },
    #[error("steps key '{0}' is not a heading id")]
    StepsKey(String),
    #[error("student id is blank")]
    BlankStudentId,
}

impl TryFrom<ApplicationDto> for Application {
    type Error = DtoError;

    fn try_from(dto: ApplicationDto) -> Result<Self, Self::Error> {
        if dto.student_id.trim().is_empty() {
            return Err(DtoError::BlankStudentId);
        }
        if dto.priority == 0 {
            return Err(DtoError::ZeroPriority {
                heading_id: dto.heading_id,
            });
        }
        if dto.rating_place == 0 {
            return Err(DtoError::ZeroRatingPlace {
                heading_id: dto.heading_id,
            });
        }
        let competition = Competition::from_label(&dto.competition_type)
            .ok_or_else(|| DtoError::UnknownCompetition(dto.competition_type.clone()))?;

        Ok(Application {
            student_id: StudentId(dto.student_id.trim().to_string()),
            heading_id: HeadingId(dto.heading_id),
            priority: Priority(dto.priority),
            competition,
            rating_place: dto.rating_place,
            score: dto.score,
            original_submitted: dto.original_submitted,
            original_quit: dto.original_quit,
            passing_to_more_priority: dto.passing_to_more_priority,
            passing_now: dto.passing_now,
        })
    }
}

impl From<&Application> for ApplicationDto {
    fn from(application: &Application) -> Self {
        Self {
            student_id: application.student_id.0.clone(),
            heading_id: application.heading_id.0,
            priority: application.priority.0,
            competition_type: application.competition.label().to_string(),
            rating_place: application.rating_place,
            score: application.score,
            original_submitted: application.original_submitted,
            original_quit: application.original_quit,
            passing_to_more_priority: application.passing_to_more_priority,
            passing_now: application.passing_now,
        }
    }
}

impl From<HeadingDto> for Heading {
    fn from(dto: HeadingDto) -> Self {
        Heading {
            id: HeadingId(dto.id),
            code: dto.code,
            name: dto.name,
            university_code: UniversityCode(dto.university_code),
            regular_capacity: dto.regular_capacity,
            target_quota_capacity: dto.target_quota_capacity,
            dedicated_quota_capacity: dto.dedicated_quota_capacity,
            special_quota_capacity: dto.special_quota_capacity,
        }
    }
}

impl TryFrom<PrimaryResultDto> for PrimaryResult {
    type Error = DtoError;

    fn try_from(dto: PrimaryResultDto) -> Result<Self, Self::Error> {
        let passing_score = dto.passing_score.ok_or(DtoError::MissingField {
            heading_id: dto.heading_id,
            field: "passing_score",
        })?;
        let last_admitted_rating_place =
            dto.last_admitted_rating_place
                .ok_or(DtoError::MissingField {
                    heading_id: dto.heading_id,
                    field: "last_admitted_rating_place",
                })?;

        Ok(PrimaryResult {
            heading_id: HeadingId(dto.heading_id),
            passing_score,
            last_admitted_rating_place,
            calculated_at: dto.calculated_at,
        })
    }
}

impl TryFrom<DrainedResultDto> for DrainedResult {
    type Error = DtoError;

    fn try_from(dto: DrainedResultDto) -> Result<Self, Self::Error> {
        let drained_percent = DrainPercent::new(dto.drained_percent)
            .ok_or(DtoError::DrainPercent(dto.drained_percent))?;

        Ok(DrainedResult {
            heading_id: HeadingId(dto.heading_id),
            drained_percent,
            min_passing_score: dto.min_passing_score,
            max_passing_score: dto.max_passing_score,
            avg_passing_score: dto.avg_passing_score,
            med_passing_score: dto.med_passing_score,
            min_last_admitted_rating_place: dto.min_last_admitted_rating_place,
            max_last_admitted_rating_place: dto.max_last_admitted_rating_place,
            avg_last_admitted_rating_place: dto.avg_last_admitted_rating_place,
            med_last_admitted_rating_place: dto.med_last_admitted_rating_place,
        })
    }
}

impl TryFrom<ResultsDto> for ResultsBundle {
    type Error = DtoError;

    fn try_from(dto: ResultsDto) -> Result<Self, Self::Error> {
        let primary = dto
            .primary
            .into_iter()
            .map(PrimaryResult::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let drained = dto
            .drained
            .into_iter()
            .map(DrainedResult::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut steps = BTreeMap::new();
        for (key, percents) in dto.steps {
            let heading_id = key
                .trim()
                .parse::<u64>()
                .map_err(|_| DtoError::StepsKey(key.clone()))?;
            let percents = percents
                .into_iter()
                .map(|value| DrainPercent::new(value).ok_or(DtoError::DrainPercent(value)))
                .collect::<Result<Vec<_>, _>>()?;
            steps.insert(HeadingId(heading_id), percents);
        }

        Ok(ResultsBundle {
            primary,
            drained,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admissions::domain::ApplicationStatus;

    fn application_dto() -> ApplicationDto {
        serde_json::from_value(serde_json::json!({
            "student_id": "158-902-311 07",
            "heading_id": 4102,
            "priority": 3,
            "competition_type": "regular",
            "rating_place": 4294967295u32,
            "score": 281,
            "original_submitted": true,
            "original_quit": false,
            "passing_to_more_priority": false,
            "passing_now": true
        }))
        .expect("dto parses")
    }

    #[test]
    fn application_fields_used_for_ranking_survive_adaptation() {
        let application = Application::try_from(application_dto()).expect("valid dto");

        assert_eq!(application.priority, Priority(3));
        assert_eq!(application.rating_place, u32::MAX);
        assert_eq!(application.heading_id, HeadingId(4102));
        assert!(application.original_submitted);
        assert_eq!(application.status(), ApplicationStatus::SubmittedHere);

        let back = ApplicationDto::from(&application);
        assert_eq!(back, application_dto());
    }

    #[test]
    fn rejects_zero_priority_and_unknown_competition() {
        let mut dto = application_dto();
        dto.priority = 0;
        assert_eq!(
            Application::try_from(dto),
            Err(DtoError::ZeroPriority { heading_id: 4102 })
        );

        let mut dto = application_dto();
        dto.competition_type = "lottery".to_string();
        assert_eq!(
            Application::try_from(dto),
            Err(DtoError::UnknownCompetition("lottery".to_string()))
        );
    }

    #[test]
    fn status_triplet_precedence() {
        assert_eq!(
            ApplicationStatus::classify(true, true, true),
            ApplicationStatus::Withdrawn
        );
        assert_eq!(
            ApplicationStatus::classify(true, false, true),
            ApplicationStatus::SubmittedHere
        );
        assert_eq!(
            ApplicationStatus::classify(false, false, true),
            ApplicationStatus::PassingElsewhere
        );
        assert_eq!(
            ApplicationStatus::classify(false, false, false),
            ApplicationStatus::Unknown
        );
    }

    #[test]
    fn primary_result_requires_cutoff_fields() {
        let dto = PrimaryResultDto {
            heading_id: 12,
            passing_score: Some(240),
            last_admitted_rating_place: None,
            calculated_at: None,
        };
        assert_eq!(
            PrimaryResult::try_from(dto),
            Err(DtoError::MissingField {
                heading_id: 12,
                field: "last_admitted_rating_place",
            })
        );
    }

    #[test]
    fn results_steps_keys_parse_into_heading_ids() {
        let dto: ResultsDto = serde_json::from_value(serde_json::json!({
            "steps": { "12": [33, 66], "13": [100] }
        }))
        .expect("results parse");
        let bundle = ResultsBundle::try_from(dto).expect("valid results");

        let steps = bundle.steps_for(HeadingId(12)).expect("steps present");
        assert_eq!(
            steps.iter().map(|p| p.get()).collect::<Vec<_>>(),
            vec![33, 66]
        );

        let bad: ResultsDto = serde_json::from_value(serde_json::json!({
            "steps": { "twelve": [33] }
        }))
        .expect("results parse");
        assert_eq!(
            ResultsBundle::try_from(bad),
            Err(DtoError::StepsKey("twelve".to_string()))
        );
    }
}
