use metrics_exporter_prometheus::PrometheusHandle;
use passline::admissions::{
    parse_percents, DrainPercent, FixtureError, FixtureRepository, Scenario,
};
use passline::config::DataConfig;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Dataset served when `APP_DATA_PATH` is not set.
pub(crate) const DEMO_DATASET: &str = include_str!("../data/demo.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_repository(config: &DataConfig) -> Result<FixtureRepository, FixtureError> {
    let repository = match &config.dataset_path {
        Some(path) => {
            info!(path = %path.display(), "loading admission dataset");
            FixtureRepository::from_path(path)?
        }
        None => {
            info!("APP_DATA_PATH not set, serving bundled demo dataset");
            demo_repository()?
        }
    };

    info!(
        headings = repository.heading_count(),
        students = repository.student_ids().len(),
        "admission dataset ready"
    );
    Ok(repository)
}

pub(crate) fn demo_repository() -> Result<FixtureRepository, FixtureError> {
    FixtureRepository::from_reader(DEMO_DATASET.as_bytes())
}

pub(crate) fn parse_scenario(raw: &str) -> Result<Scenario, String> {
    raw.parse::<Scenario>().map_err(|err| err.to_string())
}

pub(crate) fn parse_percent(raw: &str) -> Result<DrainPercent, String> {
    match parse_percents(raw)?.as_slice() {
        [percent] => Ok(*percent),
        _ => Err(format!("expected a single drain percent, got '{raw}'")),
    }
}
