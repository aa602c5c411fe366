use crate::infra::{load_repository, parse_percent, parse_scenario};
use clap::Args;
use passline::admissions::{
    AdmissionOverview, AdmissionService, DrainPercent, DrainTable, FixtureRepository,
    HeadingId, HeadingSummary, PassingState, ProgramRow, Scenario, StudentId,
    UniversitySection,
};
use passline::config::AppConfig;
use passline::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// Applicant identifier, e.g. "163-554-201 18"
    pub(crate) student_id: String,
    /// Scenario to evaluate: `primary` or `drained-<percent>`
    #[arg(long, value_parser = parse_scenario, default_value = "primary")]
    pub(crate) scenario: Scenario,
    /// JSON dataset to read instead of APP_DATA_PATH or the bundled demo data
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Print the overview as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DrainArgs {
    /// Heading identifier
    pub(crate) heading_id: u64,
    /// Comma separated percents to show; defaults to the heading's simulated steps
    #[arg(long, value_delimiter = ',', value_parser = parse_percent)]
    pub(crate) percents: Vec<DrainPercent>,
    /// JSON dataset to read instead of APP_DATA_PATH or the bundled demo data
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Emit CSV instead of an aligned table
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON dataset to read instead of APP_DATA_PATH or the bundled demo data
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
}

pub(crate) fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let LookupArgs {
        student_id,
        scenario,
        dataset,
        json,
    } = args;

    let service = build_service(dataset)?;
    let overview = service.lookup(&StudentId(student_id), scenario)?;

    if json {
        match serde_json::to_string_pretty(&overview) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Overview payload unavailable: {err}"),
        }
    } else {
        for line in render_overview(&overview) {
            println!("{line}");
        }
    }

    Ok(())
}

pub(crate) fn run_drain(args: DrainArgs) -> Result<(), AppError> {
    let DrainArgs {
        heading_id,
        percents,
        dataset,
        csv,
    } = args;

    let service = build_service(dataset)?;
    let requested = (!percents.is_empty()).then_some(percents.as_slice());
    let table = service.drain_table(HeadingId(heading_id), requested)?;

    if csv {
        table.write_csv(std::io::stdout().lock())?;
    } else {
        let summary = service.heading_summary(HeadingId(heading_id))?;
        for line in render_heading(&summary) {
            println!("{line}");
        }
        for line in render_drain_table(&table) {
            println!("{line}");
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(load_dataset(args.dataset)?);
    let student_ids = repository.student_ids();
    let service = AdmissionService::new(repository);

    println!("Admission analytics demo ({} applicants)", student_ids.len());

    for student_id in &student_ids {
        println!();
        let overview = match service.lookup(student_id, Scenario::Primary) {
            Ok(overview) => overview,
            Err(err) => {
                println!("Lookup for {student_id} failed [{}]: {err}", err.kind());
                continue;
            }
        };
        for line in render_overview(&overview) {
            println!("{line}");
        }

        let Some(focus) = focus_row(&overview) else {
            continue;
        };
        let summary = match service.heading_summary(focus.heading_id) {
            Ok(summary) => summary,
            Err(err) => {
                println!("  Heading {} unavailable: {err}", focus.heading_id);
                continue;
            }
        };

        for percent in &summary.drain_steps {
            match service.lookup(student_id, Scenario::Drained(*percent)) {
                Ok(drained) => {
                    let row = drained
                        .sections()
                        .flat_map(|section| section.rows.iter())
                        .find(|row| row.heading_id == focus.heading_id);
                    if let Some(row) = row {
                        println!(
                            "  If {} of admitted drop out: {} {}",
                            percent,
                            row.heading_code,
                            verdict(row)
                        );
                    }
                }
                Err(err) => println!("  Drained {percent} unavailable: {err}"),
            }
        }

        if let Ok(table) = service.drain_table(focus.heading_id, None) {
            if !table.is_empty() {
                for line in render_drain_table(&table) {
                    println!("  {line}");
                }
            }
        }
    }

    Ok(())
}

fn load_dataset(dataset: Option<PathBuf>) -> Result<FixtureRepository, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dataset) = dataset {
        config.data.dataset_path = Some(dataset);
    }
    Ok(load_repository(&config.data)?)
}

fn build_service(
    dataset: Option<PathBuf>,
) -> Result<AdmissionService<FixtureRepository>, AppError> {
    Ok(AdmissionService::new(Arc::new(load_dataset(dataset)?)))
}

/// The highlighted row of the passing section, or its first row.
fn focus_row(overview: &AdmissionOverview) -> Option<&ProgramRow> {
    let section = &overview.passing_section;
    section.highlighted_row().or_else(|| section.rows.first())
}

fn verdict(row: &ProgramRow) -> String {
    match (row.passes, row.delta.as_deref()) {
        (Some(true), Some(delta)) => format!("passes ({delta})"),
        (Some(true), None) => "passes (on the cutoff)".to_string(),
        (Some(false), Some(delta)) => format!("does not pass ({delta})"),
        (Some(false), None) => "does not pass".to_string(),
        (None, _) => "has no result".to_string(),
    }
}

pub(crate) fn render_overview(overview: &AdmissionOverview) -> Vec<String> {
    let mut lines = vec![format!(
        "Applicant {} ({})",
        overview.student_id, overview.scenario
    )];

    match overview.passing_state {
        PassingState::Passing => lines.push(format!(
            "Passing at {}",
            overview.passing_section.university_code
        )),
        PassingState::NotPassingAnywhere => lines.push(format!(
            "Not passing anywhere yet; first institution shown: {}",
            overview.passing_section.university_code
        )),
    }
    lines.extend(render_section(&overview.passing_section));

    if !overview.secondary_sections.is_empty() {
        lines.push("Other institutions".to_string());
        for section in &overview.secondary_sections {
            lines.push(section.university_code.to_string());
            lines.extend(render_section(section));
        }
    }

    lines
}

fn render_section(section: &UniversitySection) -> Vec<String> {
    section
        .rows
        .iter()
        .map(|row| {
            let marker = if section.highlight_priority == Some(row.priority) {
                '*'
            } else {
                ' '
            };
            format!(
                "  {marker} {:>2}  {:<9} {:<40} score {:>3}  place {:>4}  {:>5}  [{}]",
                row.priority.0,
                row.heading_code,
                row.program_name,
                row.score,
                row.rating_place,
                row.delta.as_deref().unwrap_or(""),
                row.status.label()
            )
        })
        .collect()
}

pub(crate) fn render_heading(summary: &HeadingSummary) -> Vec<String> {
    let heading = &summary.heading;
    let mut lines = vec![format!(
        "{} {} ({}), {} seats",
        heading.code, heading.name, heading.university_code, summary.total_capacity
    )];

    match &summary.primary {
        Some(result) => {
            let calculated = result
                .calculated_at
                .map(|at| format!(" as of {}", at.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default();
            lines.push(format!(
                "Passing score {} / last admitted place {}{}",
                result.passing_score, result.last_admitted_rating_place, calculated
            ));
        }
        None => lines.push("No current ranking published".to_string()),
    }

    lines
}

pub(crate) fn render_drain_table(table: &DrainTable) -> Vec<String> {
    let label_width = table
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut header = format!("{:<label_width$}", "");
    for percent in &table.percents {
        header.push_str(&format!(" {:>8}", percent.to_string()));
    }

    let mut lines = vec![header];
    for row in &table.rows {
        let mut line = format!("{:<label_width$}", row.label);
        for cell in &row.cells {
            line.push_str(&format!(" {:>8}", cell));
        }
        lines.push(line);
    }
    lines
}
