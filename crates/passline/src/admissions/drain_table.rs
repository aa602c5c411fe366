use std::collections::BTreeSet;
use std::io::Write;

use serde::{Deserialize, Serialize};

use super::domain::{DrainPercent, DrainedResult, HeadingId, ResultsBundle};

/// Rendered in cells with no simulation data behind them.
pub const PLACEHOLDER: &str = "—";

/// The eight statistics reported for every drain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainMetric {
    MinPassingScore,
    MaxPassingScore,
    AvgPassingScore,
    MedPassingScore,
    MinLastAdmittedRatingPlace,
    MaxLastAdmittedRatingPlace,
    AvgLastAdmittedRatingPlace,
    MedLastAdmittedRatingPlace,
}

impl DrainMetric {
    pub const ALL: [DrainMetric; 8] = [
        DrainMetric::MinPassingScore,
        DrainMetric::MaxPassingScore,
        DrainMetric::AvgPassingScore,
        DrainMetric::MedPassingScore,
        DrainMetric::MinLastAdmittedRatingPlace,
        DrainMetric::MaxLastAdmittedRatingPlace,
        DrainMetric::AvgLastAdmittedRatingPlace,
        DrainMetric::MedLastAdmittedRatingPlace,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DrainMetric::MinPassingScore => "Min passing score",
            DrainMetric::MaxPassingScore => "Max passing score",
            DrainMetric::AvgPassingScore => "Average passing score",
            DrainMetric::MedPassingScore => "Median passing score",
            DrainMetric::MinLastAdmittedRatingPlace => "Min last admitted place",
            DrainMetric::MaxLastAdmittedRatingPlace => "Max last admitted place",
            DrainMetric::AvgLastAdmittedRatingPlace => "Average last admitted place",
            DrainMetric::MedLastAdmittedRatingPlace => "Median last admitted place",
        }
    }

    fn render(self, result: &DrainedResult) -> String {
        match self {
            DrainMetric::MinPassingScore => result.min_passing_score.to_string(),
            DrainMetric::MaxPassingScore => result.max_passing_score.to_string(),
            DrainMetric::AvgPassingScore => format_decimal(result.avg_passing_score),
            DrainMetric::MedPassingScore => format_decimal(result.med_passing_score),
            DrainMetric::MinLastAdmittedRatingPlace => {
                result.min_last_admitted_rating_place.to_string()
            }
            DrainMetric::MaxLastAdmittedRatingPlace => {
                result.max_last_admitted_rating_place.to_string()
            }
            DrainMetric::AvgLastAdmittedRatingPlace => {
                format_decimal(result.avg_last_admitted_rating_place)
            }
            DrainMetric::MedLastAdmittedRatingPlace => {
                result.med_last_admitted_rating_place.to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainTableRow {
    pub metric: DrainMetric,
    pub label: String,
    pub cells: Vec<String>,
}

/// Metric × percent pivot of the drain simulations for one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainTable {
    pub heading_id: HeadingId,
    pub percents: Vec<DrainPercent>,
    pub rows: Vec<DrainTableRow>,
}

impl DrainTable {
    /// Pivots the drained results for `heading_id`.
    ///
    /// Columns come from `requested` when given, otherwise from the heading's entry in
    /// `steps`, otherwise from the percents present in the data.
    pub fn build(
        results: &ResultsBundle,
        heading_id: HeadingId,
        requested: Option<&[DrainPercent]>,
    ) -> Self {
        let records: Vec<&DrainedResult> = results
            .drained
            .iter()
            .filter(|result| result.heading_id == heading_id)
            .collect();

        let percents: BTreeSet<DrainPercent> = match (requested, results.steps_for(heading_id)) {
            (Some(requested), _) => requested.iter().copied().collect(),
            (None, Some(steps)) => steps.iter().copied().collect(),
            (None, None) => records.iter().map(|result| result.drained_percent).collect(),
        };
        let percents: Vec<DrainPercent> = percents.into_iter().collect();

        let columns: Vec<Option<&DrainedResult>> = percents
            .iter()
            .map(|percent| {
                records
                    .iter()
                    .copied()
                    .find(|result| result.drained_percent == *percent)
            })
            .collect();

        let rows = DrainMetric::ALL
            .iter()
            .map(|metric| DrainTableRow {
                metric: *metric,
                label: metric.label().to_string(),
                cells: columns
                    .iter()
                    .map(|column| match column {
                        Some(result) => metric.render(result),
                        None => PLACEHOLDER.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            heading_id,
            percents,
            rows,
        }
    }

    pub fn row(&self, metric: DrainMetric) -> Option<&DrainTableRow> {
        self.rows.iter().find(|row| row.metric == metric)
    }

    pub fn is_empty(&self) -> bool {
        self.percents.is_empty()
    }

    /// Writes the table as CSV with a `metric,<p>%,...` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["metric".to_string()];
        header.extend(self.percents.iter().map(ToString::to_string));
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.label.clone()];
            record.extend(row.cells.iter().cloned());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn format_decimal(value: f64) -> String {
    let rendered = format!("{value:.2}");
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_decimal_trims_trailing_zeros() {
        assert_eq!(format_decimal(238.0), "238");
        assert_eq!(format_decimal(238.5), "238.5");
        assert_eq!(format_decimal(60.256), "60.26");
    }
}
