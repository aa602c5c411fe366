use super::common::*;
use crate::admissions::domain::HeadingId;
use crate::admissions::drain_table::{DrainMetric, DrainTable, PLACEHOLDER};

#[test]
fn requested_columns_without_data_render_placeholder() {
    let results = results(Vec::new(), vec![drained(7, 66, 30), drained(7, 33, 21)]);
    let requested = [percent(66), percent(50), percent(33)];

    let table = DrainTable::build(&results, HeadingId(7), Some(requested.as_slice()));

    assert_eq!(table.percents, vec![percent(33), percent(50), percent(66)]);
    assert_eq!(table.rows.len(), DrainMetric::ALL.len());
    for row in &table.rows {
        assert_eq!(row.cells.len(), 3);
        assert_eq!(row.cells[1], PLACEHOLDER, "{} at 50%", row.label);
        assert_ne!(row.cells[0], PLACEHOLDER);
        assert_ne!(row.cells[2], PLACEHOLDER);
    }

    let median = table
        .row(DrainMetric::MedLastAdmittedRatingPlace)
        .expect("median row");
    assert_eq!(median.cells, vec!["21", PLACEHOLDER, "30"]);
    let average = table
        .row(DrainMetric::AvgPassingScore)
        .expect("average row");
    assert_eq!(average.cells[0], "240.25");
}

#[test]
fn columns_default_to_heading_steps() {
    let mut results = results(Vec::new(), vec![drained(7, 33, 21)]);
    results
        .steps
        .insert(HeadingId(7), vec![percent(100), percent(33), percent(66)]);

    let table = DrainTable::build(&results, HeadingId(7), None);

    assert_eq!(table.percents, vec![percent(33), percent(66), percent(100)]);
    let min_score = table.row(DrainMetric::MinPassingScore).expect("row");
    assert_eq!(min_score.cells, vec!["231", PLACEHOLDER, PLACEHOLDER]);
}

#[test]
fn columns_fall_back_to_percents_present_in_data() {
    let results = results(
        Vec::new(),
        vec![drained(7, 66, 30), drained(7, 33, 21), drained(8, 50, 4)],
    );

    let table = DrainTable::build(&results, HeadingId(7), None);

    assert_eq!(table.percents, vec![percent(33), percent(66)]);
    assert!(table
        .rows
        .iter()
        .all(|row| row.cells.iter().all(|cell| cell != PLACEHOLDER)));
}

#[test]
fn heading_without_simulations_yields_empty_table() {
    let results = results(Vec::new(), vec![drained(8, 50, 4)]);

    let table = DrainTable::build(&results, HeadingId(7), None);

    assert!(table.is_empty());
    assert!(table.rows.iter().all(|row| row.cells.is_empty()));
}

#[test]
fn csv_export_includes_header_and_metric_rows() {
    let results = results(Vec::new(), vec![drained(7, 33, 21)]);
    let requested = [percent(33), percent(50)];
    let table = DrainTable::build(&results, HeadingId(7), Some(requested.as_slice()));

    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).expect("csv writes");
    let text = String::from_utf8(buffer).expect("utf8 csv");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "metric,33%,50%");
    assert_eq!(lines.len(), 1 + DrainMetric::ALL.len());
    assert_eq!(lines[1], "Min passing score,231,—");
}
