use super::domain::{HeadingId, RatingPlace, ResultsBundle, Scenario};

/// A place clears the bar when it is no worse than the last admitted place.
pub const fn passes(rank: RatingPlace, last_admitted_rank: RatingPlace) -> bool {
    rank <= last_admitted_rank
}

/// Signed margin to the cutoff: positive is a safety margin, negative a shortfall.
///
/// Returns `None` when the rank sits exactly on the cutoff, since there is no margin to
/// report even though [`passes`] holds.
pub fn delta(rank: RatingPlace, last_admitted_rank: RatingPlace) -> Option<String> {
    let margin = i64::from(last_admitted_rank) - i64::from(rank);
    match margin {
        0 => None,
        _ => Some(format!("{margin:+}")),
    }
}

/// Last admitted place for `heading_id` under `scenario`.
///
/// Drained scenarios use the median over simulation runs so a single outlier run does not
/// move the bar.
pub fn cutoff_for(
    results: &ResultsBundle,
    heading_id: HeadingId,
    scenario: Scenario,
) -> Option<RatingPlace> {
    match scenario {
        Scenario::Primary => results
            .primary_for(heading_id)
            .map(|result| result.last_admitted_rating_place),
        Scenario::Drained(percent) => results
            .drained_for(heading_id, percent)
            .map(|result| result.med_last_admitted_rating_place),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admissions::domain::{DrainPercent, DrainedResult, PrimaryResult};

    #[test]
    fn rank_equal_to_cutoff_passes() {
        assert!(passes(20, 20));
        assert!(passes(1, 20));
        assert!(!passes(21, 20));
    }

    #[test]
    fn delta_matches_sign_and_magnitude_of_margin() {
        for rank in 1..=30u32 {
            for cutoff in 1..=30u32 {
                let value = delta(rank, cutoff);
                if rank == cutoff {
                    assert_eq!(value, None);
                    continue;
                }
                let text = value.expect("non-zero margin renders");
                let parsed: i64 = text.parse().expect("delta is numeric");
                assert_eq!(parsed, i64::from(cutoff) - i64::from(rank));
                assert_eq!(text.starts_with('+'), cutoff > rank);
            }
        }
    }

    #[test]
    fn delta_formats_margin_and_shortfall() {
        assert_eq!(delta(10, 15).as_deref(), Some("+5"));
        assert_eq!(delta(10, 5).as_deref(), Some("-5"));
    }

    #[test]
    fn cutoff_uses_median_for_drained_scenarios() {
        let percent = DrainPercent::new(50).expect("valid percent");
        let results = ResultsBundle {
            primary: vec![PrimaryResult {
                heading_id: HeadingId(7),
                passing_score: 250,
                last_admitted_rating_place: 40,
                calculated_at: None,
            }],
            drained: vec![DrainedResult {
                heading_id: HeadingId(7),
                drained_percent: percent,
                min_passing_score: 230,
                max_passing_score: 245,
                avg_passing_score: 238.5,
                med_passing_score: 239.0,
                min_last_admitted_rating_place: 48,
                max_last_admitted_rating_place: 71,
                avg_last_admitted_rating_place: 60.2,
                med_last_admitted_rating_place: 59,
            }],
            steps: Default::default(),
        };

        assert_eq!(cutoff_for(&results, HeadingId(7), Scenario::Primary), Some(40));
        assert_eq!(
            cutoff_for(&results, HeadingId(7), Scenario::Drained(percent)),
            Some(59)
        );
        let missing = DrainPercent::new(66).expect("valid percent");
        assert_eq!(
            cutoff_for(&results, HeadingId(7), Scenario::Drained(missing)),
            None
        );
        assert_eq!(cutoff_for(&results, HeadingId(8), Scenario::Primary), None);
    }
}
