use telemetry_remote_write::{Sample, TimeSeries};

const MILLIS_PER_SECOND: i64 = 1000;

/// Builds the example series: one sample a second ago and one at `now`.
///
/// `now` is the unix time in seconds; remote write timestamps are milliseconds.
pub fn build_example_series(now: i64) -> Vec<TimeSeries> {
    vec![TimeSeries::for_metric(
        "random_metric",
        vec![("example_label_name", "example_label_value")],
        vec![
            Sample::new(1.0, (now - 1) * MILLIS_PER_SECOND),
            Sample::new(1.0, now * MILLIS_PER_SECOND),
        ],
    )]
}

#[cfg(test)]
mod test {
    use super::*;
    use telemetry_remote_write::Label;

    #[test]
    fn builds_one_series_with_two_samples() {
        let series = build_example_series(1_595_000_000);

        // It names the metric and adds the example label
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].labels,
            vec![
                Label::new("__name__", "random_metric"),
                Label::new("example_label_name", "example_label_value"),
            ]
        );

        // It timestamps the samples in milliseconds, one second apart
        assert_eq!(
            series[0].samples,
            vec![
                Sample::new(1.0, 1_594_999_999_000),
                Sample::new(1.0, 1_595_000_000_000),
            ]
        );
    }
}
