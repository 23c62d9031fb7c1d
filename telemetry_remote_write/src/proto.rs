//! The protobuf messages of the Prometheus remote write protocol.
//!
//! The field tags must match `prometheus/prompb/types.proto` and `remote.proto`.
//! See [prost](https://github.com/tokio-rs/prost) for more options.

use prost::Message;

/// The label which carries the metric name of a series.
pub const METRIC_NAME_LABEL: &str = "__name__";

#[derive(Clone, PartialEq, Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Label {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Sample {
    #[prost(double, tag = "1")]
    pub value: f64,
    /// Milliseconds since the unix epoch
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

impl Sample {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Sample { value, timestamp }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct TimeSeries {
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new(labels: Vec<Label>, samples: Vec<Sample>) -> Self {
        TimeSeries { labels, samples }
    }

    /// Builds a series whose first label is the `__name__` label,
    /// followed by `labels` in the given order.
    pub fn for_metric<I, N, V>(name: impl Into<String>, labels: I, samples: Vec<Sample>) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let labels = labels.into_iter();
        let mut out = Vec::with_capacity(1 + labels.size_hint().0);
        out.push(Label::new(METRIC_NAME_LABEL, name));
        for (name, value) in labels {
            out.push(Label::new(name, value));
        }
        TimeSeries {
            labels: out,
            samples,
        }
    }

    /// The value of the `__name__` label, if present
    pub fn metric_name(&self) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| label.name == METRIC_NAME_LABEL)
            .map(|label| label.value.as_str())
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct WriteRequest {
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<TimeSeries>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_metric_series() {
        let series = TimeSeries::for_metric(
            "random_metric",
            vec![("b_label", "2"), ("a_label", "1")],
            vec![Sample::new(1.0, 1000)],
        );

        // It puts the metric name first and keeps the label order
        assert_eq!(series.labels.len(), 3);
        assert_eq!(series.labels[0], Label::new("__name__", "random_metric"));
        assert_eq!(series.labels[1], Label::new("b_label", "2"));
        assert_eq!(series.labels[2], Label::new("a_label", "1"));
        assert_eq!(series.metric_name(), Some("random_metric"));

        // It finds no metric name on an unnamed series
        let unnamed = TimeSeries::new(vec![Label::new("job", "push")], vec![]);
        assert_eq!(unnamed.metric_name(), None);
    }

    #[test]
    fn encodes_prompb_field_tags() {
        let sample = Sample::new(1.0, 2);

        // It writes value as field 1 (fixed64) and timestamp as field 2 (varint)
        let bytes = sample.encode_to_vec();
        assert_eq!(bytes[0], 0x09);
        assert_eq!(&bytes[1..9], &1.0f64.to_le_bytes());
        assert_eq!(&bytes[9..], &[0x10, 0x02]);

        // It writes label name as field 1 and value as field 2
        let bytes = Label::new("a", "b").encode_to_vec();
        assert_eq!(bytes, vec![0x0a, 0x01, b'a', 0x12, 0x01, b'b']);
    }
}
