//! Pointer-trace capture
//!
//! A drawing gesture is turned into a [`Trace`]: a start instant, the pointer
//! samples taken at a fixed period while drawing, and an end instant. The
//! [`TraceCollector`] owns the gesture state machine and submits each
//! completed trace to the backend exactly once.

mod collector;
mod sampler;

pub use collector::{CollectorPhase, TraceCollector, Transition};
pub use sampler::PeriodicTask;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pointer reading taken by the sampler
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub pitch: f32,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// A completed drawing gesture
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(with = "iso_millis")]
    pub trace_start: DateTime<Utc>,
    pub trace_body: Vec<PointerSample>,
    #[serde(with = "iso_millis")]
    pub trace_end: DateTime<Utc>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.trace_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace_body.is_empty()
    }

    /// Whether sample timestamps never go backwards and stay within
    /// `trace_start..=trace_end`
    pub fn is_time_ordered(&self) -> bool {
        let mut last = self.trace_start;
        for sample in &self.trace_body {
            if sample.timestamp < last {
                return false;
            }
            last = sample.timestamp;
        }
        last <= self.trace_end
    }
}

/// `2025-01-01T12:00:00.123Z` timestamps, the format the backend stores
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
