use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::duration::format_duration;

pub const RESOLUTION_WARNING: &str = "resolution larger than query range";

/// Receives every range discovered while inspecting a query.
pub trait RangeObserver {
    fn verify_temporal_range(&mut self, range: Duration);
}

/// Non-fatal condition attached to a query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warning {
    pub name: String,
    pub message: String,
}

impl Warning {
    /// Header form, `<name>_<message>`.
    pub fn header(&self) -> String {
        format!("{}_{}", self.name, self.message)
    }
}

/// Per-query result annotations.
///
/// Created fresh for each top-level query, filled in by storage (resolutions,
/// exhaustiveness) and by range inspection, then read once when the response
/// is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub exhaustive: bool,
    /// Resolutions of the data that backed the result.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "millis_vec")]
    pub resolutions: Vec<Duration>,
    /// Every range handed to [`RangeObserver::verify_temporal_range`].
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "millis_vec")]
    pub observed_ranges: Vec<Duration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl Default for ResultMetadata {
    fn default() -> Self {
        Self {
            exhaustive: true,
            resolutions: Vec::new(),
            observed_ranges: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ResultMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolutions(mut self, resolutions: impl IntoIterator<Item = Duration>) -> Self {
        self.resolutions.extend(resolutions);
        self
    }

    pub fn add_resolution(&mut self, resolution: Duration) {
        self.resolutions.push(resolution);
    }

    pub fn mark_non_exhaustive(&mut self) {
        self.exhaustive = false;
    }

    /// Adds a warning unless an identical one is already present.
    pub fn add_warning(&mut self, name: impl Into<String>, message: impl Into<String>) {
        let warning = Warning {
            name: name.into(),
            message: message.into(),
        };
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn warning_strings(&self) -> Vec<String> {
        self.warnings.iter().map(Warning::header).collect()
    }

    pub fn has_coverage_warning(&self) -> bool {
        self.warnings
            .iter()
            .any(|warning| warning.name == RESOLUTION_WARNING)
    }

    /// Merges annotations from another partial result.
    pub fn combine(mut self, other: Self) -> Self {
        self.exhaustive = self.exhaustive && other.exhaustive;
        self.resolutions.extend(other.resolutions);
        self.observed_ranges.extend(other.observed_ranges);
        for warning in other.warnings {
            self.add_warning(warning.name, warning.message);
        }
        self
    }
}

impl RangeObserver for ResultMetadata {
    /// Records `range` and warns when any backing resolution is coarser than
    /// it, since such data cannot fill the range.
    fn verify_temporal_range(&mut self, range: Duration) {
        self.observed_ranges.push(range);

        let coarser = self
            .resolutions
            .iter()
            .copied()
            .filter(|resolution| *resolution > range)
            .collect::<BTreeSet<_>>();
        if coarser.is_empty() {
            return;
        }

        let resolutions = coarser
            .into_iter()
            .map(format_duration)
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!("range: {}, resolutions: {resolutions}", format_duration(range));
        info!(%message, "query range not covered by data resolution");
        self.add_warning(RESOLUTION_WARNING, message);
    }
}

mod millis_vec {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(values: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            values
                .iter()
                .map(|value| u64::try_from(value.as_millis()).unwrap_or(u64::MAX)),
        )
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u64>::deserialize(deserializer)?;
        Ok(millis.into_iter().map(Duration::from_millis).collect())
    }
}
