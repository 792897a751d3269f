use crate::error::Result;
use crate::models::Observation;
use crate::readers::ObservationReader;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

/// A station's observations in source order. Immutable once loaded; every
/// query returns a new set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

impl ObservationSet {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Load a normalized station archive with default settings.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(&ObservationReader::new(), path)
    }

    pub fn load_with(reader: &ObservationReader, path: &Path) -> Result<Self> {
        reader.read_observations(path).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Observations with `from < timestamp < to`. Both bounds are excluded.
    pub fn slice(&self, from: NaiveDateTime, to: NaiveDateTime) -> ObservationSet {
        let observations: Vec<Observation> = self
            .observations
            .iter()
            .filter(|o| from < o.timestamp && o.timestamp < to)
            .cloned()
            .collect();

        debug!(
            %from,
            %to,
            selected = observations.len(),
            of = self.observations.len(),
            "sliced open interval"
        );
        ObservationSet::new(observations)
    }

    /// Source position of the first observation at exactly `timestamp`.
    pub fn index_of(&self, timestamp: NaiveDateTime) -> Option<usize> {
        self.observations
            .iter()
            .position(|o| o.timestamp == timestamp)
    }

    pub fn contains_timestamp(&self, timestamp: NaiveDateTime) -> bool {
        self.index_of(timestamp).is_some()
    }

    /// Observations between two source positions, both included, whichever
    /// order the positions are given in.
    pub fn slice_by_index(&self, a: usize, b: usize) -> ObservationSet {
        if self.observations.is_empty() {
            return ObservationSet::default();
        }

        let last = self.observations.len() - 1;
        let start = a.min(b).min(last);
        let end = a.max(b).min(last);
        ObservationSet::new(self.observations[start..=end].to_vec())
    }

    /// Earliest and latest timestamps, regardless of source order.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.observations.iter().map(|o| o.timestamp).min()?;
        let max = self.observations.iter().map(|o| o.timestamp).max()?;
        Some((min, max))
    }
}

impl From<Vec<Observation>> for ObservationSet {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
