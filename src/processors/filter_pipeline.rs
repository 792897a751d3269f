use crate::error::Result;
use crate::models::{FilterCriteria, Observation, WindSample};
use crate::store::ObservationSet;
use crate::utils::constants::DEFAULT_WIND_THRESHOLD;
use tracing::debug;

/// A stateless predicate over observations.
pub trait ObservationFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn keep(&self, observation: &Observation) -> bool;

    fn apply(&self, mut observations: Vec<Observation>) -> Vec<Observation> {
        observations.retain(|o| self.keep(o));
        observations
    }
}

/// Drops observations whose direction is the calm sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveCalm;

impl ObservationFilter for RemoveCalm {
    fn name(&self) -> &'static str {
        "remove_calm"
    }

    fn keep(&self, observation: &Observation) -> bool {
        !observation.is_calm()
    }
}

/// Keeps snow observations only. Identity when disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepSnowOnly {
    pub enabled: bool,
}

impl ObservationFilter for KeepSnowOnly {
    fn name(&self) -> &'static str {
        "keep_snow_only"
    }

    fn keep(&self, observation: &Observation) -> bool {
        !self.enabled || observation.is_snow()
    }
}

/// Keeps observations with `speed >= threshold`. Identity when disabled;
/// absent speeds are dropped when enabled.
#[derive(Debug, Clone, Copy)]
pub struct KeepWindAtLeast {
    pub enabled: bool,
    pub threshold: f64,
}

impl Default for KeepWindAtLeast {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_WIND_THRESHOLD,
        }
    }
}

impl ObservationFilter for KeepWindAtLeast {
    fn name(&self) -> &'static str {
        "keep_wind_at_least"
    }

    fn keep(&self, observation: &Observation) -> bool {
        !self.enabled || observation.speed.is_some_and(|s| s >= self.threshold)
    }
}

pub fn remove_calm(observations: Vec<Observation>) -> Vec<Observation> {
    RemoveCalm.apply(observations)
}

pub fn keep_snow_only(observations: Vec<Observation>, enabled: bool) -> Vec<Observation> {
    KeepSnowOnly { enabled }.apply(observations)
}

pub fn keep_wind_at_least(
    observations: Vec<Observation>,
    enabled: bool,
    threshold: f64,
) -> Vec<Observation> {
    KeepWindAtLeast { enabled, threshold }.apply(observations)
}

/// Calm removal, then the snow filter, then the wind filter.
pub struct FilterPipeline {
    wind_threshold: f64,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            wind_threshold: DEFAULT_WIND_THRESHOLD,
        }
    }

    pub fn with_wind_threshold(mut self, wind_threshold: f64) -> Self {
        self.wind_threshold = wind_threshold;
        self
    }

    pub fn wind_threshold(&self) -> f64 {
        self.wind_threshold
    }

    /// Filters for `criteria`, in application order.
    pub fn filters(&self, criteria: &FilterCriteria) -> Vec<Box<dyn ObservationFilter>> {
        vec![
            Box::new(RemoveCalm),
            Box::new(KeepSnowOnly {
                enabled: criteria.snow_only,
            }),
            Box::new(KeepWindAtLeast {
                enabled: criteria.wind_at_least_3,
                threshold: self.wind_threshold,
            }),
        ]
    }

    /// Run every filter over an already windowed set.
    pub fn apply(&self, observations: &ObservationSet, criteria: &FilterCriteria) -> Vec<Observation> {
        let mut retained = observations.observations().to_vec();

        for filter in self.filters(criteria) {
            let before = retained.len();
            retained = filter.apply(retained);
            debug!(
                filter = filter.name(),
                before,
                after = retained.len(),
                "applied filter"
            );
        }

        retained
    }

    /// Filtered `(direction, speed)` pairs. Observations missing either field
    /// are dropped here; a direction outside the compass set is an error.
    pub fn samples(
        &self,
        observations: &ObservationSet,
        criteria: &FilterCriteria,
    ) -> Result<Vec<WindSample>> {
        let retained = self.apply(observations, criteria);

        let mut samples = Vec::with_capacity(retained.len());
        for observation in &retained {
            if let Some(sample) = observation.wind_sample()? {
                samples.push(sample);
            }
        }

        debug!(
            retained = retained.len(),
            complete = samples.len(),
            "collected wind samples"
        );
        Ok(samples)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
