use crate::error::{Result, WindRoseError};
use crate::models::StationMetadata;
use crate::processors::{Aggregator, FilterPipeline};
use crate::readers::{ColumnMapping, ObservationReader};
use crate::utils::constants::{
    DEFAULT_DRIFT_TOLERANCE, DEFAULT_PERCENT_PRECISION, DEFAULT_WIND_THRESHOLD, ENV_PREFIX,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// Runtime settings, layered as built-in defaults, then an optional file,
/// then `WINDROSE__*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub columns: ColumnMapping,

    #[validate(length(equal = 1))]
    pub delimiter: String,

    pub use_mmap: bool,

    #[validate(range(min = 0.0, max = 100.0))]
    pub wind_threshold: f64,

    /// Decimals shown for percentages.
    #[validate(range(max = 6))]
    pub percent_precision: usize,

    #[validate(range(min = 0.0))]
    pub drift_tolerance: f64,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub stations: Vec<StationMetadata>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            delimiter: ",".to_string(),
            use_mmap: false,
            wind_threshold: DEFAULT_WIND_THRESHOLD,
            percent_precision: DEFAULT_PERCENT_PRECISION,
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
            max_workers: num_cpus::get(),
            stations: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validated()
    }

    /// Check every field and every configured station.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        for station in &self.stations {
            station.validate()?;
        }
        self.delimiter_byte()?;

        debug!(
            stations = self.stations.len(),
            wind_threshold = self.wind_threshold,
            "settings loaded"
        );
        Ok(self)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(WindRoseError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }

    pub fn reader(&self) -> Result<ObservationReader> {
        Ok(ObservationReader::new()
            .with_columns(self.columns.clone())
            .with_delimiter(self.delimiter_byte()?)
            .with_mmap(self.use_mmap))
    }

    pub fn filter_pipeline(&self) -> FilterPipeline {
        FilterPipeline::new().with_wind_threshold(self.wind_threshold)
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new().with_drift_tolerance(self.drift_tolerance)
    }
}
