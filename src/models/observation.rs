use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::direction::{CompassDirection, WindDirection};
use crate::utils::constants::SNOW_PRECIPITATION_CODE;

/// One meteorological record. Absent fields are `None`, never defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub direction: Option<WindDirection>,
    pub speed: Option<f64>,
    pub precipitation_code: Option<i64>,
}

impl Observation {
    pub fn new(
        timestamp: NaiveDateTime,
        direction: Option<WindDirection>,
        speed: Option<f64>,
        precipitation_code: Option<i64>,
    ) -> Self {
        Self {
            timestamp,
            direction,
            speed,
            precipitation_code,
        }
    }

    pub fn is_calm(&self) -> bool {
        self.direction.as_ref().is_some_and(|d| d.is_calm())
    }

    pub fn is_snow(&self) -> bool {
        self.precipitation_code == Some(SNOW_PRECIPITATION_CODE)
    }

    /// A NaN or infinite speed counts as absent.
    pub fn has_speed(&self) -> bool {
        self.speed.is_some_and(f64::is_finite)
    }

    pub fn has_direction(&self) -> bool {
        self.direction.is_some()
    }

    /// The `(direction, speed)` pair used for aggregation, or `None` when
    /// either field is absent or the speed is not finite. An unrecognized or
    /// calm direction is an error.
    pub fn wind_sample(&self) -> Result<Option<WindSample>> {
        match (&self.direction, self.speed) {
            (Some(direction), Some(speed)) if speed.is_finite() => Ok(Some(WindSample {
                direction: direction.compass()?,
                speed,
            })),
            _ => Ok(None),
        }
    }
}

/// A filtered `(direction, speed)` pair. This is the only input an external
/// polar-plot renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    pub direction: CompassDirection,
    pub speed: f64,
}

impl WindSample {
    pub fn new(direction: CompassDirection, speed: f64) -> Self {
        Self { direction, speed }
    }

    pub fn azimuth(&self) -> f64 {
        self.direction.degrees()
    }
}
