use crate::error::{Result, WindRoseError};
use crate::models::{CompassDirection, WindDirection};
use crate::readers::ObservationReader;
use crate::store::ObservationSet;
use crate::utils::constants::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use std::path::Path;

#[derive(Debug)]
pub struct WindStatistics {
    pub total_records: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub speed_stats: SpeedStats,
    pub data_quality: DataQuality,
    pub calm_records: usize,
    pub snow_records: usize,
    pub prevailing_direction: Option<CompassDirection>,
}

#[derive(Debug)]
pub struct SpeedStats {
    pub mean_speed: f64,
    pub max_speed: f64,
    pub max_speed_at: Option<NaiveDateTime>,
}

#[derive(Debug)]
pub struct DataQuality {
    pub total_records: usize,
    pub missing_speed: usize,
    pub missing_direction: usize,
    pub missing_precipitation: usize,
    pub unrecognized_direction: usize,
}

impl DataQuality {
    fn percentage(&self, count: usize) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (count as f64 / self.total_records as f64) * 100.0
    }

    pub fn missing_speed_percentage(&self) -> f64 {
        self.percentage(self.missing_speed)
    }

    pub fn missing_direction_percentage(&self) -> f64 {
        self.percentage(self.missing_direction)
    }

    pub fn missing_precipitation_percentage(&self) -> f64 {
        self.percentage(self.missing_precipitation)
    }
}

pub struct WindAnalyzer;

impl WindAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_file(&self, reader: &ObservationReader, path: &Path) -> Result<WindStatistics> {
        let observations = ObservationSet::load_with(reader, path)?;
        self.analyze(&observations)
    }

    pub fn analyze(&self, observations: &ObservationSet) -> Result<WindStatistics> {
        let time_range = observations
            .time_range()
            .ok_or_else(|| WindRoseError::EmptyInput("archive has no observations".to_string()))?;

        let mut direction_counts = [0usize; CompassDirection::COUNT];
        let mut calm_records = 0;
        let mut snow_records = 0;
        let mut missing_speed = 0;
        let mut missing_direction = 0;
        let mut missing_precipitation = 0;
        let mut unrecognized_direction = 0;

        let mut speed_sum = 0.0f64;
        let mut speed_count = 0usize;
        let mut max_speed = f64::NEG_INFINITY;
        let mut max_speed_at = None;

        for observation in observations {
            match &observation.direction {
                Some(WindDirection::Calm) => calm_records += 1,
                Some(WindDirection::Compass(direction)) => direction_counts[direction.index()] += 1,
                Some(WindDirection::Unrecognized(_)) => unrecognized_direction += 1,
                None => missing_direction += 1,
            }

            match observation.speed {
                Some(speed) => {
                    speed_sum += speed;
                    speed_count += 1;
                    if speed > max_speed {
                        max_speed = speed;
                        max_speed_at = Some(observation.timestamp);
                    }
                }
                None => missing_speed += 1,
            }

            if observation.precipitation_code.is_none() {
                missing_precipitation += 1;
            }
            if observation.is_snow() {
                snow_records += 1;
            }
        }

        let mean_speed = if speed_count > 0 {
            speed_sum / speed_count as f64
        } else {
            f64::NAN
        };
        if max_speed == f64::NEG_INFINITY {
            max_speed = f64::NAN;
        }

        // first in compass order wins ties
        let prevailing_direction = CompassDirection::ALL
            .into_iter()
            .filter(|d| direction_counts[d.index()] > 0)
            .fold(None, |best: Option<CompassDirection>, d| match best {
                Some(b) if direction_counts[b.index()] >= direction_counts[d.index()] => Some(b),
                _ => Some(d),
            });

        Ok(WindStatistics {
            total_records: observations.len(),
            time_range,
            speed_stats: SpeedStats {
                mean_speed,
                max_speed,
                max_speed_at,
            },
            data_quality: DataQuality {
                total_records: observations.len(),
                missing_speed,
                missing_direction,
                missing_precipitation,
                unrecognized_direction,
            },
            calm_records,
            snow_records,
            prevailing_direction,
        })
    }
}

impl WindStatistics {
    pub fn summary(&self) -> String {
        let speeds = if self.speed_stats.mean_speed.is_nan() {
            "No valid measurements".to_string()
        } else {
            format!(
                "mean {:.1} m/s, max {:.1} m/s",
                self.speed_stats.mean_speed, self.speed_stats.max_speed
            )
        };

        let prevailing = self
            .prevailing_direction
            .map(|d| format!("{} ({:.1}°)", d, d.degrees()))
            .unwrap_or_else(|| "none".to_string());

        format!(
            "Records: {} total\n\
            Time Range: {} to {}\n\
            Calm: {}, Snow: {}\n\
            Wind Speed: {}\n\
            Prevailing Direction: {}\n\
            Data Quality: {:.1}% missing speed, {:.1}% missing direction, {:.1}% missing precipitation",
            self.total_records,
            self.time_range.0.format(TIMESTAMP_FORMAT),
            self.time_range.1.format(TIMESTAMP_FORMAT),
            self.calm_records,
            self.snow_records,
            speeds,
            prevailing,
            self.data_quality.missing_speed_percentage(),
            self.data_quality.missing_direction_percentage(),
            self.data_quality.missing_precipitation_percentage(),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let strongest = match self.speed_stats.max_speed_at {
            Some(at) => format!(
                "{:.1} m/s at {}",
                self.speed_stats.max_speed,
                at.format(TIMESTAMP_FORMAT)
            ),
            None => "No valid measurements".to_string(),
        };

        let mut summary = format!("{}\n\nStrongest wind: {}", self.summary(), strongest);
        if self.data_quality.unrecognized_direction > 0 {
            summary.push_str(&format!(
                "\nUnrecognized direction codes: {}",
                self.data_quality.unrecognized_direction
            ));
        }
        summary
    }
}

impl Default for WindAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
