use crate::config::Settings;
use crate::error::{Result, WindRoseError};
use crate::models::{
    AbsolutePivot, DateWindow, FilterCriteria, PercentagePivot, StationMetadata, WindSample,
};
use crate::processors::{Aggregator, FilterPipeline, WindowResolver};
use crate::readers::ObservationReader;
use crate::store::ObservationSet;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything one wind rose request produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoseResult {
    pub station: StationMetadata,
    pub criteria: FilterCriteria,
    /// Filtered `(direction, speed)` pairs, the polar plot input.
    pub samples: Vec<WindSample>,
    pub absolute: AbsolutePivot,
    pub percentage: PercentagePivot,
}

/// Outcome of one station in a batch run.
#[derive(Debug)]
pub struct StationOutcome {
    pub station: StationMetadata,
    pub result: Result<RoseResult>,
}

pub struct RoseProcessor {
    reader: ObservationReader,
    pipeline: FilterPipeline,
    aggregator: Aggregator,
    max_workers: usize,
}

impl RoseProcessor {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            reader: settings.reader()?,
            pipeline: settings.filter_pipeline(),
            aggregator: settings.aggregator(),
            max_workers: settings.max_workers.max(1),
        })
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn load(&self, station: &StationMetadata) -> Result<ObservationSet> {
        ObservationSet::load_with(&self.reader, &station.path)
    }

    /// Load a station archive and build its wind rose.
    pub fn process(
        &self,
        station: &StationMetadata,
        criteria: &FilterCriteria,
    ) -> Result<RoseResult> {
        criteria.window.validate()?;

        let observations = self.load(station)?;
        self.process_set(station, &observations, criteria)
    }

    /// Build a wind rose from an already loaded set.
    pub fn process_set(
        &self,
        station: &StationMetadata,
        observations: &ObservationSet,
        criteria: &FilterCriteria,
    ) -> Result<RoseResult> {
        criteria.window.validate()?;

        let windowed = select_window(observations, &criteria.window)?;
        let samples = self
            .pipeline
            .samples(&windowed, criteria)
            .map_err(|e| {
                if let WindRoseError::UnknownDirection(code) = &e {
                    error!(station = %station.name, code = %code, "direction outside the compass set");
                }
                e
            })?;

        if samples.is_empty() {
            return Err(WindRoseError::EmptyInput(criteria.empty_message()));
        }

        let (absolute, percentage) = self.aggregator.build(&samples)?;

        info!(
            station = %station.name,
            window = %criteria.window,
            windowed = windowed.len(),
            samples = samples.len(),
            speeds = absolute.row_count(),
            "built wind rose"
        );

        Ok(RoseResult {
            station: station.clone(),
            criteria: *criteria,
            samples,
            absolute,
            percentage,
        })
    }

    /// Process stations in parallel, each on its own loaded set. A failing
    /// station does not stop the others.
    pub fn process_stations(
        &self,
        stations: &[StationMetadata],
        criteria: &FilterCriteria,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<StationOutcome>> {
        criteria.window.validate()?;

        let total_stations = stations.len();
        let processed_count = Arc::new(AtomicUsize::new(0));

        if let Some(p) = progress {
            p.set_message(&format!("Processing {} stations...", total_stations));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| WindRoseError::Config(e.to_string()))?;

        let outcomes: Vec<StationOutcome> = pool.install(|| {
            stations
                .par_iter()
                .map(|station| {
                    let result = self.process(station, criteria);
                    if let Err(e) = &result {
                        warn!(station = %station.name, error = %e, "station failed");
                    }

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    StationOutcome {
                        station: station.clone(),
                        result,
                    }
                })
                .collect()
        });

        if let Some(p) = progress {
            p.finish_with_message(&format!("Processed {} stations", total_stations));
        }

        Ok(outcomes)
    }
}

/// Observations inside a date window: an open interval slice, or the
/// synoptic snap for calendar dates.
pub fn select_window(observations: &ObservationSet, window: &DateWindow) -> Result<ObservationSet> {
    match *window {
        DateWindow::Interval { from, to } => Ok(observations.slice(from, to)),
        DateWindow::SynopticDates { from, to } => WindowResolver::new(observations).select(from, to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompassDirection, Observation, WindDirection};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn obs(day: u32, hour: u32, direction: &str, speed: f64, precipitation: i64) -> Observation {
        Observation::new(
            at(day, hour),
            WindDirection::parse(direction),
            Some(speed),
            Some(precipitation),
        )
    }

    fn processor() -> RoseProcessor {
        RoseProcessor::new(&Settings::default()).unwrap()
    }

    fn station() -> StationMetadata {
        StationMetadata::new("Orel", "orel.csv")
    }

    fn week() -> ObservationSet {
        ObservationSet::new(vec![
            obs(1, 0, "N", 2.0, 0),
            obs(1, 3, "N", 4.0, 2),
            obs(1, 6, "CALM", 0.0, 2),
            obs(2, 0, "E", 4.0, 2),
            obs(2, 3, "S", 1.0, 0),
            obs(3, 0, "W", 5.0, 1),
        ])
    }

    #[test]
    fn test_interval_excludes_bounds() {
        let criteria = FilterCriteria::new(DateWindow::interval(at(1, 0), at(3, 0)));

        let result = processor().process_set(&station(), &week(), &criteria).unwrap();

        // 01 00:00 and 03 00:00 sit on the bounds
        assert_eq!(result.absolute.total_count(), 3);
        assert_eq!(result.samples.len(), 3);
        assert_eq!(result.absolute.value(4.0, CompassDirection::N), Some(1));
        assert_eq!(result.absolute.value(2.0, CompassDirection::N), None);
    }

    #[test]
    fn test_nan_speed_is_not_counted() {
        let set = ObservationSet::new(vec![
            obs(1, 3, "N", 1.0, 0),
            obs(1, 6, "W", f64::NAN, 0),
        ]);
        let criteria = FilterCriteria::new(DateWindow::interval(at(1, 0), at(2, 0)));

        let result = processor().process_set(&station(), &set, &criteria).unwrap();

        assert_eq!(result.samples.len(), 1);
        assert_eq!(result.absolute.total_count(), 1);
        assert_eq!(result.absolute.row_count(), 1);
        assert_eq!(result.absolute.column_total(CompassDirection::W), 0);
        assert_eq!(result.percentage.column_total(CompassDirection::W), 0.0);
        assert!((result.percentage.grand_total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_filters_combine() {
        let criteria = FilterCriteria::new(DateWindow::interval(at(1, 0), at(3, 0)))
            .with_snow_only(true)
            .with_wind_at_least_3(true);

        let result = processor().process_set(&station(), &week(), &criteria).unwrap();

        assert_eq!(result.absolute.total_count(), 2);
        assert_eq!(result.absolute.speed_row(4.0).unwrap().total, 2);
    }

    #[test]
    fn test_empty_selection_names_conditions() {
        let criteria = FilterCriteria::new(DateWindow::interval(at(2, 1), at(2, 23)))
            .with_snow_only(true);

        let err = processor()
            .process_set(&station(), &week(), &criteria)
            .unwrap_err();

        assert!(err.is_no_data());
        match err {
            WindRoseError::EmptyInput(message) => assert!(message.contains("snow")),
            other => panic!("expected EmptyInput, got {:?}", other),
        }
    }

    #[test]
    fn test_synoptic_dates_window() {
        let criteria = FilterCriteria::new(DateWindow::synoptic_dates(
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
        ));

        let result = processor().process_set(&station(), &week(), &criteria).unwrap();

        // 02 00:00 through 03 00:00, both included
        assert_eq!(result.absolute.total_count(), 3);
    }

    #[test]
    fn test_invalid_window_rejected_before_load() {
        let missing = StationMetadata::new("Nowhere", "/nonexistent/archive.csv");
        let criteria = FilterCriteria::new(DateWindow::interval(at(3, 0), at(1, 0)));

        let result = processor().process(&missing, &criteria);

        assert!(matches!(result, Err(WindRoseError::InvalidWindow { .. })));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "dt_time,Wind_dir,wind_speed,precipitation").unwrap();
        writeln!(file, "01.01.2023 03:00,NE,3,0").unwrap();
        writeln!(file, "01.01.2023 06:00,NE,3,0").unwrap();

        let stations = vec![
            StationMetadata::new("Good", file.path()),
            StationMetadata::new("Missing", "/nonexistent/archive.csv"),
        ];
        let criteria = FilterCriteria::new(DateWindow::interval(at(1, 0), at(2, 0)));

        let outcomes = processor()
            .with_max_workers(2)
            .process_stations(&stations, &criteria, None)
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        let good = outcomes.iter().find(|o| o.station.name == "Good").unwrap();
        let result = good.result.as_ref().unwrap();
        assert_eq!(result.absolute.value(3.0, CompassDirection::NE), Some(2));

        let missing = outcomes.iter().find(|o| o.station.name == "Missing").unwrap();
        assert!(matches!(missing.result, Err(WindRoseError::Io(_))));
    }
}
