use crate::error::{Result, WindRoseError};
use crate::store::ObservationSet;
use crate::utils::constants::SYNOPTIC_HOURS;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// Both endpoints of a calendar-date window after snapping, with their
/// source positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub start_index: usize,
    pub end_index: usize,
}

impl ResolvedWindow {
    /// Lower source position; the slice always starts here, whichever
    /// endpoint produced it.
    pub fn first_index(&self) -> usize {
        self.start_index.min(self.end_index)
    }

    pub fn last_index(&self) -> usize {
        self.start_index.max(self.end_index)
    }
}

/// Snaps calendar dates onto synoptic observations (00:00, 03:00, ... 21:00).
pub struct WindowResolver<'a> {
    observations: &'a ObservationSet,
}

impl<'a> WindowResolver<'a> {
    pub fn new(observations: &'a ObservationSet) -> Self {
        Self { observations }
    }

    /// Earliest synoptic hour of `date` with an observation. When none has
    /// one, the date's midnight is returned unchanged.
    pub fn resolve_start(&self, date: NaiveDate) -> NaiveDateTime {
        self.first_available(date, SYNOPTIC_HOURS.iter().copied())
            .unwrap_or_else(|| midnight(date))
    }

    /// Latest synoptic hour of `date` with an observation, probing 21:00
    /// first. Falls back to midnight like [`Self::resolve_start`].
    pub fn resolve_end(&self, date: NaiveDate) -> NaiveDateTime {
        self.first_available(date, SYNOPTIC_HOURS.iter().rev().copied())
            .unwrap_or_else(|| midnight(date))
    }

    /// Snap both dates and locate them in the source.
    pub fn resolve(&self, from: NaiveDate, to: NaiveDate) -> Result<ResolvedWindow> {
        let start = self.resolve_start(from);
        let end = self.resolve_end(to);

        let start_index = self
            .observations
            .index_of(start)
            .ok_or(WindRoseError::NoNearbyObservation { date: from })?;
        let end_index = self
            .observations
            .index_of(end)
            .ok_or(WindRoseError::NoNearbyObservation { date: to })?;

        debug!(%start, %end, start_index, end_index, "resolved synoptic window");

        Ok(ResolvedWindow {
            start,
            end,
            start_index,
            end_index,
        })
    }

    /// Observations between the resolved endpoints, both included.
    pub fn select(&self, from: NaiveDate, to: NaiveDate) -> Result<ObservationSet> {
        let window = self.resolve(from, to)?;
        Ok(self
            .observations
            .slice_by_index(window.first_index(), window.last_index()))
    }

    fn first_available(
        &self,
        date: NaiveDate,
        hours: impl Iterator<Item = u32>,
    ) -> Option<NaiveDateTime> {
        hours
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .map(|time| date.and_time(time))
            .find(|timestamp| self.observations.contains_timestamp(*timestamp))
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompassDirection, Observation, WindDirection};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 6, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn obs(day: u32, hour: u32) -> Observation {
        Observation::new(
            at(day, hour),
            Some(WindDirection::Compass(CompassDirection::S)),
            Some(2.0),
            Some(0),
        )
    }

    #[test]
    fn test_start_probes_ascending() {
        let set = ObservationSet::new(vec![obs(1, 9), obs(1, 6), obs(1, 21)]);
        let resolver = WindowResolver::new(&set);

        assert_eq!(resolver.resolve_start(date(1)), at(1, 6));
    }

    #[test]
    fn test_end_probes_descending() {
        let set = ObservationSet::new(vec![obs(1, 0), obs(1, 15), obs(1, 18)]);
        let resolver = WindowResolver::new(&set);

        assert_eq!(resolver.resolve_end(date(1)), at(1, 18));
    }

    #[test]
    fn test_unmatched_date_keeps_midnight() {
        let set = ObservationSet::new(vec![obs(2, 3)]);
        let resolver = WindowResolver::new(&set);

        assert_eq!(resolver.resolve_start(date(1)), at(1, 0));
        assert_eq!(resolver.resolve_end(date(1)), at(1, 0));
    }

    #[test]
    fn test_off_synoptic_hours_are_not_matched() {
        let set = ObservationSet::new(vec![Observation::new(
            date(1).and_hms_opt(4, 30, 0).unwrap(),
            None,
            None,
            None,
        )]);
        let resolver = WindowResolver::new(&set);

        assert_eq!(resolver.resolve_start(date(1)), at(1, 0));
    }

    #[test]
    fn test_select_uses_index_min_and_max() {
        // descending archive, as station exports usually are
        let set = ObservationSet::new(vec![
            obs(4, 0),
            obs(3, 21),
            obs(3, 3),
            obs(2, 12),
            obs(2, 3),
            obs(1, 21),
        ]);
        let resolver = WindowResolver::new(&set);

        let window = resolver.resolve(date(2), date(3)).unwrap();
        assert_eq!(window.start, at(2, 3));
        assert_eq!(window.end, at(3, 21));
        assert!(window.start_index > window.end_index);
        assert_eq!((window.first_index(), window.last_index()), (1, 4));

        let selected = resolver.select(date(2), date(3)).unwrap();
        let stamps: Vec<NaiveDateTime> = selected.iter().map(|o| o.timestamp).collect();
        assert_eq!(stamps, vec![at(3, 21), at(3, 3), at(2, 12), at(2, 3)]);
    }

    #[test]
    fn test_unresolvable_endpoint_is_an_error() {
        let set = ObservationSet::new(vec![obs(2, 3), obs(3, 3)]);
        let resolver = WindowResolver::new(&set);

        match resolver.select(date(1), date(3)) {
            Err(WindRoseError::NoNearbyObservation { date: d }) => assert_eq!(d, date(1)),
            other => panic!("expected NoNearbyObservation, got {:?}", other),
        }
    }
}
