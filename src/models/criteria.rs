use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WindRoseError};
use crate::utils::constants::{DATE_FORMAT, TIMESTAMP_FORMAT};

/// How the date window of a request is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateWindow {
    /// Open interval `from < timestamp < to`.
    Interval {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    /// Calendar dates snapped onto the nearest synoptic observations.
    SynopticDates { from: NaiveDate, to: NaiveDate },
}

impl DateWindow {
    pub fn interval(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        DateWindow::Interval { from, to }
    }

    pub fn synoptic_dates(from: NaiveDate, to: NaiveDate) -> Self {
        DateWindow::SynopticDates { from, to }
    }

    /// Window bounds at midnight resolution, for messages and validation.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        match *self {
            DateWindow::Interval { from, to } => (from, to),
            DateWindow::SynopticDates { from, to } => {
                (from.and_time(NaiveTime::default()), to.and_time(NaiveTime::default()))
            }
        }
    }

    /// Parse user-supplied bounds. Synoptic windows take `DD.MM.YYYY`;
    /// intervals take `DD.MM.YYYY HH:MM` or a bare date meaning midnight.
    pub fn parse(from: &str, to: &str, synoptic: bool) -> Result<Self> {
        let window = if synoptic {
            DateWindow::synoptic_dates(parse_date(from)?, parse_date(to)?)
        } else {
            DateWindow::interval(parse_bound(from)?, parse_bound(to)?)
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = match *self {
            DateWindow::Interval { from, to } => from < to,
            // a single synoptic day is a valid legacy request
            DateWindow::SynopticDates { from, to } => from <= to,
        };

        if ok {
            Ok(())
        } else {
            let (from, to) = self.bounds();
            Err(WindRoseError::InvalidWindow { from, to })
        }
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)?)
}

fn parse_bound(text: &str) -> Result<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT) {
        Ok(timestamp) => Ok(timestamp),
        Err(_) => parse_date(text).map(|d| d.and_time(NaiveTime::default())),
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = self.bounds();
        write!(
            f,
            "{} to {}",
            from.format(DATE_FORMAT),
            to.format(DATE_FORMAT)
        )
    }
}

/// Everything that selects the observations of one wind rose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub window: DateWindow,
    pub snow_only: bool,
    pub wind_at_least_3: bool,
}

impl FilterCriteria {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            snow_only: false,
            wind_at_least_3: false,
        }
    }

    pub fn with_snow_only(mut self, snow_only: bool) -> Self {
        self.snow_only = snow_only;
        self
    }

    pub fn with_wind_at_least_3(mut self, wind_at_least_3: bool) -> Self {
        self.wind_at_least_3 = wind_at_least_3;
        self
    }

    pub fn active_conditions(&self) -> Vec<&'static str> {
        let mut conditions = Vec::new();
        if self.snow_only {
            conditions.push("snow");
        }
        if self.wind_at_least_3 {
            conditions.push("wind >= 3 m/s");
        }
        conditions
    }

    pub fn describe(&self) -> String {
        let precipitation = if self.snow_only {
            "snow precipitation only"
        } else {
            "any precipitation"
        };
        let wind = if self.wind_at_least_3 {
            "wind 3 m/s and above"
        } else {
            "any wind speed"
        };
        format!("{}, {}, {}", self.window, precipitation, wind)
    }

    /// Message for an empty selection.
    pub fn empty_message(&self) -> String {
        let conditions = self.active_conditions();
        if conditions.is_empty() {
            format!("no observations for period {}", self.window)
        } else {
            format!(
                "no observations matching ({}) for period {}",
                conditions.join(" + "),
                self.window
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    #[test]
    fn test_interval_must_be_increasing() {
        let from = date(1).and_hms_opt(0, 0, 0).unwrap();
        let to = date(2).and_hms_opt(0, 0, 0).unwrap();

        assert!(DateWindow::interval(from, to).validate().is_ok());
        assert!(DateWindow::interval(from, from).validate().is_err());
        assert!(matches!(
            DateWindow::interval(to, from).validate(),
            Err(WindRoseError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_synoptic_dates_allow_single_day() {
        assert!(DateWindow::synoptic_dates(date(5), date(5)).validate().is_ok());
        assert!(DateWindow::synoptic_dates(date(6), date(5)).validate().is_err());
    }

    #[test]
    fn test_empty_message_lists_active_conditions() {
        let window = DateWindow::synoptic_dates(date(1), date(31));

        let plain = FilterCriteria::new(window);
        assert_eq!(
            plain.empty_message(),
            "no observations for period 01.03.2021 to 31.03.2021"
        );

        let both = plain.with_snow_only(true).with_wind_at_least_3(true);
        assert_eq!(
            both.empty_message(),
            "no observations matching (snow + wind >= 3 m/s) for period 01.03.2021 to 31.03.2021"
        );
    }

    #[test]
    fn test_criteria_are_independent() {
        let window = DateWindow::synoptic_dates(date(1), date(2));
        let criteria = FilterCriteria::new(window).with_wind_at_least_3(true);

        assert!(!criteria.snow_only);
        assert!(criteria.wind_at_least_3);
        assert_eq!(criteria.window, window);
    }

    #[test]
    fn test_parse_interval_bounds() {
        let window = DateWindow::parse("01.03.2021", "02.03.2021 12:00", false).unwrap();
        assert_eq!(
            window,
            DateWindow::interval(
                date(1).and_hms_opt(0, 0, 0).unwrap(),
                date(2).and_hms_opt(12, 0, 0).unwrap()
            )
        );
    }

    #[test]
    fn test_parse_synoptic_dates() {
        let window = DateWindow::parse("01.03.2021", "05.03.2021", true).unwrap();
        assert_eq!(window, DateWindow::synoptic_dates(date(1), date(5)));

        assert!(matches!(
            DateWindow::parse("2021-03-01", "05.03.2021", true),
            Err(WindRoseError::DateParse(_))
        ));
        assert!(matches!(
            DateWindow::parse("05.03.2021", "01.03.2021", false),
            Err(WindRoseError::InvalidWindow { .. })
        ));
    }
}
