use crate::error::{Result, WindRoseError};
use crate::models::{Observation, WindDirection};
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DIRECTION_COLUMN, DEFAULT_PRECIPITATION_COLUMN,
    DEFAULT_SPEED_COLUMN, DEFAULT_TIMESTAMP_COLUMN, TIMESTAMP_FORMAT,
};
use chrono::NaiveDateTime;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Source column names of the four required fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub timestamp: String,
    pub direction: String,
    pub speed: String,
    pub precipitation: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            direction: DEFAULT_DIRECTION_COLUMN.to_string(),
            speed: DEFAULT_SPEED_COLUMN.to_string(),
            precipitation: DEFAULT_PRECIPITATION_COLUMN.to_string(),
        }
    }
}

struct ColumnIndices {
    timestamp: usize,
    direction: usize,
    speed: usize,
    precipitation: usize,
}

pub struct ObservationReader {
    columns: ColumnMapping,
    delimiter: u8,
    use_mmap: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            columns: ColumnMapping::default(),
            delimiter: b',',
            use_mmap: false,
        }
    }

    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read every observation of a station archive, in file order.
    pub fn read_observations(&self, path: &Path) -> Result<Vec<Observation>> {
        let observations = if self.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from_bytes(&mmap)?
        } else {
            let bytes = std::fs::read(path)?;
            self.read_from_bytes(&bytes)?
        };

        debug!(
            path = %path.display(),
            records = observations.len(),
            "loaded station archive"
        );
        Ok(observations)
    }

    /// Parse raw archive bytes (UTF-8, or Windows-1251 as a fallback).
    pub fn read_from_bytes(&self, bytes: &[u8]) -> Result<Vec<Observation>> {
        let content = decode_archive(bytes);
        self.read_from_str(&content)
    }

    pub fn read_from_str(&self, content: &str) -> Result<Vec<Observation>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(content.as_bytes());

        let indices = self.resolve_columns(reader.headers()?)?;

        let mut observations = Vec::new();
        let mut bad_speed = 0usize;
        let mut bad_precipitation = 0usize;

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(row + 2);

            let timestamp = parse_timestamp(record.get(indices.timestamp).unwrap_or(""), line)?;

            let direction = WindDirection::parse(record.get(indices.direction).unwrap_or(""));

            let speed_text = record.get(indices.speed).unwrap_or("");
            let speed = parse_speed(speed_text);
            if speed.is_none() && !speed_text.is_empty() {
                bad_speed += 1;
            }

            let precipitation_text = record.get(indices.precipitation).unwrap_or("");
            let precipitation_code = parse_precipitation_code(precipitation_text);
            if precipitation_code.is_none() && !precipitation_text.is_empty() {
                bad_precipitation += 1;
            }

            observations.push(Observation::new(
                timestamp,
                direction,
                speed,
                precipitation_code,
            ));
        }

        if bad_speed > 0 || bad_precipitation > 0 {
            warn!(
                bad_speed,
                bad_precipitation, "unparseable values kept as absent fields"
            );
        }

        Ok(observations)
    }

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<ColumnIndices> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let required = [
            &self.columns.timestamp,
            &self.columns.direction,
            &self.columns.speed,
            &self.columns.precipitation,
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(WindRoseError::Schema { missing });
        }

        // every name was found above
        Ok(ColumnIndices {
            timestamp: find(&self.columns.timestamp).unwrap_or_default(),
            direction: find(&self.columns.direction).unwrap_or_default(),
            speed: find(&self.columns.speed).unwrap_or_default(),
            precipitation: find(&self.columns.precipitation).unwrap_or_default(),
        })
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_archive(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, had_errors) = encoding_rs::WINDOWS_1251.decode_without_bom_handling(bytes);
            if had_errors {
                warn!("archive is neither UTF-8 nor clean Windows-1251");
            }
            text
        }
    }
}

fn parse_timestamp(text: &str, line: usize) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|e| WindRoseError::Parse {
        line,
        message: format!("invalid timestamp '{}': {}", text, e),
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .trim_matches('"')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_speed(text: &str) -> Option<f64> {
    parse_number(text)
}

fn parse_precipitation_code(text: &str) -> Option<i64> {
    parse_number(text)
        .filter(|v| v.fract() == 0.0)
        .map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompassDirection;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "dt_time,t_tek,Wind_dir,wind_speed,precipitation";

    #[test]
    fn test_read_observations_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "{}", HEADER)?;
        writeln!(temp_file, "01.02.2020 03:00,-5.1,NNE,4,2")?;
        writeln!(temp_file, "01.02.2020 00:00,-6.0,CALM,0,0")?;

        let reader = ObservationReader::new();
        let records = reader.read_observations(temp_file.path())?;

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].timestamp,
            NaiveDate::from_ymd_opt(2020, 2, 1)
                .unwrap()
                .and_hms_opt(3, 0, 0)
                .unwrap()
        );
        assert_eq!(
            records[0].direction,
            Some(WindDirection::Compass(CompassDirection::NNE))
        );
        assert_eq!(records[0].speed, Some(4.0));
        assert!(records[0].is_snow());
        assert!(records[1].is_calm());

        Ok(())
    }

    #[test]
    fn test_mmap_matches_buffered() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "{}", HEADER)?;
        writeln!(temp_file, "05.01.2021 12:00,1.0,W,7,1")?;

        let buffered = ObservationReader::new().read_observations(temp_file.path())?;
        let mapped = ObservationReader::new()
            .with_mmap(true)
            .read_observations(temp_file.path())?;

        assert_eq!(buffered, mapped);
        Ok(())
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let reader = ObservationReader::new();
        let result = reader.read_from_str("dt_time,Wind_dir\n01.01.2020 00:00,N\n");

        match result {
            Err(WindRoseError::Schema { missing }) => {
                assert_eq!(missing, vec!["wind_speed", "precipitation"]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_timestamp_aborts_load() {
        let reader = ObservationReader::new();
        let content = format!("{}\n01.01.2020 00:00,0,N,1,0\n2020-01-01 03:00,0,N,1,0\n", HEADER);

        match reader.read_from_str(&content) {
            Err(WindRoseError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_values_become_absent() -> Result<()> {
        let reader = ObservationReader::new();
        let content = format!(
            "{}\n01.01.2020 00:00,0,N,calm-ish,snow\n01.01.2020 03:00,0,,2.5,2.0\n",
            HEADER
        );

        let records = reader.read_from_str(&content)?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].speed, None);
        assert_eq!(records[0].precipitation_code, None);
        assert_eq!(records[1].direction, None);
        assert_eq!(records[1].speed, Some(2.5));
        assert_eq!(records[1].precipitation_code, Some(2));
        Ok(())
    }

    #[test]
    fn test_custom_columns_and_delimiter() -> Result<()> {
        let reader = ObservationReader::new()
            .with_delimiter(b';')
            .with_columns(ColumnMapping {
                timestamp: "time".into(),
                direction: "dd".into(),
                speed: "ff".into(),
                precipitation: "sn".into(),
            });

        let records = reader.read_from_str("sn;ff;dd;time\n2;3;SE;10.10.2010 21:00\n")?;

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].direction,
            Some(WindDirection::Compass(CompassDirection::SE))
        );
        assert_eq!(records[0].speed, Some(3.0));
        Ok(())
    }

    #[test]
    fn test_windows_1251_fallback() -> Result<()> {
        let text = "dt_time,station,Wind_dir,wind_speed,precipitation\n01.01.2020 00:00,Орёл,S,2,0\n";
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode(text);
        assert!(std::str::from_utf8(&encoded).is_err());

        let records = ObservationReader::new().read_from_bytes(&encoded)?;

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].direction,
            Some(WindDirection::Compass(CompassDirection::S))
        );
        Ok(())
    }

    #[test]
    fn test_utf8_bom_is_ignored() -> Result<()> {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(format!("{}\n01.01.2020 00:00,0,N,1,0\n", HEADER).as_bytes());

        let records = ObservationReader::new().read_from_bytes(&bytes)?;
        assert_eq!(records.len(), 1);
        Ok(())
    }
}
