use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub name: String,

    /// Name as used after "in ..." in report titles. Falls back to `name`.
    #[serde(default)]
    pub locative_name: Option<String>,

    pub path: PathBuf,
}

impl StationMetadata {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            locative_name: None,
            path: path.into(),
        }
    }

    pub fn with_locative_name(mut self, locative_name: impl Into<String>) -> Self {
        self.locative_name = Some(locative_name.into());
        self
    }

    pub fn locative(&self) -> &str {
        self.locative_name.as_deref().unwrap_or(&self.name)
    }

    /// File stem of the rendered rose image, e.g. `wrose Orel`.
    pub fn image_stem(&self) -> String {
        format!("wrose {}", self.name)
    }

    /// File stem of the rendered report document.
    pub fn report_stem(&self) -> String {
        format!("Wind rose in {}. Chart and table", self.locative())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for StationMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = StationMetadata::new("Orel", "data/orel.csv");
        assert!(station.validate().is_ok());

        let unnamed = StationMetadata::new("", "data/orel.csv");
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_locative_falls_back_to_name() {
        let station = StationMetadata::new("Orel", "data/orel.csv");
        assert_eq!(station.locative(), "Orel");
        assert_eq!(station.report_stem(), "Wind rose in Orel. Chart and table");

        let station = station.with_locative_name("Orle");
        assert_eq!(station.locative(), "Orle");
        assert_eq!(station.image_stem(), "wrose Orel");
    }

    #[test]
    fn test_display_uses_file_name() {
        let station = StationMetadata::new("Mtsensk", "archive/mcensk_05_24.csv");
        assert_eq!(station.to_string(), "Mtsensk (mcensk_05_24.csv)");
    }
}
