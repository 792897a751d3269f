use crate::models::StationMetadata;
use chrono::{Datelike, Local};
use std::path::PathBuf;

fn date_suffix() -> String {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    format!("{:02}{:02}{:02}", year, now.month(), now.day())
}

/// Default report path: output/{report stem}-{YYMMDD}.{ext}
pub fn generate_default_report_filename(station: &StationMetadata, extension: &str) -> PathBuf {
    let filename = format!("{}-{}.{}", station.report_stem(), date_suffix(), extension);
    PathBuf::from("output").join(filename)
}

/// Default plot sample path: output/{image stem}-samples-{YYMMDD}.csv
pub fn generate_default_samples_filename(station: &StationMetadata) -> PathBuf {
    let filename = format!("{}-samples-{}.csv", station.image_stem(), date_suffix());
    PathBuf::from("output").join(filename)
}
