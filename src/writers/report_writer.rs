use crate::error::Result;
use crate::models::{AbsolutePivot, CompassDirection, PercentagePivot, WindSample};
use crate::processors::RoseResult;
use crate::utils::constants::{
    CHECK_ROW_LABEL, PERCENT_ZERO_THRESHOLD, SPEED_HEADER, TOTAL_LABEL,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Format a percentage for display. Residues below 0.05 in magnitude, and
/// NaN, print as "0.0" whatever their sign.
///
/// The zero literal ignores `precision`: at precision 0 a near-zero cell
/// prints "0.0" while every other cell prints without decimals ("12").
pub fn format_percentage(value: f64, precision: usize) -> String {
    if value.is_nan() || value.abs() < PERCENT_ZERO_THRESHOLD {
        return "0.0".to_string();
    }
    format!("{:.*}", precision, value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

/// Header of both tables: speed column, sixteen direction labels, total.
pub fn table_header() -> Vec<String> {
    let mut header = Vec::with_capacity(CompassDirection::COUNT + 2);
    header.push(SPEED_HEADER.to_string());
    header.extend(CompassDirection::ALL.iter().map(|d| d.label().to_string()));
    header.push(TOTAL_LABEL.to_string());
    header
}

/// Speed rows followed by the marginal total row.
pub fn percentage_rows(pivot: &PercentagePivot, precision: usize) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = pivot
        .rows()
        .iter()
        .map(|row| {
            let mut line = vec![row.label.to_string()];
            line.extend(row.cells.iter().map(|v| format_percentage(*v, precision)));
            line.push(format_percentage(row.total, precision));
            line
        })
        .collect();

    let mut totals = vec![TOTAL_LABEL.to_string()];
    totals.extend(
        pivot
            .column_totals()
            .iter()
            .map(|v| format_percentage(*v, precision)),
    );
    totals.push(format_percentage(pivot.grand_total(), precision));
    rows.push(totals);
    rows
}

pub fn count_rows(pivot: &AbsolutePivot) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = pivot
        .rows()
        .iter()
        .map(|row| {
            let mut line = vec![row.label.to_string()];
            line.extend(row.cells.iter().map(|c| c.to_string()));
            line.push(row.total.to_string());
            line
        })
        .collect();

    let mut totals = vec![TOTAL_LABEL.to_string()];
    totals.extend(pivot.column_totals().iter().map(|c| c.to_string()));
    totals.push(pivot.grand_total().to_string());
    rows.push(totals);
    rows
}

/// A rendered wind rose: formatted tables plus the artefact names a report
/// or plot renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct RoseReport {
    pub title: String,
    pub station: String,
    pub conditions: String,
    pub image_path: PathBuf,
    pub sample_count: usize,
    pub header: Vec<String>,
    pub percentages: Vec<Vec<String>>,
    pub counts: Vec<Vec<String>>,
    /// Sum of the direction totals, shown under the table.
    pub check_sum: String,
}

impl RoseReport {
    pub fn from_result(result: &RoseResult, precision: usize) -> Self {
        Self {
            title: format!("Wind rose in {}", result.station.locative()),
            station: result.station.name.clone(),
            conditions: result.criteria.describe(),
            image_path: PathBuf::from(format!("{}.png", result.station.image_stem())),
            sample_count: result.samples.len(),
            header: table_header(),
            percentages: percentage_rows(&result.percentage, precision),
            counts: count_rows(&result.absolute),
            check_sum: format_percentage(result.percentage.direction_total_sum(), precision),
        }
    }

    pub fn with_image_path(mut self, image_path: impl Into<PathBuf>) -> Self {
        self.image_path = image_path.into();
        self
    }
}

/// Consumer of rendered reports.
pub trait ReportSink {
    fn write_report(&mut self, report: &RoseReport) -> Result<()>;
}

pub struct TableWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl TableWriter<BufWriter<File>> {
    pub fn create(path: &Path, format: OutputFormat) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_csv(&mut self, report: &RoseReport) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(&mut self.writer);

        csv_writer.write_record(&report.header)?;
        for row in &report.percentages {
            csv_writer.write_record(row)?;
        }
        csv_writer.write_record([CHECK_ROW_LABEL, report.check_sum.as_str()])?;
        csv_writer.flush()?;
        Ok(())
    }

    fn write_json(&mut self, report: &RoseReport) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_text(&mut self, report: &RoseReport) -> Result<()> {
        writeln!(self.writer, "{}", report.title)?;
        writeln!(self.writer, "{}", report.conditions)?;
        writeln!(self.writer, "Observations: {}", report.sample_count)?;
        writeln!(self.writer)?;

        write_aligned(&mut self.writer, &report.header, &report.percentages)?;
        writeln!(self.writer, "{} {}", CHECK_ROW_LABEL, report.check_sum)?;
        writeln!(self.writer)?;

        writeln!(self.writer, "Counts")?;
        write_aligned(&mut self.writer, &report.header, &report.counts)?;
        Ok(())
    }
}

impl<W: Write> ReportSink for TableWriter<W> {
    fn write_report(&mut self, report: &RoseReport) -> Result<()> {
        match self.format {
            OutputFormat::Csv => self.write_csv(report)?,
            OutputFormat::Json => self.write_json(report)?,
            OutputFormat::Text => self.write_text(report)?,
        }
        self.writer.flush()?;

        debug!(station = %report.station, format = ?self.format, "wrote report");
        Ok(())
    }
}

fn write_aligned<W: Write>(writer: &mut W, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for line in std::iter::once(header).chain(rows.iter().map(|r| r.as_slice())) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .collect();
        writeln!(writer, "{}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SampleRecord {
    azimuth_deg: f64,
    speed: f64,
}

/// Export filtered samples as `azimuth_deg,speed` for a polar plot renderer.
pub fn write_samples_csv<W: Write>(writer: W, samples: &[WindSample]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for sample in samples {
        csv_writer.serialize(SampleRecord {
            azimuth_deg: sample.azimuth(),
            speed: sample.speed,
        })?;
    }
    csv_writer.flush()?;

    debug!(samples = samples.len(), "wrote plot samples");
    Ok(())
}

pub fn write_samples_file(path: &Path, samples: &[WindSample]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_samples_csv(BufWriter::new(File::create(path)?), samples)
}
