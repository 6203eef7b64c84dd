/// Score report assembly and CSV round-trip.
///
/// A `ScoreReport` is a header plus rows: seven fixed metadata columns
/// followed by a configurable list of score columns. Reports write to and
/// re-load from delimited files; on re-load the header must match the
/// report's own header exactly — a mismatch is reported, never silently
/// ignored, because appending rows under the wrong header would corrupt
/// every downstream consumer of the file.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::model::ForecastPeriod;
use crate::verify::{ContinuousScore, VerificationReport};

/// The metadata columns every report starts with.
pub const META_COLUMNS: [&str; 7] = [
    "Variable",
    "ForecastDay",
    "Station",
    "StartDate",
    "EndDate",
    "ShiftPeriod",
    "ShiftDay",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ReportError {
    /// A row with the wrong number of columns for the report's header.
    EntryLength { expected: usize, got: usize },
    /// A re-loaded file whose header differs from the report's.
    HeaderMismatch { expected: Vec<String>, got: Vec<String> },
    Csv(csv::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::EntryLength { expected, got } => {
                write!(f, "entry has {} columns, report header has {}", got, expected)
            }
            ReportError::HeaderMismatch { expected, got } => write!(
                f,
                "report header mismatch: expected {:?}, file has {:?}",
                expected, got
            ),
            ReportError::Csv(err) => write!(f, "csv error: {}", err),
            ReportError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> ReportError {
        ReportError::Csv(err)
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> ReportError {
        ReportError::Io(err)
    }
}

// ---------------------------------------------------------------------------
// Score report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ScoreReport {
    /// Empty report whose header is the metadata columns followed by
    /// `score_columns`.
    pub fn new(score_columns: &[&str]) -> ScoreReport {
        let mut header: Vec<String> = META_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(score_columns.iter().map(|c| c.to_string()));
        ScoreReport {
            header,
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends one row. The row must have exactly one value per header
    /// column; a wrong-length row is rejected without being stored.
    pub fn add_entry(&mut self, entry: Vec<String>) -> Result<(), ReportError> {
        if entry.len() != self.header.len() {
            return Err(ReportError::EntryLength {
                expected: self.header.len(),
                got: entry.len(),
            });
        }
        self.rows.push(entry);
        Ok(())
    }

    /// Writes header and rows as a delimited file.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Re-loads rows from a previously written file.
    ///
    /// The file's header must equal this report's header exactly; otherwise
    /// nothing is loaded and the mismatch is reported. With `overwrite` the
    /// current rows are replaced, otherwise the file's rows append.
    pub fn read_csv(&mut self, path: &Path, overwrite: bool) -> Result<(), ReportError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
        let mut records = reader.records();

        let file_header: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        };
        if file_header != self.header {
            return Err(ReportError::HeaderMismatch {
                expected: self.header.clone(),
                got: file_header,
            });
        }

        let mut loaded = Vec::new();
        for record in records {
            let row: Vec<String> = record?.iter().map(|s| s.to_string()).collect();
            if row.len() != self.header.len() {
                return Err(ReportError::EntryLength {
                    expected: self.header.len(),
                    got: row.len(),
                });
            }
            loaded.push(row);
        }

        if overwrite {
            self.rows = loaded;
        } else {
            self.rows.extend(loaded);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Report builders
// ---------------------------------------------------------------------------

fn fmt_value(value: f64) -> String {
    format!("{:.4}", value)
}

fn fmt_date(date: DateTime<Utc>) -> String {
    date.format("%Y%m%d").to_string()
}

fn meta(
    variable: &str,
    period: ForecastPeriod,
    site: &str,
    report: &VerificationReport,
) -> Vec<String> {
    vec![
        variable.to_string(),
        period.label().to_string(),
        site.to_string(),
        fmt_date(report.start),
        fmt_date(report.end),
        report
            .shift_time
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| "ALL".to_string()),
        "ALL".to_string(),
    ]
}

/// Precipitation rows: Brier Score and Brier Skill Score per station plus
/// the all-stations row per period.
pub fn precip_report(report: &VerificationReport) -> Result<ScoreReport, ReportError> {
    let mut out = ScoreReport::new(&["BS", "BSS"]);
    for summary in &report.precip {
        for station in &summary.stations {
            let mut entry = meta("PPRB", summary.period, &station.site, report);
            entry.push(fmt_value(station.table.brier_score()));
            entry.push(fmt_value(station.skill_score));
            out.add_entry(entry)?;
        }
        let mut entry = meta("PPRB", summary.period, "ALL", report);
        entry.push(fmt_value(summary.combined_components.score));
        entry.push(fmt_value(summary.combined_skill));
        out.add_entry(entry)?;
    }
    Ok(out)
}

/// Continuous-error rows (temperature or wind): ME, MAE, RMSE per station.
pub fn continuous_report(
    report: &VerificationReport,
    scores: &[ContinuousScore],
) -> Result<ScoreReport, ReportError> {
    let mut out = ScoreReport::new(&["ME", "MAE", "RMSE"]);
    for score in scores {
        let mut entry = meta(score.variable.code(), score.period, &score.site, report);
        entry.push(fmt_value(score.mean_error));
        entry.push(fmt_value(score.mean_absolute_error));
        entry.push(fmt_value(score.root_mean_square_error));
        out.add_entry(entry)?;
    }
    Ok(out)
}

/// Sky-cover rows: Heidke and Peirce skill scores per station plus the
/// all-stations row per period.
pub fn sky_report(report: &VerificationReport) -> Result<ScoreReport, ReportError> {
    let mut out = ScoreReport::new(&["HSS", "PSS"]);
    for summary in &report.sky {
        for station in &summary.stations {
            let mut entry = meta("SKYC", summary.period, &station.site, report);
            entry.push(fmt_value(station.heidke));
            entry.push(fmt_value(station.peirce));
            out.add_entry(entry)?;
        }
        let mut entry = meta("SKYC", summary.period, "ALL", report);
        entry.push(fmt_value(summary.combined_heidke));
        entry.push(fmt_value(summary.combined_peirce));
        out.add_entry(entry)?;
    }
    Ok(out)
}

/// Convenience accessors used by the CLI when writing the report set.
pub fn all_reports(
    report: &VerificationReport,
) -> Result<Vec<(&'static str, ScoreReport)>, ReportError> {
    Ok(vec![
        ("precip_scores.csv", precip_report(report)?),
        (
            "temperature_scores.csv",
            continuous_report(report, &report.temperature)?,
        ),
        ("wind_scores.csv", continuous_report(report, &report.wind)?),
        ("sky_scores.csv", sky_report(report)?),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
