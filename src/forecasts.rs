/// Per-shift forecast store.
///
/// A `ShiftForecasts` accumulates the worksheet rows of one recurring shift
/// (e.g. Tuesday afternoon) into the five fixed period buckets, and answers
/// the time-windowed, site-filtered queries the orchestrator matches against
/// observations. The `ForecastArchive` collects every shift of the
/// verification run.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    FCST_VALID_MIN, FIELD_MISSING, ForecastField, ForecastPeriod, ForecastRecord, RecordError,
    ShiftTime, SkyCover,
};
use crate::observations::Window;

/// Timestamp layout used in worksheet verifying-window fields.
pub const WORKSHEET_TIME_FORMAT: &str = "%Y%m%d_%H:%M";

/// Field count of one worksheet row after the verifying window is prefixed.
const RECORD_FIELDS: usize = 16;

// ---------------------------------------------------------------------------
// Shift forecasts
// ---------------------------------------------------------------------------

/// All forecasts issued on one recurring shift, bucketed by period.
///
/// Buckets are an array indexed by `ForecastPeriod::index`, and rows append
/// in worksheet order with no dedup — a shift forecasting the same window
/// twice counts twice, exactly as it verifies twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftForecasts {
    day: String,
    time: ShiftTime,
    periods: [Vec<ForecastRecord>; 5],
}

impl ShiftForecasts {
    pub fn new(day: &str, time: ShiftTime) -> ShiftForecasts {
        ShiftForecasts {
            day: day.to_string(),
            time,
            periods: Default::default(),
        }
    }

    /// Weekday label of the shift, e.g. "Tue".
    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn time(&self) -> ShiftTime {
        self.time
    }

    /// Archive key of the shift, e.g. "Tue_Aft".
    pub fn key(&self) -> String {
        format!("{}_{}", self.day, self.time.label())
    }

    pub fn records(&self, period: ForecastPeriod) -> &[ForecastRecord] {
        &self.periods[period.index()]
    }

    pub fn record_count(&self) -> usize {
        self.periods.iter().map(|p| p.len()).sum()
    }

    /// Parses one raw worksheet row and appends it to `period`.
    ///
    /// `fields` is the flat ordered row
    /// [SDATE, EDATE, SITE, TMPH, TIMH, TMPL, TIML, WDRI, WDRF, WSHI, WSLO,
    /// WGST, SKYC, PPRB, PTYP, PINT]. Empty fields normalize to the missing
    /// sentinel before typed parsing. A malformed row is reported back as a
    /// `RecordError` and nothing is appended; the caller logs it and moves
    /// on with the rest of the worksheet.
    pub fn add_forecast(
        &mut self,
        fields: &[&str],
        period: ForecastPeriod,
    ) -> Result<(), RecordError> {
        if fields.len() != RECORD_FIELDS {
            return Err(RecordError::FieldCount {
                expected: RECORD_FIELDS,
                got: fields.len(),
            });
        }

        let record = ForecastRecord {
            start: parse_time("SDATE", fields[0])?,
            end: parse_time("EDATE", fields[1])?,
            site: fields[2].trim().to_string(),
            temp_high: parse_number("TMPH", fields[3])?,
            temp_high_time: parse_text(fields[4]),
            temp_low: parse_number("TMPL", fields[5])?,
            temp_low_time: parse_text(fields[6]),
            wind_dir_initial: parse_text(fields[7]),
            wind_dir_final: parse_text(fields[8]),
            wind_speed_high: parse_number("WSHI", fields[9])?,
            wind_speed_low: parse_number("WSLO", fields[10])?,
            wind_gust: parse_number("WGST", fields[11])?,
            sky_cover: SkyCover::from_code(fields[12]),
            precip_prob: parse_number("PPRB", fields[13])?,
            precip_type: parse_text(fields[14]),
            precip_intensity: parse_text(fields[15]),
        };

        self.periods[period.index()].push(record);
        Ok(())
    }

    /// Forecast values for one site and variable over a query window.
    ///
    /// Selects records whose verifying window lies inside the query window
    /// (start >= `start`, end <= `end`) at exactly the given site, and
    /// returns three aligned sequences: verifying starts, verifying ends,
    /// and the variable's values (−999 where blank).
    ///
    /// With the filter on, a record must also pass the composite validity
    /// rule: the queried variable is populated (> −900) AND at least one
    /// temperature field is populated. Rows failing the second clause were
    /// never filled in by the forecaster, so they are excluded for every
    /// variable, not just temperature.
    pub fn forecasts_in_window(
        &self,
        period: ForecastPeriod,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        field: ForecastField,
        site: &str,
        apply_filter: bool,
    ) -> (Vec<DateTime<Utc>>, Vec<DateTime<Utc>>, Vec<f64>) {
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut values = Vec::new();

        for record in &self.periods[period.index()] {
            if record.site != site || record.start < start || record.end > end {
                continue;
            }
            let value = record.field(field);
            if apply_filter {
                let populated = value.map_or(false, |v| v > FCST_VALID_MIN);
                if !populated || !record.has_temperature() {
                    continue;
                }
            }
            starts.push(record.start);
            ends.push(record.end);
            values.push(value.unwrap_or(FIELD_MISSING));
        }

        (starts, ends, values)
    }

    /// Like `forecasts_in_window`, but returning the sky-cover category of
    /// each matching record alongside its verifying window.
    pub fn sky_forecasts_in_window(
        &self,
        period: ForecastPeriod,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        site: &str,
    ) -> (Vec<DateTime<Utc>>, Vec<DateTime<Utc>>, Vec<SkyCover>) {
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut covers = Vec::new();

        for record in &self.periods[period.index()] {
            if record.site != site || record.start < start || record.end > end {
                continue;
            }
            if record.sky_cover == SkyCover::Missing || !record.has_temperature() {
                continue;
            }
            starts.push(record.start);
            ends.push(record.end);
            covers.push(record.sky_cover);
        }

        (starts, ends, covers)
    }
}

fn parse_time(field: &'static str, raw: &str) -> Result<DateTime<Utc>, RecordError> {
    NaiveDateTime::parse_from_str(raw.trim(), WORKSHEET_TIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|_| RecordError::BadTimestamp {
            field,
            value: raw.to_string(),
        })
}

/// Numeric worksheet field: blank normalizes to missing, the −999 sentinel
/// parses back to missing, anything else must be a number.
fn parse_number(field: &'static str, raw: &str) -> Result<Option<f64>, RecordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(|_| RecordError::BadNumber {
        field,
        value: raw.to_string(),
    })?;
    if value <= FCST_VALID_MIN {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn parse_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Verifying windows
// ---------------------------------------------------------------------------

/// The five verifying windows for a worksheet issued on `date` during
/// `shift`, in period order.
///
/// Morning worksheets verify the same day from 10Z; afternoon and evening
/// worksheets roll the day-1 windows later, and their day-4 window extends
/// a full day further out.
pub fn period_windows(date: NaiveDate, shift: ShiftTime) -> [Window; 5] {
    let base = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();
    let h = Duration::hours;
    let d = Duration::days;

    match shift {
        ShiftTime::Morning => [
            (base + h(10), base + h(18)),
            (base + h(18), base + d(1) + h(6)),
            (base + d(1), base + d(2)),
            (base + d(2), base + d(3)),
            (base + d(3), base + d(4)),
        ],
        ShiftTime::Afternoon => [
            (base + h(18), base + d(1) + h(6)),
            (base + d(1) + h(6), base + d(2)),
            (base + d(2), base + d(3)),
            (base + d(3), base + d(4)),
            (base + d(4), base + d(5)),
        ],
        ShiftTime::Evening => [
            (base + d(1), base + d(1) + h(18)),
            (base + d(1) + h(18), base + d(2) + h(6)),
            (base + d(2), base + d(3)),
            (base + d(3), base + d(4)),
            (base + d(4), base + d(5)),
        ],
    }
}

// ---------------------------------------------------------------------------
// Forecast archive
// ---------------------------------------------------------------------------

/// All shift forecast stores of a verification run, keyed "Tue_Aft" style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastArchive {
    shifts: BTreeMap<String, ShiftForecasts>,
}

impl ForecastArchive {
    pub fn new() -> ForecastArchive {
        ForecastArchive::default()
    }

    /// The store for one recurring shift, created empty on first use.
    pub fn shift_mut(&mut self, day: &str, time: ShiftTime) -> &mut ShiftForecasts {
        let key = format!("{}_{}", day, time.label());
        self.shifts
            .entry(key)
            .or_insert_with(|| ShiftForecasts::new(day, time))
    }

    pub fn get(&self, key: &str) -> Option<&ShiftForecasts> {
        self.shifts.get(key)
    }

    /// All shift stores, optionally restricted to one shift time.
    pub fn shifts(&self, time: Option<ShiftTime>) -> Vec<&ShiftForecasts> {
        self.shifts
            .values()
            .filter(|s| time.map_or(true, |t| s.time() == t))
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.shifts.values().map(|s| s.record_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
