/// Core data types for the forecast verification service.
///
/// This module defines the shared domain model imported by all other modules:
/// observation and forecast records, the closed forecast-period and shift
/// enumerations, the sky-cover scale, and the missing-data sentinels. It
/// contains no I/O and no scoring logic — only types and their parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Missing-data sentinels
// ---------------------------------------------------------------------------

/// Field-level missing value. Raw fields that arrive empty (or as the ASOS
/// `M` marker) are normalized to this before typed parsing.
pub const FIELD_MISSING: f64 = -999.0;

/// Aggregate-level missing value. Window aggregates (high temp, precip sum,
/// ...) with no qualifying observations resolve to this, never to NaN and
/// never to a panic.
pub const AGGREGATE_MISSING: f64 = -998.0;

/// Observation validity threshold: raw observation values at or below this
/// are treated as missing when a validity filter is applied.
pub const OBS_MISSING_MAX: f64 = -990.0;

/// Forecast validity threshold: forecast values must be strictly greater
/// than this to count as populated.
pub const FCST_VALID_MIN: f64 = -900.0;

/// Wind speed unit conversion, knots to miles per hour.
pub const KNOTS_TO_MPH: f64 = 1.150_779_45;

/// Plausibility bounds for observed temperatures, degrees Fahrenheit.
/// Values outside this range are sensor noise, not weather.
pub const TEMP_PLAUSIBLE_MIN: f64 = -40.0;
pub const TEMP_PLAUSIBLE_MAX: f64 = 140.0;

// ---------------------------------------------------------------------------
// Forecast periods and shifts
// ---------------------------------------------------------------------------

/// The five forecast lead-time buckets of a shift, in lead-time order.
///
/// Day 1 is split into an early (`1A`) and late (`1B`) window; days 2-4 are
/// whole-day windows. The enumeration is closed: every forecast row belongs
/// to exactly one of these buckets, and period storage is indexed by
/// `ForecastPeriod::index` rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastPeriod {
    Day1A,
    Day1B,
    Day2,
    Day3,
    Day4,
}

impl ForecastPeriod {
    /// All periods in lead-time order.
    pub const ALL: [ForecastPeriod; 5] = [
        ForecastPeriod::Day1A,
        ForecastPeriod::Day1B,
        ForecastPeriod::Day2,
        ForecastPeriod::Day3,
        ForecastPeriod::Day4,
    ];

    /// Storage index of this period, 0..5.
    pub fn index(self) -> usize {
        match self {
            ForecastPeriod::Day1A => 0,
            ForecastPeriod::Day1B => 1,
            ForecastPeriod::Day2 => 2,
            ForecastPeriod::Day3 => 3,
            ForecastPeriod::Day4 => 4,
        }
    }

    /// The period label as it appears in worksheets and reports.
    pub fn label(self) -> &'static str {
        match self {
            ForecastPeriod::Day1A => "1A",
            ForecastPeriod::Day1B => "1B",
            ForecastPeriod::Day2 => "2",
            ForecastPeriod::Day3 => "3",
            ForecastPeriod::Day4 => "4",
        }
    }

    /// Parses a period label. Returns `None` for anything outside the
    /// closed set.
    pub fn from_label(label: &str) -> Option<ForecastPeriod> {
        ForecastPeriod::ALL.into_iter().find(|p| p.label() == label)
    }
}

/// Forecaster work periods within a day. Each forecast worksheet belongs to
/// exactly one shift time, and the verifying windows of its five periods are
/// offset differently for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftTime {
    Morning,
    Afternoon,
    Evening,
}

impl ShiftTime {
    pub const ALL: [ShiftTime; 3] = [
        ShiftTime::Morning,
        ShiftTime::Afternoon,
        ShiftTime::Evening,
    ];

    /// Three-letter label used in worksheet filenames and shift keys.
    pub fn label(self) -> &'static str {
        match self {
            ShiftTime::Morning => "Mor",
            ShiftTime::Afternoon => "Aft",
            ShiftTime::Evening => "Eve",
        }
    }

    pub fn from_label(label: &str) -> Option<ShiftTime> {
        ShiftTime::ALL.into_iter().find(|s| s.label() == label)
    }
}

// ---------------------------------------------------------------------------
// Sky cover
// ---------------------------------------------------------------------------

/// Sky-cover categories on the ordinal ASOS scale, least to most covered.
///
/// `VerticalVisibility` (the `VV` report) means the ceiling is obscured and
/// ranks with overcast. Layers reported as `M` or blank carry no rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyCover {
    Clear,
    Few,
    Scattered,
    Broken,
    Overcast,
    VerticalVisibility,
    Missing,
}

impl SkyCover {
    /// Parses a raw layer code as reported by ASOS or written on a forecast
    /// worksheet. Unknown codes are treated as missing.
    pub fn from_code(code: &str) -> SkyCover {
        match code.trim() {
            "CLR" | "SKC" => SkyCover::Clear,
            "FEW" => SkyCover::Few,
            "SCT" => SkyCover::Scattered,
            "BKN" => SkyCover::Broken,
            "OVC" => SkyCover::Overcast,
            "VV" => SkyCover::VerticalVisibility,
            _ => SkyCover::Missing,
        }
    }

    /// Ordinal rank on the 0-4 cover scale, or `None` for a missing layer.
    pub fn rank(self) -> Option<u8> {
        match self {
            SkyCover::Clear => Some(0),
            SkyCover::Few => Some(1),
            SkyCover::Scattered => Some(2),
            SkyCover::Broken => Some(3),
            SkyCover::Overcast | SkyCover::VerticalVisibility => Some(4),
            SkyCover::Missing => None,
        }
    }

    /// Maps a rank back to the canonical category for that amount of cover.
    pub fn from_rank(rank: u8) -> SkyCover {
        match rank {
            0 => SkyCover::Clear,
            1 => SkyCover::Few,
            2 => SkyCover::Scattered,
            3 => SkyCover::Broken,
            _ => SkyCover::Overcast,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SkyCover::Clear => "CLR",
            SkyCover::Few => "FEW",
            SkyCover::Scattered => "SCT",
            SkyCover::Broken => "BKN",
            SkyCover::Overcast => "OVC",
            SkyCover::VerticalVisibility => "VV",
            SkyCover::Missing => "M",
        }
    }
}

// ---------------------------------------------------------------------------
// Observation records
// ---------------------------------------------------------------------------

/// A single ASOS observation at one station.
///
/// Raw fields that were missing in the source report are `None` here; the
/// documented −999 sentinel is re-emitted at the query boundary
/// (`ObservationSeries::values_in_window`) for report compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 3-letter verification station id, e.g. "OUN".
    pub station: String,
    /// Report time, UTC.
    pub valid: DateTime<Utc>,
    /// Air temperature, degrees Fahrenheit.
    pub temp_f: Option<f64>,
    /// Wind speed, knots.
    pub wind_speed_kt: Option<f64>,
    /// 1-hour precipitation accumulation.
    pub precip_1hr: Option<f64>,
    /// Up to four reported sky-cover layers.
    pub sky_layers: [SkyCover; 4],
    /// Raw METAR text, when present in the archive.
    pub metar: Option<String>,
}

/// Numeric observation fields addressable by window queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObsField {
    TempF,
    WindSpeedKt,
    Precip1hr,
}

impl ObsField {
    /// Column name in the IEM ASOS archive.
    pub fn code(self) -> &'static str {
        match self {
            ObsField::TempF => "tmpf",
            ObsField::WindSpeedKt => "sknt",
            ObsField::Precip1hr => "p01m",
        }
    }
}

impl Observation {
    /// Raw value of a numeric field, `None` when the report omitted it.
    pub fn field(&self, field: ObsField) -> Option<f64> {
        match field {
            ObsField::TempF => self.temp_f,
            ObsField::WindSpeedKt => self.wind_speed_kt,
            ObsField::Precip1hr => self.precip_1hr,
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast records
// ---------------------------------------------------------------------------

/// One row of a forecast worksheet: a single site's forecast for one
/// verifying window within a shift period.
///
/// Numeric fields left blank on the worksheet are `None`; text fields left
/// blank are `None`. The verifying window is closed on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Start of the verifying window, UTC (SDATE).
    pub start: DateTime<Utc>,
    /// End of the verifying window, UTC (EDATE).
    pub end: DateTime<Utc>,
    /// 4-letter forecast site id, e.g. "KOUN".
    pub site: String,
    /// High temperature (TMPH) and its valid time (TIMH).
    pub temp_high: Option<f64>,
    pub temp_high_time: Option<String>,
    /// Low temperature (TMPL) and its valid time (TIML).
    pub temp_low: Option<f64>,
    pub temp_low_time: Option<String>,
    /// Initial and final wind direction (WDRI, WDRF), 8-point compass codes.
    pub wind_dir_initial: Option<String>,
    pub wind_dir_final: Option<String>,
    /// Wind speed range (WSHI, WSLO) and gust (WGST), miles per hour.
    pub wind_speed_high: Option<f64>,
    pub wind_speed_low: Option<f64>,
    pub wind_gust: Option<f64>,
    /// Sky cover category (SKYC).
    pub sky_cover: SkyCover,
    /// Probability of precipitation (PPRB), percent 0-100.
    pub precip_prob: Option<f64>,
    /// Precipitation type and intensity codes (PTYP, PINT).
    pub precip_type: Option<String>,
    pub precip_intensity: Option<String>,
}

/// Numeric forecast fields addressable by window queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastField {
    TempHigh,
    TempLow,
    WindSpeedHigh,
    WindSpeedLow,
    WindGust,
    PrecipProb,
}

impl ForecastField {
    /// Worksheet column code, as used in report rows.
    pub fn code(self) -> &'static str {
        match self {
            ForecastField::TempHigh => "TMPH",
            ForecastField::TempLow => "TMPL",
            ForecastField::WindSpeedHigh => "WSHI",
            ForecastField::WindSpeedLow => "WSLO",
            ForecastField::WindGust => "WGST",
            ForecastField::PrecipProb => "PPRB",
        }
    }
}

impl ForecastRecord {
    /// Raw value of a numeric field, `None` when the worksheet left it blank.
    pub fn field(&self, field: ForecastField) -> Option<f64> {
        match field {
            ForecastField::TempHigh => self.temp_high,
            ForecastField::TempLow => self.temp_low,
            ForecastField::WindSpeedHigh => self.wind_speed_high,
            ForecastField::WindSpeedLow => self.wind_speed_low,
            ForecastField::WindGust => self.wind_gust,
            ForecastField::PrecipProb => self.precip_prob,
        }
    }

    /// True when at least one of the temperature fields is populated.
    ///
    /// Rows with neither a high nor a low temperature are worksheet filler:
    /// the forecaster never touched them, so every variable on the row is
    /// suspect, not just temperature.
    pub fn has_temperature(&self) -> bool {
        self.temp_high.map_or(false, |t| t > FCST_VALID_MIN)
            || self.temp_low.map_or(false, |t| t > FCST_VALID_MIN)
    }
}

// ---------------------------------------------------------------------------
// Record parse errors
// ---------------------------------------------------------------------------

/// Errors raised while parsing a raw observation or forecast row.
///
/// These are recoverable: the loader logs the offending row and continues
/// with the rest of the batch.
#[derive(Debug, PartialEq)]
pub enum RecordError {
    /// The row had the wrong number of fields for its schema.
    FieldCount { expected: usize, got: usize },
    /// A timestamp field could not be parsed.
    BadTimestamp { field: &'static str, value: String },
    /// A numeric field could not be parsed.
    BadNumber { field: &'static str, value: String },
    /// A period label outside the closed {1A, 1B, 2, 3, 4} set.
    UnknownPeriod(String),
    /// A shift label outside the closed {Mor, Aft, Eve} set.
    UnknownShift(String),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::FieldCount { expected, got } => {
                write!(f, "expected {} fields, got {}", expected, got)
            }
            RecordError::BadTimestamp { field, value } => {
                write!(f, "unparseable timestamp in {}: '{}'", field, value)
            }
            RecordError::BadNumber { field, value } => {
                write!(f, "unparseable number in {}: '{}'", field, value)
            }
            RecordError::UnknownPeriod(label) => write!(f, "unknown forecast period '{}'", label),
            RecordError::UnknownShift(label) => write!(f, "unknown shift '{}'", label),
        }
    }
}

impl std::error::Error for RecordError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
