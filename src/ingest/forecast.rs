/// Forecast worksheet ingest.
///
/// Worksheets are fixed-width text files named `YYYYMMDD<shift>.fcst`
/// (e.g. `20100510Aft.fcst`), one per shift. Each of the five period
/// blocks opens with a date line, may carry a column-header line, and then
/// lists one 5-character-column row per site. The verifying window of each
/// row is not written on the worksheet; it is derived from the issue date
/// and shift via `forecasts::period_windows`.
///
/// Malformed rows are logged and skipped so a single bad worksheet line
/// never sinks a season of forecasts.

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::forecasts::{ForecastArchive, ShiftForecasts, period_windows, WORKSHEET_TIME_FORMAT};
use crate::logging::{self, Source};
use crate::model::{ForecastPeriod, ShiftTime};

/// Width of one worksheet column.
const COLUMN_WIDTH: usize = 5;

/// Splits a fixed-width worksheet line into trimmed fields.
pub fn split_fixed_width(line: &str, width: usize) -> Vec<String> {
    line.as_bytes()
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).trim().to_string())
        .collect()
}

/// A line opening a period block: its first eight characters are the
/// block's verifying date.
fn is_period_line(line: &str) -> bool {
    line.len() >= 8 && line.as_bytes()[..8].iter().all(|b| b.is_ascii_digit())
}

/// A site forecast row: a `K`-prefixed 4-letter site id in column one.
fn is_site_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 4
        && bytes[0] == b'K'
        && bytes[1..4].iter().all(|b| b.is_ascii_uppercase())
}

/// Parses one worksheet into a shift store. Returns the number of rows
/// added; rows that fail to parse are logged against the worksheet name
/// and skipped.
pub fn parse_worksheet(
    text: &str,
    date: NaiveDate,
    shift_time: ShiftTime,
    store: &mut ShiftForecasts,
    worksheet_name: &str,
) -> usize {
    let windows = period_windows(date, shift_time);
    let mut period: Option<usize> = None;
    let mut added = 0;

    for line in text.lines() {
        if is_period_line(line) {
            period = Some(period.map_or(0, |p| p + 1));
            continue;
        }
        if !is_site_line(line) {
            continue;
        }

        let Some(idx) = period.filter(|p| *p < ForecastPeriod::ALL.len()) else {
            logging::warn(
                Source::Forecast,
                Some(worksheet_name),
                &format!("site row outside any period block: '{}'", line),
            );
            continue;
        };

        let (start, end) = windows[idx];
        let start_field = start.format(WORKSHEET_TIME_FORMAT).to_string();
        let end_field = end.format(WORKSHEET_TIME_FORMAT).to_string();
        let site_fields = split_fixed_width(line, COLUMN_WIDTH);

        let mut fields: Vec<&str> = vec![&start_field, &end_field];
        fields.extend(site_fields.iter().map(|s| s.as_str()));

        match store.add_forecast(&fields, ForecastPeriod::ALL[idx]) {
            Ok(()) => added += 1,
            Err(err) => {
                logging::warn(
                    Source::Forecast,
                    Some(worksheet_name),
                    &format!("skipping row '{}': {}", line, err),
                );
            }
        }
    }

    added
}

/// Loads one worksheet file into a shift store.
pub fn load_worksheet_file(
    path: &Path,
    date: NaiveDate,
    shift_time: ShiftTime,
    store: &mut ShiftForecasts,
) -> Result<usize, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(parse_worksheet(&text, date, shift_time, store, &name))
}

/// Walks the verification date range and loads every worksheet present in
/// `dir` into the archive, bucketing by weekday and shift time. Missing
/// worksheets are normal (nobody forecasts every shift); unreadable ones
/// are logged and skipped.
pub fn collect_forecasts(
    dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
    archive: &mut ForecastArchive,
) -> usize {
    let mut loaded = 0;
    let mut date = start;

    while date <= end {
        let weekday = date.format("%a").to_string();
        for shift_time in ShiftTime::ALL {
            let filename = format!("{}{}.fcst", date.format("%Y%m%d"), shift_time.label());
            let path = dir.join(&filename);
            if !path.exists() {
                continue;
            }
            let store = archive.shift_mut(&weekday, shift_time);
            match load_worksheet_file(&path, date, shift_time, store) {
                Ok(rows) => {
                    loaded += 1;
                    logging::debug(
                        Source::Forecast,
                        Some(&filename),
                        &format!("loaded {} rows", rows),
                    );
                }
                Err(err) => {
                    logging::error(
                        Source::Forecast,
                        Some(&filename),
                        &format!("failed to load: {}", err),
                    );
                }
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    logging::info(
        Source::Forecast,
        None,
        &format!(
            "collected {} worksheets, {} forecast rows",
            loaded,
            archive.record_count()
        ),
    );
    loaded
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastField;
    use chrono::{TimeZone, Utc};

    /// Builds a fixed-width site row from 14 worksheet fields.
    fn site_row(fields: [&str; 14]) -> String {
        fields
            .iter()
            .map(|f| format!("{:<5}", f))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn sample_worksheet() -> String {
        let row_koun = site_row([
            "KOUN", "83", "21Z", "61", "09Z", "SW", "NW", "15", "5", "25", "SCT", "20", "RA",
            "LGT",
        ]);
        let row_ktul = site_row([
            "KTUL", "85", "22Z", "63", "10Z", "S", "SW", "12", "4", "", "BKN", "40", "RA", "MDT",
        ]);
        format!(
            "Forecast worksheet\n\
             20100510\n\
             SITE TMPH TIMH TMPL TIML WDRI WDRF WSHI WSLO WGST SKYC PPRB PTYP PINT\n\
             {}\n\
             {}\n\
             20100510\n\
             {}\n",
            row_koun, row_ktul, row_koun
        )
    }

    #[test]
    fn test_parse_worksheet_buckets_rows_by_period() {
        let date = NaiveDate::from_ymd_opt(2010, 5, 10).unwrap();
        let mut store = ShiftForecasts::new("Mon", ShiftTime::Afternoon);
        let added = parse_worksheet(
            &sample_worksheet(),
            date,
            ShiftTime::Afternoon,
            &mut store,
            "20100510Aft.fcst",
        );

        assert_eq!(added, 3);
        assert_eq!(store.records(ForecastPeriod::Day1A).len(), 2);
        assert_eq!(store.records(ForecastPeriod::Day1B).len(), 1);
    }

    #[test]
    fn test_parsed_rows_carry_the_shift_verifying_windows() {
        let date = NaiveDate::from_ymd_opt(2010, 5, 10).unwrap();
        let mut store = ShiftForecasts::new("Mon", ShiftTime::Afternoon);
        parse_worksheet(
            &sample_worksheet(),
            date,
            ShiftTime::Afternoon,
            &mut store,
            "20100510Aft.fcst",
        );

        let record = &store.records(ForecastPeriod::Day1A)[0];
        assert_eq!(
            record.start,
            Utc.with_ymd_and_hms(2010, 5, 10, 18, 0, 0).unwrap(),
            "afternoon day-1A verifies 18Z to 06Z"
        );
        assert_eq!(
            record.end,
            Utc.with_ymd_and_hms(2010, 5, 11, 6, 0, 0).unwrap()
        );
        assert_eq!(record.site, "KOUN");
        assert_eq!(record.temp_high, Some(83.0));
        assert_eq!(record.field(ForecastField::PrecipProb), Some(20.0));
    }

    #[test]
    fn test_blank_gust_column_parses_to_missing() {
        let date = NaiveDate::from_ymd_opt(2010, 5, 10).unwrap();
        let mut store = ShiftForecasts::new("Mon", ShiftTime::Afternoon);
        parse_worksheet(
            &sample_worksheet(),
            date,
            ShiftTime::Afternoon,
            &mut store,
            "20100510Aft.fcst",
        );

        let ktul = &store.records(ForecastPeriod::Day1A)[1];
        assert_eq!(ktul.site, "KTUL");
        assert_eq!(ktul.wind_gust, None);
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let date = NaiveDate::from_ymd_opt(2010, 5, 10).unwrap();
        let mut store = ShiftForecasts::new("Mon", ShiftTime::Morning);
        let truncated = "20100510\nKOUN   83\n";
        let added = parse_worksheet(truncated, date, ShiftTime::Morning, &mut store, "test.fcst");
        assert_eq!(added, 0);
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_site_rows_before_any_period_are_skipped() {
        let date = NaiveDate::from_ymd_opt(2010, 5, 10).unwrap();
        let mut store = ShiftForecasts::new("Mon", ShiftTime::Morning);
        let row = site_row([
            "KOUN", "83", "21Z", "61", "09Z", "SW", "NW", "15", "5", "25", "SCT", "20", "RA",
            "LGT",
        ]);
        let added = parse_worksheet(&row, date, ShiftTime::Morning, &mut store, "test.fcst");
        assert_eq!(added, 0, "a row with no period block has no verifying window");
    }

    #[test]
    fn test_split_fixed_width_trims_each_column() {
        let fields = split_fixed_width("KOUN   83  21Z", 5);
        assert_eq!(fields, vec!["KOUN", "83", "21Z"]);
    }

    #[test]
    fn test_period_line_detection() {
        assert!(is_period_line("20100510"));
        assert!(is_period_line("20100510  extra"));
        assert!(!is_period_line("SITE TMPH"));
        assert!(!is_period_line("2010"));
    }

    #[test]
    fn test_site_line_detection() {
        assert!(is_site_line("KOUN   83"));
        assert!(!is_site_line("SITE TMPH"));
        assert!(!is_site_line("20100510"));
    }
}
