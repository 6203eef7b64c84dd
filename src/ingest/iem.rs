/// IEM (Iowa Environmental Mesonet) ASOS archive ingest.
///
/// Loads station observation history from the comma-delimited archive
/// format served by the Iowa State University Mesonet: `#` comment lines,
/// one header line naming the columns, `M` marking missing fields. Archives
/// are read from local `<STATION>_asos.txt` files or fetched over HTTP for
/// a station and date range.
///
/// API documentation: https://mesonet.agron.iastate.edu/request/download.phtml

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::logging::{self, Source};
use crate::model::{Observation, SkyCover};
use crate::observations::{ObservationArchive, ObservationSeries};

const IEM_BASE_URL: &str = "https://mesonet.agron.iastate.edu";

/// Timestamp layout of the archive's `valid` column.
const ARCHIVE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Filename suffix of local archive files, e.g. `OUN_asos.txt`.
pub const ARCHIVE_FILE_SUFFIX: &str = "_asos.txt";

// ============================================================================
// Column layout
// ============================================================================

/// Column positions resolved from an archive's header line. The archive
/// may carry more columns than verification uses; only these are read.
struct Columns {
    station: usize,
    valid: usize,
    tmpf: usize,
    sknt: usize,
    p01m: usize,
    skyc: [Option<usize>; 4],
    metar: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Columns, Box<dyn Error>> {
        let names: Vec<&str> = header.split(',').map(|s| s.trim()).collect();
        let find = |name: &str| names.iter().position(|n| *n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| format!("archive header is missing column '{}'", name))
        };

        Ok(Columns {
            station: require("station")?,
            valid: require("valid")?,
            tmpf: require("tmpf")?,
            sknt: require("sknt")?,
            p01m: require("p01m")?,
            skyc: [find("skyc1"), find("skyc2"), find("skyc3"), find("skyc4")],
            metar: find("metar"),
        })
    }
}

// ============================================================================
// Archive parsing
// ============================================================================

/// Numeric archive field: `M`, `null`, and blank are missing.
fn parse_field(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "M" || trimmed == "null" {
        None
    } else {
        trimmed.parse().ok()
    }
}

fn sky_layer(fields: &[&str], index: Option<usize>) -> SkyCover {
    index
        .and_then(|i| fields.get(i))
        .map(|raw| SkyCover::from_code(raw))
        .unwrap_or(SkyCover::Missing)
}

/// Parses archive text into a station series, keeping reports inside
/// `start..=end`. Rows with an unreadable timestamp are logged and skipped;
/// a missing header is an error because nothing can be read without it.
pub fn parse_archive(
    text: &str,
    station: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ObservationSeries, Box<dyn Error>> {
    let mut columns: Option<Columns> = None;
    let mut observations = Vec::new();

    for line in text.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        if columns.is_none() {
            if line.contains("station") {
                columns = Some(Columns::from_header(line)?);
                continue;
            }
            return Err("archive data begins before the header line".into());
        }
        let cols = columns.as_ref().expect("header parsed above");

        let fields: Vec<&str> = line.split(',').collect();
        let raw_time = fields.get(cols.valid).copied().unwrap_or("");
        let valid = match NaiveDateTime::parse_from_str(raw_time.trim(), ARCHIVE_TIME_FORMAT) {
            Ok(naive) => naive.and_utc(),
            Err(_) => {
                logging::warn(
                    Source::Asos,
                    Some(station),
                    &format!("skipping report with unreadable time '{}'", raw_time),
                );
                continue;
            }
        };

        observations.push(Observation {
            station: fields
                .get(cols.station)
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| station.to_string()),
            valid,
            temp_f: fields.get(cols.tmpf).and_then(|f| parse_field(f)),
            wind_speed_kt: fields.get(cols.sknt).and_then(|f| parse_field(f)),
            precip_1hr: fields.get(cols.p01m).and_then(|f| parse_field(f)),
            sky_layers: [
                sky_layer(&fields, cols.skyc[0]),
                sky_layer(&fields, cols.skyc[1]),
                sky_layer(&fields, cols.skyc[2]),
                sky_layer(&fields, cols.skyc[3]),
            ],
            metar: cols
                .metar
                .and_then(|i| fields.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && *s != "M"),
        });
    }

    if columns.is_none() {
        return Err("archive contained no header line".into());
    }
    Ok(ObservationSeries::from_observations(
        station,
        start,
        end,
        observations,
    ))
}

// ============================================================================
// Local archive files
// ============================================================================

/// Loads one station's archive file.
pub fn load_station_file(
    path: &Path,
    station: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ObservationSeries, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    parse_archive(&text, station, start, end)
}

/// Loads every `<STATION>_asos.txt` file in a directory. A file that fails
/// to load is logged and skipped; the rest of the archive still loads.
pub fn load_directory(
    dir: &Path,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ObservationArchive, Box<dyn Error>> {
    let mut archive = ObservationArchive::new();

    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(station) = name.strip_suffix(ARCHIVE_FILE_SUFFIX) else {
            continue;
        };
        match load_station_file(&entry.path(), station, start, end) {
            Ok(series) => {
                logging::info(
                    Source::Asos,
                    Some(station),
                    &format!("loaded {} observations", series.len()),
                );
                archive.insert(series);
            }
            Err(err) => {
                logging::error(
                    Source::Asos,
                    Some(station),
                    &format!("failed to load '{}': {}", name, err),
                );
            }
        }
    }

    Ok(archive)
}

// ============================================================================
// HTTP fetch
// ============================================================================

/// Builds the archive request URL for a station and date range.
fn archive_url(station: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{}/cgi-bin/request/asos.py?station={}&data=tmpf,sknt,p01m,skyc1,skyc2,skyc3,skyc4,metar\
         &year1={}&month1={}&day1={}&year2={}&month2={}&day2={}\
         &tz=UTC&format=onlycomma&latlon=no&elev=no&missing=M&trace=null&direct=no",
        IEM_BASE_URL,
        station,
        start.format("%Y"),
        start.format("%m"),
        start.format("%d"),
        end.format("%Y"),
        end.format("%m"),
        end.format("%d"),
    )
}

/// Fetches a station's archive from the IEM endpoint and parses it.
pub fn fetch_station(
    client: &reqwest::blocking::Client,
    station: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ObservationSeries, Box<dyn Error>> {
    let url = archive_url(station, start, end);
    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(format!("IEM ASOS API error: {}", response.status()).into());
    }
    let text = response.text()?;
    parse_archive(&text, station, start, end)
}

/// Fetches archives for a list of stations. Per-station failures are
/// logged and skipped so one offline station never blocks the batch.
pub fn fetch_stations(
    client: &reqwest::blocking::Client,
    stations: &[&str],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ObservationArchive {
    let mut archive = ObservationArchive::new();
    for station in stations {
        match fetch_station(client, station, start, end) {
            Ok(series) => {
                logging::info(
                    Source::Asos,
                    Some(station),
                    &format!("fetched {} observations", series.len()),
                );
                archive.insert(series);
            }
            Err(err) => {
                logging::error(
                    Source::Asos,
                    Some(station),
                    &format!("fetch failed: {}", err),
                );
            }
        }
    }
    archive
}

// ============================================================================
// Tests
// ============================================================================
