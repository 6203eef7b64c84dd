/// End-to-end verification tests.
///
/// Each test writes a small season of data files — fixed-width forecast
/// worksheets and IEM ASOS archives — into a scratch directory, loads them
/// through the real ingest paths, runs the verification pass, and checks
/// the resulting skill and error scores.
///
/// 2010-05-10 is a Monday; the sample worksheet is that Monday's afternoon
/// shift, so its day-1A forecasts verify from 18Z to 06Z the next morning.

use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use wxverif_service::config;
use wxverif_service::forecasts::ForecastArchive;
use wxverif_service::ingest::{forecast, iem};
use wxverif_service::model::{ForecastField, ForecastPeriod, ShiftTime};
use wxverif_service::report;
use wxverif_service::snapshot::Snapshot;
use wxverif_service::verify;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Builds one fixed-width worksheet row from its 14 fields.
fn site_row(fields: [&str; 14]) -> String {
    fields
        .iter()
        .map(|f| format!("{:<5}", f))
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn sample_worksheet() -> String {
    let koun = site_row([
        "KOUN", "83", "21Z", "61", "09Z", "SW", "NW", "15", "5", "25", "BKN", "100", "RA", "LGT",
    ]);
    let ktul = site_row([
        "KTUL", "90", "22Z", "65", "10Z", "N", "NE", "10", "3", "", "CLR", "0", "", "",
    ]);
    format!(
        "Forecast worksheet\n\
         20100510\n\
         SITE TMPH TIMH TMPL TIML WDRI WDRF WSHI WSLO WGST SKYC PPRB PTYP PINT\n\
         {}\n\
         {}\n",
        koun, ktul
    )
}

const OUN_ARCHIVE: &str = "\
#DEBUG: Format -> onlycomma
station,valid,tmpf,sknt,p01m,skyc1,skyc2,skyc3,skyc4,metar
OUN,2010-05-10 19:53,78.0,8.0,0.00,SCT,M,M,M,KOUN 101953Z AUTO
OUN,2010-05-10 20:53,80.0,10.0,0.30,BKN,M,M,M,KOUN 102053Z AUTO
";

const TUL_ARCHIVE: &str = "\
#DEBUG: Format -> onlycomma
station,valid,tmpf,sknt,p01m,skyc1,skyc2,skyc3,skyc4,metar
TUL,2010-05-10 20:53,85.0,5.0,0.00,CLR,M,M,M,KTUL 102053Z AUTO
";

struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Scratch {
        let root = std::env::temp_dir().join(format!(
            "wxverif_integration_{}_{}",
            std::process::id(),
            name
        ));
        fs::create_dir_all(root.join("fcst")).unwrap();
        fs::create_dir_all(root.join("verif_data")).unwrap();
        fs::write(root.join("fcst/20100510Aft.fcst"), sample_worksheet()).unwrap();
        fs::write(root.join("verif_data/OUN_asos.txt"), OUN_ARCHIVE).unwrap();
        fs::write(root.join("verif_data/TUL_asos.txt"), TUL_ARCHIVE).unwrap();
        Scratch { root }
    }

    fn load(&self) -> (ForecastArchive, wxverif_service::observations::ObservationArchive) {
        let start_date = config::parse_date("20100501").unwrap();
        let end_date = config::parse_date("20100531").unwrap();
        let start = config::date_to_utc(start_date);
        let end = config::date_to_utc(end_date);

        let mut forecasts = ForecastArchive::new();
        forecast::collect_forecasts(&self.root.join("fcst"), start_date, end_date, &mut forecasts);
        let observations = iem::load_directory(&self.root.join("verif_data"), start, end).unwrap();
        (forecasts, observations)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

fn window() -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2010, 5, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2010, 5, 31, 0, 0, 0).unwrap(),
    )
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[test]
fn test_collection_buckets_worksheets_by_weekday_and_shift() {
    let scratch = Scratch::new("collection");
    let (forecasts, observations) = scratch.load();

    let shift = forecasts.get("Mon_Aft").expect("2010-05-10 was a Monday");
    assert_eq!(shift.time(), ShiftTime::Afternoon);
    assert_eq!(shift.records(ForecastPeriod::Day1A).len(), 2);
    assert_eq!(observations.station_ids(), vec!["OUN", "TUL"]);
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[test]
fn test_perfect_precip_forecasts_score_skill_one() {
    let scratch = Scratch::new("precip");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let summaries = verify::verify_precip(&forecasts, &observations, start, end, None);
    let day1a = &summaries[ForecastPeriod::Day1A.index()];

    // KOUN forecast 100% and verified wet; KTUL forecast 0% and verified
    // dry. Perfect reliability against a 0.5 climatology.
    assert_eq!(day1a.combined.get(1, 10), 1.0);
    assert_eq!(day1a.combined.get(0, 0), 1.0);
    assert_eq!(day1a.combined.total(), 2.0);
    assert_eq!(day1a.combined_skill, 1.0);
    assert_eq!(day1a.combined_components.score, 0.0);

    // Later periods had no forecasts: totals zero, skill undefined, and
    // nothing panicked along the way.
    let day4 = &summaries[ForecastPeriod::Day4.index()];
    assert_eq!(day4.combined.total(), 0.0);
    assert!(!day4.combined_skill.is_finite());
}

#[test]
fn test_temperature_errors_match_observed_highs() {
    let scratch = Scratch::new("temperature");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let scores = verify::verify_temperature(&forecasts, &observations, start, end, None);

    let oun_high = scores
        .iter()
        .find(|s| s.station == "OUN" && s.variable == ForecastField::TempHigh)
        .expect("OUN TMPH score");
    assert_eq!(oun_high.mean_error, 3.0, "forecast 83 vs observed high 80");

    let tul_high = scores
        .iter()
        .find(|s| s.station == "TUL" && s.variable == ForecastField::TempHigh)
        .expect("TUL TMPH score");
    assert_eq!(tul_high.mean_error, 5.0, "forecast 90 vs observed high 85");
}

#[test]
fn test_wind_errors_convert_observed_knots() {
    let scratch = Scratch::new("wind");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let scores = verify::verify_wind(&forecasts, &observations, start, end, None);
    let oun_high = scores
        .iter()
        .find(|s| s.station == "OUN" && s.variable == ForecastField::WindSpeedHigh)
        .expect("OUN WSHI score");

    // Forecast 15 mph against a 10 kt observed peak.
    let expected = 15.0 - 10.0 * wxverif_service::model::KNOTS_TO_MPH;
    assert!((oun_high.mean_error - expected).abs() < 1e-9);
}

#[test]
fn test_sky_cover_verifies_on_the_diagonal() {
    let scratch = Scratch::new("sky");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let summaries = verify::verify_sky(&forecasts, &observations, start, end, None);
    let day1a = &summaries[ForecastPeriod::Day1A.index()];

    // BKN verified BKN at OUN, CLR verified CLR at TUL.
    assert_eq!(day1a.combined.get(3, 3), 1.0);
    assert_eq!(day1a.combined.get(0, 0), 1.0);
    assert_eq!(day1a.combined_heidke, 1.0);
    assert_eq!(day1a.combined_peirce, 1.0);
}

#[test]
fn test_full_run_produces_every_verification_type() {
    let scratch = Scratch::new("full_run");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let overall = verify::run_verification(&forecasts, &observations, start, end, None);
    assert_eq!(overall.precip.len(), 5, "one summary per period");
    assert!(!overall.temperature.is_empty());
    assert!(!overall.wind.is_empty());
    assert_eq!(overall.sky.len(), 5);

    // Restricting to the morning shift leaves nothing: the only worksheet
    // is an afternoon one, and that must not be an error.
    let morning = verify::run_verification(
        &forecasts,
        &observations,
        start,
        end,
        Some(ShiftTime::Morning),
    );
    assert!(morning.temperature.is_empty());
    assert_eq!(morning.precip[0].combined.total(), 0.0);
}

// ---------------------------------------------------------------------------
// Snapshot and reports
// ---------------------------------------------------------------------------

#[test]
fn test_snapshot_round_trip_preserves_loaded_archives() {
    let scratch = Scratch::new("snapshot");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let snapshot = Snapshot {
        start,
        end,
        forecasts,
        observations,
    };
    let path = scratch.root.join("season.json");
    snapshot.save(&path).unwrap();
    let reloaded = Snapshot::load(&path).unwrap();

    assert_eq!(reloaded, snapshot);
}

#[test]
fn test_score_reports_write_and_read_back_identically() {
    let scratch = Scratch::new("reports");
    let (forecasts, observations) = scratch.load();
    let (start, end) = window();

    let overall = verify::run_verification(&forecasts, &observations, start, end, None);
    let precip = report::precip_report(&overall).unwrap();
    assert!(
        precip
            .rows()
            .iter()
            .any(|row| row[0] == "PPRB" && row[2] == "ALL" && row[1] == "1A"),
        "the all-stations day-1A row must be present"
    );

    let path = scratch.root.join("precip_scores.csv");
    precip.write_csv(&path).unwrap();

    let mut reloaded = report::ScoreReport::new(&["BS", "BSS"]);
    reloaded.read_csv(&path, false).unwrap();
    assert_eq!(reloaded, precip);
}
