/// Verification orchestrator.
///
/// Drives the per-station, per-period matching between forecast and
/// observation archives, builds the appropriate contingency table for each
/// variable, and aggregates across stations:
///
/// - precipitation probabilities verify in `ProbabilityTable`s, merged into
///   an all-stations table per period (skill against the combined
///   climatology is the number that matters);
/// - temperature and wind verify in per-station `ContinuousTable`s, which
///   are deliberately never merged — ME/MAE/RMSE are not
///   climatology-sensitive, so cross-station aggregation would only blur
///   siting differences;
/// - sky cover verifies in `CategoryTable`s, merged like the probability
///   tables.
///
/// A station/period combination that cannot be scored is logged and
/// skipped; it never blocks the rest of the batch.

use chrono::{DateTime, Utc};

use crate::forecasts::{ForecastArchive, ShiftForecasts};
use crate::logging::{self, Source};
use crate::model::{
    AGGREGATE_MISSING, ForecastField, ForecastPeriod, ShiftTime, SkyCover,
};
use crate::observations::{ObservationArchive, ObservationSeries, Window};
use crate::scoring::{BrierComponents, CategoryTable, ContinuousTable, ProbabilityTable};
use crate::stations;

// ============================================================================
// Score containers
// ============================================================================

/// One station's probabilistic precipitation verification for a period.
#[derive(Debug, Clone)]
pub struct StationPrecipScore {
    /// 3-letter verification id.
    pub station: String,
    /// 4-letter forecast id.
    pub site: String,
    pub table: ProbabilityTable,
    pub reliability: Vec<f64>,
    pub skill_score: f64,
}

/// Precipitation verification for one period across all stations.
#[derive(Debug, Clone)]
pub struct PrecipPeriodSummary {
    pub period: ForecastPeriod,
    pub stations: Vec<StationPrecipScore>,
    /// Cell-wise merge of every per-station table.
    pub combined: ProbabilityTable,
    pub combined_components: BrierComponents,
    pub combined_reliability: Vec<f64>,
    pub combined_skill: f64,
}

/// Continuous-error verification of one variable at one station for one
/// period. Used for both temperature (TMPH/TMPL) and wind (WSHI/WSLO).
#[derive(Debug, Clone)]
pub struct ContinuousScore {
    pub variable: ForecastField,
    pub period: ForecastPeriod,
    pub station: String,
    pub site: String,
    pub table: ContinuousTable,
    pub mean_error: f64,
    pub mean_absolute_error: f64,
    pub root_mean_square_error: f64,
}

/// One station's categorical sky-cover verification for a period.
#[derive(Debug, Clone)]
pub struct StationSkyScore {
    pub station: String,
    pub site: String,
    pub table: CategoryTable,
    pub heidke: f64,
    pub peirce: f64,
}

/// Sky-cover verification for one period across all stations.
#[derive(Debug, Clone)]
pub struct SkyPeriodSummary {
    pub period: ForecastPeriod,
    pub stations: Vec<StationSkyScore>,
    pub combined: CategoryTable,
    pub combined_heidke: f64,
    pub combined_peirce: f64,
}

/// Everything one verification pass produces.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Which shift times contributed; `None` means all of them.
    pub shift_time: Option<ShiftTime>,
    pub precip: Vec<PrecipPeriodSummary>,
    pub temperature: Vec<ContinuousScore>,
    pub wind: Vec<ContinuousScore>,
    pub sky: Vec<SkyPeriodSummary>,
}

/// The standard 11-bin probability labels 0.0, 0.1, ... 1.0.
pub fn precip_bin_labels() -> Vec<f64> {
    (0..=10).map(|i| i as f64 / 10.0).collect()
}

/// Category labels for the 5-way sky-cover table, rank order.
pub fn sky_labels() -> Vec<String> {
    [
        SkyCover::Clear,
        SkyCover::Few,
        SkyCover::Scattered,
        SkyCover::Broken,
        SkyCover::Overcast,
    ]
    .iter()
    .map(|c| c.label().to_string())
    .collect()
}

// ============================================================================
// Precipitation
// ============================================================================

/// Accumulates one station's precipitation table for a period: every PPRB
/// forecast in the window, matched against the observed precipitation total
/// over its verifying window. Pairs whose observation is the no-data
/// sentinel are not counted.
fn precip_table_for_station(
    shifts: &[&ShiftForecasts],
    obs: &ObservationSeries,
    site: &str,
    period: ForecastPeriod,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ProbabilityTable {
    let mut table = ProbabilityTable::new(precip_bin_labels());

    for shift in shifts {
        let (starts, ends, probs) = shift.forecasts_in_window(
            period,
            start,
            end,
            ForecastField::PrecipProb,
            site,
            true,
        );
        let windows: Vec<Window> = starts.into_iter().zip(ends).collect();
        let totals = obs.precip_totals(&windows);

        for (prob, total) in probs.iter().zip(totals) {
            if total <= AGGREGATE_MISSING {
                continue;
            }
            let occurred = total > 0.0;
            let bin = (prob / 10.0) as usize;
            table.record(occurred, bin);
        }
    }

    table
}

/// Verifies precipitation probabilities for every period and station.
pub fn verify_precip(
    forecasts: &ForecastArchive,
    observations: &ObservationArchive,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shift_time: Option<ShiftTime>,
) -> Vec<PrecipPeriodSummary> {
    let shifts = forecasts.shifts(shift_time);
    let mut summaries = Vec::new();

    for period in ForecastPeriod::ALL {
        let mut station_scores = Vec::new();
        let mut combined = ProbabilityTable::new(precip_bin_labels());

        for station in observations.station_ids() {
            let Some(site) = stations::forecast_id(station) else {
                logging::warn(
                    Source::Scoring,
                    Some(station),
                    "station is not in the site registry; skipping",
                );
                continue;
            };
            let Some(obs) = observations.get(station) else {
                continue;
            };

            let table = precip_table_for_station(&shifts, obs, site, period, start, end);
            if let Err(err) = combined.merge_from(&table) {
                logging::error(
                    Source::Scoring,
                    Some(station),
                    &format!("cannot merge into all-stations table: {}", err),
                );
                continue;
            }
            station_scores.push(StationPrecipScore {
                station: station.to_string(),
                site: site.to_string(),
                reliability: table.reliability(),
                skill_score: table.brier_skill_score(),
                table,
            });
        }

        let combined_components = combined.brier_components();
        summaries.push(PrecipPeriodSummary {
            period,
            stations: station_scores,
            combined_reliability: combined.reliability(),
            combined_skill: combined.brier_skill_score(),
            combined_components,
            combined,
        });
    }

    summaries
}

// ============================================================================
// Temperature and wind
// ============================================================================

/// Pairs one forecast variable against one observation aggregate for a
/// single station/period, producing a continuous-error score.
fn continuous_score_for_station(
    shifts: &[&ShiftForecasts],
    obs: &ObservationSeries,
    station: &str,
    site: &str,
    variable: ForecastField,
    observe: impl Fn(&ObservationSeries, &[Window]) -> Vec<f64>,
    period: ForecastPeriod,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<ContinuousScore> {
    let mut table = ContinuousTable::new();

    for shift in shifts {
        let (starts, ends, values) =
            shift.forecasts_in_window(period, start, end, variable, site, true);
        let windows: Vec<Window> = starts.into_iter().zip(ends).collect();
        let observed = observe(obs, &windows);

        if let Err(err) = table.add_pairs(&values, &observed) {
            logging::error(
                Source::Scoring,
                Some(station),
                &format!(
                    "{} period {}: dropping shift {}: {}",
                    variable.code(),
                    period.label(),
                    shift.key(),
                    err
                ),
            );
        }
    }

    if table.is_empty() {
        return None;
    }
    Some(ContinuousScore {
        variable,
        period,
        station: station.to_string(),
        site: site.to_string(),
        mean_error: table.mean_error(),
        mean_absolute_error: table.mean_absolute_error(),
        root_mean_square_error: table.root_mean_square_error(),
        table,
    })
}

/// Verifies forecast high/low temperatures against observed extremes,
/// per station and period. Continuous tables stay per-station.
pub fn verify_temperature(
    forecasts: &ForecastArchive,
    observations: &ObservationArchive,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shift_time: Option<ShiftTime>,
) -> Vec<ContinuousScore> {
    let shifts = forecasts.shifts(shift_time);
    let mut scores = Vec::new();

    for period in ForecastPeriod::ALL {
        for station in observations.station_ids() {
            let Some(site) = stations::forecast_id(station) else {
                continue;
            };
            let Some(obs) = observations.get(station) else {
                continue;
            };

            let pairings: [(ForecastField, fn(&ObservationSeries, &[Window]) -> Vec<f64>); 2] = [
                (ForecastField::TempHigh, ObservationSeries::high_temps),
                (ForecastField::TempLow, ObservationSeries::low_temps),
            ];
            for (variable, observe) in pairings {
                if let Some(score) = continuous_score_for_station(
                    &shifts, obs, station, site, variable, observe, period, start, end,
                ) {
                    scores.push(score);
                }
            }
        }
    }

    scores
}

/// Verifies forecast wind-speed ranges against observed extremes. Stations
/// whose anemometer is flagged unreliable in the registry are skipped for
/// wind only.
pub fn verify_wind(
    forecasts: &ForecastArchive,
    observations: &ObservationArchive,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shift_time: Option<ShiftTime>,
) -> Vec<ContinuousScore> {
    let shifts = forecasts.shifts(shift_time);
    let mut scores = Vec::new();

    for period in ForecastPeriod::ALL {
        for station in observations.station_ids() {
            if !stations::wind_verified(station) {
                logging::debug(
                    Source::Scoring,
                    Some(station),
                    "wind sensor flagged unreliable; skipping wind verification",
                );
                continue;
            }
            let Some(site) = stations::forecast_id(station) else {
                continue;
            };
            let Some(obs) = observations.get(station) else {
                continue;
            };

            let pairings: [(ForecastField, fn(&ObservationSeries, &[Window]) -> Vec<f64>); 2] = [
                (ForecastField::WindSpeedHigh, ObservationSeries::max_winds),
                (ForecastField::WindSpeedLow, ObservationSeries::min_winds),
            ];
            for (variable, observe) in pairings {
                if let Some(score) = continuous_score_for_station(
                    &shifts, obs, station, site, variable, observe, period, start, end,
                ) {
                    scores.push(score);
                }
            }
        }
    }

    scores
}

// ============================================================================
// Sky cover
// ============================================================================

fn sky_table_for_station(
    shifts: &[&ShiftForecasts],
    obs: &ObservationSeries,
    site: &str,
    period: ForecastPeriod,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CategoryTable {
    let mut table = CategoryTable::new(sky_labels());

    for shift in shifts {
        let (starts, ends, covers) = shift.sky_forecasts_in_window(period, start, end, site);
        let windows: Vec<Window> = starts.into_iter().zip(ends).collect();
        let observed = obs.cloud_cover(&windows);

        for (forecast, observed) in covers.iter().zip(observed) {
            let (Some(f_rank), Some(o_rank)) = (forecast.rank(), observed.rank()) else {
                continue;
            };
            table.record(f_rank as usize, o_rank as usize);
        }
    }

    table
}

/// Verifies forecast sky-cover categories against the worst observed layer,
/// per period and station, with an all-stations merge like precipitation.
pub fn verify_sky(
    forecasts: &ForecastArchive,
    observations: &ObservationArchive,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shift_time: Option<ShiftTime>,
) -> Vec<SkyPeriodSummary> {
    let shifts = forecasts.shifts(shift_time);
    let mut summaries = Vec::new();

    for period in ForecastPeriod::ALL {
        let mut station_scores = Vec::new();
        let mut combined = CategoryTable::new(sky_labels());

        for station in observations.station_ids() {
            let Some(site) = stations::forecast_id(station) else {
                continue;
            };
            let Some(obs) = observations.get(station) else {
                continue;
            };

            let table = sky_table_for_station(&shifts, obs, site, period, start, end);
            if let Err(err) = combined.merge_from(&table) {
                logging::error(
                    Source::Scoring,
                    Some(station),
                    &format!("cannot merge into all-stations table: {}", err),
                );
                continue;
            }
            station_scores.push(StationSkyScore {
                station: station.to_string(),
                site: site.to_string(),
                heidke: table.heidke_skill_score(),
                peirce: table.peirce_skill_score(),
                table,
            });
        }

        summaries.push(SkyPeriodSummary {
            period,
            stations: station_scores,
            combined_heidke: combined.heidke_skill_score(),
            combined_peirce: combined.peirce_skill_score(),
            combined,
        });
    }

    summaries
}

// ============================================================================
// Full verification pass
// ============================================================================

/// Runs every verification type over the loaded archives.
pub fn run_verification(
    forecasts: &ForecastArchive,
    observations: &ObservationArchive,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shift_time: Option<ShiftTime>,
) -> VerificationReport {
    logging::info(
        Source::Scoring,
        None,
        &format!(
            "verifying {} forecast rows against {} stations",
            forecasts.record_count(),
            observations.len()
        ),
    );

    VerificationReport {
        start,
        end,
        shift_time,
        precip: verify_precip(forecasts, observations, start, end, shift_time),
        temperature: verify_temperature(forecasts, observations, start, end, shift_time),
        wind: verify_wind(forecasts, observations, start, end, shift_time),
        sky: verify_sky(forecasts, observations, start, end, shift_time),
    }
}

/// Formats a score for the console: undefined scores print as "undef".
fn fmt_score(value: f64) -> String {
    if value.is_finite() {
        format!("{:6.3}", value)
    } else {
        " undef".to_string()
    }
}

/// Prints the per-period skill summary to the console.
pub fn print_summary(report: &VerificationReport) {
    let label = report
        .shift_time
        .map(|t| t.label())
        .unwrap_or("all shifts");
    println!("============================================================");
    println!(
        "Verification {} - {} ({})",
        report.start.format("%Y%m%d"),
        report.end.format("%Y%m%d"),
        label
    );
    println!("============================================================");

    for summary in &report.precip {
        println!();
        println!("Brier Skill Scores for period {}:", summary.period.label());
        println!("  All stations: {}", fmt_score(summary.combined_skill));
        for station in &summary.stations {
            println!("  {}: {}", station.site, fmt_score(station.skill_score));
        }
    }

    for summary in &report.sky {
        println!();
        println!(
            "Sky cover skill for period {} (all stations): HSS {} PSS {}",
            summary.period.label(),
            fmt_score(summary.combined_heidke),
            fmt_score(summary.combined_peirce)
        );
    }

    if !report.temperature.is_empty() {
        println!();
        println!("Temperature errors (per station):");
        for score in &report.temperature {
            println!(
                "  {} {} period {}: ME {} MAE {} RMSE {}",
                score.site,
                score.variable.code(),
                score.period.label(),
                fmt_score(score.mean_error),
                fmt_score(score.mean_absolute_error),
                fmt_score(score.root_mean_square_error)
            );
        }
    }

    if !report.wind.is_empty() {
        println!();
        println!("Wind errors (per station):");
        for score in &report.wind {
            println!(
                "  {} {} period {}: ME {} MAE {} RMSE {}",
                score.site,
                score.variable.code(),
                score.period.label(),
                fmt_score(score.mean_error),
                fmt_score(score.mean_absolute_error),
                fmt_score(score.root_mean_square_error)
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use crate::observations::ObservationSeries;
    use chrono::TimeZone;

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 5, day, hour, 0, 0).unwrap()
    }

    fn window_str(day: u32, hour: u32) -> String {
        format!("201005{:02}_{:02}:00", day, hour)
    }

    /// A worksheet row forecasting inside [day 10 18Z, day 11 06Z].
    fn row(site: &str, tmph: &str, wshi: &str, wslo: &str, skyc: &str, pprb: &str) -> Vec<String> {
        vec![
            window_str(10, 18),
            window_str(11, 6),
            site.to_string(),
            tmph.to_string(),
            "21Z".to_string(),
            "61".to_string(),
            "09Z".to_string(),
            "SW".to_string(),
            "NW".to_string(),
            wshi.to_string(),
            wslo.to_string(),
            "".to_string(),
            skyc.to_string(),
            pprb.to_string(),
            "RA".to_string(),
            "LGT".to_string(),
        ]
    }

    fn add_row(shift: &mut ShiftForecasts, period: ForecastPeriod, fields: &[String]) {
        let refs: Vec<&str> = fields.iter().map(|s| s.as_str()).collect();
        shift.add_forecast(&refs, period).unwrap();
    }

    fn obs_at(station: &str, day: u32, hour: u32) -> Observation {
        Observation {
            station: station.to_string(),
            valid: utc(day, hour),
            temp_f: Some(70.0),
            wind_speed_kt: Some(10.0),
            precip_1hr: Some(0.0),
            sky_layers: [
                SkyCover::Scattered,
                SkyCover::Missing,
                SkyCover::Missing,
                SkyCover::Missing,
            ],
            metar: None,
        }
    }

    fn series_for(station: &str, observations: Vec<Observation>) -> ObservationSeries {
        ObservationSeries::from_observations(station, utc(1, 0), utc(31, 0), observations)
    }

    #[test]
    fn test_precip_verification_scores_a_perfect_forecast() {
        let mut forecasts = ForecastArchive::new();
        let shift = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "100"));
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "0"));

        // Both rows share the verifying window, so both verify against the
        // same (wet) precipitation total.
        let mut wet = obs_at("OUN", 10, 20);
        wet.precip_1hr = Some(0.4);
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("OUN", vec![wet]));

        let summaries = verify_precip(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        let day1a = &summaries[ForecastPeriod::Day1A.index()];

        // Both forecasts verified wet: the 100% row lands in bin 10 row 1,
        // the 0% row in bin 0 row 1.
        assert_eq!(day1a.combined.get(1, 10), 1.0);
        assert_eq!(day1a.combined.get(1, 0), 1.0);
        assert_eq!(day1a.combined.total(), 2.0);
        assert_eq!(day1a.stations.len(), 1);
        assert_eq!(day1a.stations[0].site, "KOUN");
    }

    #[test]
    fn test_precip_pairs_with_no_observations_are_skipped() {
        let mut forecasts = ForecastArchive::new();
        let shift = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "70"));

        // Station exists but has no reports inside the verifying window.
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("OUN", vec![obs_at("OUN", 20, 12)]));

        let summaries = verify_precip(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        assert_eq!(
            summaries[ForecastPeriod::Day1A.index()].combined.total(),
            0.0,
            "a no-data window contributes nothing, and nothing panics"
        );
    }

    #[test]
    fn test_combined_table_is_the_merge_of_station_tables() {
        let mut forecasts = ForecastArchive::new();
        let shift = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "100"));
        add_row(shift, ForecastPeriod::Day1A, &row("KTUL", "83", "15", "5", "SCT", "0"));

        let mut wet = obs_at("OUN", 10, 20);
        wet.precip_1hr = Some(0.4);
        let dry = obs_at("TUL", 10, 20);
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("OUN", vec![wet]));
        observations.insert(series_for("TUL", vec![dry]));

        let summaries = verify_precip(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        let day1a = &summaries[ForecastPeriod::Day1A.index()];

        let mut expected = ProbabilityTable::new(precip_bin_labels());
        for station in &day1a.stations {
            expected.merge_from(&station.table).unwrap();
        }
        assert_eq!(day1a.combined, expected);
        // Perfect two-point forecast: BSS 1 on the combined climatology.
        assert_eq!(day1a.combined_skill, 1.0);
    }

    #[test]
    fn test_temperature_scores_report_bias() {
        let mut forecasts = ForecastArchive::new();
        let shift = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "0"));

        let mut hot = obs_at("OUN", 10, 21);
        hot.temp_f = Some(80.0);
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("OUN", vec![hot]));

        let scores = verify_temperature(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        let tmph = scores
            .iter()
            .find(|s| s.variable == ForecastField::TempHigh && s.period == ForecastPeriod::Day1A)
            .expect("TMPH should have been verified");
        assert_eq!(tmph.mean_error, 3.0, "forecast 83 against observed 80");
        assert_eq!(tmph.station, "OUN");
    }

    #[test]
    fn test_wind_exclusion_is_honored() {
        let mut forecasts = ForecastArchive::new();
        let shift = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(shift, ForecastPeriod::Day1A, &row("KCSM", "83", "15", "5", "SCT", "0"));
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "0"));

        let mut observations = ObservationArchive::new();
        observations.insert(series_for("CLK", vec![obs_at("CLK", 10, 20)]));
        observations.insert(series_for("OUN", vec![obs_at("OUN", 10, 20)]));

        let wind = verify_wind(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        assert!(
            wind.iter().all(|s| s.station != "CLK"),
            "the flagged station must not be wind-verified"
        );
        assert!(wind.iter().any(|s| s.station == "OUN"));

        // The same station still verifies temperature.
        let temps = verify_temperature(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        assert!(temps.iter().any(|s| s.station == "CLK"));
    }

    #[test]
    fn test_sky_verification_counts_category_pairs() {
        let mut forecasts = ForecastArchive::new();
        let shift = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(shift, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "BKN", "0"));

        // Worst observed layer in the window is scattered.
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("OUN", vec![obs_at("OUN", 10, 20)]));

        let summaries = verify_sky(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        let day1a = &summaries[ForecastPeriod::Day1A.index()];
        assert_eq!(day1a.combined.get(3, 2), 1.0, "forecast BKN, observed SCT");
        assert_eq!(day1a.combined.total(), 1.0);
    }

    #[test]
    fn test_unregistered_stations_are_skipped_not_fatal() {
        let forecasts = ForecastArchive::new();
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("XXX", vec![]));

        let report = run_verification(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        assert!(report.precip[0].stations.is_empty());
        assert!(report.temperature.is_empty());
    }

    #[test]
    fn test_shift_time_filter_restricts_contributing_shifts() {
        let mut forecasts = ForecastArchive::new();
        let aft = forecasts.shift_mut("Mon", ShiftTime::Afternoon);
        add_row(aft, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "100"));
        let eve = forecasts.shift_mut("Mon", ShiftTime::Evening);
        add_row(eve, ForecastPeriod::Day1A, &row("KOUN", "83", "15", "5", "SCT", "100"));

        let mut wet = obs_at("OUN", 10, 20);
        wet.precip_1hr = Some(0.4);
        let mut observations = ObservationArchive::new();
        observations.insert(series_for("OUN", vec![wet]));

        let all = verify_precip(&forecasts, &observations, utc(1, 0), utc(31, 0), None);
        let evening_only = verify_precip(
            &forecasts,
            &observations,
            utc(1, 0),
            utc(31, 0),
            Some(ShiftTime::Evening),
        );
        assert_eq!(all[0].combined.total(), 2.0);
        assert_eq!(evening_only[0].combined.total(), 1.0);
    }
}
