/// Per-station observation store.
///
/// An `ObservationSeries` holds one station's ASOS reports for the loaded
/// verification window, ordered by report time, and answers the window
/// queries the orchestrator matches forecasts against: raw values, high/low
/// temperature, max/min wind, precipitation totals, and worst-case sky
/// cover.
///
/// A window with no qualifying observations is not an error. Every
/// aggregate resolves it to the −998 sentinel (or the missing sky-cover
/// category) so that gaps in observational coverage flow through scoring as
/// data, never as a fault.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    AGGREGATE_MISSING, FIELD_MISSING, KNOTS_TO_MPH, OBS_MISSING_MAX, Observation, ObsField,
    SkyCover, TEMP_PLAUSIBLE_MAX, TEMP_PLAUSIBLE_MIN,
};

/// A verifying time window, closed on both ends.
pub type Window = (DateTime<Utc>, DateTime<Utc>);

// ---------------------------------------------------------------------------
// Observation series
// ---------------------------------------------------------------------------

/// One station's observations over the loaded date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    station: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    data: Vec<Observation>,
}

impl ObservationSeries {
    /// Builds a series from loaded observations, retaining only reports
    /// inside the requested window (inclusive at both ends). Source order
    /// is preserved; archives deliver reports in non-decreasing time order.
    pub fn from_observations(
        station: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        observations: Vec<Observation>,
    ) -> ObservationSeries {
        let data = observations
            .into_iter()
            .filter(|obs| obs.valid >= start && obs.valid <= end)
            .collect();
        ObservationSeries {
            station: station.to_string(),
            start,
            end,
            data,
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn loaded_range(&self) -> Window {
        (self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Observations with `start <= valid <= end`.
    fn in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> impl Iterator<Item = &Observation> {
        self.data
            .iter()
            .filter(move |obs| obs.valid >= start && obs.valid <= end)
    }

    /// Raw values of `field` for every report in the window.
    ///
    /// Without the filter, missing fields come back as the −999 sentinel so
    /// the result stays aligned with the reports. With the filter, rows
    /// whose value is missing (at or below −990) are dropped instead.
    pub fn values_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        field: ObsField,
        apply_filter: bool,
    ) -> Vec<f64> {
        self.in_window(start, end)
            .map(|obs| obs.field(field).unwrap_or(FIELD_MISSING))
            .filter(|value| !apply_filter || *value > OBS_MISSING_MAX)
            .collect()
    }

    /// Highest plausible temperature per window, −998 where no plausible
    /// reports exist.
    pub fn high_temps(&self, windows: &[Window]) -> Vec<f64> {
        self.high_temps_bounded(windows, TEMP_PLAUSIBLE_MIN, TEMP_PLAUSIBLE_MAX)
    }

    /// Lowest plausible temperature per window, −998 where no plausible
    /// reports exist.
    pub fn low_temps(&self, windows: &[Window]) -> Vec<f64> {
        self.low_temps_bounded(windows, TEMP_PLAUSIBLE_MIN, TEMP_PLAUSIBLE_MAX)
    }

    /// `high_temps` with explicit plausibility bounds.
    pub fn high_temps_bounded(&self, windows: &[Window], min: f64, max: f64) -> Vec<f64> {
        self.temp_extreme(windows, min, max, f64::max)
    }

    /// `low_temps` with explicit plausibility bounds.
    pub fn low_temps_bounded(&self, windows: &[Window], min: f64, max: f64) -> Vec<f64> {
        self.temp_extreme(windows, min, max, f64::min)
    }

    fn temp_extreme(
        &self,
        windows: &[Window],
        min: f64,
        max: f64,
        pick: fn(f64, f64) -> f64,
    ) -> Vec<f64> {
        windows
            .iter()
            .map(|(start, end)| {
                self.in_window(*start, *end)
                    .filter_map(|obs| obs.temp_f)
                    .filter(|t| *t >= min && *t <= max)
                    .reduce(pick)
                    .unwrap_or(AGGREGATE_MISSING)
            })
            .collect()
    }

    /// Peak wind per window in miles per hour, −998 where no wind reports
    /// exist.
    pub fn max_winds(&self, windows: &[Window]) -> Vec<f64> {
        self.wind_extreme(windows, f64::max)
    }

    /// Minimum sustained wind per window in miles per hour, −998 where no
    /// wind reports exist.
    pub fn min_winds(&self, windows: &[Window]) -> Vec<f64> {
        self.wind_extreme(windows, f64::min)
    }

    fn wind_extreme(&self, windows: &[Window], pick: fn(f64, f64) -> f64) -> Vec<f64> {
        windows
            .iter()
            .map(|(start, end)| {
                self.in_window(*start, *end)
                    .filter_map(|obs| obs.wind_speed_kt)
                    .map(|kt| kt * KNOTS_TO_MPH)
                    .reduce(pick)
                    .unwrap_or(AGGREGATE_MISSING)
            })
            .collect()
    }

    /// Total 1-hour precipitation increments per window.
    ///
    /// Returns −998 when the window holds no precipitation reports at all,
    /// and a real 0.0 when reports exist but sum to nothing — rain
    /// non-occurrence is data, not a gap, and the two must stay
    /// distinguishable downstream.
    pub fn precip_totals(&self, windows: &[Window]) -> Vec<f64> {
        windows
            .iter()
            .map(|(start, end)| {
                let increments: Vec<f64> = self
                    .in_window(*start, *end)
                    .filter_map(|obs| obs.precip_1hr)
                    .collect();
                if increments.is_empty() {
                    AGGREGATE_MISSING
                } else {
                    increments.iter().sum()
                }
            })
            .collect()
    }

    /// Worst-case sky cover per window: the highest-ranked layer across all
    /// four reported layers of every observation in the window. Windows
    /// with no ranked layers map to the missing category.
    pub fn cloud_cover(&self, windows: &[Window]) -> Vec<SkyCover> {
        windows
            .iter()
            .map(|(start, end)| {
                self.in_window(*start, *end)
                    .flat_map(|obs| obs.sky_layers.iter())
                    .filter_map(|layer| layer.rank())
                    .max()
                    .map(SkyCover::from_rank)
                    .unwrap_or(SkyCover::Missing)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Observation archive
// ---------------------------------------------------------------------------

/// All loaded observation series, keyed by verification station id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationArchive {
    stations: BTreeMap<String, ObservationSeries>,
}

impl ObservationArchive {
    pub fn new() -> ObservationArchive {
        ObservationArchive::default()
    }

    pub fn insert(&mut self, series: ObservationSeries) {
        self.stations.insert(series.station().to_string(), series);
    }

    pub fn get(&self, station: &str) -> Option<&ObservationSeries> {
        self.stations.get(station)
    }

    /// Station ids in sorted order.
    pub fn station_ids(&self) -> Vec<&str> {
        self.stations.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 5, 10, hour, minute, 0).unwrap()
    }

    fn obs(hour: u32, minute: u32) -> Observation {
        Observation {
            station: "OUN".to_string(),
            valid: at(hour, minute),
            temp_f: None,
            wind_speed_kt: None,
            precip_1hr: None,
            sky_layers: [SkyCover::Missing; 4],
            metar: None,
        }
    }

    fn series(data: Vec<Observation>) -> ObservationSeries {
        ObservationSeries::from_observations("OUN", at(0, 0), at(23, 59), data)
    }

    #[test]
    fn test_values_in_window_is_inclusive_at_both_ends() {
        let mut early = obs(2, 0);
        early.temp_f = Some(60.0);
        let mut late = obs(4, 0);
        late.temp_f = Some(65.0);
        let mut outside = obs(5, 0);
        outside.temp_f = Some(70.0);
        let s = series(vec![early, late, outside]);

        let values = s.values_in_window(at(2, 0), at(4, 0), ObsField::TempF, false);
        assert_eq!(values, vec![60.0, 65.0]);
    }

    #[test]
    fn test_values_filter_drops_missing_rows() {
        let mut present = obs(2, 0);
        present.temp_f = Some(60.0);
        let absent = obs(3, 0);
        let s = series(vec![present, absent]);

        let raw = s.values_in_window(at(0, 0), at(12, 0), ObsField::TempF, false);
        assert_eq!(raw, vec![60.0, FIELD_MISSING], "unfiltered rows keep the sentinel");

        let filtered = s.values_in_window(at(0, 0), at(12, 0), ObsField::TempF, true);
        assert_eq!(filtered, vec![60.0]);
    }

    #[test]
    fn test_high_and_low_temps_over_a_window() {
        let mut a = obs(10, 0);
        a.temp_f = Some(61.0);
        let mut b = obs(14, 0);
        b.temp_f = Some(84.0);
        let mut c = obs(20, 0);
        c.temp_f = Some(72.0);
        let s = series(vec![a, b, c]);
        let windows = [(at(9, 0), at(21, 0))];

        assert_eq!(s.high_temps(&windows), vec![84.0]);
        assert_eq!(s.low_temps(&windows), vec![61.0]);
    }

    #[test]
    fn test_implausible_temperatures_are_ignored() {
        // A 999-degree spike is sensor noise; the real max is beside it.
        let mut spike = obs(12, 0);
        spike.temp_f = Some(999.0);
        let mut real = obs(13, 0);
        real.temp_f = Some(88.0);
        let s = series(vec![spike, real]);

        assert_eq!(s.high_temps(&[(at(11, 0), at(14, 0))]), vec![88.0]);
    }

    #[test]
    fn test_empty_window_yields_sentinel_not_nan() {
        let s = series(vec![]);
        let windows = [(at(0, 0), at(6, 0))];
        assert_eq!(s.high_temps(&windows), vec![AGGREGATE_MISSING]);
        assert_eq!(s.low_temps(&windows), vec![AGGREGATE_MISSING]);
        assert_eq!(s.max_winds(&windows), vec![AGGREGATE_MISSING]);
        assert_eq!(s.min_winds(&windows), vec![AGGREGATE_MISSING]);
        assert_eq!(s.precip_totals(&windows), vec![AGGREGATE_MISSING]);
    }

    #[test]
    fn test_wind_extremes_convert_knots_to_mph() {
        let mut calm = obs(8, 0);
        calm.wind_speed_kt = Some(5.0);
        let mut gusty = obs(9, 0);
        gusty.wind_speed_kt = Some(20.0);
        let s = series(vec![calm, gusty]);
        let windows = [(at(8, 0), at(10, 0))];

        let max = s.max_winds(&windows);
        let min = s.min_winds(&windows);
        assert!((max[0] - 20.0 * KNOTS_TO_MPH).abs() < 1e-9);
        assert!((min[0] - 5.0 * KNOTS_TO_MPH).abs() < 1e-9);
    }

    #[test]
    fn test_zero_precip_total_is_distinct_from_no_data() {
        let mut dry = obs(3, 0);
        dry.precip_1hr = Some(0.0);
        let mut also_dry = obs(4, 0);
        also_dry.precip_1hr = Some(0.0);
        let s = series(vec![dry, also_dry]);

        let totals = s.precip_totals(&[(at(2, 0), at(5, 0)), (at(10, 0), at(12, 0))]);
        assert_eq!(totals[0], 0.0, "observed dryness is a real zero");
        assert_eq!(totals[1], AGGREGATE_MISSING, "no reports is the sentinel");
    }

    #[test]
    fn test_precip_totals_sum_increments() {
        let mut first = obs(6, 0);
        first.precip_1hr = Some(0.25);
        let mut second = obs(7, 0);
        second.precip_1hr = Some(0.30);
        let s = series(vec![first, second]);

        let totals = s.precip_totals(&[(at(5, 0), at(8, 0))]);
        assert!((totals[0] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_cloud_cover_takes_worst_layer_across_window() {
        let mut thin = obs(12, 0);
        thin.sky_layers = [
            SkyCover::Few,
            SkyCover::Scattered,
            SkyCover::Missing,
            SkyCover::Missing,
        ];
        let mut thick = obs(13, 0);
        thick.sky_layers = [
            SkyCover::Scattered,
            SkyCover::Broken,
            SkyCover::Missing,
            SkyCover::Missing,
        ];
        let s = series(vec![thin, thick]);

        let cover = s.cloud_cover(&[(at(12, 0), at(14, 0))]);
        assert_eq!(cover, vec![SkyCover::Broken]);
    }

    #[test]
    fn test_cloud_cover_without_ranked_layers_is_missing() {
        let s = series(vec![obs(12, 0)]);
        assert_eq!(s.cloud_cover(&[(at(12, 0), at(13, 0))]), vec![SkyCover::Missing]);
    }

    #[test]
    fn test_obscured_ceiling_maps_back_to_overcast() {
        let mut vv = obs(15, 0);
        vv.sky_layers = [
            SkyCover::VerticalVisibility,
            SkyCover::Missing,
            SkyCover::Missing,
            SkyCover::Missing,
        ];
        let s = series(vec![vv]);
        assert_eq!(s.cloud_cover(&[(at(15, 0), at(16, 0))]), vec![SkyCover::Overcast]);
    }

    #[test]
    fn test_from_observations_applies_load_window() {
        let inside = obs(12, 0);
        let mut late = obs(12, 0);
        late.valid = Utc.with_ymd_and_hms(2010, 5, 12, 0, 0, 0).unwrap();
        let s = ObservationSeries::from_observations(
            "OUN",
            at(0, 0),
            at(23, 59),
            vec![inside, late],
        );
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_archive_lookup_by_station() {
        let mut archive = ObservationArchive::new();
        archive.insert(series(vec![obs(1, 0)]));
        assert!(archive.get("OUN").is_some());
        assert!(archive.get("TUL").is_none());
        assert_eq!(archive.station_ids(), vec!["OUN"]);
    }
}
