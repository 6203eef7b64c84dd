/// Forecast verification service.
///
/// Verifies shift forecasts against observed ASOS station data: loads
/// worksheet and observation archives, matches forecast rows to
/// observations over their verifying windows, accumulates contingency
/// tables per variable, and computes skill and error scores per station,
/// period, and shift time.

pub mod config;
pub mod forecasts;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod observations;
pub mod report;
pub mod scoring;
pub mod snapshot;
pub mod stations;
pub mod verify;
