/// Batch driver: load (or reload) the season's archives, run every
/// verification type, print skill summaries, and write score reports.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use wxverif_service::config::{self, Config};
use wxverif_service::forecasts::ForecastArchive;
use wxverif_service::ingest::{forecast, iem};
use wxverif_service::logging::{self, LogLevel, Source};
use wxverif_service::model::ShiftTime;
use wxverif_service::observations::ObservationArchive;
use wxverif_service::report;
use wxverif_service::snapshot::Snapshot;
use wxverif_service::stations;
use wxverif_service::verify;

#[derive(Parser)]
#[command(name = "wxverif")]
#[command(about = "Verify shift forecasts against ASOS station observations", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "wxverif.toml")]
    config: PathBuf,

    /// Start verification date, YYYYMMDD (overrides the config file)
    #[arg(long)]
    start: Option<String>,

    /// End verification date, YYYYMMDD (overrides the config file)
    #[arg(long)]
    end: Option<String>,

    /// Load archives from the snapshot instead of collecting data files
    #[arg(long)]
    from_snapshot: bool,

    /// Save the collected archives to the snapshot after loading
    #[arg(long)]
    save_snapshot: bool,

    /// Fetch ASOS archives from the IEM API instead of local files
    #[arg(long)]
    fetch_asos: bool,

    /// Skip writing CSV score reports
    #[arg(long)]
    no_reports: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("wxverif: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    logging::init_logger(
        LogLevel::from_config(&cfg.logging.level),
        cfg.logging.file.as_deref(),
    );

    let start_date =
        config::parse_date(cli.start.as_deref().unwrap_or(cfg.verification.start.as_str()))?;
    let end_date = config::parse_date(cli.end.as_deref().unwrap_or(cfg.verification.end.as_str()))?;
    let start = config::date_to_utc(start_date);
    let end = config::date_to_utc(end_date);

    let (forecasts, observations) = if cli.from_snapshot {
        let snapshot = Snapshot::load(Path::new(&cfg.paths.snapshot))?;
        logging::info(
            Source::System,
            None,
            &format!(
                "loaded snapshot '{}': {} forecast rows, {} stations",
                cfg.paths.snapshot,
                snapshot.forecasts.record_count(),
                snapshot.observations.len()
            ),
        );
        (snapshot.forecasts, snapshot.observations)
    } else {
        let forecasts = collect_forecasts(&cfg, start_date, end_date);
        let observations = collect_observations(&cli, &cfg, start, end)?;

        if cli.save_snapshot {
            let snapshot = Snapshot {
                start,
                end,
                forecasts: forecasts.clone(),
                observations: observations.clone(),
            };
            snapshot.save(Path::new(&cfg.paths.snapshot))?;
            logging::info(
                Source::System,
                None,
                &format!("saved snapshot '{}'", cfg.paths.snapshot),
            );
        }
        (forecasts, observations)
    };

    if forecasts.is_empty() {
        return Err("no forecast rows loaded; nothing to verify".into());
    }

    // Overall pass plus one per shift time, like the season summaries the
    // forecasters get.
    let overall = verify::run_verification(&forecasts, &observations, start, end, None);
    verify::print_summary(&overall);
    for shift_time in ShiftTime::ALL {
        let per_shift =
            verify::run_verification(&forecasts, &observations, start, end, Some(shift_time));
        verify::print_summary(&per_shift);
        if !cli.no_reports {
            write_reports(&per_shift, &cfg.paths.report_dir, Some(shift_time))?;
        }
    }

    if !cli.no_reports {
        write_reports(&overall, &cfg.paths.report_dir, None)?;
    }

    Ok(())
}

fn collect_forecasts(
    cfg: &Config,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
) -> ForecastArchive {
    let mut archive = ForecastArchive::new();
    forecast::collect_forecasts(
        Path::new(&cfg.paths.forecast_dir),
        start_date,
        end_date,
        &mut archive,
    );
    archive
}

fn collect_observations(
    cli: &Cli,
    cfg: &Config,
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> Result<ObservationArchive, Box<dyn Error>> {
    if cli.fetch_asos {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(iem::fetch_stations(
            &client,
            &stations::all_verif_ids(),
            start,
            end,
        ))
    } else {
        iem::load_directory(Path::new(&cfg.paths.asos_dir), start, end)
    }
}

fn write_reports(
    verification: &verify::VerificationReport,
    report_dir: &str,
    shift_time: Option<ShiftTime>,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(report_dir)?;

    for (name, score_report) in report::all_reports(verification)? {
        let filename = match shift_time {
            Some(time) => name.replace(".csv", &format!("_{}.csv", time.label())),
            None => name.to_string(),
        };
        let path = Path::new(report_dir).join(&filename);
        score_report.write_csv(&path)?;
        logging::info(
            Source::Report,
            None,
            &format!("wrote {} rows to {}", score_report.len(), path.display()),
        );
    }
    Ok(())
}
