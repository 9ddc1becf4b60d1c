//! CLI entry point for the bike-share statistics tool.
//!
//! Provides subcommands for a one-shot analysis, the interactive prompt loop,
//! and listing the configured city datasets.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use bikeshare_stats::{
    analysis::{AnalysisReport, analyze},
    config::{CityConfig, data_dir_from_env},
    fetch::{BasicClient, HttpClient},
    filter::TripFilter,
    loader::load_city,
    output::{print_pretty, write_json, write_report},
    prompt::Prompter,
    trip::City,
};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_stats")]
#[command(about = "Descriptive statistics over US bike-share trip logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one city's trips, optionally filtered by month and weekday
    Analyze {
        /// chicago, new york city or washington
        #[arg(short, long)]
        city: City,

        /// all, or january..june
        #[arg(short, long, default_value = "all")]
        month: String,

        /// all, or monday..sunday
        #[arg(short, long, default_value = "all")]
        day: String,

        /// Directory or base URL holding the city CSVs (defaults to $BIKESHARE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<String>,

        /// Print the reports as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Prompt for city, month and day, then analyze; repeat on request
    Interactive {
        /// Directory or base URL holding the city CSVs (defaults to $BIKESHARE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<String>,
    },
    /// List supported cities and where their datasets are read from
    Cities {
        /// Directory or base URL holding the city CSVs (defaults to $BIKESHARE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "warn"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = CityConfig::from_env()?;
    let client = BasicClient::new()?;

    match cli.command {
        Commands::Analyze {
            city,
            month,
            day,
            data_dir,
            json,
        } => {
            let filter = TripFilter::parse(&month, &day)?;
            let data_dir = data_dir.unwrap_or_else(data_dir_from_env);
            let report = run_analysis(&client, &config, &data_dir, city, filter).await?;

            let stdout = std::io::stdout().lock();
            if json {
                write_json(stdout, &report)?;
            } else {
                write_report(stdout, city, &filter, &report)?;
            }
        }
        Commands::Interactive { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(data_dir_from_env);
            interactive(&client, &config, &data_dir).await?;
        }
        Commands::Cities { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(data_dir_from_env);
            for city in City::ALL {
                println!("{:<15} {}", city.to_string(), config.source_for(city, &data_dir));
            }
        }
    }

    Ok(())
}

/// Filter from `var`, or `default` when it is unset or unparseable.
fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Loads one city, applies the filter and computes all reports.
#[tracing::instrument(skip(client, config), fields(city = %city))]
async fn run_analysis<C: HttpClient>(
    client: &C,
    config: &CityConfig,
    data_dir: &str,
    city: City,
    filter: TripFilter,
) -> Result<AnalysisReport> {
    let dataset = load_city(client, config, city, data_dir).await?;

    let filtered = if filter.is_unconstrained() {
        dataset.trips
    } else {
        filter.apply(&dataset.trips)
    };
    info!(kept = filtered.len(), "Filter applied");

    let report = analyze(Arc::from(filtered)).await?;
    print_pretty(&report);
    Ok(report)
}

/// The prompt loop: ask, analyze, print, and repeat while the user says yes.
async fn interactive<C: HttpClient>(client: &C, config: &CityConfig, data_dir: &str) -> Result<()> {
    println!("Hello! Let's explore some US bikeshare data!");
    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    loop {
        let Some((city, filter)) = prompter.ask_selection().await? else {
            break;
        };

        // a failed load ends this round only; the user may pick again
        match run_analysis(client, config, data_dir, city, filter).await {
            Ok(report) => write_report(std::io::stdout().lock(), city, &filter, &report)?,
            Err(e) => {
                error!(error = %e, "Analysis failed");
                println!("Could not analyze {city}: {e:#}");
            }
        }

        if !prompter.ask_restart().await? {
            break;
        }
    }

    Ok(())
}
