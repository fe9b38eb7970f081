//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::{CsvAdapter, CsvColumns};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::tracing_sink::TracingSink;
use crate::domain::backtest::{BacktestDriver, BacktestResult, MalformedBarPolicy};
use crate::domain::config_validation::{DataSettings, ValidatedConfig, validate_config};
use crate::domain::error::MacrossError;
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::build_strategy;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportPort, ReportSink};

#[derive(Parser, Debug)]
#[command(name = "macross", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV, overrides [data] file_path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Step-record CSV, overrides [report] output_path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Abort on the first malformed bar
        #[arg(long)]
        strict: bool,
    },
    /// Validate a configuration file and print the resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range and bar count of the configured data
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            strict,
        } => run_backtest(&config, data, output, strict),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data } => run_info(&config, data),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<ValidatedConfig, MacrossError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)
}

/// Data adapter for `settings`, with an optional path override.
pub fn build_data_adapter(
    settings: &DataSettings,
    data_override: Option<PathBuf>,
) -> Result<CsvAdapter, MacrossError> {
    let path = data_override
        .or_else(|| settings.file_path.clone())
        .ok_or_else(|| MacrossError::ConfigMissing {
            section: "data".into(),
            key: "file_path".into(),
        })?;
    let columns = CsvColumns {
        date: settings.date_column.clone(),
        price: settings.price_column.clone(),
        volume: settings.volume_column.clone(),
    };
    Ok(CsvAdapter::new(path, columns))
}

/// Fetch, order, and replay. Everything after configuration lives here so
/// it can run against any [`DataPort`].
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &ValidatedConfig,
    sink: &mut dyn ReportSink,
) -> Result<BacktestResult, MacrossError> {
    let bars = data_port.fetch_bars(config.data.start_date, config.data.end_date)?;
    let series = PriceSeries::new(bars)?;
    let strategy = build_strategy(&config.strategy)?;
    let mut driver = BacktestDriver::new(strategy, config.backtest.clone())?;
    info!(strategy = %driver.strategy_name(), bars = series.len(), "running backtest");
    driver.run(&series, sink)
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<PathBuf>,
    output_override: Option<PathBuf>,
    strict: bool,
) -> Result<(), MacrossError> {
    // Stage 1: load and validate config
    let mut config = load_config(config_path)?;
    if strict {
        config.backtest.malformed_bars = MalformedBarPolicy::Abort;
    }
    if output_override.is_some() {
        config.output_path = output_override;
    }

    // Stage 2: resolve data source
    let data_port = build_data_adapter(&config.data, data_override)?;
    eprintln!("Loading prices from {}", data_port.path().display());

    // Stage 3: replay
    let mut sink = TracingSink::new();
    let result = run_backtest_pipeline(&data_port, &config, &mut sink)?;

    // Stage 4: console summary
    print_summary(&result);

    // Stage 5: step report
    if let Some(output) = &config.output_path {
        CsvReportAdapter::new().write(&result, output)?;
        eprintln!("\nReport written to: {}", output.display());
    }
    Ok(())
}

pub fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    eprintln!("\n=== Backtest Summary ===");
    eprintln!("Steps Processed:  {}", s.steps_processed);
    eprintln!("Active Steps:     {}", s.total_steps_active);
    eprintln!("Malformed Bars:   {}", s.malformed_bars);
    eprintln!("Trades:           {}", s.trade_count);
    eprintln!("Initial Cash:     {:.2}", s.initial_cash);
    eprintln!("Commission Paid:  {:.4}", s.total_commission);
    eprintln!("Ending Cash:      {:.4}", s.ending_cash);
    eprintln!("Realized P&L:     {:.4}", s.realized_pnl);
    eprintln!("Unrealized P&L:   {:.4}", s.unrealized_pnl);
    eprintln!("Ending Value:     {:.4}", s.ending_value);
    eprintln!("Ending Position:  {}", s.ending_position);

    if !result.trades.is_empty() {
        eprintln!("\n=== Trades ===");
        for t in &result.trades {
            eprintln!(
                "  #{:<6} {}  {} -> {}  @ {:.5}  fee {:.5}",
                t.index, t.timestamp, t.from, t.to, t.price, t.commission
            );
        }
    }
}

fn run_validate(config_path: &Path) -> Result<(), MacrossError> {
    let config = load_config(config_path)?;
    let strategy = build_strategy(&config.strategy)?;

    eprintln!("\nStrategy:");
    eprintln!("  name:       {}", strategy.name());
    eprintln!("  warmup:     {} bars", strategy.warmup());
    eprintln!("  crossover:  {:?}", config.strategy.crossover);

    eprintln!("\nBacktest:");
    eprintln!("  initial_cash:    {}", config.backtest.initial_cash);
    eprintln!("  commission_rate: {}", config.backtest.commission_rate);
    eprintln!("  malformed_bars:  {:?}", config.backtest.malformed_bars);

    eprintln!("\nData:");
    match &config.data.file_path {
        Some(p) => eprintln!("  file_path:  {}", p.display()),
        None => eprintln!("  file_path:  (not set, pass --data)"),
    }
    eprintln!(
        "  columns:    {} / {} / {}",
        config.data.date_column, config.data.price_column, config.data.volume_column
    );
    if let Some(d) = config.data.start_date {
        eprintln!("  start_date: {}", d);
    }
    if let Some(d) = config.data.end_date {
        eprintln!("  end_date:   {}", d);
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_info(config_path: &Path, data_override: Option<PathBuf>) -> Result<(), MacrossError> {
    let config = load_config(config_path)?;
    let data_port = build_data_adapter(&config.data, data_override)?;

    match data_port.data_range()? {
        Some((first, last, count)) => {
            println!(
                "{}: {} bars, {} to {}",
                data_port.path().display(),
                count,
                first,
                last
            );
        }
        None => eprintln!("{}: no data found", data_port.path().display()),
    }
    Ok(())
}
