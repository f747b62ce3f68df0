//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::{JsonReportAdapter, STDOUT_PATH};
use crate::domain::backtest::{Backtest, BacktestRequest, BacktestResult, RunWarning};
use crate::domain::batch;
use crate::domain::config_validation::{
    validate_backtest_config, validate_strategy_config, RunConfig,
};
use crate::domain::error::BacktestError;
use crate::domain::strategy::{lookup, StrategyEntry, StrategyParams, REGISTRY};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-symbol strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one strategy and write the result record as JSON
    Backtest(RunArgs),
    /// Run several strategies over the same data and print a table
    Compare {
        #[command(flatten)]
        run: RunArgs,
        /// Comma-separated strategy names; all registered strategies when omitted
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,
    },
    /// List the registered strategies and their parameters
    Strategies,
    /// Validate a configuration without touching any data
    Validate(RunArgs),
}

/// Settings shared by every run command. Flags override the INI file.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub symbol: Option<String>,
    #[arg(long)]
    pub strategy: Option<String>,
    #[arg(long)]
    pub cash: Option<f64>,
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub benchmark: Option<String>,
    /// Strategy parameter, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
    /// Output path, `-` for stdout
    #[arg(short, long)]
    pub output: Option<String>,
    /// Fail when the series is shorter than the strategy warm-up
    #[arg(long)]
    pub strict: bool,
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest(args) => run_backtest(&args),
        Command::Compare { run, strategies } => run_compare(&run, &strategies),
        Command::Strategies => {
            run_strategies();
            Ok(())
        }
        Command::Validate(args) => run_validate(&args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    FileConfigAdapter::from_file(path).map_err(|e| BacktestError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Command-line values layered over an optional INI file.
#[derive(Default)]
pub struct LayeredConfig {
    file: Option<FileConfigAdapter>,
    overrides: HashMap<(String, String), String>,
}

impl LayeredConfig {
    pub fn new(file: Option<FileConfigAdapter>) -> Self {
        LayeredConfig {
            file,
            overrides: HashMap::new(),
        }
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) {
        self.overrides.insert(
            (section.to_lowercase(), key.trim().to_string()),
            value.to_string(),
        );
    }

    /// Build from the file named by `--config` (if any) plus the flags.
    pub fn from_args(args: &RunArgs) -> Result<Self, BacktestError> {
        let file = args.config.as_deref().map(load_config).transpose()?;
        let mut config = LayeredConfig::new(file);

        if let Some(symbol) = &args.symbol {
            config.set("backtest", "symbol", symbol);
        }
        if let Some(strategy) = &args.strategy {
            config.set("backtest", "strategy", strategy);
        }
        if let Some(cash) = args.cash {
            config.set("backtest", "initial_cash", cash);
        }
        if let Some(start) = &args.start {
            config.set("backtest", "start_date", start);
        }
        if let Some(end) = &args.end {
            config.set("backtest", "end_date", end);
        }
        if let Some(dir) = &args.data_dir {
            config.set("backtest", "data_dir", dir.display());
        }
        if let Some(benchmark) = &args.benchmark {
            config.set("backtest", "benchmark", benchmark);
        }
        if let Some(output) = &args.output {
            config.set("backtest", "output", output);
        }
        if args.strict {
            config.set("backtest", "strict", true);
        }
        if let Some(level) = &args.log_level {
            config.set("logging", "level", level);
        }
        for assignment in &args.params {
            let (key, value) = StrategyParams::parse_assignment(assignment)?;
            config.set("params", &key, value);
        }
        Ok(config)
    }

    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        self.overrides
            .get(&(section.to_lowercase(), key.to_string()))
            .cloned()
            .or_else(|| self.file.as_ref().and_then(|f| f.get_string(section, key)))
    }
}

impl ConfigPort for LayeredConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key).filter(|v| !v.trim().is_empty())
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get_string(section, key).map(|v| v.trim().to_lowercase()) {
            Some(v) if matches!(v.as_str(), "true" | "yes" | "1") => true,
            Some(v) if matches!(v.as_str(), "false" | "no" | "0") => false,
            _ => default,
        }
    }

    fn get_section(&self, section: &str) -> Vec<(String, String)> {
        let section = section.to_lowercase();
        let mut merged: BTreeMap<String, String> = self
            .file
            .as_ref()
            .map(|f| f.get_section(&section).into_iter().collect())
            .unwrap_or_default();
        for ((s, key), value) in &self.overrides {
            if *s == section {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged.into_iter().collect()
    }
}

/// Validate the whole run, strategy included.
pub fn resolve_run(config: &dyn ConfigPort) -> Result<RunConfig, BacktestError> {
    let mut run = validate_backtest_config(config)?;
    let (strategy, params) = validate_strategy_config(config)?;
    run.request.strategy = strategy;
    run.request.params = params;
    Ok(run)
}

/// Subscriber for the runner: `fmt` to stderr, filtered by `level` or, when
/// unset, by `RUST_LOG`.
pub fn log_dispatch(level: Option<&str>) -> Result<Dispatch, BacktestError> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| BacktestError::ConfigInvalid {
            section: "logging".into(),
            key: "level".into(),
            reason: e.to_string(),
        })?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    Ok(Dispatch::new(subscriber))
}

fn run_backtest(args: &RunArgs) -> Result<(), BacktestError> {
    let config = LayeredConfig::from_args(args)?;
    let run = resolve_run(&config)?;
    let runner = Backtest::with_dispatch(log_dispatch(run.log_level.as_deref())?);
    let port = CsvAdapter::new(run.data_dir.clone());

    eprintln!(
        "Running {} on {} from {}",
        run.request.strategy,
        run.request.symbol,
        run.data_dir.display()
    );
    let result = runner.run_with_port(&run.request, &port)?;
    print_warnings(&result.warnings);
    print_summary(&run.request, &result);

    let output = run.output.as_deref().unwrap_or(STDOUT_PATH);
    JsonReportAdapter::new().write(&result, output)?;
    if output != STDOUT_PATH {
        eprintln!("Result written to {output}");
    }
    Ok(())
}

fn run_compare(args: &RunArgs, names: &[String]) -> Result<(), BacktestError> {
    let config = LayeredConfig::from_args(args)?;
    let run = validate_backtest_config(&config)?;
    // The configured strategy, if any, keeps its [params]; the rest run on defaults.
    let configured = match config.get_string("backtest", "strategy") {
        Some(_) => Some(validate_strategy_config(&config)?),
        None => None,
    };
    let entries = select_strategies(names)?;
    let runner = Backtest::with_dispatch(log_dispatch(run.log_level.as_deref())?);
    let port = CsvAdapter::new(run.data_dir.clone());

    let request = &run.request;
    let data = port.fetch_series(&request.symbol, request.start_date, request.end_date)?;
    let benchmark_symbol = request.benchmark_symbol();
    let benchmark =
        match port.fetch_series(&benchmark_symbol, request.start_date, request.end_date) {
            Ok(series) => Some(series),
            Err(e) => {
                eprintln!("warning: benchmark {benchmark_symbol} unavailable: {e}");
                None
            }
        };

    let jobs: Vec<BacktestRequest> = entries
        .iter()
        .map(|entry| {
            let params = match &configured {
                Some((name, params)) if name == entry.name => params.clone(),
                _ => StrategyParams::new(),
            };
            BacktestRequest {
                strategy: entry.name.to_string(),
                params,
                ..request.clone()
            }
        })
        .collect();

    eprintln!(
        "Comparing {} strategies on {} ({} bars)",
        jobs.len(),
        request.symbol,
        data.len()
    );
    let results = batch::run_all(&runner, &jobs, &data, benchmark.as_ref());
    print_comparison(&jobs, &results);
    Ok(())
}

fn select_strategies(names: &[String]) -> Result<Vec<&'static StrategyEntry>, BacktestError> {
    if names.is_empty() {
        return Ok(REGISTRY.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            lookup(name).ok_or_else(|| BacktestError::UnknownStrategy { name: name.clone() })
        })
        .collect()
}

fn run_strategies() {
    for entry in REGISTRY {
        println!("{:<16} {}", entry.name, entry.summary);
        if !entry.keys.is_empty() {
            println!("{:<16} params: {}", "", entry.keys.join(", "));
        }
    }
}

fn run_validate(args: &RunArgs) -> Result<(), BacktestError> {
    let config = LayeredConfig::from_args(args)?;
    let run = resolve_run(&config)?;
    if let Some(level) = run.log_level.as_deref() {
        log_dispatch(Some(level))?;
    }

    eprintln!("Configuration OK");
    eprintln!("  Symbol:    {}", run.request.symbol);
    eprintln!("  Benchmark: {}", run.request.benchmark_symbol());
    eprintln!("  Strategy:  {}", run.request.strategy);
    for (key, value) in run.request.params.iter() {
        eprintln!("    {key} = {value}");
    }
    eprintln!("  Cash:      {:.2}", run.request.initial_cash);
    eprintln!("  Data dir:  {}", run.data_dir.display());
    Ok(())
}

fn describe_warning(warning: &RunWarning) -> String {
    match warning {
        RunWarning::InsufficientData { bars, minimum } => {
            format!("only {bars} bars, strategy needs {minimum} to warm up")
        }
        RunWarning::BenchmarkUnavailable { symbol, reason } => {
            format!("benchmark {symbol} unavailable: {reason}")
        }
    }
}

fn print_warnings(warnings: &[RunWarning]) {
    for warning in warnings {
        eprintln!("warning: {}", describe_warning(warning));
    }
}

fn print_summary(request: &BacktestRequest, result: &BacktestResult) {
    let s = &result.summary;
    eprintln!();
    eprintln!("=== {} / {} ===", s.symbol, request.strategy);
    eprintln!("Total Return:     {:.2}%", s.total_return * 100.0);
    eprintln!("Annual Return:    {:.2}%", s.annual_return * 100.0);
    eprintln!(
        "Max Drawdown:     -{:.1}% ({} bars, {} to {})",
        s.max_drawdown * 100.0,
        s.max_drawdown_length,
        s.max_drawdown_start,
        s.max_drawdown_end
    );
    eprintln!("Sharpe Ratio:     {:.2}", s.sharpe);
    eprintln!("Win Rate:         {:.1}%", s.win_rate * 100.0);
    eprintln!("Buy & Hold:       {:.2}%", s.buy_hold_return * 100.0);
    eprintln!("Total Trades:     {}", s.total_trades);
    eprintln!("Final Value:      {:.2}", s.final_value);
}

fn print_comparison(jobs: &[BacktestRequest], results: &[Result<BacktestResult, BacktestError>]) {
    println!(
        "{:<16} {:>9} {:>9} {:>8} {:>7} {:>8} {:>7}",
        "Strategy", "Return", "Annual", "MaxDD", "Sharpe", "WinRate", "Trades"
    );
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(r) => {
                let s = &r.summary;
                println!(
                    "{:<16} {:>8.2}% {:>8.2}% {:>7.1}% {:>7.2} {:>7.1}% {:>7}",
                    job.strategy,
                    s.total_return * 100.0,
                    s.annual_return * 100.0,
                    s.max_drawdown * 100.0,
                    s.sharpe,
                    s.win_rate * 100.0,
                    s.total_trades
                );
            }
            Err(e) => println!("{:<16} error: {e}", job.strategy),
        }
    }
}
