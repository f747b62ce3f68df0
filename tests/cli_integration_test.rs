//! CLI integration tests: INI files, CSV data and JSON output on disk.

mod common;

use clap::Parser;
use common::*;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;
use tradesim::cli::{self, Cli, LayeredConfig, RunArgs};

fn assert_exit(code: ExitCode, expected: u8) {
    // ExitCode has no PartialEq; compare the debug form.
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(expected)));
}

/// A data directory holding `AAPL.csv` and `SPY.csv`.
fn data_dir(bars: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    let aapl = bars_from_closes("2024-01-01", &wave(bars, 150.0));
    let spy = bars_from_closes("2024-01-01", &wave(bars, 450.0));
    std::fs::write(dir.path().join("AAPL.csv"), to_csv(&aapl)).unwrap();
    std::fs::write(dir.path().join("SPY.csv"), to_csv(&spy)).unwrap();
    dir
}

fn write_ini(dir: &Path, content: &str) -> String {
    let path = dir.join("tradesim.ini");
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["tradesim"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

mod backtest_command {
    use super::*;

    #[test]
    fn ini_driven_run_writes_result() {
        let data = data_dir(60);
        let out = data.path().join("result.json");
        let ini = format!(
            "[backtest]\nsymbol = AAPL\nstrategy = SmaCross\ninitial_cash = 10000\n\
             data_dir = {}\noutput = {}\n\n[params]\nfast = 3\nslow = 8\n",
            data.path().display(),
            out.display()
        );
        let config = write_ini(data.path(), &ini);

        assert_exit(run(&["backtest", "--config", &config]), 0);

        let value = read_json(&out);
        assert_eq!(value["summary"]["symbol"], "AAPL");
        let dates = value["chart"]["dates"].as_array().unwrap();
        assert_eq!(dates.len(), 60 - 8);
        assert_eq!(value["chart"]["benchmark_values"].as_array().unwrap().len(), dates.len());
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn flags_only_run() {
        let data = data_dir(30);
        let out = data.path().join("buyhold.json");
        let dir = data.path().display().to_string();
        let out_arg = out.display().to_string();

        let code = run(&[
            "backtest",
            "--symbol",
            "AAPL",
            "--strategy",
            "buyhold",
            "--cash",
            "5000",
            "--data-dir",
            &dir,
            "--output",
            &out_arg,
        ]);
        assert_exit(code, 0);

        let value = read_json(&out);
        assert_eq!(value["chart"]["buy_points"].as_array().unwrap().len(), 1);
        assert_eq!(value["chart"]["strategy_values"][0].as_f64().unwrap().round(), 5000.0);
    }

    #[test]
    fn param_flag_overrides_ini() {
        let data = data_dir(40);
        let out = data.path().join("dca.json");
        let ini = format!(
            "[backtest]\nsymbol = AAPL\nstrategy = DCA\ndata_dir = {}\noutput = {}\n\n\
             [params]\ninvest_period = 20\n",
            data.path().display(),
            out.display()
        );
        let config = write_ini(data.path(), &ini);

        assert_exit(
            run(&["backtest", "-c", &config, "--param", "invest_period=5"]),
            0,
        );
        let value = read_json(&out);
        assert_eq!(value["chart"]["buy_points"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn missing_benchmark_is_a_warning_not_a_failure() {
        let data = data_dir(20);
        let out = data.path().join("result.json");
        let dir = data.path().display().to_string();
        let out_arg = out.display().to_string();

        let code = run(&[
            "backtest",
            "--symbol",
            "AAPL",
            "--strategy",
            "BuyHold",
            "--benchmark",
            "QQQ",
            "--data-dir",
            &dir,
            "-o",
            &out_arg,
        ]);
        assert_exit(code, 0);
        let value = read_json(&out);
        assert_eq!(value["warnings"][0]["kind"], "benchmark_unavailable");
        assert_eq!(value["warnings"][0]["symbol"], "QQQ");
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn unknown_strategy_is_configuration_error() {
        let data = data_dir(10);
        let dir = data.path().display().to_string();
        let code = run(&[
            "backtest", "--symbol", "AAPL", "--strategy", "Momentum", "--data-dir", &dir,
        ]);
        assert_exit(code, 2);
    }

    #[test]
    fn missing_config_file_is_configuration_error() {
        assert_exit(run(&["backtest", "--config", "/nonexistent/tradesim.ini"]), 2);
    }

    #[test]
    fn missing_data_file_is_data_error() {
        let data = data_dir(10);
        let dir = data.path().display().to_string();
        let code = run(&[
            "backtest", "--symbol", "MSFT", "--strategy", "BuyHold", "--data-dir", &dir,
        ]);
        assert_exit(code, 3);
    }

    #[test]
    fn strict_short_series_is_insufficient_data() {
        let data = data_dir(10);
        let dir = data.path().display().to_string();
        let code = run(&[
            "backtest",
            "--symbol",
            "AAPL",
            "--strategy",
            "SmaCross",
            "--data-dir",
            &dir,
            "--strict",
        ]);
        assert_exit(code, 5);
    }

    #[test]
    fn malformed_csv_is_data_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AAPL.csv"),
            "date,open,high,low,close,volume\n2024-01-02,1,1,1,1,1\n2024-01-01,1,1,1,1,1\n",
        )
        .unwrap();
        let dir_arg = dir.path().display().to_string();
        let code = run(&[
            "backtest", "--symbol", "AAPL", "--strategy", "BuyHold", "--data-dir", &dir_arg,
        ]);
        assert_exit(code, 3);
    }
}

mod other_commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(
            dir.path(),
            "[backtest]\nsymbol = AAPL\nstrategy = Turtle\n\n[params]\nentry = 30\nexit = 15\n",
        );
        assert_exit(run(&["validate", "--config", &config]), 0);
    }

    #[test]
    fn validate_rejects_bad_params() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(
            dir.path(),
            "[backtest]\nsymbol = AAPL\nstrategy = SmaCross\n\n[params]\nfast = 30\nslow = 10\n",
        );
        assert_exit(run(&["validate", "--config", &config]), 2);
    }

    #[test]
    fn validate_rejects_inverted_dates() {
        let code = run(&[
            "validate",
            "--symbol",
            "AAPL",
            "--strategy",
            "RSI",
            "--start",
            "2024-06-01",
            "--end",
            "2024-01-01",
        ]);
        assert_exit(code, 2);
    }

    #[test]
    fn strategies_lists_registry() {
        assert_exit(run(&["strategies"]), 0);
    }

    #[test]
    fn compare_runs_selected_strategies() {
        let data = data_dir(80);
        let dir = data.path().display().to_string();
        let code = run(&[
            "compare",
            "--symbol",
            "AAPL",
            "--data-dir",
            &dir,
            "--strategies",
            "BuyHold,SmaCross,RSI",
        ]);
        assert_exit(code, 0);
    }

    #[test]
    fn compare_rejects_unknown_strategy() {
        let data = data_dir(20);
        let dir = data.path().display().to_string();
        let code = run(&[
            "compare", "--symbol", "AAPL", "--data-dir", &dir, "--strategies", "Nope",
        ]);
        assert_exit(code, 2);
    }
}

mod layered_config {
    use super::*;
    use tradesim::ports::config_port::ConfigPort;

    #[test]
    fn flags_win_over_file() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(
            dir.path(),
            "[backtest]\nsymbol = AAPL\nstrategy = RSI\ninitial_cash = 1000\n",
        );
        let args = RunArgs {
            config: Some(config.into()),
            cash: Some(2_500.0),
            ..RunArgs::default()
        };
        let layered = LayeredConfig::from_args(&args).unwrap();
        let run = cli::resolve_run(&layered).unwrap();

        assert_eq!(layered.get_string("backtest", "symbol").as_deref(), Some("AAPL"));
        assert_eq!(run.request.initial_cash, 2_500.0);
        assert_eq!(run.request.strategy, "RSI");
    }
}
