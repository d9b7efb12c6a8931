//! waste-forecast entry point: CLI wiring, data generation, and forecasting.

use std::path::{Path, PathBuf};
use std::process;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waste_forecast::city::forecast_city;
use waste_forecast::config::ForecastConfig;
use waste_forecast::data::HistorySource;
use waste_forecast::generator::{Generator, next_start, seed_for_start, start_ending_on};
use waste_forecast::io::export::{append_csv, export_csv};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    data_path: Option<String>,
    generate: bool,
    append: bool,
    days_override: Option<usize>,
    seed_override: Option<u64>,
    json: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: Option<u16>,
}

fn print_help() {
    eprintln!("waste-forecast: next-day waste forecasting per district");
    eprintln!();
    eprintln!("Usage: waste-forecast [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>      Load configuration from TOML file");
    eprintln!("  --preset <name>      Use a built-in preset (accra, single_district)");
    eprintln!("  --data <path>        Override the historical CSV path");
    eprintln!("  --generate           Write synthetic history instead of forecasting");
    eprintln!("  --append             With --generate, extend the existing file");
    eprintln!("  --days <n>           Days of synthetic history to generate");
    eprintln!("  --seed <u64>         Override the generator seed");
    eprintln!("  --json               Print the forecast as JSON");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve              Start the REST API server");
        eprintln!("  --port <u16>         API server port (default: 8000)");
    }
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the accra preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: waste_forecast=info).");
}

/// Reads the value following a flag or exits with a usage error.
fn flag_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires {what}");
        process::exit(1);
    }
    args[*i].clone()
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        data_path: None,
        generate: false,
        append: false,
        days_override: None,
        seed_override: None,
        json: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                cli.config_path = Some(flag_value(&args, &mut i, "--config", "a path argument"));
            }
            "--preset" => {
                cli.preset = Some(flag_value(&args, &mut i, "--preset", "a name argument"));
            }
            "--data" => {
                cli.data_path = Some(flag_value(&args, &mut i, "--data", "a path argument"));
            }
            "--generate" => cli.generate = true,
            "--append" => cli.append = true,
            "--json" => cli.json = true,
            "--days" => {
                let raw = flag_value(&args, &mut i, "--days", "a count argument");
                if let Ok(d) = raw.parse::<usize>() {
                    cli.days_override = Some(d);
                } else {
                    eprintln!("error: --days value \"{raw}\" is not a valid count");
                    process::exit(1);
                }
            }
            "--seed" => {
                let raw = flag_value(&args, &mut i, "--seed", "a u64 argument");
                if let Ok(s) = raw.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }
            }
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                let raw = flag_value(&args, &mut i, "--port", "a u16 argument");
                if let Ok(p) = raw.parse::<u16>() {
                    cli.port = Some(p);
                } else {
                    eprintln!("error: --port value \"{raw}\" is not a valid u16");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waste_forecast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Generates synthetic history into the configured CSV file.
fn generate(cfg: &ForecastConfig, append: bool) -> Result<(), String> {
    let path: &Path = &cfg.data.path;
    let days = cfg.generator.days;

    let start = if append && path.exists() {
        let snapshot = cfg.source().load_snapshot().map_err(|e| e.to_string())?;
        match next_start(&snapshot) {
            Some(d) => d,
            None => start_ending_on(chrono::Local::now().date_naive(), days),
        }
    } else {
        start_ending_on(chrono::Local::now().date_naive(), days)
    };

    let seed = if append {
        seed_for_start(cfg.generator.seed, start)
    } else {
        cfg.generator.seed
    };
    let records = Generator::from_config(cfg, seed).run(start, days);
    let written = if append {
        append_csv(&records, &cfg.materials, path)
    } else {
        export_csv(&records, &cfg.materials, path)
    };
    written.map_err(|e| format!("failed to write \"{}\": {e}", path.display()))?;

    info!(
        rows = records.len(),
        %start,
        path = %path.display(),
        append,
        "synthetic history written"
    );
    Ok(())
}

/// Loads history, forecasts tomorrow, and prints the result.
fn forecast(cfg: &ForecastConfig, json: bool) -> Result<(), String> {
    let snapshot = cfg.source().load_snapshot().map_err(|e| e.to_string())?;
    for district in snapshot.list_districts() {
        if cfg.district(&district).is_none() {
            warn!(%district, "district in history is not configured");
        }
    }

    let forecaster = cfg.forecaster();
    let overall = forecast_city(&snapshot, forecaster.as_ref()).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&overall).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        println!("{overall}");
    }
    Ok(())
}

fn main() {
    let cli = parse_args();
    init_tracing();

    // --config takes priority, then --preset, then accra
    let mut cfg = if let Some(ref path) = cli.config_path {
        match ForecastConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ForecastConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ForecastConfig::accra()
    };

    if let Some(ref path) = cli.data_path {
        cfg.data.path = PathBuf::from(path);
    }
    if let Some(days) = cli.days_override {
        cfg.generator.days = days;
    }
    if let Some(seed) = cli.seed_override {
        cfg.generator.seed = seed;
    }
    #[cfg(feature = "api")]
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    if cli.generate {
        if let Err(e) = generate(&cfg, cli.append) {
            eprintln!("error: {e}");
            process::exit(1);
        }
        return;
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let addr = SocketAddr::from(([0, 0, 0, 0], cfg.server.port));
        let state = Arc::new(waste_forecast::api::AppState::from_config(cfg));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(waste_forecast::api::serve(state, addr)) {
            eprintln!("error: server failed: {e}");
            process::exit(1);
        }
        return;
    }

    if let Err(e) = forecast(&cfg, cli.json) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
