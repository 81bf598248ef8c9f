//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::auto_step::AutoStepper;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::candle::{Candle, CandleStore};
use crate::domain::error::CandlesimError;
use crate::domain::order::Order;
use crate::domain::simulator::Simulator;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "candlesim", about = "Deterministic OHLC backtest simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a candle history, filling scripted orders
    Replay {
        /// Candle CSV (timestamp,open,high,low,close)
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Order script CSV (type,amount,price,timestamp)
        #[arg(short, long)]
        orders: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Step on a wall-clock cadence instead of inline (milliseconds)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Write a snapshot of the final state to this path
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Summarize an exported snapshot
    Inspect {
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Check a candle CSV for the ordering invariant
    Validate {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Replay {
            data,
            orders,
            config,
            interval_ms,
            export,
        } => run_replay(
            data.as_ref(),
            orders.as_ref(),
            config.as_ref(),
            interval_ms,
            export.as_ref(),
        ),
        Command::Inspect { snapshot } => run_inspect(&snapshot),
        Command::Validate { data } => run_validate(&data),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CandlesimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolved replay parameters: CLI flags override config values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySettings {
    pub candles: PathBuf,
    pub orders: Option<PathBuf>,
    pub interval_ms: u64,
    pub export: Option<PathBuf>,
}

pub fn build_replay_settings(
    config: Option<&dyn ConfigPort>,
    data_flag: Option<&PathBuf>,
    orders_flag: Option<&PathBuf>,
    interval_flag: Option<u64>,
    export_flag: Option<&PathBuf>,
) -> Result<ReplaySettings, CandlesimError> {
    let from_config = |key: &str| {
        config
            .and_then(|c| c.get_string("data", key))
            .map(PathBuf::from)
    };

    let candles = data_flag
        .cloned()
        .or_else(|| from_config("candles"))
        .ok_or_else(|| CandlesimError::ConfigInvalid {
            section: "data".into(),
            key: "candles".into(),
            reason: "no candle file given (use --data or [data] candles)".into(),
        })?;

    let interval_ms = interval_flag
        .unwrap_or_else(|| config.map_or(0, |c| c.get_int("replay", "interval_ms", 0).max(0)) as u64);

    let export = export_flag.cloned().or_else(|| {
        config
            .and_then(|c| c.get_string("replay", "export"))
            .map(PathBuf::from)
    });

    Ok(ReplaySettings {
        candles,
        orders: orders_flag.cloned().or_else(|| from_config("orders")),
        interval_ms,
        export,
    })
}

/// Render an epoch-second timestamp for reports; raw number if out of range.
fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn report_candle(candle: &Candle, orders: &[Order]) {
    let executed = orders.iter().filter(|o| o.is_executed()).count();
    eprintln!(
        "processed {} close={} ({executed}/{} orders executed)",
        format_timestamp(candle.timestamp),
        candle.close,
        orders.len(),
    );
}

fn print_summary(sim: &Simulator) {
    println!("cursor:       {}", format_timestamp(sim.cursor()));
    println!("net position: {}", sim.ledger.net_position());
    println!("balance:      {}", sim.balance.balance());
    println!("total PnL:    {}", sim.total_pnl());
}

fn run_replay(
    data_flag: Option<&PathBuf>,
    orders_flag: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    interval_flag: Option<u64>,
    export_flag: Option<&PathBuf>,
) -> ExitCode {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => Some(a),
                Err(code) => return code,
            }
        }
        None => None,
    };

    let settings = match build_replay_settings(
        adapter.as_ref().map(|a| a as &dyn ConfigPort),
        data_flag,
        orders_flag,
        interval_flag,
        export_flag,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let port = CsvAdapter::new(settings.candles.clone(), settings.orders.clone());
    let sim = match load_simulator(&port) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let sim = if settings.interval_ms == 0 {
        run_inline(sim)
    } else {
        match run_timed(sim, settings.interval_ms) {
            Ok(s) => s,
            Err(code) => return code,
        }
    };

    print_summary(&sim);

    if let Some(path) = &settings.export {
        match sim.export_state().and_then(|json| {
            fs::write(path, json)?;
            Ok(())
        }) {
            Ok(()) => eprintln!("Snapshot written to {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

fn load_simulator(port: &dyn DataPort) -> Result<Simulator, CandlesimError> {
    let candles = port.load_candles()?;
    eprintln!("Loaded {} candles", candles.len());

    let mut sim = Simulator::new(candles)?;

    let requests = port.load_orders()?;
    eprintln!("Placing {} orders", requests.len());
    for request in requests {
        sim.place_order(
            request.order_type,
            request.amount,
            request.price,
            request.timestamp,
        )?;
    }
    Ok(sim)
}

fn run_inline(mut sim: Simulator) -> Simulator {
    while sim.advance_to_next_candle_with(report_candle) {}
    sim
}

fn run_timed(sim: Simulator, interval_ms: u64) -> Result<Simulator, ExitCode> {
    eprintln!("Auto-stepping every {interval_ms}ms");
    let shared = Arc::new(Mutex::new(sim));
    let stepper = AutoStepper::start(
        Arc::clone(&shared),
        Duration::from_millis(interval_ms),
        report_candle,
    );
    stepper.wait();

    match Arc::try_unwrap(shared) {
        Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(|poison| poison.into_inner())),
        Err(_) => {
            eprintln!("error: auto-step driver still holds the simulator");
            Err(ExitCode::from(1))
        }
    }
}

fn run_inspect(snapshot_path: &PathBuf) -> ExitCode {
    let json = match fs::read_to_string(snapshot_path) {
        Ok(j) => j,
        Err(e) => {
            let err = CandlesimError::from(e);
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let mut sim = match Simulator::new(Vec::new()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = sim.import_state(&json) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    // the snapshot carries no balance; rebuild it from the executed orders
    sim.recompute_balance();

    println!("candles: {}", sim.store.len());
    println!("orders:  {}", sim.orders().len());
    for order in sim.orders() {
        let price = order
            .price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".into());
        let executed = order
            .execution_price
            .map(|p| format!("executed @ {p}"))
            .unwrap_or_else(|| "pending".into());
        println!(
            "  #{} {} amount={} price={} placed={} {}",
            order.id,
            order.order_type,
            order.amount,
            price,
            format_timestamp(order.timestamp),
            executed,
        );
    }
    print_summary(&sim);
    ExitCode::SUCCESS
}

fn run_validate(data: &PathBuf) -> ExitCode {
    let port = CsvAdapter::new(data.clone(), None);
    let result = port.load_candles().and_then(CandleStore::new);
    match result {
        Ok(store) => {
            println!(
                "OK: {} candles, timestamps strictly increasing",
                store.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
