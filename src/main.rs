// src/main.rs
//! gps-timesync - set the system clock from a serial GPS receiver

use anyhow::Context;
use clap::Parser;
use gps_timesync::{
    display::TerminalDisplay, scheduler, transport, FixStore, GatherSettings, Gatherer, GpsConfig,
    PartialFailurePolicy, SerialTransport, SystemClock,
};
use log::{debug, info};
use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    runtime::Runtime,
    sync::{mpsc, watch},
};

/// How long shutdown waits for a gather cycle that is still reading
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "gps-timesync", version, about = "Set the system clock from a serial GPS receiver")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port the receiver is attached to
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Seconds between gather cycles
    #[arg(short, long)]
    interval: Option<u64>,

    /// Only set the clock when HDOP is below this
    #[arg(long)]
    max_hdop: Option<f64>,

    /// What a transport failure does to the last fix
    #[arg(long, value_enum)]
    on_partial_failure: Option<PartialFailurePolicy>,

    /// Run a single gather cycle and exit
    #[arg(long)]
    once: bool,

    /// With --once, print the fix as JSON
    #[arg(long, requires = "once")]
    json: bool,

    /// Show a live status view in the terminal
    #[arg(short, long, conflicts_with = "once")]
    watch: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Save the effective configuration and exit
    #[arg(long)]
    write_config: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut GpsConfig) {
        if let Some(port) = &self.port {
            config.update_serial(port.clone(), self.baud.unwrap_or(config.serial_baudrate));
        } else if let Some(baud) = self.baud {
            config.serial_baudrate = baud;
        }
        if let Some(interval) = self.interval {
            config.gather_interval_secs = interval;
        }
        if let Some(max_hdop) = self.max_hdop {
            config.max_hdop = max_hdop;
        }
        if let Some(policy) = self.on_partial_failure {
            config.on_partial_failure = policy;
        }
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// SIGUSR1 asks for an immediate gather
#[cfg(unix)]
fn listen_for_update_requests(requests: mpsc::Sender<()>) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 =
        signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            if requests.try_send(()).is_err() {
                debug!("Gather request already pending");
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn listen_for_update_requests(_requests: mpsc::Sender<()>) -> anyhow::Result<()> {
    Ok(())
}

fn print_fix(store: &FixStore) {
    println!("Status:      {}", store.format_status());
    println!("Time:        {}", store.format_time());
    println!("Grid square: {}", store.format_grid_square());
    println!("Latitude:    {}", store.format_latitude());
    println!("Longitude:   {}", store.format_longitude());
    println!("Fix quality: {}", store.format_fix_quality());
    println!("Satellites:  {}", store.format_satellites());
    println!("HDOP:        {}", store.format_hdop());
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        transport::list_serial_ports()?;
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => GpsConfig::load_from_file(path)?,
        None => GpsConfig::load().context("Failed to load configuration")?,
    };
    cli.apply(&mut config);
    config.validate()?;

    init_logging(cli.verbose, config.log_file.as_deref())?;

    if cli.write_config {
        let path = match &cli.config {
            Some(path) => {
                config.save_to_file(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    info!(
        "Using {} at {} baud, partial failures {}",
        config.serial_port, config.serial_baudrate, config.on_partial_failure
    );

    let store = Arc::new(FixStore::new());
    let gatherer = Arc::new(Gatherer::new(
        Arc::clone(&store),
        Box::new(SerialTransport::new(config.read_timeout())),
        Box::new(SystemClock::new()),
        GatherSettings::from(&config),
    ));

    let runtime = Runtime::new().context("Failed to start the tokio runtime")?;
    let outcome = runtime.block_on(serve(&cli, &config, &store, &gatherer));
    scheduler::shutdown(runtime, &gatherer, SHUTDOWN_GRACE);

    if !outcome? {
        std::process::exit(1);
    }
    Ok(())
}

/// Run until the work asked for on the command line is done. Returns
/// whether a `--once` cycle succeeded.
async fn serve(
    cli: &Cli,
    config: &GpsConfig,
    store: &Arc<FixStore>,
    gatherer: &Arc<Gatherer>,
) -> anyhow::Result<bool> {
    if cli.once {
        let success = scheduler::trigger(gatherer).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&*store.get())?);
        } else {
            print_fix(store);
        }
        return Ok(success);
    }

    let (request_tx, request_rx) = mpsc::channel(1);
    let (stop_tx, stop_rx) = watch::channel(false);
    listen_for_update_requests(request_tx)?;

    let schedule = tokio::spawn(scheduler::run(
        Arc::clone(gatherer),
        config.gather_interval(),
        config.gather_on_startup,
        request_rx,
        stop_rx,
    ));

    if cli.watch {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                running_clone.store(false, Ordering::Relaxed);
            }
        });
        TerminalDisplay::new().run(Arc::clone(store), running).await?;
    } else {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
    }

    info!("Shutting down");
    let _ = stop_tx.send(true);
    schedule.await?;
    Ok(true)
}
