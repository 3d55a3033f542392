//! Brogue Portal command line.
//!
//! Usage:
//!   brogue-portal simulate [--dry-run] [--steps N] [--seed N]
//!   brogue-portal relay [--read-only]   # JSON snapshots in on stdin,
//!                                        # engine commands out on stdout
//!   brogue-portal serve            # metrics server only
//!   brogue-portal stats FILE       # summarize a run history file
//!   brogue-portal endpoints
//!
//! Logging follows `RUST_LOG` (default `info`).

use brogue_portal::build_info;
use brogue_portal::config::{parse_disabled, PortalConfig};
use brogue_portal::error::ConfigError;
use brogue_portal::endpoints::Endpoint;
use brogue_portal::metrics::{AdminKillQueue, SharedMetrics};
use brogue_portal::payload::GameStatsPayload;
use brogue_portal::simulator::{run_simulation, SimConfig};
use brogue_portal::snapshot::{load_run_history, GameStats, JsonLinesSource};
use brogue_portal::{HttpTransport, MemoryTransport, PortalClient, TelemetryService, Transport};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "brogue-portal")]
#[command(version = build_info::VERSION, about = "Report Brogue gameplay telemetry to the portal", long_about = None)]
struct Cli {
    #[command(flatten)]
    portal: PortalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the `PORTAL_*` environment.
#[derive(Args, Debug)]
struct PortalArgs {
    /// Portal base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Port for the Prometheus /metrics endpoint
    #[arg(long, global = true)]
    metrics_port: Option<u16>,

    /// Milliseconds between telemetry ticks
    #[arg(long, global = true)]
    tick_ms: Option<u64>,

    /// Comma-separated reporters to disable (player, monsters, items,
    /// gamestate, gamestats, metrics)
    #[arg(long, global = true)]
    disable: Option<String>,

    /// Do not start the metrics server
    #[arg(long, global = true)]
    no_server: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a seeded simulated dungeon through the reporters
    Simulate {
        /// Log payloads instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Telemetry steps to run
        #[arg(long, default_value_t = 600)]
        steps: u64,

        /// RNG seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Deepest level before the simulated player escapes
        #[arg(long, default_value_t = 26)]
        max_depth: i32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report JSON-lines snapshots read from stdin until it closes.
    /// Monstie spawns and admin kills are written to stdout as JSON lines.
    Relay {
        /// Do not fetch monsties or accept admin kills
        #[arg(long)]
        read_only: bool,
    },
    /// Run only the metrics server
    Serve,
    /// Summarize a run history file the way the gamestats reporter would
    Stats {
        /// Tab-separated run history
        path: PathBuf,
    },
    /// Print the portal endpoint table
    Endpoints,
    /// Print version and build information
    Version,
}

fn build_config(args: &PortalArgs) -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config.set_base_url("--base-url", base_url)?;
    }
    if let Some(port) = args.metrics_port {
        config.metrics_port = port;
    }
    if let Some(ms) = args.tick_ms {
        config.set_tick_ms("--tick-ms", ms)?;
    }
    if let Some(list) = &args.disable {
        config.disabled = parse_disabled(list)?;
    }
    Ok(config)
}

/// Serve `/metrics` in the background unless disabled.
#[cfg(feature = "server")]
fn start_server(args: &PortalArgs, config: &PortalConfig, metrics: SharedMetrics, kills: AdminKillQueue) {
    if args.no_server {
        return;
    }
    match brogue_portal::metrics::spawn_metrics_server(config.metrics_port, metrics, kills) {
        Ok((addr, _handle)) => log::info!("Serving metrics on http://{}/metrics", addr),
        Err(e) => log::error!("Could not start metrics server on port {}: {}", config.metrics_port, e),
    }
}

#[cfg(not(feature = "server"))]
fn start_server(args: &PortalArgs, _config: &PortalConfig, _metrics: SharedMetrics, _kills: AdminKillQueue) {
    if !args.no_server {
        log::warn!("Built without the server feature, /metrics is unavailable");
    }
}

fn simulate<T: Transport>(
    client: PortalClient<T>,
    args: &PortalArgs,
    config: &PortalConfig,
    sim: &SimConfig,
    json: bool,
) {
    let mut service = TelemetryService::new(client, config);
    start_server(args, config, service.metrics(), service.admin_kills());
    let report = run_simulation(sim, &mut service);
    if json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report.to_text());
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&cli.portal)?;

    match cli.command {
        Command::Simulate {
            dry_run,
            steps,
            seed,
            max_depth,
            json,
        } => {
            let sim = SimConfig {
                steps,
                seed,
                max_depth,
                step_delay: if dry_run { Duration::ZERO } else { config.tick_interval },
                ..Default::default()
            };
            if dry_run {
                let transport = MemoryTransport::new();
                transport.respond_with(
                    &Endpoint::NewMonsties.url(&config.base_url),
                    serde_json::json!({"pod-names": []}),
                );
                let client = PortalClient::new(transport.clone(), config.base_url.clone());
                simulate(client, &cli.portal, &config, &sim, json);
                for request in transport.requests() {
                    let body = request.body.map(|b| b.to_string()).unwrap_or_default();
                    log::info!("{:?} {} {}", request.method, request.url, body);
                }
            } else {
                let client = PortalClient::new(
                    HttpTransport::new(config.request_timeout),
                    config.base_url.clone(),
                );
                simulate(client, &cli.portal, &config, &sim, json);
            }
        }
        Command::Relay { read_only } => {
            let client = PortalClient::new(
                HttpTransport::new(config.request_timeout),
                config.base_url.clone(),
            );
            let mut service = TelemetryService::new(client, &config);
            start_server(&cli.portal, &config, service.metrics(), service.admin_kills());

            let mut source = JsonLinesSource::new(std::io::stdin().lock());
            if !read_only {
                source = source.with_commands(std::io::stdout());
            }
            while !source.is_exhausted() {
                service.step(&mut source);
                std::thread::sleep(config.tick_interval);
            }
            log::info!("Snapshot input closed");
        }
        Command::Serve => {
            let metrics = SharedMetrics::new();
            let kills = AdminKillQueue::new();
            #[cfg(feature = "server")]
            {
                let (addr, handle) =
                    brogue_portal::metrics::spawn_metrics_server(config.metrics_port, metrics, kills)?;
                log::info!("Serving metrics on http://{}/metrics", addr);
                handle.join().map_err(|_| "metrics server thread panicked")?;
            }
            #[cfg(not(feature = "server"))]
            {
                let _ = (metrics, kills);
                return Err("built without the server feature".into());
            }
        }
        Command::Stats { path } => {
            let runs = load_run_history(&path)?;
            let stats = GameStats::from_runs(&runs);
            if let Some(last) = runs.last().and_then(|r| r.ended_at()) {
                log::info!("Last run ended {}", last.format("%Y-%m-%d %H:%M"));
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&GameStatsPayload::from(&stats))?
            );
        }
        Command::Endpoints => {
            for endpoint in Endpoint::all() {
                println!("{:<32} {}", endpoint.to_string(), endpoint.url(&config.base_url));
            }
        }
        Command::Version => {
            println!("{}", build_info::version_line());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
