//! headless — runs the standard open-pit mine without a UI.
//!
//! Six trucks haul from six shovels (four waste, two mineral) to one crusher
//! and one dump under the greedy dispatch policy.  Truck snapshots and
//! per-tick summaries are written as CSV to `--out`.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fms_core::{AdmissionPolicy, SimConfig, Tick};
use fms_dispatch::{standard_mine, DispatchObserver, FleetStats, TickSummary};
use fms_fleet::Truck;
use fms_output::{CsvWriter, FleetOutputObserver, OutputWriter};
use fms_spatial::MineNetwork;
use fms_station::Station;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Headless run of the standard open-pit fleet simulation")]
struct Args {
    /// JSON file with a `SimConfig`; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Turn trucks away from full queues on arrival.
    #[arg(long)]
    strict: bool,

    /// Directory for the CSV output.
    #[arg(long, default_value = "output/headless")]
    out: PathBuf,

    /// Print a progress line every N ticks (0 = never).
    #[arg(long, default_value_t = 1_000)]
    progress: u64,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.total_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.strict {
        config.admission = AdmissionPolicy::Strict;
    }
    Ok(config)
}

/// Install the global subscriber.  `log` records from the simulation crates
/// are forwarded to it.
fn init_logging(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}

// ── Observer wrapper: progress + row counts ──────────────────────────────────

struct ProgressObserver<W: OutputWriter> {
    inner:         FleetOutputObserver<W>,
    interval:      u64,
    snapshot_rows: usize,
    summary_rows:  usize,
}

impl<W: OutputWriter> DispatchObserver for ProgressObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.summary_rows += 1;
        if tick.is_multiple_of(self.interval) {
            println!(
                "T{:>7}: mineral {:>9.1} t | waste {:>9.1} t | misrouted {:>7.1} t",
                tick.0,
                summary.totals.mineral_processed,
                summary.totals.waste_dumped,
                summary.totals.mineral_misrouted + summary.totals.waste_misrouted,
            );
        }
        self.inner.on_tick_end(tick, summary);
    }

    fn on_snapshot(&mut self, tick: Tick, network: &MineNetwork, trucks: &[Truck], stations: &[Station]) {
        self.snapshot_rows += trucks.len();
        self.inner.on_snapshot(tick, network, trucks, stations);
    }

    fn on_run_end(&mut self, final_tick: Tick, stats: &FleetStats) {
        self.inner.on_run_end(final_tick, stats);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))?;
    let args = Args::parse();
    let config = load_config(&args)?;

    println!("=== headless — open-pit fleet simulation ===");
    println!(
        "Ticks: {}  |  Seed: {}  |  Admission: {:?}",
        config.total_ticks, config.seed, config.admission
    );

    let mut dispatcher = standard_mine(config)?;
    println!(
        "Network: {} nodes, {} segments  |  {} trucks, {} stations",
        dispatcher.network().node_count(),
        dispatcher.network().segment_count(),
        dispatcher.trucks().len(),
        dispatcher.stations().len(),
    );
    println!();

    let writer = CsvWriter::new(&args.out)?;
    let mut obs = ProgressObserver {
        inner:         FleetOutputObserver::new(writer),
        interval:      args.progress,
        snapshot_rows: 0,
        summary_rows:  0,
    };

    let t0 = Instant::now();
    dispatcher.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  truck_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!();

    let stats = dispatcher.stats();
    println!("{:<10} {:<8} {:>6} {:>6} {:>10} {:>8} {:>6}", "Station", "Kind", "Queue", "Served", "Tons", "Hang", "Util");
    println!("{}", "-".repeat(60));
    for s in &stats.stations {
        println!(
            "{:<10} {:<8} {:>6} {:>6} {:>10.1} {:>8} {:>5.0}%",
            s.name,
            s.kind,
            s.queue_len,
            s.served,
            s.tons + s.wrong_material_tons,
            s.hang_time,
            s.utilization * 100.0,
        );
    }
    println!();

    println!("{:<8} {:<20} {:<10} {:>8}", "Truck", "Task", "Node", "Load");
    println!("{}", "-".repeat(50));
    for t in &stats.trucks {
        println!("{:<8} {:<20} {:<10} {:>8.1}", t.id.0, t.task.as_str(), t.node_name, t.load);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_warnings_reach_the_subscriber() {
        init_logging(EnvFilter::new("warn")).unwrap();
        assert!(log::log_enabled!(target: "fms_dispatch::builder", log::Level::Warn));
    }

    #[test]
    fn cli_overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from(["headless", "--ticks", "50", "--seed", "7", "--strict"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.total_ticks, 50);
        assert_eq!(config.seed, 7);
        assert_eq!(config.admission, AdmissionPolicy::Strict);
        assert_eq!(config.fallback_node, SimConfig::default().fallback_node);
    }
}
