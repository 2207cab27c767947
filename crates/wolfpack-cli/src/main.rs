//! wolfpack CLI - headless hunt runner.
//!
//! - `wolfpack run` - run a scripted hunt, print the outcome and optionally record a trace
//! - `wolfpack verify` - replay a recorded trace and report the first divergent tick

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use wolfpack_ai::{HuntConfig, HuntSnapshot, PackPlan};
use wolfpack_tools::{GoldenTrace, LogTraceSink, Scenario, ScriptHost, TickRecord};

#[derive(Parser)]
#[command(name = "wolfpack")]
#[command(about = "Headless runner for deterministic pack hunts", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted hunt
    Run(RunArgs),

    /// Replay a recorded trace and check that every tick still matches
    Verify {
        /// Trace file written by `wolfpack run --trace`
        trace: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Seed for the hunt's random stream and terrain layout
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Number of packs
    #[arg(long, default_value_t = 1)]
    packs: usize,

    /// Members per pack
    #[arg(long, default_value_t = 5)]
    agents: usize,

    /// Ticks to simulate at 60 Hz
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// YAML file overriding hunt tuning; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the golden trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Verify { trace } => verify(&trace),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<HuntConfig> {
    let Some(path) = path else {
        return Ok(HuntConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: HuntConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn run(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    if args.packs > config.pack.max_packs {
        bail!(
            "--packs {} exceeds pack.max_packs {}",
            args.packs,
            config.pack.max_packs
        );
    }

    let scenario = Scenario {
        seed: args.seed,
        packs: args.packs,
        agents: args.agents,
        ticks: args.ticks,
        config,
    };
    tracing::info!(
        seed = scenario.seed,
        packs = scenario.packs,
        agents = scenario.agents,
        ticks = scenario.ticks,
        "starting hunt"
    );

    let (trace, finished) = scenario
        .record_run(&mut LogTraceSink)
        .context("hunt failed")?;
    let snapshot = finished.hunt.snapshot();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&trace, &snapshot, &finished.host);
    }

    if let Some(path) = &args.trace {
        trace
            .save(path)
            .with_context(|| format!("failed to write trace {}", path.display()))?;
        println!("trace written to {}", path.display());
    }
    Ok(())
}

fn print_summary(trace: &GoldenTrace, snapshot: &HuntSnapshot, host: &ScriptHost) {
    println!(
        "seed {}  ticks {}  events {}  digest {:016x}",
        trace.scenario.seed,
        trace.ticks.len(),
        trace.events.len(),
        trace.final_digest().unwrap_or_default()
    );
    for pack in &snapshot.packs {
        let leader = pack
            .leader
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        println!(
            "{}  plan {:<8}  morale {:.2}  members {}  leader {}",
            pack.id,
            pack.plan.map_or("none", PackPlan::name),
            pack.morale,
            pack.members,
            leader
        );
        for agent in snapshot.agents.iter().filter(|a| a.pack == pack.id) {
            println!(
                "  {:<9} {:<11} {:<10} {:<10} health {:.2}  stamina {:.2}",
                agent.id.to_string(),
                agent.state.name(),
                agent.role.name(),
                agent.emotion.name(),
                agent.health,
                agent.stamina
            );
        }
    }
    println!("target took {:.1} damage over {} hits", host.damage_dealt, host.hits);
}

fn verify(path: &Path) -> Result<()> {
    let trace = GoldenTrace::load(path)
        .with_context(|| format!("failed to load trace {}", path.display()))?;

    match trace.replay().context("failed to replay trace")? {
        None => {
            println!(
                "ok: {} ticks match (final digest {:016x})",
                trace.ticks.len(),
                trace.final_digest().unwrap_or_default()
            );
            Ok(())
        }
        Some(divergence) => bail!(
            "trace diverged at tick {}: expected {}, got {}",
            divergence.tick,
            describe(divergence.expected),
            describe(divergence.actual)
        ),
    }
}

fn describe(record: Option<TickRecord>) -> String {
    record.map_or_else(
        || "no tick".to_string(),
        |t| format!("digest {:016x} with {} events", t.digest, t.events),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults_to_the_reference_hunt() {
        let cli = Cli::try_parse_from(["wolfpack", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!((args.seed, args.packs, args.agents, args.ticks), (12345, 1, 5, 120));
        assert!(args.trace.is_none() && !args.json);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config: HuntConfig = serde_yaml::from_str("comms:\n  range: 0.3\n").unwrap();
        assert_eq!(config.comms.range, 0.3);
        assert_eq!(config.comms.latency, HuntConfig::default().comms.latency);
        assert_eq!(config.agent, HuntConfig::default().agent);
    }
}
