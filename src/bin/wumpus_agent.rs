//! wumpus-agent CLI: run one episode and print every decision.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use wumpus_agent::{
    AgentError, AgentResult, Episode, EpisodeConfig, EpisodeEvent, EpisodeRunner,
    EpisodeSnapshot, EpisodeStatus, RunnerConfig, StepRecord, WumpusWorld,
};

#[derive(Parser)]
#[command(name = "wumpus-agent", version, about = "Knowledge-based wumpus world agent")]
struct Cli {
    /// World file to play; a random world is generated when absent.
    #[arg(long)]
    world: Option<PathBuf>,

    /// JSON episode configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Side length of a random world.
    #[arg(long)]
    size: Option<usize>,

    /// Seed for the random world.
    #[arg(long)]
    seed: Option<u64>,

    /// Step limit.
    #[arg(long)]
    max_steps: Option<usize>,

    /// Require bringing the gold back to (0,0).
    #[arg(long)]
    return_to_exit: bool,

    /// Pause between steps in milliseconds.
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Print one JSON object per event instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(snapshot) if snapshot.status == EpisodeStatus::Won => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> AgentResult<EpisodeSnapshot> {
    let config = episode_config(cli)?;
    let world = cli.world.as_ref().map(WumpusWorld::from_file).transpose()?;
    let episode = Episode::new(config, world)?;

    if !cli.json {
        println!("episode {}", episode.id());
        println!("{}", episode.world());
    }

    let runner = EpisodeRunner::start(
        episode,
        RunnerConfig {
            step_delay: Duration::from_millis(cli.delay_ms),
            ..RunnerConfig::default()
        },
    )?;

    let mut last = None;
    for event in runner.events() {
        match event {
            EpisodeEvent::Step(record) => print_step(&record, cli.json)?,
            EpisodeEvent::Finished(snapshot) => {
                print_snapshot(&snapshot, cli.json)?;
                last = Some(*snapshot);
            }
        }
    }
    runner.join()?;
    last.ok_or_else(|| AgentError::internal("episode ended without a final snapshot"))
}

fn episode_config(cli: &Cli) -> AgentResult<EpisodeConfig> {
    let mut config = match &cli.config {
        Some(path) => EpisodeConfig::from_json_file(path)?,
        None => EpisodeConfig::default(),
    };
    if let Some(size) = cli.size {
        config.grid_size = size;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    config.return_to_exit |= cli.return_to_exit;
    config.validate()?;
    Ok(config)
}

fn print_step(record: &StepRecord, json: bool) -> AgentResult<()> {
    if json {
        println!("{}", to_json(record)?);
        return Ok(());
    }
    println!(
        "#{:<4} {} -> {} [{}] {:<12} {}",
        record.step,
        record.position_before,
        record.position_after,
        record.percepts,
        record.decision.action.to_string(),
        record.decision.rule_label,
    );
    if let Some(outcome) = record.decision.arrow_outcome {
        println!("      arrow: {outcome:?}");
    }
    Ok(())
}

fn print_snapshot(snapshot: &EpisodeSnapshot, json: bool) -> AgentResult<()> {
    if json {
        println!("{}", to_json(snapshot)?);
        return Ok(());
    }
    println!();
    println!("{}", snapshot.playing_grid);
    match snapshot.outcome {
        Some(outcome) => println!("{:?} after {} steps ({:?})", snapshot.status, snapshot.steps, outcome),
        None => println!("{:?} after {} steps", snapshot.status, snapshot.steps),
    }
    println!("knowledge digest {}", snapshot.knowledge_digest);
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> AgentResult<String> {
    serde_json::to_string(value).map_err(|e| AgentError::internal(format!("serialization failed: {e}")))
}
