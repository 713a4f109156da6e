//! `concept`, runs a belief/behaviour diffusion simulation over a social
//! network and writes either the full per-agent trace or a per-day summary.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use concept::config::Configuration;
use concept::error::{SimError, SimResult};
use concept::json::{
    load_agents, load_beliefs, load_behaviours, AgentSpec, BehaviourSpec, BeliefSpec,
};
use concept::runner::{RunOutput, Runner};

/// The arguments of the command-line interface.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The start time of the simulation.
    start_time: u32,

    /// The end time of the simulation.
    end_time: u32,

    /// The path to agents.json.zst.
    agents: PathBuf,

    /// The path to beliefs.json.
    beliefs: PathBuf,

    /// The path to behaviours.json.
    behaviours: PathBuf,

    /// The output path, written as .json.zst.
    output: PathBuf,

    /// Fully serialize the agents' histories instead of the per-day
    /// summary statistics.
    #[clap(short = 'f', long = "full-output")]
    full_output: bool,

    /// zstd compression level for the output stream, 1-22.
    #[clap(short = 'Z', long = "compression-level", default_value_t = 3)]
    compression_level: i32,

    /// Seed for the run's random number generator, for reproducible runs.
    #[clap(long = "seed", default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    simple_logger::init_with_env().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// The binary's own errors propagate as [`SimError`]; `anyhow` just lets
/// this outer layer collect them (and, eventually, any other error type a
/// future loader might raise) behind a single `?`-friendly return type,
/// matching the thiserror-under-anyhow split used elsewhere in the corpus.
fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.end_time <= cli.start_time {
        return Err(SimError::Configuration(format!(
            "end_time ({}) must be after start_time ({})",
            cli.end_time, cli.start_time
        ))
        .into());
    }

    info!("Loading behaviours from {}", cli.behaviours.display());
    let behaviour_specs: Vec<BehaviourSpec> = read_json(&cli.behaviours)?;
    let behaviours = load_behaviours(&behaviour_specs);

    info!("Loading beliefs from {}", cli.beliefs.display());
    let belief_specs: Vec<BeliefSpec> = read_json(&cli.beliefs)?;
    let beliefs = load_beliefs(&belief_specs, &behaviours)?;

    info!("Loading agents from {}", cli.agents.display());
    let agent_specs: Vec<AgentSpec> = read_zst_json(&cli.agents)?;
    let agents = load_agents(&agent_specs, &behaviours, &beliefs)?;

    let config = Configuration::new(
        behaviours,
        beliefs,
        agents,
        cli.start_time,
        cli.end_time,
        cli.full_output,
    )?;

    let mut runner = Runner::new(config, cli.seed);
    let output = runner.run()?;

    info!("Writing output to {}", cli.output.display());
    match output {
        RunOutput::Full(specs) => write_zst_json(&cli.output, &specs, cli.compression_level)?,
        RunOutput::Summary(specs) => write_zst_json(&cli.output, &specs, cli.compression_level)?,
    }
    Ok(())
}

/// Read a plain (uncompressed) JSON document, used for the small,
/// human-edited `behaviours.json`/`beliefs.json` catalogs.
fn read_json<T: DeserializeOwned>(path: &Path) -> SimResult<T> {
    let file = File::open(path)
        .map_err(|e| SimError::InputFormat(format!("cannot open {}: {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SimError::InputFormat(format!("cannot parse {}: {e}", path.display())))
}

/// Read a zstd-compressed JSON document, used for `agents.json.zst`,
/// which scales with population size rather than catalog size.
fn read_zst_json<T: DeserializeOwned>(path: &Path) -> SimResult<T> {
    let file = File::open(path)
        .map_err(|e| SimError::InputFormat(format!("cannot open {}: {e}", path.display())))?;
    let decoder = zstd::stream::read::Decoder::new(file)
        .map_err(|e| SimError::InputFormat(format!("cannot decompress {}: {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(decoder))
        .map_err(|e| SimError::InputFormat(format!("cannot parse {}: {e}", path.display())))
}

/// Write a zstd-compressed JSON document at the given compression level.
fn write_zst_json<T: Serialize>(path: &Path, value: &T, level: i32) -> SimResult<()> {
    let file = File::create(path)
        .map_err(|e| SimError::InputFormat(format!("cannot create {}: {e}", path.display())))?;
    let mut encoder = zstd::stream::write::Encoder::new(BufWriter::new(file), level)
        .map_err(|e| SimError::InputFormat(format!("cannot start compression: {e}")))?;
    serde_json::to_writer(&mut encoder, value)
        .map_err(|e| SimError::InputFormat(format!("cannot serialize output: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SimError::InputFormat(format!("cannot finish compression: {e}")))?;
    Ok(())
}
