//! CLI tool to run a stage chain configuration over a stream of tiles.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use stagechain::{Chain, ExecutionTrace};
use tracing::Level;
use wind_stages::{installed, load_config, read_tiles, run_tiles};

/// Run a chain configuration (JSON or YAML) against JSON Lines tiles.
#[derive(Parser)]
#[command(name = "chain-run")]
struct Cli {
    /// Chain configuration file (.json, .yaml or .yml)
    config: PathBuf,

    /// Input tiles, one JSON object per line ("-" for stdin)
    input: String,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show paths, stages and record counts on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Skip tiles whose execution fails, with all of their output, instead
    /// of stopping
    #[arg(long)]
    keep_going: bool,
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("cannot open input '{input}'"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = output else {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("cannot create output directory for '{}'", path.display())
        })?;
    }
    let file = File::create(path)
        .with_context(|| format!("cannot create output '{}'", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn run(cli: &Cli) -> Result<ExecutionTrace> {
    let config = load_config(&cli.config)?;
    let chain = Chain::build(installed(), config.processors)?;
    if cli.verbose {
        eprintln!("Config:   {}", cli.config.display());
        eprintln!("Input:    {}", cli.input);
        eprintln!(
            "Output:   {}",
            cli.output
                .as_deref()
                .map_or("(stdout)".into(), |p| p.display().to_string())
        );
        eprintln!("Stages:   {}", chain.stage_names().join(" | "));
    }

    let out = open_output(cli.output.as_deref())?;
    let tiles = read_tiles(open_input(&cli.input)?);
    Ok(run_tiles(&chain, tiles, out, cli.keep_going)?)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(&cli) {
        Ok(totals) => {
            if cli.verbose {
                eprintln!("Records:  {totals}");
            }
        }
        Err(e) => {
            eprintln!("Chain error: {e:#}");
            process::exit(1);
        }
    }
}
