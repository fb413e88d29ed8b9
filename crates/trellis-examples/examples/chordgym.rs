//! Replay a key and attribute script against the chord gym widget tree.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trellis_examples::chordgym::{ChordGym, DEMO};

/// Replay a chord script.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Script file; the built-in demo runs if omitted
    script: Option<PathBuf>,

    /// Print the binding table and exit
    #[clap(short, long)]
    bindings: bool,

    /// Log filter, e.g. "trellis=debug"
    #[clap(short, long, default_value = "warn")]
    log: String,
}

/// Run the chord gym.
pub fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log)?)
        .without_time()
        .with_target(false)
        .init();

    let mut gym = ChordGym::new()?;
    if args.bindings {
        for line in gym.bindings()? {
            println!("{line}");
        }
        return Ok(());
    }

    let script = match &args.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => DEMO.to_string(),
    };
    for line in gym.run_script(&script)? {
        println!("{line}");
    }
    Ok(())
}
