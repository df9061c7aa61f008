//! Merge mode
//!
//! Loads the whole batch, merges it across a fixed worker pool and prints
//! the final state of every entity as one JSON object.

use peerstate::{app, cli, system, Config, Result};
use std::io::{self, BufWriter};
use std::process::ExitCode;

const NAME: &str = "peerstate-merge";
const ABOUT: &str = "Merge a batch of updates in parallel and print the final entity state.";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<()> {
    let args = cli::parse_from(NAME, ABOUT, std::env::args_os())?;

    let config = Config::load()?;
    system::logging::init(&config.logging)?;

    let workers = config.effective_worker_count();
    tracing::debug!(version = peerstate::VERSION, input = %args.input.display(), workers, "starting merge");

    let input = cli::open_input(&args.input)?;
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    app::run_merge(input, &mut output, workers)?;
    Ok(())
}
