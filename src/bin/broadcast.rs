//! Broadcast mode
//!
//! Applies commands in input order and prints one JSON line per
//! notification to stdout.

use peerstate::{app, cli, system, Config, Result};
use std::io::{self, BufWriter};
use std::process::ExitCode;

const NAME: &str = "peerstate-broadcast";
const ABOUT: &str = "Apply relate and update commands, broadcasting accepted changes to related entities.";

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
    tracing::debug!(version = peerstate::VERSION, input = %args.input.display(), "starting broadcast");

    let input = cli::open_input(&args.input)?;
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    app::run_broadcast(input, &mut output)?;
    Ok(())
}
