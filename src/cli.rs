//! Command line handling shared by both binaries
//!
//! Both programs accept exactly `-i <path>`. Help and version flags are
//! disabled so that any other argument shape is a usage error.

use crate::core::error::{Error, Result};
use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// JSON Lines input file
    pub input: PathBuf,
}

/// Build the argument parser for a binary
pub fn command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .version(crate::VERSION)
        .about(about)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("input")
                .short('i')
                .value_name("PATH")
                .help("JSON Lines command file")
                .required(true)
                .allow_hyphen_values(true)
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

/// Parse `args` (including the program name) into [`CliArgs`].
/// The only accepted shape is `<program> -i <path>`.
pub fn parse_from<I, T>(name: &'static str, about: &'static str, args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // clap also accepts `-ifile` and `-i=file`; only the detached form is valid
    if args.len() != 3 || args[1] != "-i" {
        return Err(Error::usage("expected exactly -i <path>"));
    }

    let matches = command(name, about)
        .try_get_matches_from(args)
        .map_err(|e| Error::usage(e.kind().as_str().unwrap_or("unexpected arguments")))?;

    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .ok_or_else(|| Error::usage("missing -i <path>"))?;

    Ok(CliArgs { input })
}

/// Open the input file for buffered reading
pub fn open_input(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::InputNotFound {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        parse_from("peerstate-test", "test", args.iter().copied())
    }

    #[test]
    fn test_accepts_input_flag() {
        let args = parse(&["prog", "-i", "commands.jsonl"]).unwrap();
        assert_eq!(args.input, PathBuf::from("commands.jsonl"));
    }

    #[test]
    fn test_accepts_path_starting_with_dash() {
        let args = parse(&["prog", "-i", "-dash.jsonl"]).unwrap();
        assert_eq!(args.input, PathBuf::from("-dash.jsonl"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        let shapes: [&[&str]; 9] = [
            &["prog"],
            &["prog", "-i"],
            &["prog", "commands.jsonl"],
            &["prog", "-o", "commands.jsonl"],
            &["prog", "-i", "a.jsonl", "extra"],
            &["prog", "--help"],
            &["prog", "-icommands.jsonl"],
            &["prog", "-i=commands.jsonl"],
            &["prog", "commands.jsonl", "-i"],
        ];

        for shape in shapes {
            assert!(
                matches!(parse(shape), Err(Error::Usage(_))),
                "expected usage error for {:?}",
                shape
            );
        }
    }

    #[test]
    fn test_open_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.jsonl");
        assert!(matches!(open_input(&missing), Err(Error::InputNotFound { .. })));
    }
}
