use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::engine::LanguagePair;
use crate::workflow::RunRequest;

pub const USAGE: &str =
    "srtrans [--config <path>] [--verbose] <input_file> <output_file> <source_lang_code> <target_lang_code>";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log to stderr at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// <input_file> <output_file> <source_lang_code> <target_lang_code>
    #[arg(value_name = "ARGS", num_args = 0..)]
    pub positional: Vec<String>,
}

/// Validated command line
#[derive(Debug)]
pub struct Invocation {
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub request: RunRequest,
}

#[derive(Debug)]
pub enum CliError {
    /// Help or version output requested; clap prints it and exits
    Display(clap::Error),
    /// Anything else: wrong number of positionals or unknown flags
    InvalidArguments,
}

pub fn parse_invocation<I, T>(argv: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Err(CliError::Display(e));
        }
        Err(_) => return Err(CliError::InvalidArguments),
    };

    let [input, output, source, target]: [String; 4] = args
        .positional
        .try_into()
        .map_err(|_| CliError::InvalidArguments)?;

    Ok(Invocation {
        verbose: args.verbose,
        config: args.config,
        request: RunRequest {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            pair: LanguagePair::new(source, target),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_positionals() {
        let inv = parse_invocation(["srtrans", "in.srt", "out.srt", "en", "fr"]).unwrap();
        assert_eq!(inv.request.input, PathBuf::from("in.srt"));
        assert_eq!(inv.request.output, PathBuf::from("out.srt"));
        assert_eq!(inv.request.pair, LanguagePair::new("en", "fr"));
        assert!(!inv.verbose);
        assert!(inv.config.is_none());
    }

    #[test]
    fn test_flags_are_not_positionals() {
        let inv = parse_invocation([
            "srtrans", "--verbose", "--config", "my.toml", "in.srt", "out.srt", "en", "fr",
        ])
        .unwrap();
        assert!(inv.verbose);
        assert_eq!(inv.config, Some(PathBuf::from("my.toml")));
    }

    #[test]
    fn test_wrong_arity_is_invalid() {
        assert!(matches!(
            parse_invocation(["srtrans", "in.srt", "out.srt", "en"]),
            Err(CliError::InvalidArguments)
        ));
        assert!(matches!(
            parse_invocation(["srtrans", "a", "b", "c", "d", "e"]),
            Err(CliError::InvalidArguments)
        ));
        assert!(matches!(parse_invocation(["srtrans"]), Err(CliError::InvalidArguments)));
    }

    #[test]
    fn test_unknown_flag_is_invalid() {
        assert!(matches!(
            parse_invocation(["srtrans", "--bogus", "a", "b", "c", "d"]),
            Err(CliError::InvalidArguments)
        ));
    }

    #[test]
    fn test_help_is_display() {
        assert!(matches!(
            parse_invocation(["srtrans", "--help"]),
            Err(CliError::Display(_))
        ));
    }
}
