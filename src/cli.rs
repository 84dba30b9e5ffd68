use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

/// Show remaining broadband quota and days left in the billing cycle.
///
/// With no options, prints one line per service on the account.
#[derive(Debug, Default, Parser)]
#[command(name = "isp-usage")]
#[command(version)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Store your ISP username and password for later runs
    #[arg(short, long)]
    pub setup: bool,

    /// Print this help text
    #[arg(short, long)]
    pub help: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Arguments that could not be parsed and were ignored
    #[arg(skip)]
    pub ignored: Option<String>,
}

impl Cli {
    /// Parse `args`, ignoring whatever follows the longest valid prefix.
    ///
    /// `--setup extra` still runs setup; an unrecognized first argument
    /// falls through to the default report. Only `--version` comes back as
    /// an error, for the caller to print.
    pub fn parse_lenient<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        // The program name alone always parses
        for end in (1..=args.len()).rev() {
            match Self::try_parse_from(&args[..end]) {
                Ok(mut cli) => {
                    if end < args.len() {
                        cli.ignored = Some(
                            args[end..]
                                .iter()
                                .map(|arg| arg.to_string_lossy().into_owned())
                                .collect::<Vec<_>>()
                                .join(" "),
                        );
                    }
                    return Ok(cli);
                }
                Err(err) if err.kind() == ErrorKind::DisplayVersion => return Err(err),
                Err(_) => continue,
            }
        }

        Ok(Self::default())
    }
}

pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}

/// Print usage to `err_out`; asking for help is a failed run
pub fn show_help<W: Write>(err_out: &mut W) -> u8 {
    // Nothing useful to do if stderr is gone
    let _ = writeln!(err_out, "{}", help_text());
    crate::EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_lenient(std::iter::once("isp-usage").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_arguments_reports() {
        let cli = parse(&[]);
        assert!(!cli.setup && !cli.help);
        assert!(cli.ignored.is_none());
    }

    #[test]
    fn test_setup_flags() {
        assert!(parse(&["--setup"]).setup);
        assert!(parse(&["-s"]).setup);
    }

    #[test]
    fn test_help_flags() {
        assert!(parse(&["--help"]).help);
        assert!(parse(&["-h"]).help);
    }

    #[test]
    fn test_unknown_argument_falls_through() {
        let cli = parse(&["--bogus"]);
        assert!(!cli.setup && !cli.help);
        assert_eq!(cli.ignored.as_deref(), Some("--bogus"));

        let cli = parse(&["stray", "words"]);
        assert_eq!(cli.ignored.as_deref(), Some("stray words"));
    }

    #[test]
    fn test_trailing_junk_keeps_leading_flag() {
        let cli = parse(&["--setup", "extra"]);
        assert!(cli.setup);
        assert_eq!(cli.ignored.as_deref(), Some("extra"));

        let cli = parse(&["-s", "junk"]);
        assert!(cli.setup);
        assert_eq!(cli.ignored.as_deref(), Some("junk"));

        let cli = parse(&["-h", "--bogus"]);
        assert!(cli.help);
        assert_eq!(cli.ignored.as_deref(), Some("--bogus"));
    }

    #[test]
    fn test_unknown_first_argument_hides_later_flags() {
        let cli = parse(&["--bogus", "--setup"]);
        assert!(!cli.setup);
        assert_eq!(cli.ignored.as_deref(), Some("--bogus --setup"));
    }

    #[test]
    fn test_options_survive_trailing_junk() {
        let cli = parse(&["-v", "--config", "/tmp/c.json", "what"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(cli.ignored.as_deref(), Some("what"));
    }

    #[test]
    fn test_show_help_goes_to_writer_and_fails() {
        let mut err_out = Vec::new();
        assert_eq!(show_help(&mut err_out), 1);
        assert!(String::from_utf8(err_out).unwrap().contains("--setup"));
    }

    #[test]
    fn test_config_path() {
        let cli = parse(&["--config", "/etc/isp-usage.json", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/isp-usage.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_version_is_passed_back() {
        let err = Cli::parse_lenient(["isp-usage", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_help_text_mentions_setup() {
        let help = help_text();
        assert!(help.contains("--setup"));
        assert!(help.contains("--help"));
    }
}
