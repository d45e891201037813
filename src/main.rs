use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use solovideos::cli::{Command, RunOptions, run_cli_with_config};
use solovideos::output::OutputFormatter;
use solovideos::{Action, Mode};
use std::path::PathBuf;
use std::process::ExitCode;

mod logging;

/// Extract video files from a directory tree into a mirrored destination.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Scan a directory and copy or move its videos.
    Run(RunArgs),
    /// Show the most recent run log.
    LastLog {
        /// Directory holding the run logs.
        #[arg(long, value_hint = ValueHint::DirPath)]
        log_dir: Option<PathBuf>,
        /// Print the log contents as well as its path.
        #[arg(long)]
        print: bool,
    },
    /// List the known video formats.
    Formats,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory to scan recursively.
    #[arg(value_hint = ValueHint::DirPath)]
    source: PathBuf,

    /// Destination: absolute, relative to SOURCE, or "" for 00_SOLO_VIDEOS.
    #[arg(short, long)]
    dest: Option<String>,

    /// Actually copy or move files (default is a dry run).
    #[arg(long, conflicts_with = "dry_run")]
    execute: bool,

    /// Only log what would happen.
    #[arg(long)]
    dry_run: bool,

    /// Copy files, leaving the originals in place.
    #[arg(long = "copy", conflicts_with = "move_files")]
    copy: bool,

    /// Move files (default).
    #[arg(long = "move")]
    move_files: bool,

    /// Extension to extract; repeat or comma-separate (default: all video formats).
    #[arg(short, long = "ext", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Directory for run logs.
    #[arg(long, value_hint = ValueHint::DirPath)]
    log_dir: Option<PathBuf>,

    /// Do not write a run log file.
    #[arg(long)]
    no_log_file: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        let mode = if args.execute {
            Some(Mode::Execute)
        } else if args.dry_run {
            Some(Mode::Simulate)
        } else {
            None
        };
        let action = if args.copy {
            Some(Action::Copy)
        } else if args.move_files {
            Some(Action::Move)
        } else {
            None
        };

        RunOptions {
            source: args.source,
            destination: args.dest,
            mode,
            action,
            extensions: args.extensions,
            log_dir: args.log_dir,
            no_log_file: args.no_log_file,
            json: args.json,
        }
    }
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Run(args) => Command::Run(args.into()),
            CliCommand::LastLog { log_dir, print } => Command::LastLog { log_dir, print },
            CliCommand::Formats => Command::Formats,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run_cli_with_config(cli.command.into(), cli.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn test_run_defaults_leave_mode_and_action_to_config() {
        let cli = parse(&["solovideos", "run", "/media"]);
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run");
        };
        let options = RunOptions::from(args);
        assert_eq!(options.mode, None);
        assert_eq!(options.action, None);
        assert!(options.extensions.is_empty());
    }

    #[test]
    fn test_run_flags() {
        let cli = parse(&[
            "solovideos", "run", "/media", "--execute", "--copy", "--ext", "mp4,mkv", "-e", "avi",
            "--dest", "OUT",
        ]);
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run");
        };
        let options = RunOptions::from(args);
        assert_eq!(options.mode, Some(Mode::Execute));
        assert_eq!(options.action, Some(Action::Copy));
        assert_eq!(options.extensions, vec!["mp4", "mkv", "avi"]);
        assert_eq!(options.destination.as_deref(), Some("OUT"));
    }

    #[test]
    fn test_execute_conflicts_with_dry_run() {
        let result = Cli::try_parse_from(["solovideos", "run", "/media", "--execute", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["solovideos", "last-log", "--print", "-vv", "--config", "c.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, CliCommand::LastLog { print: true, .. }));
    }
}
