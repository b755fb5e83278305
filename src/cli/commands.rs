//! Command definitions for the focus timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::TimeSpan;

// ============================================================================
// CLI Structure
// ============================================================================

/// Focus timer - run named countdowns from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "focus-timer",
    version,
    about = "Headless focus timer",
    long_about = "Runs work/rest countdowns with progress and completion notifications.\n\
                  Selector durations are remembered between runs.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the duration store (overrides the configuration)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a countdown until it finishes or Ctrl-C is pressed
    Run(RunArgs),

    /// Show the configured selectors and their durations
    Show,

    /// Change the stored duration of a selector
    Set(SetArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Selector to count down (defaults to the first one)
    #[arg(long, value_name = "NAME")]
    pub selector: Option<String>,
}

/// Arguments for the set command
#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Selector name
    pub name: String,

    /// New duration as HH:MM:SS, MM:SS or SS
    #[arg(value_parser = parse_duration)]
    pub duration: TimeSpan,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a duration argument.
fn parse_duration(s: &str) -> Result<TimeSpan, String> {
    s.parse::<TimeSpan>().map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["focus-timer"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.config.is_none());
            assert!(cli.store.is_none());
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["focus-timer", "-v", "show"]);
            assert!(cli.verbose);
            assert!(matches!(cli.command, Some(Commands::Show)));
        }

        #[test]
        fn test_parse_global_paths_after_subcommand() {
            let cli = Cli::parse_from([
                "focus-timer",
                "show",
                "--config",
                "/tmp/config.json",
                "--store",
                "/tmp/durations.json",
            ]);
            assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.json")));
            assert_eq!(cli.store, Some(PathBuf::from("/tmp/durations.json")));
        }
    }

    // ------------------------------------------------------------------------
    // Run Tests
    // ------------------------------------------------------------------------

    mod run_tests {
        use super::*;

        #[test]
        fn test_parse_run_default() {
            let cli = Cli::parse_from(["focus-timer", "run"]);
            match cli.command {
                Some(Commands::Run(args)) => assert!(args.selector.is_none()),
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_with_selector() {
            let cli = Cli::parse_from(["focus-timer", "run", "--selector", "rest"]);
            match cli.command {
                Some(Commands::Run(args)) => assert_eq!(args.selector.as_deref(), Some("rest")),
                _ => panic!("Expected Run command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Set Tests
    // ------------------------------------------------------------------------

    mod set_tests {
        use super::*;

        #[test]
        fn test_parse_set() {
            let cli = Cli::parse_from(["focus-timer", "set", "work", "00:50:00"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.name, "work");
                    assert_eq!(args.duration, TimeSpan::compose(0, 50, 0));
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_short_form() {
            let cli = Cli::parse_from(["focus-timer", "set", "rest", "7:30"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.duration, TimeSpan::compose(0, 7, 30));
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_invalid_duration() {
            let result = Cli::try_parse_from(["focus-timer", "set", "work", "1:99:00"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_set_duration_too_long() {
            let err = Cli::try_parse_from(["focus-timer", "set", "work", "5124095576030432:00:00"])
                .unwrap_err();
            assert!(err.to_string().contains("too long"));
        }

        #[test]
        fn test_parse_set_missing_duration() {
            let result = Cli::try_parse_from(["focus-timer", "set", "work"]);
            assert!(result.is_err());
        }
    }
}
