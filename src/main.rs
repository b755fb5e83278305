//! Focus timer CLI - headless runner for the focus timer core
//!
//! Runs one countdown per invocation:
//! - the active (or `--selector`) duration counts down on a timer host
//! - progress and completion notifications go to the log
//! - Ctrl-C stops the countdown

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use focus_timer::cli::{Cli, Commands, Display, RunArgs, SetArgs, TerminalView};
use focus_timer::config::TimerConfig;
use focus_timer::daemon::HostRegistry;
use focus_timer::notification::TracingNotifier;
use focus_timer::screen::TimerScreen;
use focus_timer::selector::{DurationStore, JsonFileStore, SelectorSet};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    let store = open_store(cli.store, &config)?;

    match command {
        Commands::Run(args) => run(&config, store, &args).await,
        Commands::Show => {
            let selectors = SelectorSet::from_config(&config, store.as_ref())?;
            Display::show_selectors(&selectors);
            Ok(())
        }
        Commands::Set(args) => set(&config, store.as_ref(), &args),
    }
}

/// Loads the configuration file, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<TimerConfig> {
    match path {
        Some(path) => TimerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(TimerConfig::default()),
    }
}

/// Opens the duration store: `--store`, then the config, then the user config dir.
fn open_store(flag: Option<PathBuf>, config: &TimerConfig) -> Result<Arc<dyn DurationStore>> {
    let path = flag
        .or_else(|| config.store_path.clone())
        .or_else(JsonFileStore::default_path)
        .context("no configuration directory found; pass --store")?;

    tracing::debug!(path = %path.display(), "using duration store");
    Ok(Arc::new(JsonFileStore::new(path)))
}

/// Runs one countdown to completion or until Ctrl-C.
async fn run(config: &TimerConfig, store: Arc<dyn DurationStore>, args: &RunArgs) -> Result<()> {
    let selectors = SelectorSet::from_config(config, store.as_ref())?;
    let registry = HostRegistry::new(config, Arc::new(TracingNotifier));
    let mut screen = TimerScreen::attach(&registry, selectors, store, TerminalView::new())?;

    if let Some(name) = &args.selector {
        let index = screen
            .selectors()
            .position(name)
            .with_context(|| format!("unknown selector '{name}'"))?;
        screen.select(index)?;
    }

    let name = screen.selectors().active().name().to_string();
    Display::show_run_started(screen.selectors().active());
    screen.start()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            state = screen.next() => match state {
                Some(state) if state.is_idle() => {
                    Display::show_finished(&name);
                    break;
                }
                Some(_) => {}
                None => break,
            },
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                screen.stop()?;
                Display::show_stopped(&name);
                break;
            }
        }
    }

    drop(screen);
    registry.reap();
    Ok(())
}

/// Stores a new duration for one selector.
fn set(config: &TimerConfig, store: &dyn DurationStore, args: &SetArgs) -> Result<()> {
    let mut selectors = SelectorSet::from_config(config, store)?;
    let index = selectors
        .position(&args.name)
        .with_context(|| format!("unknown selector '{}'", args.name))?;

    selectors.edit(index, args.duration, store)?;
    Display::show_set_success(&args.name, args.duration);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use focus_timer::types::TimeSpan;

    #[test]
    fn test_load_config_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, TimerConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }

    #[test]
    fn test_store_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TimerConfig::default();
        config.store_path = Some(dir.path().join("from-config.json"));

        let store = open_store(Some(dir.path().join("from-flag.json")), &config).unwrap();
        let mut selectors = SelectorSet::from_config(&config, store.as_ref()).unwrap();
        selectors.edit(0, TimeSpan::from_secs(90), store.as_ref()).unwrap();

        assert!(dir.path().join("from-flag.json").exists());
        assert!(!dir.path().join("from-config.json").exists());
    }

    #[test]
    fn test_set_unknown_selector() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("durations.json"));
        let args = SetArgs {
            name: "nap".to_string(),
            duration: TimeSpan::from_secs(60),
        };

        let err = set(&TimerConfig::default(), &store, &args).unwrap_err();
        assert!(err.to_string().contains("unknown selector 'nap'"));
    }

    #[test]
    fn test_set_persists_duration() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("durations.json"));
        let args = SetArgs {
            name: "rest".to_string(),
            duration: TimeSpan::compose(0, 10, 0),
        };

        set(&TimerConfig::default(), &store, &args).unwrap();

        let selectors = SelectorSet::from_config(&TimerConfig::default(), &store).unwrap();
        assert_eq!(selectors.get(1).unwrap().persisted(), TimeSpan::compose(0, 10, 0));
    }
}
