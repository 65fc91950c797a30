#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use orbit_core::config::resolve_config;
use orbit_core::error::{ErrorCode, StoreError};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::io;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable naming the session when `--session` is absent.
const SESSION_ENV: &str = "ORBIT_SESSION";
const DEFAULT_SESSION: &str = "default";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "orbit: durable session memory for agent loops",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format; overrides --json and configuration.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Session to operate on (falls back to ORBIT_SESSION, then "default").
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn session_name(&self) -> String {
        self.session
            .clone()
            .or_else(|| env::var(SESSION_ENV).ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_SESSION.to_string())
    }

    /// Mode used before configuration has been read.
    fn fallback_mode(&self) -> OutputMode {
        match self.format {
            Some(mode) => mode,
            None if self.json => OutputMode::Json,
            None => OutputMode::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        subcommand,
        about = "Record and curate notes",
        after_help = "EXAMPLES:\n    orbit note add \"cache keys include the locale\" --type learning\n    orbit note list --type stuck"
    )]
    Note(cmd::note::NoteCommand),

    #[command(
        subcommand,
        about = "Track tasks",
        after_help = "EXAMPLES:\n    orbit task add \"Write parser\" --priority high\n    orbit task status TSK-1 in_progress"
    )]
    Task(cmd::task::TaskCommand),

    #[command(subcommand, about = "Read and send inbox messages")]
    Inbox(cmd::inbox::InboxCommand),

    #[command(subcommand, about = "Start, complete, and summarize iterations")]
    Iteration(cmd::iteration::IterationCommand),

    #[command(subcommand, about = "Manage whole sessions")]
    Session(cmd::session::SessionCommand),

    #[command(about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ORBIT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "orbit=debug,info"
        } else {
            "orbit=info,warn"
        })
    });

    let format = env::var("ORBIT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args, &mut command, &mut io::stdout());
    }

    let project_root = env::current_dir()?;
    let config = resolve_config(&project_root, cli.json).map_err(ConfigFailure)?;
    let output = resolve_output_mode(cli.format, &config.resolved_output);
    let session = cli.session_name();
    debug!(
        session = %session,
        data_dir = %config.store.data_dir.display(),
        "resolved configuration"
    );

    let ctx = cmd::Context::new(&config.store, session, output);
    match &cli.command {
        Commands::Note(command) => cmd::note::run_note(command, &ctx),
        Commands::Task(command) => cmd::task::run_task(command, &ctx),
        Commands::Inbox(command) => cmd::inbox::run_inbox(command, &ctx),
        Commands::Iteration(command) => cmd::iteration::run_iteration(command, &ctx),
        Commands::Session(command) => cmd::session::run_session(command, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

/// Marks an error raised while loading configuration files.
#[derive(Debug, thiserror::Error)]
#[error("{0:#}")]
struct ConfigFailure(anyhow::Error);

fn to_cli_error(err: &anyhow::Error) -> CliError {
    if let Some(store) = err.downcast_ref::<StoreError>() {
        return CliError::from(store);
    }
    if err.downcast_ref::<ConfigFailure>().is_some() {
        let code = ErrorCode::ConfigParseError;
        return CliError {
            message: err.to_string(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        };
    }
    CliError::new(format!("{err:#}"))
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let rendered = to_cli_error(&err);
            if render_error(cli.fallback_mode(), &rendered).is_err() {
                eprintln!("error: {}", rendered.message);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["orbit", "task", "list", "--session", "alpha"]);
        assert_eq!(cli.session_name(), "alpha");
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["orbit", "--json", "--format", "pretty", "note", "list"]);
        assert_eq!(cli.fallback_mode(), OutputMode::Pretty);
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["orbit", "inbox", "list", "--json"]);
        assert!(cli.json);
        assert!(cli.fallback_mode().is_json());
    }

    #[test]
    fn store_errors_keep_their_code() {
        let err = anyhow::Error::from(StoreError::NotFound {
            kind: "task",
            id: "TSK-9".into(),
        });
        let cli = to_cli_error(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2001"));
    }

    #[test]
    fn config_failures_use_config_code() {
        let err = anyhow::Error::from(ConfigFailure(anyhow::anyhow!("bad toml")));
        let cli = to_cli_error(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1002"));
        assert!(cli.message.contains("bad toml"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
