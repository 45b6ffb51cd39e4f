//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use readlater_core::{IntentRouter, ProgressReporter, Reply, Responder};
use readlater_shared::{AppConfig, init_config, load_config, load_config_from};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Save links, get them categorized, read them later.
#[derive(Parser)]
#[command(
    name = "readlater",
    version,
    about = "Save web pages to a categorized reading list.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.readlater/readlater.toml).
    #[arg(long = "config", env = "READLATER_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Database file, overriding `storage.database_path`.
    #[arg(long, env = "READLATER_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Print replies as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Send one message: a link to save, or a command such as `list` or `stats`.
    Send {
        /// Message text. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Read messages from stdin, one per line, until EOF or `quit`.
    Chat,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so replies on
/// stdout stay clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "readlater=warn",
        1 => "readlater=info",
        2 => "readlater=debug",
        _ => "readlater=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Send { ref text } => {
            let text = text.join(" ");
            cmd_send(&cli, &text).await
        }
        Command::Chat => cmd_chat(&cli).await,
        Command::Config { ref action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config_file.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn build_router(cli: &Cli) -> Result<IntentRouter> {
    let config = resolve_config(cli.config_file.as_deref())?;
    let router = IntentRouter::from_config(&config, cli.db.as_deref()).await?;
    Ok(router)
}

async fn cmd_send(cli: &Cli, text: &str) -> Result<()> {
    let router = build_router(cli).await?;

    let progress = (!cli.json).then(|| Arc::new(CliProgress::new()));
    let router = match &progress {
        Some(p) => router.with_progress(p.clone()),
        None => router,
    };

    info!(chars = text.len(), "handling message");
    let result = router.handle(text).await;
    if let Some(p) = &progress {
        p.finish();
    }

    match result {
        Ok(reply) => print_reply(&reply, cli.json),
        Err(err) => {
            error!(error = %err, "message failed");
            print_reply(&Responder::error(&err), cli.json)?;
            Err(eyre!("message failed: {err}"))
        }
    }
}

async fn cmd_chat(cli: &Cli) -> Result<()> {
    let router = build_router(cli).await?;
    let interactive = !cli.json;

    if interactive {
        eprintln!("readlater chat. Send a link or a command; `quit` to exit.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            eprint!("> ");
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        // A failed message is reported and the session continues.
        let reply = match router.handle(line).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(error = %err, "message failed");
                Responder::error(&err)
            }
        };
        print_reply(&reply, cli.json)?;
    }

    Ok(())
}

fn print_reply(reply: &Reply, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(reply)?);
    } else {
        println!("{}", reply.summary);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner showing the current save phase.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, url: &str, name: &str) {
        self.spinner.set_message(format!("{name} {url}"));
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
