//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use fieldpress_core::pipeline::{self, ProgressReporter, PublishConfig, PublishResult};
use fieldpress_shared::{config_file_path, init_config, load_config, validate_credentials};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// fieldpress — publish CRM content records as static-site collections.
#[derive(Parser)]
#[command(
    name = "fieldpress",
    version,
    about = "Extract CRM content records and press them into Jekyll collection files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Run the one-shot publish: fetch, resolve, transform, write.
    Publish {
        /// Use the snapshot cache instead of querying the CRM.
        #[arg(long)]
        offline: bool,

        /// Output root directory (overrides config).
        #[arg(short, long)]
        out: Option<String>,

        /// Snapshot cache file (overrides config).
        #[arg(long)]
        cache: Option<String>,
    },

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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "fieldpress=info",
        1 => "fieldpress=debug",
        _ => "fieldpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Publish {
            offline,
            out,
            cache,
        } => cmd_publish(offline, out.as_deref(), cache.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_publish(offline: bool, out: Option<&str>, cache: Option<&str>) -> Result<()> {
    let config = load_config()?;

    // Live runs need credentials before doing anything
    if !offline {
        validate_credentials(&config)?;
    }

    let output_root = PathBuf::from(out.unwrap_or(&config.publish.output_dir));
    let cache_file = PathBuf::from(cache.unwrap_or(&config.publish.cache_file));

    let publish_config = PublishConfig {
        offline,
        output_root,
        cache_file,
        app: config,
    };

    info!(
        offline,
        output_root = %publish_config.output_root.display(),
        "starting publish"
    );

    let reporter = CliProgress::new();
    let result = pipeline::publish(&publish_config, &reporter)?;

    // Print summary
    println!();
    println!("  Publish complete!");
    println!("  Records: {}", result.records_written);
    println!("  Source:  {}", if result.offline { "snapshot cache" } else { "live CRM" });
    println!("  Output:  {}", result.output_root.display());
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;
    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record_written(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &PublishResult) {
        self.spinner.finish_and_clear();
    }
}
