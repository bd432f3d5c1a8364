use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use hashprep_theme::{NativePlatform, Preference, StoreError, ThemeConfig, ThemeController};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no config directory found; pass --store or set HASHPREP_THEME_FILE")]
    NoStorePath,
    #[error("theme store unusable: {0}")]
    Store(#[from] StoreError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "hashprep-theme", about = "Read and change the hashprep theme preference")]
struct Cli {
    /// JSON file holding the stored preference.
    #[arg(long, env = "HASHPREP_THEME_FILE")]
    store: Option<PathBuf>,

    /// Key the preference is stored under.
    #[arg(long, env = "HASHPREP_THEME_KEY", default_value = hashprep_theme::config::DEFAULT_STORAGE_KEY)]
    key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Once(OnceCommand),
    /// Print the applied attribute whenever it changes.
    Watch {
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },
}

#[derive(Subcommand, Debug)]
enum OnceCommand {
    /// Print the stored preference.
    Get,
    /// Print the theme in effect.
    Resolved,
    /// Store a preference and print the applied attribute.
    Set {
        #[arg(value_name = "light|dark|system")]
        preference: Preference,
    },
    /// Flip between light and dark and print the applied attribute.
    Toggle,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match cli.store {
        Some(path) => path,
        None => default_store_path().ok_or(CliError::NoStorePath)?,
    };
    let platform = NativePlatform::open(store);
    // Surface a corrupt store here; the controller itself would load `system`.
    platform.store().load()?;

    let theme = ThemeController::load(platform, ThemeConfig::default().with_storage_key(cli.key));
    let mut out = io::stdout().lock();
    match cli.command {
        Command::Once(command) => run_command(&theme, &command, &mut out),
        Command::Watch { interval_ms } => {
            let interval = Duration::from_millis(interval_ms);
            watch(&theme, interval, &mut out, shutdown_signal()).await
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; watch runs until killed");
        std::future::pending::<()>().await;
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hashprep").join("theme.json"))
}

fn run_command(
    theme: &ThemeController<NativePlatform>,
    command: &OnceCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        OnceCommand::Get => writeln!(out, "{}", theme.preference())?,
        OnceCommand::Resolved => writeln!(out, "{}", theme.resolved())?,
        OnceCommand::Set { preference } => {
            theme.set_preference(*preference);
            print_attribute(theme, out)?;
        }
        OnceCommand::Toggle => {
            let now = theme.toggle();
            tracing::debug!(theme = %now, "toggled");
            print_attribute(theme, out)?;
        }
    }
    Ok(())
}

/// Apply the current theme, then poll the OS every `interval` and print the
/// attribute each time it changes, until `shutdown` completes.
async fn watch(
    theme: &ThemeController<NativePlatform>,
    interval: Duration,
    out: &mut impl Write,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CliError> {
    theme.init();
    let mut last = print_attribute(theme, out)?;
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(100)));
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !theme.platform().poll() {
                    continue;
                }
                let current = current_attribute(theme);
                if current != last {
                    last = print_attribute(theme, out)?;
                }
            }
            () = &mut shutdown => {
                tracing::debug!("watch interrupted");
                return Ok(());
            }
        }
    }
}

fn current_attribute(theme: &ThemeController<NativePlatform>) -> String {
    let name = &theme.config().attribute;
    theme
        .platform()
        .attribute(name)
        .unwrap_or_else(|| theme.resolved().to_string())
}

fn print_attribute(
    theme: &ThemeController<NativePlatform>,
    out: &mut impl Write,
) -> Result<String, CliError> {
    let value = current_attribute(theme);
    writeln!(out, "{}={value}", theme.config().attribute)?;
    out.flush()?;
    Ok(value)
}
