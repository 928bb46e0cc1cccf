//! Lifecycle hook demo runner.
//!
//! Reproduces the classic constructor/destructor check: a startup hook
//! prints `startup`, main prints `In main`, a cleanup hook prints `cleanup`.
//!
//! ```text
//!   load modules ──▶ startup hooks ──▶ main ──▶ cleanup hooks ──▶ exit code
//!                         │                          ▲
//!                         └── failure: unwind ───────┘ (main skipped)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use lifecycle_hooks::config::{load_config, RuntimeConfig};
use lifecycle_hooks::lifecycle::{signals, Loader, ModuleFn, Shutdown};
use lifecycle_hooks::observability::logging;

#[derive(Parser)]
#[command(name = "lifecycle-hooks")]
#[command(about = "Run startup and cleanup hooks around a demo main", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Make the startup hook fail (main is skipped).
    #[arg(long)]
    fail_startup: bool,

    /// Make the cleanup hook fail.
    #[arg(long)]
    fail_cleanup: bool,

    /// Print the launch report as JSON to stderr.
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RuntimeConfig::default(),
    };
    logging::init_logging(&config.observability)?;

    tracing::debug!(
        log_level = %config.observability.log_level,
        catch_panics = config.registry.catch_panics,
        unwind_on_startup_failure = config.registry.unwind_on_startup_failure,
        "Configuration loaded"
    );

    let fail_startup = cli.fail_startup;
    let fail_cleanup = cli.fail_cleanup;
    let fixture = ModuleFn::new("fixture", move |scope| {
        scope.on_startup("my_startup", move || {
            println!("startup");
            if fail_startup {
                return Err("startup hook told to fail".into());
            }
            Ok(())
        })?;
        scope.on_cleanup("my_cleanup", move || {
            println!("cleanup");
            if fail_cleanup {
                return Err("cleanup hook told to fail".into());
            }
            Ok(())
        })?;
        Ok(())
    });

    let mut loader = Loader::new(&config);
    loader.load(&fixture)?;

    let shutdown = Shutdown::new();
    let listener = signals::spawn_signal_listener(shutdown.clone());

    let report = loader
        .launch_until_shutdown(&shutdown, || async {
            println!("In main");
            0
        })
        .await?;
    listener.abort();

    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    let code = report.exit_code();
    tracing::info!(exit_code = code, "Shutdown complete");
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
