//! promptforge: batch generation of structured records from a local LLM.
//!
//! Asks the operator how many records to generate, then drives the batch
//! against an Ollama server, writing validated JSON artifacts as it goes.
//!
//! Usage:
//!   cargo run -p promptforge-cli -- characters
//!   cargo run -p promptforge-cli -- negotiations --count 3 --output-dir out
//!   cargo run -p promptforge-cli -- --config config/promptforge.toml characters

mod logging;
mod prompt;

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use signal_hook::consts::SIGINT;
use tracing::{error, info, warn};

use promptforge_config::Settings;
use promptforge_contracts::{
    artifact::ArtifactLayout,
    batch::{BatchReport, BatchStatus},
    error::ForgeResult,
};
use promptforge_core::{
    traits::GeneratedRecord, BatchDriver, BatchEvent, CancelFlag, Generator, ProgressFn,
    ThreadSleeper,
};
use promptforge_ollama::OllamaClient;
use promptforge_records::{install_checks, Character, NegotiationScenario};
use promptforge_store::FileArtifactStore;
use promptforge_verify::SchemaVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Generate character profiles and negotiation scenarios with a local LLM.
///
/// Every record is checked against its JSON Schema before it is written.
/// Failed calls are retried with exponential backoff.
#[derive(Parser)]
#[command(
    name = "promptforge",
    about = "Batch-generate schema-validated JSON records with Ollama",
    long_about = "Generates character profiles or negotiation scenarios through a local\n\
                  Ollama model, validating each record and saving it as JSON."
)]
struct Cli {
    /// TOML config file. Defaults to ./promptforge.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate character profiles into a single aggregate file.
    Characters(BatchArgs),
    /// Generate negotiation scenarios, one file per scenario.
    Negotiations(BatchArgs),
}

#[derive(Args)]
struct BatchArgs {
    /// How many records to generate. Asked for interactively when omitted.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    count: Option<u32>,

    /// Directory for generated files. Overrides `output.dir`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Command {
    fn args(&self) -> &BatchArgs {
        match self {
            Command::Characters(args) | Command::Negotiations(args) => args,
        }
    }

    /// Prefix of the command's DEBUG log file.
    fn log_name(&self) -> &'static str {
        match self {
            Command::Characters(_) => "charactergen",
            Command::Negotiations(_) => "negotiationgen",
        }
    }

    fn question(&self) -> &'static str {
        match self {
            Command::Characters(_) => "How many characters would you like to generate? ",
            Command::Negotiations(_) => {
                "How many negotiation scenarios would you like to generate? "
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = &cli.command.args().output_dir {
        settings.output.dir = dir.clone();
    }

    // Held until main returns so the file writers flush.
    let _guards = match logging::init(cli.command.log_name(), &settings.logging) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("Logging setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        command = cli.command.log_name(),
        config = ?cli.config,
        "configuration loaded"
    );

    let count = match cli.command.args().count {
        Some(n) => n,
        None => match prompt::prompt_count(
            &mut io::stdin().lock(),
            &mut io::stdout(),
            cli.command.question(),
        ) {
            Ok(Some(n)) => n,
            Ok(None) => {
                info!("input closed before a count was given");
                println!("\nOperation cancelled by user.");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                error!(error = %e, "failed to read count");
                return ExitCode::FAILURE;
            }
        },
    };

    let cancel = CancelFlag::new();
    install_interrupt_handler(&cancel);

    let code = match cli.command {
        Command::Characters(_) => run_batch::<Character>(&settings, count, cancel),
        Command::Negotiations(_) => run_batch::<NegotiationScenario>(&settings, count, cancel),
    };
    ExitCode::from(code)
}

/// The first SIGINT sets `cancel`; a second one exits immediately.
fn install_interrupt_handler(cancel: &CancelFlag) {
    let installed = signal_hook::flag::register_conditional_shutdown(SIGINT, 130, cancel.handle())
        .and_then(|_| signal_hook::flag::register(SIGINT, cancel.handle()));
    if let Err(e) = installed {
        warn!(error = %e, "could not install interrupt handler");
    }
}

// ── Batch dispatch ────────────────────────────────────────────────────────────

fn run_batch<R: GeneratedRecord>(settings: &Settings, count: u32, cancel: CancelFlag) -> u8 {
    let report = match build_driver(settings, cancel, R::KIND) {
        Ok(driver) => driver.run::<R>(count),
        Err(e) => {
            error!(error_kind = %e.kind(), error = %e, "failed to start batch");
            eprintln!("Error: {e}");
            return 1;
        }
    };

    if report.status == BatchStatus::Completed {
        print_summary(&report);
    }
    u8::try_from(report.exit_code()).unwrap_or(1)
}

fn build_driver(
    settings: &Settings,
    cancel: CancelFlag,
    kind: &'static str,
) -> ForgeResult<BatchDriver> {
    let client = OllamaClient::new(
        &settings.model.base_url,
        &settings.model.model,
        settings.model.timeout(),
    )?;
    let store = FileArtifactStore::new(settings.output.dir.clone());
    info!(
        model = client.model(),
        base_url = client.base_url(),
        output_dir = %store.dir().display(),
        "pipeline ready"
    );

    let mut verifier = SchemaVerifier::new();
    install_checks(&mut verifier);

    let generator = Generator::new(
        Box::new(client),
        Box::new(verifier),
        Box::new(ThreadSleeper::new(cancel.clone())),
        settings.generation.backoff(),
    )
    .with_cancel(cancel);

    Ok(
        BatchDriver::new(generator, Box::new(store), settings.batch_settings())
            .on_progress(console_progress(kind, settings.logging.dir.clone())),
    )
}

/// Operator-facing progress lines on stdout.
fn console_progress(kind: &'static str, log_dir: PathBuf) -> ProgressFn {
    Box::new(move |event| match event {
        BatchEvent::ItemRetrying {
            attempt,
            max_attempts,
            ..
        } => println!("Error occurred, retrying... ({attempt}/{max_attempts})"),
        BatchEvent::ItemFailed { item, .. } => {
            println!(
                "Failed to generate {kind} {item}. Check {} for details.",
                logging::current_error_log(&log_dir).display()
            )
        }
        BatchEvent::Cancelled { .. } => println!("\nOperation cancelled by user."),
        BatchEvent::ItemStarted { .. } | BatchEvent::ItemPersisted { .. } => {}
    })
}

// ── Summary ───────────────────────────────────────────────────────────────────

fn print_summary<R: GeneratedRecord>(report: &BatchReport<R>) {
    let generated = report.stats.generated;
    match R::layout() {
        ArtifactLayout::Aggregate { prefix } => {
            if let Some(last) = report.artifacts.last() {
                println!(
                    "\nSuccessfully generated {generated} {prefix} and saved to {}",
                    last.path.display()
                );
            }
        }
        ArtifactLayout::PerRecord => {
            println!("\nSuccessfully generated {generated} {}.", R::WRAPPER_KEY);
            println!("Files generated:");
            for receipt in &report.artifacts {
                println!("- {}", receipt.path.display());
            }
        }
    }
}
