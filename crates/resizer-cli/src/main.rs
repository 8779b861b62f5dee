//! resizer: run the resize pipeline from the command line.
//!
//! Reads the same environment as the HTTP service (`publicurl`, `bucketname`,
//! `STORAGE_BACKEND`, ...).

use anyhow::Context;
use clap::{Parser, Subcommand};
use resizer_cli::{init_tracing, key_deriver_from, read_event, run_invocation};
use resizer_core::{Config, FingerprintScheme, ResizeRequest};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "resizer", about = "On-demand image resizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize one image and print its public location (or the failure message)
    Invoke {
        /// Source image URL (http, https or file)
        #[arg(long)]
        url: String,
        /// Target width in pixels
        #[arg(long)]
        width: u32,
        /// Target height in pixels
        #[arg(long)]
        height: u32,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run an invocation record read from a file, or stdin when omitted or "-"
    Event {
        path: Option<std::path::PathBuf>,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the location a request would be stored at, without any I/O
    Key {
        /// Source image URL
        #[arg(long)]
        url: String,
        /// Target width in pixels
        #[arg(long)]
        width: u32,
        /// Target height in pixels
        #[arg(long)]
        height: u32,
        /// Public prefix (defaults to the `publicurl` environment variable)
        #[arg(long)]
        public_url: Option<String>,
        /// Fingerprint scheme: legacy or sha256 (defaults to `FINGERPRINT_SCHEME`, then legacy)
        #[arg(long)]
        scheme: Option<FingerprintScheme>,
    },
}

async fn invoke(request: ResizeRequest, json: bool) -> anyhow::Result<ExitCode> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let outcome = run_invocation(&config, &request).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Serialize outcome")?
        );
    } else {
        println!("{}", outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Invoke {
            url,
            width,
            height,
            json,
        } => invoke(ResizeRequest::new(url, width, height), json).await,
        Commands::Event { path, json } => {
            let request = match path {
                Some(path) if path.as_os_str() != "-" => {
                    let file = std::fs::File::open(&path)
                        .with_context(|| format!("Open {}", path.display()))?;
                    read_event(file)?
                }
                _ => read_event(std::io::stdin().lock())?,
            };
            invoke(request, json).await
        }
        Commands::Key {
            url,
            width,
            height,
            public_url,
            scheme,
        } => {
            let keys = key_deriver_from(public_url, scheme, |name| std::env::var(name).ok())?;
            let key = keys.derive(&url, width, height);
            println!("{}", key.location);
            Ok(ExitCode::SUCCESS)
        }
    }
}
