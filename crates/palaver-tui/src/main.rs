//! Palaver TUI entry point.

use std::path::Path;

use clap::Parser;
use palaver_tui::{HttpApi, Runtime, TerminalDriver};

/// Palaver terminal chat client
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(about = "Terminal client for the palaver chatroom server")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Write logs to this file (stderr is unusable while the terminal is in
    /// raw mode)
    #[arg(long)]
    log_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let api = HttpApi::new(&args.server)?;
    let driver = TerminalDriver::new(api)?;
    let mut runtime = Runtime::new(driver);

    Ok(runtime.run().await?)
}

fn init_logging(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
