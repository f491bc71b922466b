use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use clap::Parser;
use pdf_quiz::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    if let Err(e) = init_logging(&config) {
        eprintln!("Could not open log file {}: {}", config.log_path().display(), e);
        std::process::exit(1);
    }

    if let Err(e) = pdf_quiz::run(config).await {
        tracing::error!(error = %e, "quiz ended with an error");
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}

/// The TUI owns stdout, so logs go to a file.
fn init_logging(config: &Config) -> std::io::Result<()> {
    fs::create_dir_all(&config.data_dir)?;
    let path = config.log_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_quiz=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
