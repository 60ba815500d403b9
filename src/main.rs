// src/main.rs
use anyhow::Result;
use clap::Parser;
use notehub::cli::args::Args;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging based on verbosity; stdout is reserved for output
    let filter = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("notehub={}", filter).parse()?),
        )
        .init();

    notehub::run(args).await
}
