use clap::Parser;

use voice_memos::cli::Args;
use voice_memos::config::Config;
use voice_memos::demo::{self, Outcome, OutputFormat};
use voice_memos::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply(&mut config);
    config.validate()?;

    init_tracing(&config.logging.level);

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    tokio::select! {
        outcome = demo::run(&config, format) => match outcome? {
            Outcome::Alert(title) => eprintln!("Session ended with alert: {title}"),
            Outcome::Played(memo) => eprintln!(
                "Recorded and played \"{}\" ({:.1}s) from {}",
                memo.title,
                memo.duration,
                memo.url.display()
            ),
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            eprintln!("Interrupted");
        }
    }

    Ok(())
}
