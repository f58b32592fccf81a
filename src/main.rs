use cara_diary::config::TOKEN_ENV_VAR;
use cara_diary::{CaraError, Client, Config, DataExtractor};
use clap::Parser;
use log::warn;
use std::error::Error;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cara-diary",
    about = "Export the Cara food diary of the last 180 days to index.html"
)]
struct Cli {
    /// Dashboard token; falls back to CARA_XTOKEN env var
    #[arg(long, env = "CARA_XTOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = match Config::new(cli.token) {
        Ok(config) => config,
        Err(CaraError::MissingToken) => {
            warn!("No dashboard token configured, nothing exported");
            println!("Please set your {TOKEN_ENV_VAR} as environment variable.");
            return Ok(ExitCode::from(1));
        }
        Err(err) => return Err(err.into()),
    };

    let client = Client::new(config.token.clone())?;
    let report = DataExtractor::new(config, client).run().await?;

    println!(
        "Exported {} entries over {} days ({} to {}) to {}",
        report.entries,
        report.days,
        report.start,
        report.end,
        report.output_path.display()
    );
    println!(
        "Images: {} downloaded, {} unavailable, {} already present",
        report.images.downloaded, report.images.unavailable, report.images.already_present
    );
    if report.truncated {
        println!("Warning: more entries exist in this window than were exported.");
    }

    Ok(ExitCode::SUCCESS)
}
