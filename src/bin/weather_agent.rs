use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use genai_agent::weather::{suggest_attire, WeatherClient, WeatherReport};
use genai_agent::{AdapterConfig, ModelAdapter};
use tracing::info;

const FORECAST_DAYS: usize = 7;

#[derive(Parser)]
#[command(author, version, about = "Suggest office attire from a 7-day forecast", long_about = None)]
struct Cli {
    /// City to fetch the forecast for
    #[arg(default_value = "New York")]
    location: String,

    /// Output format
    #[arg(value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    genai_agent::telemetry::init_tracing();
    let cli = Cli::parse();

    let adapter: Arc<dyn ModelAdapter> = Arc::new(AdapterConfig::from_env()?.build()?);
    let weather = WeatherClient::new()?;

    let forecast = weather.forecast(&cli.location, FORECAST_DAYS).await?;
    info!(location = %forecast.location, days = forecast.days.len(), "Forecast ready");

    let suggestion = suggest_attire(adapter.as_ref(), &forecast).await?;
    let report = WeatherReport::build(&forecast, &suggestion);

    match cli.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Markdown => println!("{}", report.to_markdown()),
    }
    Ok(())
}
