//! Weather-based office attire suggestions.
//!
//! Fetches a forecast from Open-Meteo, asks the model for one attire
//! suggestion per day and assembles a report.

pub mod attire;
pub mod forecast;
pub mod report;

pub use attire::{attire_prompt, parse_daily_attire, suggest_attire};
pub use forecast::{describe_weather_code, weather_emoji, Forecast, ForecastDay, WeatherClient};
pub use report::WeatherReport;
