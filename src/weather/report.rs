use std::fmt::Write as _;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::attire::parse_daily_attire;
use super::forecast::{weather_emoji, Forecast};

const DEFAULT_ATTIRE: &str = "Professional business casual attire recommended.";
const SOURCE: &str = "Weather Agent (Open-Meteo API + Gemini AI)";

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub location: String,
    pub generated_at: DateTime<Local>,
    pub total_days: usize,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Temperature {
    pub min_celsius: Option<f64>,
    pub max_celsius: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Precipitation {
    pub amount_mm: Option<f64>,
    pub probability_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayWeather {
    pub emoji: String,
    pub description: String,
    pub temperature: Temperature,
    pub precipitation: Precipitation,
    pub wind_speed_kmh: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub day_number: usize,
    pub date: String,
    pub weather: DayWeather,
    pub attire_suggestion: String,
}

/// Forecast plus per-day attire suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub metadata: ReportMetadata,
    pub forecast: Vec<DayReport>,
}

impl WeatherReport {
    /// Combine a forecast with the model's numbered attire suggestions.
    pub fn build(forecast: &Forecast, attire_suggestion: &str) -> Self {
        let mut daily_attire = parse_daily_attire(attire_suggestion, forecast);

        let days = forecast
            .days
            .iter()
            .enumerate()
            .map(|(i, day)| DayReport {
                day_number: i + 1,
                date: day.date.clone(),
                weather: DayWeather {
                    emoji: weather_emoji(&day.weather_description).to_string(),
                    description: day.weather_description.clone(),
                    temperature: Temperature {
                        min_celsius: day.temp_min,
                        max_celsius: day.temp_max,
                    },
                    precipitation: Precipitation {
                        amount_mm: day.precipitation_mm,
                        probability_percent: day.precipitation_prob,
                    },
                    wind_speed_kmh: day.wind_speed_kmh,
                },
                attire_suggestion: daily_attire
                    .remove(&day.date)
                    .unwrap_or_else(|| DEFAULT_ATTIRE.to_string()),
            })
            .collect::<Vec<_>>();

        Self {
            metadata: ReportMetadata {
                location: forecast.location.clone(),
                generated_at: Local::now(),
                total_days: days.len(),
                source: SOURCE.to_string(),
            },
            forecast: days,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "# Office attire forecast: {}\n\n_Generated {} by {}_\n",
            self.metadata.location,
            self.metadata.generated_at.format("%Y-%m-%d %H:%M"),
            self.metadata.source
        );

        for day in &self.forecast {
            let temp = |v: Option<f64>| v.map_or_else(|| "?".to_string(), |v| format!("{v}°C"));
            let _ = write!(
                out,
                "\n## Day {}: {} {} {}\n\n- Temperature: {} to {}\n- Precipitation: {} mm ({}% chance)\n- Wind: {} km/h\n\n**Attire:** {}\n",
                day.day_number,
                day.date,
                day.weather.emoji,
                day.weather.description,
                temp(day.weather.temperature.min_celsius),
                temp(day.weather.temperature.max_celsius),
                day.weather.precipitation.amount_mm.unwrap_or(0.0),
                day.weather.precipitation.probability_percent.unwrap_or(0.0),
                day.weather
                    .wind_speed_kmh
                    .map_or_else(|| "?".to_string(), |v| v.to_string()),
                day.attire_suggestion,
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::forecast::ForecastDay;

    fn forecast() -> Forecast {
        let day = |date: &str, code: u16, description: &str| ForecastDay {
            date: date.to_string(),
            temp_max: Some(21.0),
            temp_min: Some(12.5),
            precipitation_mm: Some(0.0),
            precipitation_prob: Some(5.0),
            wind_speed_kmh: Some(14.2),
            weather_code: Some(code),
            weather_description: description.to_string(),
        };
        Forecast {
            location: "Tokyo, Japan".to_string(),
            days: vec![
                day("2026-10-19", 0, "Clear sky"),
                day("2026-10-20", 63, "Moderate rain"),
            ],
        }
    }

    #[test]
    fn test_build_report() {
        let report = WeatherReport::build(&forecast(), "1. Light blazer and chinos.");

        assert_eq!(report.metadata.location, "Tokyo, Japan");
        assert_eq!(report.metadata.total_days, 2);
        assert_eq!(report.forecast[0].day_number, 1);
        assert_eq!(report.forecast[0].weather.emoji, "☀️");
        assert_eq!(report.forecast[0].attire_suggestion, "Light blazer and chinos.");
        assert_eq!(report.forecast[1].weather.emoji, "🌧️");
        assert_eq!(report.forecast[1].attire_suggestion, DEFAULT_ATTIRE);
    }

    #[test]
    fn test_json_shape() {
        let report = WeatherReport::build(&forecast(), "");
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["metadata"]["source"], SOURCE);
        assert_eq!(value["forecast"][1]["weather"]["temperature"]["min_celsius"], 12.5);
        assert_eq!(value["forecast"][1]["weather"]["precipitation"]["probability_percent"], 5.0);
        assert!(value["metadata"]["generated_at"].is_string());
    }

    #[test]
    fn test_markdown_lists_days() {
        let markdown = WeatherReport::build(&forecast(), "2. Raincoat.").to_markdown();
        assert!(markdown.starts_with("# Office attire forecast: Tokyo, Japan"));
        assert!(markdown.contains("## Day 2: 2026-10-20 🌧️ Moderate rain"));
        assert!(markdown.contains("**Attire:** Raincoat."));
    }
}
