use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::WeatherError;

const GEOCODING_BASE: &str = "https://geocoding-api.open-meteo.com";
const FORECAST_BASE: &str = "https://api.open-meteo.com";

const DAILY_FIELDS: [&str; 6] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "precipitation_probability_max",
    "windspeed_10m_max",
];

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub precipitation_prob: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub weather_code: Option<u16>,
    pub weather_description: String,
}

/// A located multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// "City, Country"
    pub location: String,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<u16>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    windspeed_10m_max: Vec<Option<f64>>,
}

fn at<T: Copy>(series: &[Option<T>], i: usize) -> Option<T> {
    series.get(i).copied().flatten()
}

/// Client for the Open-Meteo geocoding and forecast APIs.
pub struct WeatherClient {
    client: Client,
    geocoding_base: String,
    forecast_base: String,
}

impl WeatherClient {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_urls(GEOCODING_BASE, FORECAST_BASE)
    }

    /// Create a client against custom base URLs (for testing).
    pub fn with_base_urls(
        geocoding_base: impl Into<String>,
        forecast_base: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            geocoding_base: geocoding_base.into().trim_end_matches('/').to_string(),
            forecast_base: forecast_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch up to `days` days of forecast for a city name.
    #[instrument(skip(self))]
    pub async fn forecast(&self, location: &str, days: usize) -> Result<Forecast, WeatherError> {
        info!("Fetching coordinates");
        let geo: GeocodingResponse = self
            .client
            .get(format!("{}/v1/search", self.geocoding_base))
            .query(&[
                ("name", location),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = geo
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))?;
        debug!(name = %place.name, country = %place.country, lat = place.latitude, lon = place.longitude, "Resolved location");

        info!(days, "Fetching weather forecast");
        let response: ForecastResponse = self
            .client
            .get(format!("{}/v1/forecast", self.forecast_base))
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                ("daily", DAILY_FIELDS.join(",")),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let daily = response
            .daily
            .ok_or_else(|| WeatherError::MalformedForecast("missing 'daily' series".to_string()))?;

        let days = (0..days.min(daily.time.len()))
            .map(|i| {
                let weather_code = at(&daily.weather_code, i);
                ForecastDay {
                    date: daily.time[i].clone(),
                    temp_max: at(&daily.temperature_2m_max, i),
                    temp_min: at(&daily.temperature_2m_min, i),
                    precipitation_mm: at(&daily.precipitation_sum, i),
                    precipitation_prob: at(&daily.precipitation_probability_max, i),
                    wind_speed_kmh: at(&daily.windspeed_10m_max, i),
                    weather_code,
                    weather_description: weather_code
                        .map(describe_weather_code)
                        .unwrap_or_else(|| "Unknown".to_string()),
                }
            })
            .collect();

        let location = if place.country.is_empty() {
            place.name
        } else {
            format!("{}, {}", place.name, place.country)
        };

        Ok(Forecast { location, days })
    }
}

/// Describe a WMO weather code.
pub fn describe_weather_code(code: u16) -> String {
    let description = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Foggy with rime",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Heavy drizzle",
        61 => "Light rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Light snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Light showers",
        81 => "Moderate showers",
        82 => "Heavy showers",
        85 => "Light snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        other => return format!("Weather code {other}"),
    };
    description.to_string()
}

/// Pick an emoji for a weather description. First matching keyword wins.
pub fn weather_emoji(description: &str) -> &'static str {
    const EMOJI: [(&str, &str); 14] = [
        ("clear", "☀️"),
        ("sunny", "☀️"),
        ("mainly clear", "🌤️"),
        ("partly cloudy", "⛅"),
        ("overcast", "☁️"),
        ("cloudy", "☁️"),
        ("drizzle", "🌦️"),
        ("rain", "🌧️"),
        ("heavy rain", "⛈️"),
        ("thunderstorm", "⛈️"),
        ("snow", "❄️"),
        ("showers", "🌧️"),
        ("foggy", "🌫️"),
        ("fog", "🌫️"),
    ];

    let lower = description.to_lowercase();
    EMOJI
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, emoji)| *emoji)
        .unwrap_or("🌤️")
}
