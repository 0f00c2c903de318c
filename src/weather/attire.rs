use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::instrument;

use super::forecast::Forecast;
use crate::adapter::ModelAdapter;
use crate::response::Output;
use crate::{Error, GenerationOptions, Prompt};

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Build the attire prompt for a forecast.
pub fn attire_prompt(forecast: &Forecast) -> String {
    let mut forecast_text = format!("\n\nWeather forecast for {}:\n", forecast.location);
    for day in &forecast.days {
        let _ = write!(
            forecast_text,
            "\nDay: {}\n- High: {}°C, Low: {}°C\n- Condition: {}\n- Precipitation: {}mm ({}% chance)\n- Wind: {} km/h\n",
            day.date,
            fmt_opt(day.temp_max),
            fmt_opt(day.temp_min),
            day.weather_description,
            fmt_opt(day.precipitation_mm),
            fmt_opt(day.precipitation_prob),
            fmt_opt(day.wind_speed_kmh),
        );
    }

    format!(
        "Based on this weather forecast for an office worker, suggest appropriate office attire for each day.
Consider:
- Temperature comfort (formal vs casual layers)
- Rain/precipitation (waterproof jacket, umbrella needed)
- Wind (consider windbreaker)
- Professional office dress code

Be practical and specific. Format as a numbered list (1., 2., 3., etc), one suggestion per day.
Keep each day's suggestion concise but actionable (2-3 sentences max).
{forecast_text}
Provide specific, actionable clothing recommendations:"
    )
}

/// Ask the model for per-day attire suggestions.
#[instrument(skip_all, fields(location = %forecast.location))]
pub async fn suggest_attire(
    adapter: &dyn ModelAdapter,
    forecast: &Forecast,
) -> Result<String, Error> {
    let prompt = Prompt::user(attire_prompt(forecast));
    let response = adapter
        .generate(&prompt, &GenerationOptions::default())
        .await?;

    match response.output {
        Output::FinalAnswer { text } => Ok(text),
        Output::ToolDirective(directive) => Err(Error::malformed(format!(
            "expected attire suggestions, got a call to '{}'",
            directive.name
        ))),
    }
}

/// Map numbered lines (`"2. Wear a coat"`) to the date of that forecast day.
pub fn parse_daily_attire(suggestion: &str, forecast: &Forecast) -> BTreeMap<String, String> {
    let mut daily = BTreeMap::new();

    for line in suggestion.lines().map(str::trim) {
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let Some((number, text)) = line.split_once('.') else {
            continue;
        };
        let Ok(day) = number.trim().parse::<usize>() else {
            continue;
        };
        if day == 0 {
            continue;
        }
        if let Some(forecast_day) = forecast.days.get(day - 1) {
            daily.insert(forecast_day.date.clone(), text.trim().to_string());
        }
    }

    daily
}
