use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

const OPENWEATHERMAP_BASE_URL: &str = "https://api.openweathermap.org";
const GEOCODING_LIMIT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoLocation {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    pub main: MainWeather,
    #[serde(rename = "weather", default)]
    pub conditions: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainWeather {
    #[serde(rename = "temp")]
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

/// Geocoding and current-weather lookups.
///
/// `Ok(None)` means the service answered without a usable payload.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn resolve_location(&self, city: &str) -> Result<Option<Vec<GeoLocation>>>;

    async fn current_weather(&self, latitude: f64, longitude: f64)
        -> Result<Option<CurrentWeather>>;
}

/// OpenWeatherMap geocoding (`/geo/1.0/direct`) and weather (`/data/2.5/weather`) APIs.
pub struct OpenWeatherMapClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherMapClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: OPENWEATHERMAP_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .query(&[("appid", &self.api_key)])
            .send()
            .await
            .context("Failed to send request to OpenWeatherMap API")?;

        if !response.status().is_success() {
            warn!(path, status = %response.status(), "OpenWeatherMap returned no payload");
            return Ok(None);
        }

        response
            .json::<Option<T>>()
            .await
            .context("Failed to parse OpenWeatherMap API response")
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    async fn resolve_location(&self, city: &str) -> Result<Option<Vec<GeoLocation>>> {
        self.get_json(
            "/geo/1.0/direct",
            &[("q", city.to_string()), ("limit", GEOCODING_LIMIT.to_string())],
        )
        .await
    }

    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<CurrentWeather>> {
        self.get_json(
            "/data/2.5/weather",
            &[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("lang", "en".to_string()),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }
}

/// Looks up the current weather for `city` and renders it as one line.
///
/// Never fails: every failure becomes a message, since the result is shown
/// verbatim to the user.
pub async fn get_weather(provider: &dyn WeatherProvider, city: &str) -> String {
    match lookup(provider, city).await {
        Ok(summary) => summary,
        Err(e) => {
            // Alternate formatting keeps the whole cause chain.
            let message = format!("{:#}", e);
            warn!(city, error = %message, "Weather lookup failed");
            format!("Error retrieving weather data: {}", message)
        }
    }
}

async fn lookup(provider: &dyn WeatherProvider, city: &str) -> Result<String> {
    let location = match provider.resolve_location(city).await? {
        Some(locations) if !locations.is_empty() => locations[0].clone(),
        _ => return Ok("No location found for the specified city.".to_string()),
    };

    debug!(city, lat = location.latitude, lon = location.longitude, "Resolved location");

    let weather = match provider
        .current_weather(location.latitude, location.longitude)
        .await?
    {
        Some(weather) => weather,
        None => return Ok("No weather data available.".to_string()),
    };

    let condition = weather
        .conditions
        .first()
        .ok_or_else(|| anyhow::anyhow!("Weather response contained no conditions"))?;

    Ok(format!(
        "Current weather in {}. Temperature: {}°C. Condition: {}.",
        city, weather.main.temperature, condition.description
    ))
}
