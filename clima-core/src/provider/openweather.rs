use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use crate::{
    error::{StatusError, WeatherError},
    model::{
        AirQuality, CitySearchResult, Coordinates, CurrentWeather, DailyForecast, ForecastItem,
        OneCallWeather,
    },
    payload::{
        OwCurrentResponse, OwDailyResponse, OwForecastResponse, OwGeoEntry, OwPollutionResponse,
    },
    search::MIN_QUERY_CHARS,
    transform::{self, MAX_DAYS},
};

use super::WeatherProvider;

pub const DATA_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

const UNITS: &str = "metric";
const SEARCH_LIMIT: usize = 5;

/// OpenWeather free-tier client. The paid daily endpoint is tried
/// opportunistically by [`WeatherProvider::forecast`].
#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    lang: String,
    data_base_url: String,
    geo_base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("lang", &self.lang)
            .field("data_base_url", &self.data_base_url)
            .field("geo_base_url", &self.geo_base_url)
            .finish_non_exhaustive()
    }
}

/// Why a single request failed, before it is folded into a [`WeatherError`].
#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status(s) if s.status == StatusCode::TOO_MANY_REQUESTS.as_u16())
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            lang: "es".to_string(),
            data_base_url: DATA_BASE_URL.to_string(),
            geo_base_url: GEO_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Point the client at other hosts, e.g. a mock server.
    pub fn with_base_urls(mut self, data: impl Into<String>, geo: impl Into<String>) -> Self {
        self.data_base_url = data.into().trim_end_matches('/').to_string();
        self.geo_base_url = geo.into().trim_end_matches('/').to_string();
        self
    }

    fn weather_query(&self, at: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("units", UNITS.to_string()),
            ("lang", self.lang.clone()),
            ("appid", self.api_key.clone()),
        ]
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        tracing::debug!(%url, "GET");

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%url, %status, "provider rejected request");
            return Err(StatusError { status: status.as_u16(), body: truncate_body(&body) }.into());
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_current(&self, at: Coordinates) -> Result<OwCurrentResponse, FetchError> {
        let url = format!("{}/weather", self.data_base_url);
        self.fetch_json(url, &self.weather_query(at)).await
    }

    async fn fetch_forecast_entries(
        &self,
        at: Coordinates,
    ) -> Result<OwForecastResponse, FetchError> {
        let url = format!("{}/forecast", self.data_base_url);
        self.fetch_json(url, &self.weather_query(at)).await
    }

    async fn fetch_daily(&self, at: Coordinates) -> Result<OwDailyResponse, FetchError> {
        let url = format!("{}/forecast/daily", self.data_base_url);
        let mut query = self.weather_query(at);
        query.push(("cnt", MAX_DAYS.to_string()));
        self.fetch_json(url, &query).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn one_call(&self, at: Coordinates) -> Result<OneCallWeather, WeatherError> {
        let (current, forecast) =
            tokio::join!(self.fetch_current(at), self.fetch_forecast_entries(at));

        let throttled = [current.as_ref().err(), forecast.as_ref().err()]
            .into_iter()
            .flatten()
            .any(FetchError::is_rate_limited);
        if throttled {
            tracing::warn!("OpenWeather quota exceeded");
            return Err(WeatherError::RateLimitExceeded);
        }

        let current = current.map_err(|e| {
            tracing::warn!(error = %e, "current conditions request failed");
            WeatherError::fetch_failed(e)
        })?;
        let forecast = forecast.map_err(|e| {
            tracing::warn!(error = %e, "forecast request failed");
            WeatherError::fetch_failed(e)
        })?;

        Ok(transform::one_call_from_payloads(current, forecast))
    }

    #[instrument(skip(self), level = "info")]
    async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, WeatherError> {
        let raw = self.fetch_current(at).await.map_err(|e| {
            tracing::warn!(error = %e, "current conditions request failed");
            WeatherError::fetch_failed(e)
        })?;
        Ok(raw.into())
    }

    #[instrument(skip(self), level = "info")]
    async fn forecast(&self, at: Coordinates) -> Result<DailyForecast, WeatherError> {
        match self.fetch_daily(at).await {
            Ok(daily) => Ok(DailyForecast {
                timezone_offset: daily.city.timezone.unwrap_or_default(),
                days: daily.list.into_iter().take(MAX_DAYS).map(ForecastItem::from).collect(),
            }),
            Err(primary) => {
                tracing::info!(error = %primary, "daily endpoint unavailable, using 3-hour forecast");

                let raw = self.fetch_forecast_entries(at).await.map_err(|e| {
                    tracing::warn!(error = %e, "fallback forecast request failed");
                    WeatherError::forecast_failed(e)
                })?;

                let offset = transform::offset_from_seconds(raw.city.timezone);
                Ok(DailyForecast {
                    days: transform::daily_from_entries(&raw.list, offset),
                    timezone_offset: offset.local_minus_utc(),
                })
            }
        }
    }

    #[instrument(skip(self), level = "info")]
    async fn air_quality(&self, at: Coordinates) -> Result<AirQuality, WeatherError> {
        let url = format!("{}/air_pollution", self.data_base_url);
        let query = [
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let raw: OwPollutionResponse = self
            .fetch_json(url, &query)
            .await
            .map_err(WeatherError::air_quality_failed)?;

        let sample = raw
            .list
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::air_quality_failed("response contained no samples"))?;

        Ok(AirQuality { aqi: sample.main.aqi, components: sample.components, dt: sample.dt })
    }

    #[instrument(skip(self), level = "info")]
    async fn search_cities(&self, query: &str) -> Result<Vec<CitySearchResult>, WeatherError> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let url = format!("{}/direct", self.geo_base_url);
        let params = [
            ("q", query.to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let raw: Vec<OwGeoEntry> = self
            .fetch_json(url, &params)
            .await
            .map_err(WeatherError::search_failed)?;

        Ok(raw.into_iter().take(SEARCH_LIMIT).map(CitySearchResult::from).collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
