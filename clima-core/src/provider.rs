use crate::{
    Config,
    error::WeatherError,
    model::{
        AirQuality, CitySearchResult, Coordinates, CurrentWeather, DailyForecast, OneCallWeather,
    },
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

#[cfg(test)]
pub(crate) mod fake;

/// Everything the widget asks of a weather backend.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions plus synthesized hourly and daily views.
    ///
    /// Fails with [`WeatherError::RateLimitExceeded`] when any underlying
    /// request was throttled.
    async fn one_call(&self, at: Coordinates) -> Result<OneCallWeather, WeatherError>;

    async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, WeatherError>;

    /// Up to seven forecast days, with the location's UTC offset so callers
    /// can label them in the same calendar they were grouped in.
    async fn forecast(&self, at: Coordinates) -> Result<DailyForecast, WeatherError>;

    async fn air_quality(&self, at: Coordinates) -> Result<AirQuality, WeatherError>;

    /// Up to five candidate cities; empty without a request for queries
    /// shorter than [`crate::search::MIN_QUERY_CHARS`].
    async fn search_cities(&self, query: &str) -> Result<Vec<CitySearchResult>, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    if !config.is_api_key_configured() {
        tracing::warn!(
            "No OpenWeather API key configured; requests will be rejected by the provider. \
             Set {} or run `clima configure`.",
            crate::config::API_KEY_ENV
        );
    }

    Arc::new(OpenWeatherProvider::new(config.api_key()).with_language(config.language()))
}
