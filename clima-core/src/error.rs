use thiserror::Error;

/// Message shown when a load fails for any reason other than the quota.
pub const LOAD_FAILED_MESSAGE: &str = "No se pudo cargar el clima. Intenta de nuevo.";

/// Message shown when the user's position cannot be obtained.
pub const LOCATION_FAILED_MESSAGE: &str =
    "No se pudo obtener tu ubicación. Verifica los permisos de ubicación.";

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the provider client.
///
/// The `Display` strings are sentinels: callers match on the variant, the UI
/// never shows them verbatim (see [`WeatherError::user_message`]).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered 429 on any of the requests of a load.
    #[error("RATE_LIMIT_EXCEEDED")]
    RateLimitExceeded,

    #[error("Failed to fetch weather data")]
    FetchFailed(#[source] Option<Cause>),

    #[error("Failed to fetch forecast")]
    ForecastFailed(#[source] Option<Cause>),

    #[error("Failed to fetch air quality")]
    AirQualityFailed(#[source] Option<Cause>),

    #[error("Failed to search cities")]
    SearchFailed(#[source] Option<Cause>),
}

impl WeatherError {
    pub fn fetch_failed(cause: impl Into<Cause>) -> Self {
        Self::FetchFailed(Some(cause.into()))
    }

    pub fn forecast_failed(cause: impl Into<Cause>) -> Self {
        Self::ForecastFailed(Some(cause.into()))
    }

    pub fn air_quality_failed(cause: impl Into<Cause>) -> Self {
        Self::AirQualityFailed(Some(cause.into()))
    }

    pub fn search_failed(cause: impl Into<Cause>) -> Self {
        Self::SearchFailed(Some(cause.into()))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }

    /// Text for the widget. `None` for the rate limit, which gets its own panel.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::RateLimitExceeded => None,
            _ => Some(LOAD_FAILED_MESSAGE),
        }
    }
}

/// Failures of a [`crate::location::LocationSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported")]
    NotSupported,
    #[error("User denied the request for geolocation")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    PositionUnavailable,
    #[error("The request to get user location timed out")]
    Timeout,
}

/// Non-success HTTP status, kept as the source of a sentinel error.
#[derive(Debug, Error)]
#[error("provider returned status {status}: {body}")]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}
