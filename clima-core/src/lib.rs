//! Core library for the `clima` weather widget.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - The OpenWeather client and the payload → view-model transformers
//! - Debounced city search and the weather load orchestrator
//!
//! It is used by the `clima` binary, but any front end can drive
//! [`WeatherLoader`] and [`CitySearch`] and render their published state.

pub mod config;
pub mod error;
pub mod loader;
pub mod location;
pub mod model;
pub mod payload;
pub mod provider;
pub mod search;
pub mod transform;

pub use config::{Config, HomeCity};
pub use error::{GeolocationError, WeatherError};
pub use loader::{IconSink, WeatherLoader, WeatherState};
pub use location::{FixedLocation, LocationSource, user_location};
pub use model::{
    AirQuality, CitySearchResult, Coordinates, CurrentWeather, DailyForecast, ForecastItem,
    HourlyForecast, OneCallWeather, WeatherIcon,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use search::{CitySearch, SearchState};
