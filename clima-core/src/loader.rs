//! Loads the widget's weather and tracks loading / error / quota flags.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::HomeCity,
    error::{LOCATION_FAILED_MESSAGE, WeatherError},
    location::{self, LocationSource},
    model::{AirQuality, CitySearchResult, Coordinates, OneCallWeather, WeatherIcon},
    provider::WeatherProvider,
};

/// Receives icon changes after each successful load.
pub trait IconSink: Send + Sync {
    fn update_icon(&self, condition: &str, is_day: bool);
}

#[derive(Debug, Clone, Default)]
pub struct WeatherState {
    pub location_name: Option<String>,
    pub weather: Option<OneCallWeather>,
    /// `None` when the pollution endpoint failed; the panel is hidden.
    pub air_quality: Option<AirQuality>,
    pub is_loading: bool,
    /// User-facing message for the last failed load.
    pub error: Option<String>,
    pub is_rate_limited: bool,
    pub is_day: bool,
    pub icon: Option<WeatherIcon>,
}

pub struct WeatherLoader {
    provider: Arc<dyn WeatherProvider>,
    home: HomeCity,
    icons: Option<Arc<dyn IconSink>>,
    state: watch::Sender<WeatherState>,
}

impl WeatherLoader {
    pub fn new(provider: Arc<dyn WeatherProvider>, home: HomeCity) -> Self {
        let (state, _) = watch::channel(WeatherState::default());
        Self { provider, home, icons: None, state }
    }

    pub fn with_icon_sink(mut self, sink: Arc<dyn IconSink>) -> Self {
        self.icons = Some(sink);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    /// Initial load for the configured home city.
    pub async fn load_default(&self) {
        let at = self.home.coordinates();
        self.load(at, Some(self.home.name.clone())).await;
    }

    pub async fn select_city(&self, city: &CitySearchResult) {
        self.load(city.coordinates(), Some(city.to_string())).await;
    }

    /// Load for wherever `source` says the user is. The name then comes from
    /// the provider's answer.
    pub async fn use_current_location(&self, source: Option<&dyn LocationSource>) {
        match location::user_location(source).await {
            Ok(at) => self.load(at, None).await,
            Err(err) => {
                tracing::warn!(error = %err, "could not determine user location");
                self.state.send_modify(|s| {
                    s.error = Some(LOCATION_FAILED_MESSAGE.to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    async fn load(&self, at: Coordinates, name: Option<String>) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
            s.is_rate_limited = false;
        });

        let (weather, air) =
            tokio::join!(self.provider.one_call(at), self.provider.air_quality(at));

        match weather {
            Ok(weather) => self.apply(weather, air, name),
            Err(err) => self.fail(err),
        }
    }

    fn apply(
        &self,
        weather: OneCallWeather,
        air: Result<AirQuality, WeatherError>,
        name: Option<String>,
    ) {
        let is_day = weather.current.is_day();
        let condition = weather.current.primary_condition().map(|c| c.main.clone());

        let air_quality = match air {
            Ok(aq) => Some(aq),
            Err(err) => {
                tracing::warn!(error = %err, "air quality unavailable");
                None
            }
        };

        if let (Some(sink), Some(main)) = (&self.icons, &condition) {
            sink.update_icon(main, is_day);
        }

        let name = name.unwrap_or_else(|| weather.current.location_name.clone());
        tracing::info!(location = %name, is_day, "weather loaded");

        self.state.send_modify(|s| {
            s.location_name = Some(name);
            s.icon = condition.as_deref().map(|main| WeatherIcon::from_condition(main, is_day));
            s.is_day = is_day;
            s.weather = Some(weather);
            s.air_quality = air_quality;
            s.is_loading = false;
        });
    }

    fn fail(&self, err: WeatherError) {
        if err.is_rate_limited() {
            tracing::warn!("weather load hit the provider quota");
        } else {
            tracing::error!(error = %err, "weather load failed");
        }

        self.state.send_modify(|s| {
            s.is_rate_limited = err.is_rate_limited();
            s.error = err.user_message().map(str::to_string);
            s.is_loading = false;
        });
    }
}
