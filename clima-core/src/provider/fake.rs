//! In-memory provider for orchestration tests.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex, time::Duration};

use super::WeatherProvider;
use crate::{
    error::{StatusError, WeatherError},
    model::{
        AirComponents, AirQuality, CitySearchResult, Coordinates, CurrentWeather, DailyForecast,
        OneCallWeather, WeatherCondition,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Ok,
    RateLimited,
    Failed,
}

#[derive(Debug)]
pub(crate) struct FakeProvider {
    pub weather: Outcome,
    pub air: Outcome,
    pub current: CurrentWeather,
    /// query -> (latency, results or failure)
    pub searches: HashMap<String, (Duration, Option<Vec<CitySearchResult>>)>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            weather: Outcome::Ok,
            air: Outcome::Ok,
            current: current_weather("Clear", 1_000, 500, 2_000),
            searches: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_search(
        mut self,
        query: &str,
        latency_ms: u64,
        results: Option<Vec<CitySearchResult>>,
    ) -> Self {
        self.searches
            .insert(query.to_string(), (Duration::from_millis(latency_ms), results));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail(outcome: Outcome) -> WeatherError {
        match outcome {
            Outcome::RateLimited => WeatherError::RateLimitExceeded,
            _ => WeatherError::fetch_failed(StatusError { status: 500, body: String::new() }),
        }
    }
}

pub(crate) fn city(name: &str) -> CitySearchResult {
    CitySearchResult {
        name: name.to_string(),
        country: "CO".to_string(),
        state: None,
        lat: 4.6,
        lon: -74.1,
    }
}

pub(crate) fn current_weather(main: &str, dt: i64, sunrise: i64, sunset: i64) -> CurrentWeather {
    CurrentWeather {
        location_name: "Medellín".into(),
        country: "CO".into(),
        coordinates: Some(Coordinates::new(6.2442, -75.5812)),
        temperature: 24.0,
        feels_like: 24.3,
        temp_min: 19.0,
        temp_max: 27.0,
        pressure: 1016,
        humidity: 65,
        visibility: 10_000,
        wind_speed: 1.8,
        wind_deg: 120,
        wind_gust: None,
        clouds: 20,
        dt,
        sunrise,
        sunset,
        timezone_offset: -18_000,
        conditions: vec![WeatherCondition {
            id: 800,
            main: main.to_string(),
            description: String::new(),
            icon: String::new(),
        }],
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn one_call(&self, at: Coordinates) -> Result<OneCallWeather, WeatherError> {
        self.record(format!("one_call {},{}", at.lat, at.lon));
        match self.weather {
            Outcome::Ok => Ok(OneCallWeather {
                current: self.current.clone(),
                hourly: Vec::new(),
                daily: Vec::new(),
            }),
            other => Err(Self::fail(other)),
        }
    }

    async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, WeatherError> {
        self.record(format!("current {},{}", at.lat, at.lon));
        Ok(self.current.clone())
    }

    async fn forecast(&self, at: Coordinates) -> Result<DailyForecast, WeatherError> {
        self.record(format!("forecast {},{}", at.lat, at.lon));
        Ok(DailyForecast { days: Vec::new(), timezone_offset: self.current.timezone_offset })
    }

    async fn air_quality(&self, at: Coordinates) -> Result<AirQuality, WeatherError> {
        self.record(format!("air {},{}", at.lat, at.lon));
        match self.air {
            Outcome::Ok => Ok(AirQuality { aqi: 2, components: AirComponents::default(), dt: 0 }),
            other => Err(Self::fail(other)),
        }
    }

    async fn search_cities(&self, query: &str) -> Result<Vec<CitySearchResult>, WeatherError> {
        self.record(format!("search {query}"));
        let (latency, results) = self.searches.get(query).cloned().unwrap_or_default();
        tokio::time::sleep(latency).await;
        results.ok_or_else(|| WeatherError::search_failed("fake search failure"))
    }
}
