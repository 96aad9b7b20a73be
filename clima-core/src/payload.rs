//! Raw OpenWeather JSON payloads.
//!
//! Only the fields the widget reads are declared; everything optional on the
//! provider side is defaulted so a sparse response still parses.

use serde::Deserialize;

use crate::model::WeatherCondition;

#[derive(Debug, Clone, Deserialize)]
pub struct OwCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: u32,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: u16,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwClouds {
    #[serde(default)]
    pub all: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwRain {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

impl OwRain {
    pub fn volume(&self) -> Option<f64> {
        self.three_hours.or(self.one_hour)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwSys {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// `GET /data/2.5/weather`
#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    pub coord: Option<OwCoord>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub main: OwMain,
    #[serde(default)]
    pub visibility: u32,
    #[serde(default)]
    pub wind: OwWind,
    #[serde(default)]
    pub clouds: OwClouds,
    pub dt: i64,
    #[serde(default)]
    pub sys: OwSys,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub name: String,
}

/// One 3-hour step of `GET /data/2.5/forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastEntry {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub clouds: OwClouds,
    #[serde(default)]
    pub wind: OwWind,
    #[serde(default)]
    pub visibility: u32,
    #[serde(default)]
    pub pop: f64,
    pub rain: Option<OwRain>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub coord: Option<OwCoord>,
    pub timezone: Option<i32>,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// `GET /data/2.5/forecast`
#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    #[serde(default)]
    pub city: OwCity,
    pub list: Vec<OwForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDailyTemp {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDailyFeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One day of the paid `GET /data/2.5/forecast/daily`.
#[derive(Debug, Clone, Deserialize)]
pub struct OwDailyEntry {
    pub dt: i64,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
    pub temp: OwDailyTemp,
    pub feels_like: OwDailyFeelsLike,
    #[serde(default)]
    pub pressure: u32,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: u16,
    #[serde(default)]
    pub clouds: u8,
    #[serde(default)]
    pub pop: f64,
    pub rain: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDailyResponse {
    #[serde(default)]
    pub city: OwCity,
    pub list: Vec<OwDailyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwAqiMain {
    pub aqi: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwPollutionEntry {
    pub main: OwAqiMain,
    pub components: crate::model::AirComponents,
    pub dt: i64,
}

/// `GET /data/2.5/air_pollution`
#[derive(Debug, Clone, Deserialize)]
pub struct OwPollutionResponse {
    pub list: Vec<OwPollutionEntry>,
}

/// One element of `GET /geo/1.0/direct`.
#[derive(Debug, Clone, Deserialize)]
pub struct OwGeoEntry {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}
