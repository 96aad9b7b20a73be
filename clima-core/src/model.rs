use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Condition as reported by the provider, e.g. `{ main: "Rain", description: "lluvia ligera" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub id: u32,
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub country: String,
    pub coordinates: Option<Coordinates>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u8,
    pub visibility: u32,
    pub wind_speed: f64,
    pub wind_deg: u16,
    pub wind_gust: Option<f64>,
    pub clouds: u8,
    /// Unix seconds.
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    /// Shift from UTC in seconds.
    pub timezone_offset: i32,
    pub conditions: Vec<WeatherCondition>,
}

impl CurrentWeather {
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.conditions.first()
    }

    /// Daylight when the observation falls between sunrise and sunset.
    pub fn is_day(&self) -> bool {
        self.dt >= self.sunrise && self.dt < self.sunset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureAggregate {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeelsLikeAggregate {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One forecast day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    /// Zero when the day was synthesized from 3-hour steps.
    pub sunrise: i64,
    pub sunset: i64,
    pub temp: TemperatureAggregate,
    pub feels_like: FeelsLikeAggregate,
    pub pressure: u32,
    pub humidity: u8,
    pub conditions: Vec<WeatherCondition>,
    pub wind_speed: f64,
    pub wind_deg: u16,
    pub clouds: u8,
    /// Probability of precipitation, 0.0..=1.0.
    pub pop: f64,
    pub rain: Option<f64>,
}

/// Forecast days together with the offset their calendar dates are cut in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    pub days: Vec<ForecastItem>,
    /// Shift from UTC in seconds of the forecast location.
    pub timezone_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub pressure: u32,
    pub humidity: u8,
    pub conditions: Vec<WeatherCondition>,
    pub pop: f64,
    pub wind_speed: f64,
    pub wind_deg: u16,
    /// Not served by the free tier.
    pub uvi: f64,
}

/// Current + hourly + daily, assembled from the two free endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCallWeather {
    pub current: CurrentWeather,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<ForecastItem>,
}

/// Pollutant concentrations in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AirComponents {
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub no: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub nh3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    /// 1 (good) ..= 5 (very poor).
    pub aqi: u8,
    pub components: AirComponents,
    pub dt: i64,
}

impl AirQuality {
    pub fn label(&self) -> &'static str {
        match self.aqi {
            1 => "Buena",
            2 => "Aceptable",
            3 => "Moderada",
            4 => "Mala",
            5 => "Muy mala",
            _ => "Desconocida",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySearchResult {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl CitySearchResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

impl std::fmt::Display for CitySearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) if !state.is_empty() => {
                write!(f, "{}, {}, {}", self.name, state, self.country)
            }
            _ => write!(f, "{}, {}", self.name, self.country),
        }
    }
}

/// Widget icon for a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    ClearDay,
    ClearNight,
    Clouds,
    Drizzle,
    Rain,
    Thunderstorm,
    Snow,
    Fog,
}

impl WeatherIcon {
    /// Map the provider's `main` group ("Clear", "Rain", ...) to an icon.
    pub fn from_condition(main: &str, is_day: bool) -> Self {
        match main {
            "Clear" if is_day => Self::ClearDay,
            "Clear" => Self::ClearNight,
            "Drizzle" => Self::Drizzle,
            "Rain" => Self::Rain,
            "Thunderstorm" => Self::Thunderstorm,
            "Snow" => Self::Snow,
            "Mist" | "Smoke" | "Haze" | "Dust" | "Fog" | "Sand" | "Ash" | "Squall"
            | "Tornado" => Self::Fog,
            _ => Self::Clouds,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClearDay => "sun",
            Self::ClearNight => "moon",
            Self::Clouds => "cloud",
            Self::Drizzle => "cloud-drizzle",
            Self::Rain => "cloud-rain",
            Self::Thunderstorm => "cloud-lightning",
            Self::Snow => "cloud-snow",
            Self::Fog => "cloud-fog",
        }
    }
}

/// 16-point compass label for a wind direction in degrees.
pub fn wind_direction_label(deg: u16) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSO", "SO", "OSO", "O", "ONO",
        "NO", "NNO",
    ];
    let idx = ((f64::from(deg % 360) / 22.5).round() as usize) % POINTS.len();
    POINTS[idx]
}
