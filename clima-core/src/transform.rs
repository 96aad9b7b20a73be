//! Reshaping of provider payloads into the widget's view-models.
//!
//! The free tier only serves current conditions and a 5-day/3-hour forecast,
//! so the daily and hourly views are synthesized here.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::model::{
    CitySearchResult, CurrentWeather, FeelsLikeAggregate, ForecastItem, HourlyForecast,
    OneCallWeather, TemperatureAggregate,
};
use crate::payload::{
    OwCurrentResponse, OwDailyEntry, OwForecastEntry, OwForecastResponse, OwGeoEntry,
};

/// Upper bound on synthesized days.
pub const MAX_DAYS: usize = 7;

/// 24 hours of 3-hour steps.
pub const HOURLY_STEPS: usize = 8;

/// Group 3-hour entries by calendar date (in `offset`) and reduce each group
/// to one [`ForecastItem`].
///
/// Temperatures are aggregated over the whole group; `morn`, `eve` and
/// `night` are positional samples (first, `floor(len * 0.75)`, last), not
/// solar times. Every other field is copied from the group's first entry.
pub fn daily_from_entries(entries: &[OwForecastEntry], offset: FixedOffset) -> Vec<ForecastItem> {
    let mut groups: Vec<(NaiveDate, Vec<&OwForecastEntry>)> = Vec::new();

    for entry in entries {
        let Some(date) = local_date(entry.dt, offset) else {
            tracing::warn!(dt = entry.dt, "skipping forecast entry with out-of-range timestamp");
            continue;
        };

        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, items)) => items.push(entry),
            None => groups.push((date, vec![entry])),
        }
    }

    groups
        .into_iter()
        .take(MAX_DAYS)
        .map(|(_, items)| reduce_day(&items))
        .collect()
}

fn reduce_day(items: &[&OwForecastEntry]) -> ForecastItem {
    let first = items[0];
    let last = items[items.len() - 1];
    let evening = items[(items.len() as f64 * 0.75).floor() as usize];

    let temps: Vec<f64> = items.iter().map(|e| e.main.temp).collect();
    let feels: Vec<f64> = items.iter().map(|e| e.main.feels_like).collect();

    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ForecastItem {
        dt: first.dt,
        sunrise: 0,
        sunset: 0,
        temp: TemperatureAggregate {
            day: mean(&temps),
            min,
            max,
            night: last.main.temp,
            eve: evening.main.temp,
            morn: first.main.temp,
        },
        feels_like: FeelsLikeAggregate {
            day: mean(&feels),
            night: last.main.feels_like,
            eve: evening.main.feels_like,
            morn: first.main.feels_like,
        },
        pressure: first.main.pressure,
        humidity: first.main.humidity,
        conditions: first.weather.clone(),
        wind_speed: first.wind.speed,
        wind_deg: first.wind.deg,
        clouds: first.clouds.all,
        pop: first.pop,
        rain: first.rain.as_ref().and_then(|r| r.volume()),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn local_date(ts: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|utc| utc.with_timezone(&offset).date_naive())
}

/// Offset from a provider `timezone` field, UTC when absent or out of range.
pub fn offset_from_seconds(seconds: Option<i32>) -> FixedOffset {
    seconds
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

pub fn hourly_from_entries(entries: &[OwForecastEntry]) -> Vec<HourlyForecast> {
    entries
        .iter()
        .take(HOURLY_STEPS)
        .map(|e| HourlyForecast {
            dt: e.dt,
            temperature: e.main.temp,
            feels_like: e.main.feels_like,
            pressure: e.main.pressure,
            humidity: e.main.humidity,
            conditions: e.weather.clone(),
            pop: e.pop,
            wind_speed: e.wind.speed,
            wind_deg: e.wind.deg,
            uvi: 0.0,
        })
        .collect()
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(raw: OwCurrentResponse) -> Self {
        Self {
            location_name: raw.name,
            country: raw.sys.country,
            coordinates: raw.coord.map(|c| crate::model::Coordinates::new(c.lat, c.lon)),
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            pressure: raw.main.pressure,
            humidity: raw.main.humidity,
            visibility: raw.visibility,
            wind_speed: raw.wind.speed,
            wind_deg: raw.wind.deg,
            wind_gust: raw.wind.gust,
            clouds: raw.clouds.all,
            dt: raw.dt,
            sunrise: raw.sys.sunrise,
            sunset: raw.sys.sunset,
            timezone_offset: raw.timezone,
            conditions: raw.weather,
        }
    }
}

impl From<OwDailyEntry> for ForecastItem {
    fn from(raw: OwDailyEntry) -> Self {
        Self {
            dt: raw.dt,
            sunrise: raw.sunrise,
            sunset: raw.sunset,
            temp: TemperatureAggregate {
                day: raw.temp.day,
                min: raw.temp.min,
                max: raw.temp.max,
                night: raw.temp.night,
                eve: raw.temp.eve,
                morn: raw.temp.morn,
            },
            feels_like: FeelsLikeAggregate {
                day: raw.feels_like.day,
                night: raw.feels_like.night,
                eve: raw.feels_like.eve,
                morn: raw.feels_like.morn,
            },
            pressure: raw.pressure,
            humidity: raw.humidity,
            conditions: raw.weather,
            wind_speed: raw.speed,
            wind_deg: raw.deg,
            clouds: raw.clouds,
            pop: raw.pop,
            rain: raw.rain,
        }
    }
}

impl From<OwGeoEntry> for CitySearchResult {
    fn from(raw: OwGeoEntry) -> Self {
        Self {
            name: raw.name,
            country: raw.country,
            state: raw.state,
            lat: raw.lat,
            lon: raw.lon,
        }
    }
}

/// Assemble the current+hourly+daily bundle from the two free-tier payloads.
///
/// Days are cut at the forecast city's local midnight, falling back to the
/// current payload's offset when the forecast omits it.
pub fn one_call_from_payloads(
    current: OwCurrentResponse,
    forecast: OwForecastResponse,
) -> OneCallWeather {
    let offset = offset_from_seconds(forecast.city.timezone.or(Some(current.timezone)));

    OneCallWeather {
        hourly: hourly_from_entries(&forecast.list),
        daily: daily_from_entries(&forecast.list, offset),
        current: current.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherCondition;
    use crate::payload::{OwCity, OwClouds, OwMain, OwRain, OwWind};

    const DAY: i64 = 86_400;
    // 2024-01-01T00:00:00Z
    const JAN_1: i64 = 1_704_067_200;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn entry(dt: i64, temp: f64) -> OwForecastEntry {
        OwForecastEntry {
            dt,
            main: OwMain {
                temp,
                feels_like: temp - 1.0,
                temp_min: temp,
                temp_max: temp,
                pressure: 1010,
                humidity: 70,
            },
            weather: vec![WeatherCondition {
                id: 800,
                main: format!("cond-{dt}"),
                description: String::new(),
                icon: String::new(),
            }],
            clouds: OwClouds { all: 20 },
            wind: OwWind { speed: 3.0, deg: 180, gust: None },
            visibility: 10_000,
            pop: 0.2,
            rain: None,
        }
    }

    /// Eight 3-hour steps per day starting at `start`.
    fn days(start: i64, n: usize) -> Vec<OwForecastEntry> {
        (0..n * 8)
            .map(|i| entry(start + i as i64 * 10_800, 10.0 + (i % 8) as f64))
            .collect()
    }

    #[test]
    fn one_item_per_calendar_day() {
        let items = daily_from_entries(&days(JAN_1, 5), utc());
        assert_eq!(items.len(), 5);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.dt, JAN_1 + i as i64 * DAY);
        }
    }

    #[test]
    fn caps_at_seven_days() {
        let items = daily_from_entries(&days(JAN_1, 9), utc());
        assert_eq!(items.len(), MAX_DAYS);
    }

    #[test]
    fn empty_input_yields_no_days() {
        assert!(daily_from_entries(&[], utc()).is_empty());
    }

    #[test]
    fn aggregates_stay_within_the_group() {
        let mut entries = days(JAN_1, 2);
        // A spike on day two must not leak into day one.
        entries[12].main.temp = 40.0;

        let items = daily_from_entries(&entries, utc());
        assert_eq!(items[0].temp.max, 17.0);
        assert_eq!(items[0].temp.min, 10.0);
        assert_eq!(items[1].temp.max, 40.0);

        for item in &items {
            assert!(item.temp.min <= item.temp.day);
            assert!(item.temp.day <= item.temp.max);
        }
    }

    #[test]
    fn positional_samples_and_mean() {
        let items = daily_from_entries(&days(JAN_1, 1), utc());
        let t = items[0].temp;
        assert_eq!(t.morn, 10.0);
        // floor(8 * 0.75) = 6
        assert_eq!(t.eve, 16.0);
        assert_eq!(t.night, 17.0);
        assert!((t.day - 13.5).abs() < 1e-9);
        assert!((items[0].feels_like.day - 12.5).abs() < 1e-9);
    }

    #[test]
    fn single_entry_day_uses_it_everywhere() {
        let items = daily_from_entries(&[entry(JAN_1 + 3_600, 8.0)], utc());
        let t = items[0].temp;
        assert_eq!((t.day, t.min, t.max, t.morn, t.eve, t.night), (8.0, 8.0, 8.0, 8.0, 8.0, 8.0));
    }

    #[test]
    fn non_temperature_fields_come_from_first_entry() {
        let mut entries = days(JAN_1, 1);
        entries[0].rain = Some(OwRain { one_hour: None, three_hours: Some(0.7) });
        entries[3].pop = 0.9;

        let item = &daily_from_entries(&entries, utc())[0];
        assert_eq!(item.conditions[0].main, format!("cond-{JAN_1}"));
        assert_eq!(item.pop, 0.2);
        assert_eq!(item.rain, Some(0.7));
        assert_eq!(item.sunrise, 0);
    }

    #[test]
    fn day_boundaries_follow_the_offset() {
        // 03:00Z and 06:00Z on Jan 1 are still Dec 31 in UTC-5.
        let entries = vec![entry(JAN_1 + 3 * 3_600, 1.0), entry(JAN_1 + 6 * 3_600, 2.0)];

        assert_eq!(daily_from_entries(&entries, utc()).len(), 1);
        let bogota = FixedOffset::west_opt(5 * 3_600).unwrap();
        assert_eq!(daily_from_entries(&entries, bogota).len(), 2);
    }

    #[test]
    fn one_call_uses_current_offset_when_forecast_has_none() {
        let current: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "main": { "temp": 20.0, "feels_like": 20.0 },
            "dt": JAN_1,
            "timezone": -18_000,
            "name": "Bogotá"
        }))
        .unwrap();
        let forecast = OwForecastResponse {
            city: OwCity { timezone: None, ..OwCity::default() },
            list: vec![entry(JAN_1 + 3 * 3_600, 1.0), entry(JAN_1 + 6 * 3_600, 2.0)],
        };

        let bundle = one_call_from_payloads(current, forecast);
        assert_eq!(bundle.daily.len(), 2);
        assert_eq!(bundle.daily[0].temp.morn, 1.0);
        assert_eq!(bundle.daily[1].temp.morn, 2.0);
    }

    #[test]
    fn hourly_keeps_first_day_and_zero_uv() {
        let hourly = hourly_from_entries(&days(JAN_1, 3));
        assert_eq!(hourly.len(), HOURLY_STEPS);
        assert!(hourly.iter().all(|h| h.uvi == 0.0));
        assert_eq!(hourly[0].dt, JAN_1);
    }

    #[test]
    fn offset_falls_back_to_utc() {
        assert_eq!(offset_from_seconds(None), utc());
        assert_eq!(offset_from_seconds(Some(i32::MAX)), utc());
        assert_eq!(offset_from_seconds(Some(-18_000)).local_minus_utc(), -18_000);
    }
}
