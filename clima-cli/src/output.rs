//! Human-friendly rendering of the widget state.

use chrono::{DateTime, FixedOffset};
use clima_core::{
    AirQuality, CitySearchResult, CurrentWeather, DailyForecast, ForecastItem, HourlyForecast,
    WeatherState,
    model::wind_direction_label, transform::offset_from_seconds,
};

pub fn print_dashboard(state: &WeatherState) {
    if state.is_rate_limited {
        println!("Límite de consultas alcanzado.");
        println!("La cuota gratuita del proveedor se agotó; vuelve a intentarlo más tarde.");
        return;
    }

    if let Some(error) = &state.error {
        println!("{error}");
        return;
    }

    let Some(weather) = &state.weather else {
        println!("Sin datos.");
        return;
    };

    let name = state.location_name.as_deref().unwrap_or(&weather.current.location_name);
    let offset = offset_from_seconds(Some(weather.current.timezone_offset));
    let icon = state.icon.map(|i| i.as_str()).unwrap_or("?");

    println!("{name}  [{icon}] {}", if state.is_day { "día" } else { "noche" });
    print_current(&weather.current, offset);

    if !weather.hourly.is_empty() {
        println!();
        print_hourly(&weather.hourly, offset);
    }

    if !weather.daily.is_empty() {
        println!();
        print_daily_rows(&weather.daily, offset);
    }

    if let Some(aq) = &state.air_quality {
        println!();
        print_air_rows(aq);
    }
}

fn print_current(c: &CurrentWeather, offset: FixedOffset) {
    let description = c
        .primary_condition()
        .map(|w| w.description.as_str())
        .unwrap_or("-");

    println!("  {:.1} °C, {description}", c.temperature);
    println!("  Sensación térmica: {:.1} °C", c.feels_like);
    println!("  Mín/Máx:           {:.1} / {:.1} °C", c.temp_min, c.temp_max);
    println!("  Humedad:           {} %", c.humidity);
    println!("  Presión:           {} hPa", c.pressure);
    println!("  Visibilidad:       {:.1} km", f64::from(c.visibility) / 1000.0);
    match c.wind_gust {
        Some(gust) => println!(
            "  Viento:            {:.1} m/s {} (ráfagas {gust:.1})",
            c.wind_speed,
            wind_direction_label(c.wind_deg)
        ),
        None => println!(
            "  Viento:            {:.1} m/s {}",
            c.wind_speed,
            wind_direction_label(c.wind_deg)
        ),
    }
    println!("  Nubosidad:         {} %", c.clouds);
    println!(
        "  Amanecer/Atardecer: {} / {}",
        local_time(c.sunrise, offset, "%H:%M"),
        local_time(c.sunset, offset, "%H:%M")
    );
}

fn print_hourly(hours: &[HourlyForecast], offset: FixedOffset) {
    println!("Próximas horas");
    for h in hours {
        println!(
            "  {}  {:>5.1} °C  {:>3.0} %  {}",
            local_time(h.dt, offset, "%H:%M"),
            h.temperature,
            h.pop * 100.0,
            h.conditions.first().map(|w| w.main.as_str()).unwrap_or("-")
        );
    }
}

pub fn print_daily(name: &str, forecast: &DailyForecast) {
    println!("{name}");
    print_daily_rows(&forecast.days, offset_from_seconds(Some(forecast.timezone_offset)));
}

fn print_daily_rows(days: &[ForecastItem], offset: FixedOffset) {
    println!("Pronóstico");
    for d in days {
        let rain = d.rain.map(|r| format!("  {r:.1} mm")).unwrap_or_default();
        println!(
            "  {}  {:>5.1} / {:>5.1} °C  {:>3.0} %  {}{rain}",
            day_label(d, offset),
            d.temp.min,
            d.temp.max,
            d.pop * 100.0,
            d.conditions.first().map(|w| w.main.as_str()).unwrap_or("-")
        );
    }
}

pub fn print_air_quality(name: &str, aq: &AirQuality) {
    println!("{name}");
    print_air_rows(aq);
}

fn print_air_rows(aq: &AirQuality) {
    let c = &aq.components;
    println!("Calidad del aire: {} ({}/5)", aq.label(), aq.aqi);
    println!("  PM2.5 {:.1}  PM10 {:.1}  O3 {:.1}  NO2 {:.1}", c.pm2_5, c.pm10, c.o3, c.no2);
    println!("  SO2 {:.1}  CO {:.1}  NO {:.1}  NH3 {:.1}  (µg/m³)", c.so2, c.co, c.no, c.nh3);
}

pub fn print_cities(cities: &[CitySearchResult]) {
    for city in cities {
        println!("{city}  ({:.4}, {:.4})", city.lat, city.lon);
    }
}

fn day_label(day: &ForecastItem, offset: FixedOffset) -> String {
    local_time(day.dt, offset, "%a %d")
}

fn local_time(ts: i64, offset: FixedOffset, fmt: &str) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|t| t.with_timezone(&offset).format(fmt).to_string())
        .unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clima_core::model::{FeelsLikeAggregate, TemperatureAggregate};

    #[test]
    fn local_time_applies_offset() {
        // 2024-01-01T12:00:00Z is 07:00 in Medellín.
        let offset = offset_from_seconds(Some(-18_000));
        assert_eq!(local_time(1_704_110_400, offset, "%H:%M"), "07:00");
    }

    fn day(dt: i64) -> ForecastItem {
        ForecastItem {
            dt,
            sunrise: 0,
            sunset: 0,
            temp: TemperatureAggregate { day: 0.0, min: 0.0, max: 0.0, night: 0.0, eve: 0.0, morn: 0.0 },
            feels_like: FeelsLikeAggregate { day: 0.0, night: 0.0, eve: 0.0, morn: 0.0 },
            pressure: 0,
            humidity: 0,
            conditions: vec![],
            wind_speed: 0.0,
            wind_deg: 0,
            clouds: 0,
            pop: 0.0,
            rain: None,
        }
    }

    #[test]
    fn day_labels_use_the_forecast_offset() {
        // First 3-hour step of each Tokyo day: 12:00Z Jan 1, 15:00Z Jan 1, 15:00Z Jan 2.
        let forecast = DailyForecast {
            days: vec![day(1_704_110_400), day(1_704_121_200), day(1_704_207_600)],
            timezone_offset: 32_400,
        };
        let offset = offset_from_seconds(Some(forecast.timezone_offset));

        let labels: Vec<String> = forecast.days.iter().map(|d| day_label(d, offset)).collect();
        assert_eq!(labels, vec!["Mon 01", "Tue 02", "Wed 03"]);
    }

    #[test]
    fn local_time_out_of_range() {
        assert_eq!(local_time(i64::MAX, offset_from_seconds(None), "%H:%M"), "--");
    }
}
