use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use clima_core::{
    CitySearch, CitySearchResult, Config, Coordinates, FixedLocation, HomeCity, LocationSource,
    WeatherLoader, WeatherProvider, error::LOCATION_FAILED_MESSAGE, provider_from_config,
    search::MIN_QUERY_CHARS, user_location,
};
use inquire::{Confirm, InquireError, Password, Select};

use crate::output;

/// Upper bound on waiting for a search the provider never answers.
const SEARCH_WAIT: Duration = Duration::from_secs(15);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "Weather widget in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where to look. Without flags the configured home city is used.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name, resolved with the geocoding endpoint.
    #[arg(long, conflicts_with_all = ["lat", "here"])]
    city: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Use the location stored in the config file.
    #[arg(long, conflicts_with = "lat")]
    here: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and language.
    Configure,

    /// Current conditions, next hours, daily forecast and air quality.
    Show {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Seven-day forecast.
    Forecast {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Air quality index and pollutant concentrations.
    Air {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Look up cities by name.
    Search {
        query: String,

        /// Choose one of the matches and show its weather.
        #[arg(long)]
        pick: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { location } => show(&config, &location).await,
            Command::Forecast { location } => {
                let provider = provider_from_config(&config);
                let (at, name) = resolve(&config, provider.as_ref(), &location).await?;
                let days = provider.forecast(at).await?;
                output::print_daily(&name, &days);
                Ok(())
            }
            Command::Air { location } => {
                let provider = provider_from_config(&config);
                let (at, name) = resolve(&config, provider.as_ref(), &location).await?;
                let aq = provider.air_quality(at).await?;
                output::print_air_quality(&name, &aq);
                Ok(())
            }
            Command::Search { query, pick } => search(&config, query, pick).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let language = Select::new("Language for condition descriptions:", vec!["es", "en"])
        .prompt()
        .context("Failed to read language")?;
    config.language = Some(language.to_string());

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(config: &Config, args: &LocationArgs) -> anyhow::Result<()> {
    let provider = provider_from_config(config);
    let loader = WeatherLoader::new(Arc::clone(&provider), config.home_city());

    if let Some(query) = &args.city {
        let city = first_match(provider.as_ref(), query).await?;
        loader.select_city(&city).await;
    } else if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let fixed = FixedLocation(Coordinates::new(lat, lon));
        loader.use_current_location(Some(&fixed as &dyn LocationSource)).await;
    } else if args.here {
        let fixed = FixedLocation::from_config(config);
        loader
            .use_current_location(fixed.as_ref().map(|f| f as &dyn LocationSource))
            .await;
    } else {
        loader.load_default().await;
    }

    output::print_dashboard(&loader.state());
    Ok(())
}

async fn search(config: &Config, query: String, pick: bool) -> anyhow::Result<()> {
    if query.chars().count() < MIN_QUERY_CHARS {
        bail!("Type at least {MIN_QUERY_CHARS} characters to search");
    }

    let provider = provider_from_config(config);
    let mut search = CitySearch::new(Arc::clone(&provider));
    let mut rx = search.subscribe();
    search.set_query(query);

    let state = tokio::time::timeout(SEARCH_WAIT, rx.wait_for(|s| s.completed > 0))
        .await
        .context("City search timed out")?
        .context("City search stopped unexpectedly")?
        .clone();

    if state.results.is_empty() {
        println!("Sin resultados para \"{}\".", state.query);
        return Ok(());
    }

    if !pick {
        output::print_cities(&state.results);
        return Ok(());
    }

    let city = Select::new("Ciudad:", state.results)
        .prompt()
        .context("No city selected")?;

    let loader = WeatherLoader::new(provider, config.home_city());
    loader.select_city(&city).await;
    output::print_dashboard(&loader.state());

    let answer = Confirm::new("¿Guardar como ciudad principal?")
        .with_default(false)
        .prompt();
    if let Some(path) = save_as_home(config, &city, answer)? {
        println!("Ciudad principal guardada en {}", path.display());
    }
    Ok(())
}

/// Persist `city` as the home city when the user agreed.
fn save_as_home(
    config: &Config,
    city: &CitySearchResult,
    answer: Result<bool, InquireError>,
) -> anyhow::Result<Option<PathBuf>> {
    if !answer.context("Failed to read confirmation")? {
        return Ok(None);
    }

    let mut config = config.clone();
    config.home = Some(HomeCity { name: city.name.clone(), lat: city.lat, lon: city.lon });
    Ok(Some(config.save()?))
}

async fn first_match(
    provider: &dyn WeatherProvider,
    query: &str,
) -> anyhow::Result<CitySearchResult> {
    provider
        .search_cities(query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No city matches \"{query}\""))
}

/// Coordinates and display name for the non-dashboard commands.
async fn resolve(
    config: &Config,
    provider: &dyn WeatherProvider,
    args: &LocationArgs,
) -> anyhow::Result<(Coordinates, String)> {
    if let Some(query) = &args.city {
        let city = first_match(provider, query).await?;
        return Ok((city.coordinates(), city.to_string()));
    }

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        return Ok((Coordinates::new(lat, lon), format!("{lat:.4}, {lon:.4}")));
    }

    if args.here {
        let fixed = FixedLocation::from_config(config);
        let at = user_location(fixed.as_ref().map(|f| f as &dyn LocationSource))
            .await
            .map_err(|e| anyhow!("{LOCATION_FAILED_MESSAGE} ({e})"))?;
        return Ok((at, format!("{:.4}, {:.4}", at.lat, at.lon)));
    }

    let home = config.home_city();
    Ok((home.coordinates(), home.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["clima", "show", "--lat", "6.24", "--lon", "-75.58"]).unwrap();
        match cli.command {
            Command::Show { location } => {
                assert_eq!(location.lat, Some(6.24));
                assert_eq!(location.lon, Some(-75.58));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["clima", "forecast", "--lat", "6.24"]).is_err());
    }

    #[test]
    fn city_conflicts_with_here() {
        assert!(Cli::try_parse_from(["clima", "air", "--city", "Cali", "--here"]).is_err());
    }

    #[test]
    fn search_pick_flag() {
        let cli = Cli::try_parse_from(["clima", "search", "Medellín", "--pick"]).unwrap();
        assert!(matches!(cli.command, Command::Search { pick: true, .. }));
    }

    fn medellin() -> CitySearchResult {
        CitySearchResult {
            name: "Medellín".into(),
            country: "CO".into(),
            state: Some("Antioquia".into()),
            lat: 6.2442,
            lon: -75.5812,
        }
    }

    #[test]
    fn unreadable_confirmation_is_an_error() {
        let err = save_as_home(&Config::default(), &medellin(), Err(InquireError::NotTTY))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read confirmation"));
    }

    #[test]
    fn declined_confirmation_saves_nothing() {
        let saved = save_as_home(&Config::default(), &medellin(), Ok(false)).unwrap();
        assert!(saved.is_none());
    }

    #[tokio::test]
    async fn resolve_defaults_to_home_city() {
        let config = Config::default();
        let provider = provider_from_config(&config);
        let args = LocationArgs { city: None, lat: None, lon: None, here: false };

        let (at, name) = resolve(&config, provider.as_ref(), &args).await.unwrap();
        assert_eq!(at, Coordinates::new(6.2442, -75.5812));
        assert_eq!(name, "Medellín");
    }

    #[tokio::test]
    async fn resolve_here_without_location_fails() {
        let config = Config::default();
        let provider = provider_from_config(&config);
        let args = LocationArgs { city: None, lat: None, lon: None, here: true };

        let err = resolve(&config, provider.as_ref(), &args).await.unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }
}
