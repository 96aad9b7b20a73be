//! "Use my location": a pluggable source of the user's position.

use async_trait::async_trait;

use crate::{Config, error::GeolocationError, model::Coordinates};

/// Something that can report where the user is.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Ask `source` for the user's position.
///
/// No source means the capability is missing. Errors from the source are
/// passed through untouched; nothing is cached or retried.
pub async fn user_location(
    source: Option<&dyn LocationSource>,
) -> Result<Coordinates, GeolocationError> {
    let source = source.ok_or(GeolocationError::NotSupported)?;
    source.current_position().await
}

/// Position fixed in configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl FixedLocation {
    pub fn from_config(config: &Config) -> Option<Self> {
        config.location.map(Self)
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}
