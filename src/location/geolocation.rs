use crate::location::error::GeolocationError;
use crate::types::Coordinate;
use async_trait::async_trait;

/// The platform's "where am I" service.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Always reports the same position, e.g. one given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

/// For platforms without a geolocation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}
