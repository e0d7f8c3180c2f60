//! The fetch seam between the cache and the upstream services.

use crate::session::BirthDate;
use almanac::{
    Almanac, Book, Coordinates, DailyWeather, HistoricalEvent, Movie, NobelPrize, Release,
};
use async_trait::async_trait;
use thiserror::Error;

/// Why an upstream query produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("no usable data")]
    Empty,

    #[error("source not configured: {0}")]
    Unconfigured(String),
}

impl From<almanac::Error> for FetchError {
    fn from(err: almanac::Error) -> Self {
        match err {
            almanac::Error::NoApiKey => FetchError::Unconfigured("TMDB API key".to_string()),
            almanac::Error::Network(message) => FetchError::Network(message),
            almanac::Error::Api { status, .. } => FetchError::Status(status),
            almanac::Error::Parse(message) => FetchError::Parse(message),
            almanac::Error::Config(message) => FetchError::Unconfigured(message),
        }
    }
}

/// Upstream queries the fetch plans are built from.
///
/// `Ok(None)` / an empty list means the service answered without usable data.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn notable_book(&self, year: i32) -> Result<Option<Book>, FetchError>;

    async fn books_published(&self, year: i32) -> Result<u64, FetchError>;

    async fn daily_weather(
        &self,
        date: BirthDate,
        coordinates: Coordinates,
    ) -> Result<Option<DailyWeather>, FetchError>;

    async fn events_on(&self, month: u32, day: u32) -> Result<Vec<HistoricalEvent>, FetchError>;

    async fn popular_movie(&self, year: i32) -> Result<Option<Movie>, FetchError>;

    async fn top_release(&self, year: i32) -> Result<Option<Release>, FetchError>;

    async fn world_population(&self, year: i32) -> Result<Option<u64>, FetchError>;

    async fn physics_prize(&self, year: i32) -> Result<Option<NobelPrize>, FetchError>;

    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, FetchError>;
}

#[async_trait]
impl FactSource for Almanac {
    async fn notable_book(&self, year: i32) -> Result<Option<Book>, FetchError> {
        Ok(Almanac::notable_book(self, year).await?)
    }

    async fn books_published(&self, year: i32) -> Result<u64, FetchError> {
        Ok(Almanac::books_published(self, year).await?)
    }

    async fn daily_weather(
        &self,
        date: BirthDate,
        coordinates: Coordinates,
    ) -> Result<Option<DailyWeather>, FetchError> {
        Ok(Almanac::daily_weather(
            self,
            date.year(),
            date.month(),
            date.day(),
            coordinates.lat,
            coordinates.lon,
        )
        .await?)
    }

    async fn events_on(&self, month: u32, day: u32) -> Result<Vec<HistoricalEvent>, FetchError> {
        Ok(Almanac::events_on(self, month, day).await?)
    }

    async fn popular_movie(&self, year: i32) -> Result<Option<Movie>, FetchError> {
        Ok(Almanac::popular_movie(self, year).await?)
    }

    async fn top_release(&self, year: i32) -> Result<Option<Release>, FetchError> {
        Ok(Almanac::top_release(self, year).await?)
    }

    async fn world_population(&self, year: i32) -> Result<Option<u64>, FetchError> {
        Ok(Almanac::world_population(self, year).await?)
    }

    async fn physics_prize(&self, year: i32) -> Result<Option<NobelPrize>, FetchError> {
        Ok(Almanac::physics_prize(self, year).await?)
    }

    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, FetchError> {
        Ok(Almanac::geocode(self, city).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_almanac_error_conversion() {
        assert_eq!(
            FetchError::from(almanac::Error::NoApiKey),
            FetchError::Unconfigured("TMDB API key".to_string())
        );
        assert_eq!(
            FetchError::from(almanac::Error::Api {
                status: 503,
                message: "maintenance".to_string()
            }),
            FetchError::Status(503)
        );
        assert!(matches!(
            FetchError::from(almanac::Error::Network("reset".to_string())),
            FetchError::Network(_)
        ));
    }
}
