//! Minimal client for the public trivia APIs behind QueryDay.
//!
//! This crate provides one typed query per upstream service:
//! - OpenLibrary search (notable book, publication counts)
//! - Open-Meteo historical archive (daily weather)
//! - Wikimedia "on this day" feed (historical events)
//! - TMDB discover (most popular film, needs an API key)
//! - MusicBrainz release search
//! - World Bank population indicator
//! - Nobel Prize API (physics laureates)
//! - Nominatim geocoding
//!
//! Every query returns `Ok(None)` (or an empty list) when the service answered
//! but had nothing usable, and `Err` when the request itself failed.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const OPEN_LIBRARY_SEARCH: &str = "https://openlibrary.org/search.json";
const OPEN_METEO_ARCHIVE: &str = "https://archive-api.open-meteo.com/v1/archive";
const WIKIMEDIA_ON_THIS_DAY: &str = "https://en.wikipedia.org/api/rest_v1/feed/onthisday/events";
const TMDB_DISCOVER: &str = "https://api.themoviedb.org/3/discover/movie";
const TMDB_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const MUSICBRAINZ_RELEASES: &str = "https://musicbrainz.org/ws/2/release";
const WORLD_BANK_POPULATION: &str =
    "https://api.worldbank.org/v2/country/WLD/indicator/SP.POP.TOTL";
const NOBEL_PRIZES: &str = "https://api.nobelprize.org/v1/prize.json";
const NOMINATIM_SEARCH: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim and MusicBrainz reject anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "QueryDay/4.0 (Educational Project)";

/// Errors that can occur when querying an upstream service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("TMDB API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Transport settings for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Base URLs of every upstream service.
///
/// Overridable so the client can be pointed at mirrors or local fakes.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub open_library_search: String,
    pub open_meteo_archive: String,
    pub wikimedia_on_this_day: String,
    pub tmdb_discover: String,
    pub tmdb_poster_base: String,
    pub musicbrainz_releases: String,
    pub world_bank_population: String,
    pub nobel_prizes: String,
    pub nominatim_search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            open_library_search: OPEN_LIBRARY_SEARCH.to_string(),
            open_meteo_archive: OPEN_METEO_ARCHIVE.to_string(),
            wikimedia_on_this_day: WIKIMEDIA_ON_THIS_DAY.to_string(),
            tmdb_discover: TMDB_DISCOVER.to_string(),
            tmdb_poster_base: TMDB_POSTER_BASE.to_string(),
            musicbrainz_releases: MUSICBRAINZ_RELEASES.to_string(),
            world_bank_population: WORLD_BANK_POPULATION.to_string(),
            nobel_prizes: NOBEL_PRIZES.to_string(),
            nominatim_search: NOMINATIM_SEARCH.to_string(),
        }
    }
}

/// Trivia API client.
#[derive(Clone)]
pub struct Almanac {
    client: reqwest::Client,
    endpoints: Endpoints,
    tmdb_api_key: Option<String>,
}

impl Almanac {
    /// Create a client with default transport settings.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(ClientOptions::default())
    }

    /// Create a client with custom transport settings.
    pub fn with_options(options: ClientOptions) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints: Endpoints::default(),
            tmdb_api_key: None,
        })
    }

    /// Create a client, picking up the TMDB key from `TMDB_API_KEY` if set.
    pub fn from_env() -> Result<Self, Error> {
        let almanac = Self::new()?;
        match std::env::var("TMDB_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(almanac.with_tmdb_api_key(key)),
            _ => Ok(almanac),
        }
    }

    /// Set the TMDB API key used by [`Almanac::popular_movie`].
    pub fn with_tmdb_api_key(mut self, key: impl Into<String>) -> Self {
        self.tmdb_api_key = Some(key.into());
        self
    }

    /// Replace the upstream base URLs.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn has_tmdb_api_key(&self) -> bool {
        self.tmdb_api_key.is_some()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Highest-rated book first published in `year`.
    pub async fn notable_book(&self, year: i32) -> Result<Option<Book>, Error> {
        let search: ApiBookSearch = self
            .get_json(
                &self.endpoints.open_library_search,
                &[
                    ("q", format!("first_publish_year:{year}")),
                    ("sort", "rating".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(book_from_search(search))
    }

    /// Number of OpenLibrary records first published in `year`.
    pub async fn books_published(&self, year: i32) -> Result<u64, Error> {
        let search: ApiBookSearch = self
            .get_json(
                &self.endpoints.open_library_search,
                &[
                    ("q", format!("first_publish_year:{year}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(search.num_found.unwrap_or(0))
    }

    /// Archived daily weather for a date and coordinate.
    pub async fn daily_weather(
        &self,
        year: i32,
        month: u32,
        day: u32,
        lat: f64,
        lon: f64,
    ) -> Result<Option<DailyWeather>, Error> {
        let date = format!("{year:04}-{month:02}-{day:02}");
        let archive: ApiArchive = self
            .get_json(
                &self.endpoints.open_meteo_archive,
                &[
                    ("latitude", lat.to_string()),
                    ("longitude", lon.to_string()),
                    ("start_date", date.clone()),
                    ("end_date", date),
                    (
                        "daily",
                        "temperature_2m_max,temperature_2m_min,precipitation_sum".to_string(),
                    ),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        Ok(weather_from_archive(archive))
    }

    /// Events that happened on this month/day across history.
    pub async fn events_on(&self, month: u32, day: u32) -> Result<Vec<HistoricalEvent>, Error> {
        let url = format!("{}/{month}/{day}", self.endpoints.wikimedia_on_this_day);
        let feed: ApiOnThisDay = self.get_json(&url, &[]).await?;

        Ok(feed
            .events
            .unwrap_or_default()
            .into_iter()
            .map(|e| HistoricalEvent {
                text: e.text,
                year: e.year,
            })
            .collect())
    }

    /// Most popular film released in `year`.
    pub async fn popular_movie(&self, year: i32) -> Result<Option<Movie>, Error> {
        let api_key = self.tmdb_api_key.as_ref().ok_or(Error::NoApiKey)?;
        let discover: ApiDiscover = self
            .get_json(
                &self.endpoints.tmdb_discover,
                &[
                    ("primary_release_year", year.to_string()),
                    ("sort_by", "popularity.desc".to_string()),
                    ("api_key", api_key.clone()),
                ],
            )
            .await?;

        Ok(discover.results.into_iter().next().map(|m| Movie {
            title: m.title,
            overview: m.overview.unwrap_or_default(),
            poster_url: m
                .poster_path
                .map(|path| format!("{}{path}", self.endpoints.tmdb_poster_base)),
        }))
    }

    /// First music release MusicBrainz lists for `year`.
    pub async fn top_release(&self, year: i32) -> Result<Option<Release>, Error> {
        let search: ApiReleaseSearch = self
            .get_json(
                &self.endpoints.musicbrainz_releases,
                &[
                    ("query", format!("date:{year}")),
                    ("fmt", "json".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(search.releases.into_iter().next().map(|r| Release {
            title: r.title,
            artist: r.artist_credit.into_iter().next().map(|c| c.name),
        }))
    }

    /// Total world population recorded by the World Bank for `year`.
    pub async fn world_population(&self, year: i32) -> Result<Option<u64>, Error> {
        let payload: serde_json::Value = self
            .get_json(
                &self.endpoints.world_bank_population,
                &[("date", year.to_string()), ("format", "json".to_string())],
            )
            .await?;

        Ok(population_from_payload(&payload))
    }

    /// Nobel Prize in Physics awarded in `year`.
    pub async fn physics_prize(&self, year: i32) -> Result<Option<NobelPrize>, Error> {
        let response: ApiNobelResponse = self
            .get_json(
                &self.endpoints.nobel_prizes,
                &[
                    ("year", year.to_string()),
                    ("category", "physics".to_string()),
                ],
            )
            .await?;

        Ok(response.prizes.into_iter().next().map(|p| NobelPrize {
            laureates: p
                .laureates
                .unwrap_or_default()
                .into_iter()
                .map(|l| Laureate {
                    first_name: l.firstname,
                    surname: l.surname,
                })
                .collect(),
        }))
    }

    /// Resolve a free-form city name to coordinates.
    pub async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, Error> {
        let places: Vec<ApiPlace> = self
            .get_json(
                &self.endpoints.nominatim_search,
                &[("format", "json".to_string()), ("q", city.to_string())],
            )
            .await?;

        coordinates_from_places(places)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        tracing::debug!(url, "upstream request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A book record from OpenLibrary.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: Option<String>,
}

/// One day of archived weather.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyWeather {
    /// Maximum temperature in °C.
    pub max_temp: f64,
    /// Minimum temperature in °C.
    pub min_temp: f64,
    /// Total precipitation in mm.
    pub precipitation: f64,
}

/// An entry of the "on this day" feed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalEvent {
    pub text: String,
    pub year: Option<i32>,
}

/// A film from TMDB.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    pub overview: String,
    pub poster_url: Option<String>,
}

/// A music release from MusicBrainz.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub title: String,
    pub artist: Option<String>,
}

/// A Nobel Prize and its laureates.
///
/// Years where the prize was withheld come back with no laureates.
#[derive(Debug, Clone, PartialEq)]
pub struct NobelPrize {
    pub laureates: Vec<Laureate>,
}

impl NobelPrize {
    /// Laureate display names, comma separated.
    pub fn laureate_names(&self) -> String {
        self.laureates
            .iter()
            .map(Laureate::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Laureate {
    pub first_name: String,
    pub surname: Option<String>,
}

impl Laureate {
    pub fn display_name(&self) -> String {
        match &self.surname {
            Some(surname) => format!("{} {surname}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// A geocoded coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiBookSearch {
    #[serde(rename = "numFound")]
    num_found: Option<u64>,
    #[serde(default)]
    docs: Vec<ApiBookDoc>,
}

#[derive(Debug, Deserialize)]
struct ApiBookDoc {
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiArchive {
    daily: Option<ApiDaily>,
}

#[derive(Debug, Deserialize)]
struct ApiDaily {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ApiOnThisDay {
    events: Option<Vec<ApiEvent>>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    text: String,
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ApiDiscover {
    #[serde(default)]
    results: Vec<ApiMovie>,
}

#[derive(Debug, Deserialize)]
struct ApiMovie {
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiReleaseSearch {
    #[serde(default)]
    releases: Vec<ApiRelease>,
}

#[derive(Debug, Deserialize)]
struct ApiRelease {
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ApiArtistCredit>,
}

#[derive(Debug, Deserialize)]
struct ApiArtistCredit {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiNobelResponse {
    #[serde(default)]
    prizes: Vec<ApiPrize>,
}

#[derive(Debug, Deserialize)]
struct ApiPrize {
    laureates: Option<Vec<ApiLaureate>>,
}

#[derive(Debug, Deserialize)]
struct ApiLaureate {
    firstname: String,
    surname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPlace {
    lat: String,
    lon: String,
}

fn book_from_search(search: ApiBookSearch) -> Option<Book> {
    search.docs.into_iter().next().map(|doc| Book {
        title: doc.title,
        author: doc.author_name.into_iter().next(),
    })
}

fn weather_from_archive(archive: ApiArchive) -> Option<DailyWeather> {
    let daily = archive.daily?;
    Some(DailyWeather {
        max_temp: daily.temperature_2m_max.first().copied().flatten()?,
        min_temp: daily.temperature_2m_min.first().copied().flatten()?,
        precipitation: daily.precipitation_sum.first().copied().flatten()?,
    })
}

/// The World Bank answers `[page_info, [observation, ...]]`, or a single
/// message object when the query is rejected.
fn population_from_payload(payload: &serde_json::Value) -> Option<u64> {
    let observations = payload.as_array()?.get(1)?.as_array()?;
    let value = observations.first()?.get("value")?.as_f64()?;
    if value > 0.0 {
        Some(value.round() as u64)
    } else {
        None
    }
}

fn coordinates_from_places(places: Vec<ApiPlace>) -> Result<Option<Coordinates>, Error> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("latitude '{}': {e}", place.lat)))?;
    let lon = place
        .lon
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("longitude '{}': {e}", place.lon)))?;

    Ok(Some(Coordinates { lat, lon }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = Almanac::new().expect("client should build");
        assert!(!client.has_tmdb_api_key());
        assert_eq!(client.endpoints().nominatim_search, NOMINATIM_SEARCH);
    }

    #[test]
    fn test_client_with_key_and_endpoints() {
        let endpoints = Endpoints {
            nobel_prizes: "http://localhost:9000/prize.json".to_string(),
            ..Endpoints::default()
        };
        let client = Almanac::new()
            .expect("client should build")
            .with_tmdb_api_key("secret")
            .with_endpoints(endpoints);

        assert!(client.has_tmdb_api_key());
        assert_eq!(
            client.endpoints().nobel_prizes,
            "http://localhost:9000/prize.json"
        );
    }

    #[tokio::test]
    async fn test_popular_movie_requires_key() {
        let client = Almanac::new().expect("client should build");
        let result = client.popular_movie(2001).await;
        assert!(matches!(result, Err(Error::NoApiKey)));
    }

    #[test]
    fn test_book_from_search() {
        let search: ApiBookSearch = serde_json::from_value(json!({
            "numFound": 5120,
            "docs": [{ "title": "Life of Pi", "author_name": ["Yann Martel"] }]
        }))
        .unwrap();

        assert_eq!(search.num_found, Some(5120));
        let book = book_from_search(search).unwrap();
        assert_eq!(book.title, "Life of Pi");
        assert_eq!(book.author.as_deref(), Some("Yann Martel"));
    }

    #[test]
    fn test_book_without_author() {
        let search: ApiBookSearch =
            serde_json::from_value(json!({ "docs": [{ "title": "Anonymous Verse" }] })).unwrap();

        let book = book_from_search(search).unwrap();
        assert!(book.author.is_none());
    }

    #[test]
    fn test_weather_from_archive() {
        let archive: ApiArchive = serde_json::from_value(json!({
            "daily": {
                "time": ["2001-03-15"],
                "temperature_2m_max": [12.4],
                "temperature_2m_min": [4.1],
                "precipitation_sum": [0.8]
            }
        }))
        .unwrap();

        let weather = weather_from_archive(archive).unwrap();
        assert_eq!(weather.max_temp, 12.4);
        assert_eq!(weather.min_temp, 4.1);
        assert_eq!(weather.precipitation, 0.8);
    }

    #[test]
    fn test_weather_with_null_values() {
        let archive: ApiArchive = serde_json::from_value(json!({
            "daily": {
                "temperature_2m_max": [null],
                "temperature_2m_min": [3.0],
                "precipitation_sum": [0.0]
            }
        }))
        .unwrap();

        assert!(weather_from_archive(archive).is_none());
    }

    #[test]
    fn test_population_from_payload() {
        let payload = json!([
            { "page": 1, "pages": 1, "per_page": 50, "total": 1 },
            [{ "indicator": { "id": "SP.POP.TOTL" }, "date": "2001", "value": 6_228_000_000u64 }]
        ]);
        assert_eq!(population_from_payload(&payload), Some(6_228_000_000));
    }

    #[test]
    fn test_population_rejected_query() {
        let payload = json!([{ "message": [{ "id": "120", "value": "Invalid value" }] }]);
        assert_eq!(population_from_payload(&payload), None);

        let null_value = json!([{ "page": 1 }, [{ "value": null }]]);
        assert_eq!(population_from_payload(&null_value), None);
    }

    #[test]
    fn test_coordinates_from_places() {
        let places: Vec<ApiPlace> = serde_json::from_value(json!([
            { "lat": "48.8534951", "lon": "2.3483915", "display_name": "Paris" }
        ]))
        .unwrap();

        let coords = coordinates_from_places(places).unwrap().unwrap();
        assert!((coords.lat - 48.853).abs() < 0.01);
        assert!((coords.lon - 2.348).abs() < 0.01);
    }

    #[test]
    fn test_coordinates_empty_and_malformed() {
        assert_eq!(coordinates_from_places(vec![]).unwrap(), None);

        let bad = vec![ApiPlace {
            lat: "north".to_string(),
            lon: "2.0".to_string(),
        }];
        assert!(matches!(coordinates_from_places(bad), Err(Error::Parse(_))));
    }

    #[test]
    fn test_release_artist_credit() {
        let search: ApiReleaseSearch = serde_json::from_value(json!({
            "releases": [{
                "title": "Discovery",
                "artist-credit": [{ "name": "Daft Punk" }]
            }]
        }))
        .unwrap();

        let release = &search.releases[0];
        assert_eq!(release.title, "Discovery");
        assert_eq!(release.artist_credit[0].name, "Daft Punk");
    }

    #[test]
    fn test_laureate_names() {
        let prize = NobelPrize {
            laureates: vec![
                Laureate {
                    first_name: "Eric A.".to_string(),
                    surname: Some("Cornell".to_string()),
                },
                Laureate {
                    first_name: "Wolfgang".to_string(),
                    surname: Some("Ketterle".to_string()),
                },
                Laureate {
                    first_name: "CERN".to_string(),
                    surname: None,
                },
            ],
        };

        assert_eq!(prize.laureate_names(), "Eric A. Cornell, Wolfgang Ketterle, CERN");
    }
}
