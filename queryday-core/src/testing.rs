//! Testing utilities.
//!
//! This module provides tools for deterministic tests without network access:
//! - `MockSource`, a `FactSource` with scripted per-endpoint outcomes
//! - `TestHarness`, a cache wired to an in-memory store and a mock source
//! - Fixtures for the Paris, 2001-03-15 session

use crate::cache::FactCache;
use crate::session::{BirthDate, Location, Session};
use crate::source::{FactSource, FetchError};
use crate::store::MemoryStore;
use almanac::{
    Book, Coordinates, DailyWeather, HistoricalEvent, Laureate, Movie, NobelPrize, Release,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// The session used throughout the test suite.
pub fn paris_session() -> Session {
    Session::new(BirthDate::from_parts_unchecked(2001, 3, 15))
        .with_location(Location::new("Paris", 48.85, 2.35))
}

/// A fact source that replays scripted outcomes and records every call.
///
/// Clones share the call log. With [`MockSource::yielding`] every call hands
/// control back to the executor once before answering, so fetches joined on
/// one task interleave the way slow network calls do.
#[derive(Debug, Clone)]
pub struct MockSource {
    pub book: Result<Option<Book>, FetchError>,
    pub books_published: Result<u64, FetchError>,
    pub weather: Result<Option<DailyWeather>, FetchError>,
    pub events: Result<Vec<HistoricalEvent>, FetchError>,
    pub movie: Result<Option<Movie>, FetchError>,
    pub release: Result<Option<Release>, FetchError>,
    pub population: Result<Option<u64>, FetchError>,
    pub prize: Result<Option<NobelPrize>, FetchError>,
    pub geocode: Result<Option<Coordinates>, FetchError>,
    yielding: bool,
    calls: Arc<Mutex<Vec<&'static str>>>,
    weather_queries: Arc<Mutex<Vec<Coordinates>>>,
}

impl MockSource {
    /// Plausible answers for 2001-03-15 in Paris.
    pub fn paris_2001() -> Self {
        Self {
            book: Ok(Some(Book {
                title: "Life of Pi".to_string(),
                author: Some("Yann Martel".to_string()),
            })),
            books_published: Ok(5120),
            weather: Ok(Some(DailyWeather {
                max_temp: 12.4,
                min_temp: 4.1,
                precipitation: 1.2,
            })),
            events: Ok(vec![
                HistoricalEvent {
                    text: "The Mir space station begins its final descent.".to_string(),
                    year: Some(2001),
                },
                HistoricalEvent {
                    text: "Ides of March.".to_string(),
                    year: Some(-44),
                },
            ]),
            movie: Ok(Some(Movie {
                title: "Harry Potter and the Philosopher's Stone".to_string(),
                overview: "A boy learns he is a wizard.".to_string(),
                poster_url: Some("https://image.tmdb.org/t/p/w500/hp.jpg".to_string()),
            })),
            release: Ok(Some(Release {
                title: "Discovery".to_string(),
                artist: Some("Daft Punk".to_string()),
            })),
            population: Ok(Some(6_228_000_000)),
            prize: Ok(Some(NobelPrize {
                laureates: vec![
                    laureate("Eric A.", "Cornell"),
                    laureate("Wolfgang", "Ketterle"),
                    laureate("Carl E.", "Wieman"),
                ],
            })),
            geocode: Ok(Some(Coordinates {
                lat: 48.85,
                lon: 2.35,
            })),
            yielding: false,
            calls: Arc::default(),
            weather_queries: Arc::default(),
        }
    }

    /// Every endpoint fails with a network error.
    pub fn failing() -> Self {
        let down = || FetchError::Network("connection refused".to_string());
        Self {
            book: Err(down()),
            books_published: Err(down()),
            weather: Err(down()),
            events: Err(down()),
            movie: Err(down()),
            release: Err(down()),
            population: Err(down()),
            prize: Err(down()),
            geocode: Err(down()),
            yielding: false,
            calls: Arc::default(),
            weather_queries: Arc::default(),
        }
    }

    /// Yield to the executor once inside every call.
    pub fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    pub fn with_book(mut self, outcome: Result<Option<Book>, FetchError>) -> Self {
        self.book = outcome;
        self
    }

    pub fn with_weather(mut self, outcome: Result<Option<DailyWeather>, FetchError>) -> Self {
        self.weather = outcome;
        self
    }

    pub fn with_events(mut self, outcome: Result<Vec<HistoricalEvent>, FetchError>) -> Self {
        self.events = outcome;
        self
    }

    pub fn with_movie(mut self, outcome: Result<Option<Movie>, FetchError>) -> Self {
        self.movie = outcome;
        self
    }

    pub fn with_release(mut self, outcome: Result<Option<Release>, FetchError>) -> Self {
        self.release = outcome;
        self
    }

    pub fn with_population(mut self, outcome: Result<Option<u64>, FetchError>) -> Self {
        self.population = outcome;
        self
    }

    pub fn with_prize(mut self, outcome: Result<Option<NobelPrize>, FetchError>) -> Self {
        self.prize = outcome;
        self
    }

    pub fn with_geocode(mut self, outcome: Result<Option<Coordinates>, FetchError>) -> Self {
        self.geocode = outcome;
        self
    }

    /// Names of the endpoints called so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        lock(&self.calls).iter().filter(|c| **c == endpoint).count()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Coordinates of the most recent weather query.
    pub fn last_weather_query(&self) -> Option<Coordinates> {
        lock(&self.weather_queries).last().copied()
    }

    async fn record(&self, endpoint: &'static str) {
        lock(&self.calls).push(endpoint);
        if self.yielding {
            tokio::task::yield_now().await;
        }
    }
}

fn laureate(first_name: &str, surname: &str) -> Laureate {
    Laureate {
        first_name: first_name.to_string(),
        surname: Some(surname.to_string()),
    }
}

// A panicking test must not poison the log for the rest of the suite.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl FactSource for MockSource {
    async fn notable_book(&self, _year: i32) -> Result<Option<Book>, FetchError> {
        self.record("notable_book").await;
        self.book.clone()
    }

    async fn books_published(&self, _year: i32) -> Result<u64, FetchError> {
        self.record("books_published").await;
        self.books_published.clone()
    }

    async fn daily_weather(
        &self,
        _date: BirthDate,
        coordinates: Coordinates,
    ) -> Result<Option<DailyWeather>, FetchError> {
        self.record("daily_weather").await;
        lock(&self.weather_queries).push(coordinates);
        self.weather.clone()
    }

    async fn events_on(&self, _month: u32, _day: u32) -> Result<Vec<HistoricalEvent>, FetchError> {
        self.record("events_on").await;
        self.events.clone()
    }

    async fn popular_movie(&self, _year: i32) -> Result<Option<Movie>, FetchError> {
        self.record("popular_movie").await;
        self.movie.clone()
    }

    async fn top_release(&self, _year: i32) -> Result<Option<Release>, FetchError> {
        self.record("top_release").await;
        self.release.clone()
    }

    async fn world_population(&self, _year: i32) -> Result<Option<u64>, FetchError> {
        self.record("world_population").await;
        self.population.clone()
    }

    async fn physics_prize(&self, _year: i32) -> Result<Option<NobelPrize>, FetchError> {
        self.record("physics_prize").await;
        self.prize.clone()
    }

    async fn geocode(&self, _city: &str) -> Result<Option<Coordinates>, FetchError> {
        self.record("geocode").await;
        self.geocode.clone()
    }
}

/// A cache over an in-memory store and a scripted source.
///
/// The harness keeps clones of both so tests can inspect writes and calls.
pub struct TestHarness {
    pub cache: FactCache<MemoryStore, MockSource>,
    pub store: MemoryStore,
    pub source: MockSource,
}

impl TestHarness {
    pub fn new(source: MockSource) -> Self {
        let store = MemoryStore::new();
        Self {
            cache: FactCache::new(store.clone(), source.clone()),
            store,
            source,
        }
    }

    /// A harness with the Paris session already started.
    pub async fn with_paris_session(source: MockSource) -> Self {
        let harness = Self::new(source);
        if let Err(e) = harness.cache.start_session(paris_session()).await {
            panic!("failed to start fixture session: {e}");
        }
        harness
    }
}
