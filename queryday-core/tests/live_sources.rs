//! Integration tests that call the real upstream services.
//!
//! Run with: `cargo test -p queryday-core --test live_sources -- --ignored`
//!
//! These are marked #[ignore] by default to avoid:
//! - Hammering public APIs from CI
//! - Test failures when offline
//! - Slow test runs (some archives take seconds to answer)

use queryday_core::facts::FactGroupName;
use queryday_core::tasks::fallback;
use queryday_core::{FactCache, MemoryStore, QueryDayConfig, SessionRequest};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if the TMDB key is available
fn has_tmdb_key() -> bool {
    std::env::var("TMDB_API_KEY").is_ok()
}

fn live_cache() -> FactCache<MemoryStore, almanac::Almanac> {
    let config = QueryDayConfig::from_env().expect("Failed to read config");
    let almanac = config.build_almanac().expect("Failed to build client");
    FactCache::new(MemoryStore::new(), almanac)
}

#[tokio::test]
#[ignore] // Run with: cargo test -p queryday-core --test live_sources -- --ignored
async fn test_live_paris_session() {
    setup();
    let cache = live_cache();

    let request = SessionRequest::new(2001, 3, 15).with_city("Paris");
    let session = cache
        .establish_session(&request)
        .await
        .expect("Failed to geocode Paris");

    let coordinates = session.coordinates().expect("Paris has coordinates");
    assert!((coordinates.lat - 48.85).abs() < 0.5);
    assert!((coordinates.lon - 2.35).abs() < 0.5);

    let core = cache.ensure_core(&session).await.expect("core");
    println!("Book: {}", core.book_fact);
    println!("Number: {}", core.number_fact);
    println!("Weather: {:?}", core.weather_data);
    assert!(!core.events_data.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_live_tech_group() {
    setup();
    let cache = live_cache();
    let session = cache
        .establish_session(&SessionRequest::new(2001, 3, 15))
        .await
        .expect("session");

    let group = cache
        .ensure_group(FactGroupName::Tech, &session)
        .await
        .expect("tech");
    let tech = group.as_tech().expect("tech facts");
    println!("Population: {}", tech.pop_data);
    println!("Science: {}", tech.science_data);
    assert!(tech.science_data.contains("Ketterle") || tech.science_data == fallback::science());
}

#[tokio::test]
#[ignore]
async fn test_live_movie_requires_key() {
    setup();
    if !has_tmdb_key() {
        eprintln!("Skipping test: TMDB_API_KEY not set");
        return;
    }

    let cache = live_cache();
    let movie = cache
        .source()
        .popular_movie(2001)
        .await
        .expect("TMDB request failed");
    let movie = movie.expect("2001 has movies");
    println!("Movie: {} ({:?})", movie.title, movie.poster_url);
    assert!(!movie.title.is_empty());
}
