//! Fetch plans.
//!
//! Every sub-field of a group has a fallible task (`Result<T, FetchError>`)
//! and a deterministic fallback. [`settle`] joins the two into a value that
//! is always produced, so a group's plan can only ever complete.

use crate::facts::{
    CoreFacts, CultureFacts, EventFact, FactGroup, FactGroupName, MovieFact, MusicFact, TechFacts,
    WeatherSnapshot,
};
use crate::render::format_thousands;
use crate::session::{BirthDate, Session};
use crate::source::{FactSource, FetchError};
use almanac::Coordinates;
use std::fmt::Display;
use std::future::Future;

/// Weather is queried for London when the session has no location.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates { lat: 51.5, lon: 0.1 };

/// Events kept per date.
pub const MAX_EVENTS: usize = 5;

/// Run a fallible task, substituting `fallback()` on failure.
pub async fn settle<T, E, Fut, Fb>(field: &'static str, task: Fut, fallback: Fb) -> T
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    Fb: FnOnce() -> T,
{
    match task.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(field, error = %e, "fetch failed, using fallback");
            fallback()
        }
    }
}

/// Fetch every sub-field of `group` concurrently and merge the results.
pub async fn fetch_group<F>(source: &F, group: FactGroupName, session: &Session) -> FactGroup
where
    F: FactSource + ?Sized,
{
    match group {
        FactGroupName::Core => FactGroup::Core(fetch_core(source, session).await),
        FactGroupName::Culture => FactGroup::Culture(fetch_culture(source, session).await),
        FactGroupName::Tech => FactGroup::Tech(fetch_tech(source, session).await),
    }
}

pub async fn fetch_core<F>(source: &F, session: &Session) -> CoreFacts
where
    F: FactSource + ?Sized,
{
    let date = session.date;
    let year = date.year();
    let coordinates = session.coordinates().unwrap_or(DEFAULT_COORDINATES);

    let (book_fact, number_fact, weather_data, events_data) = futures::join!(
        settle("bookFact", book_fact(source, year), || fallback::book_fact(year)),
        settle("numberFact", number_fact(source, year), || {
            fallback::number_fact(year)
        }),
        settle(
            "weatherData",
            weather(source, date, coordinates),
            fallback::weather
        ),
        settle(
            "eventsData",
            events(source, date.month(), date.day()),
            fallback::events
        ),
    );

    CoreFacts {
        book_fact,
        number_fact,
        weather_data,
        events_data,
        city: session.city().map(str::to_string),
    }
}

pub async fn fetch_culture<F>(source: &F, session: &Session) -> CultureFacts
where
    F: FactSource + ?Sized,
{
    let year = session.date.year();

    let (movie_data, music_data) = futures::join!(
        settle("movieData", movie(source, year), || fallback::movie(year)),
        settle("musicData", music(source, year), || fallback::music(year)),
    );

    CultureFacts {
        movie_data,
        music_data,
    }
}

pub async fn fetch_tech<F>(source: &F, session: &Session) -> TechFacts
where
    F: FactSource + ?Sized,
{
    let year = session.date.year();

    let (pop_data, science_data) = futures::join!(
        settle("popData", population(source, year), fallback::population),
        settle("scienceData", science(source, year), fallback::science),
    );

    TechFacts {
        pop_data,
        science_data,
    }
}

// ============================================================================
// Sub-field tasks
// ============================================================================

pub async fn book_fact<F: FactSource + ?Sized>(source: &F, year: i32) -> Result<String, FetchError> {
    let book = source.notable_book(year).await?.ok_or(FetchError::Empty)?;
    let author = book.author.unwrap_or_else(|| "Unknown Author".to_string());
    Ok(format!(
        "The most notable book of this year was '{}' by {author}.",
        book.title
    ))
}

pub async fn number_fact<F: FactSource + ?Sized>(
    source: &F,
    year: i32,
) -> Result<String, FetchError> {
    let count = source.books_published(year).await?;
    Ok(format!(
        "The number {year} is tied to the publication of {count} notable cultural records."
    ))
}

pub async fn weather<F: FactSource + ?Sized>(
    source: &F,
    date: BirthDate,
    coordinates: Coordinates,
) -> Result<Option<WeatherSnapshot>, FetchError> {
    let weather = source
        .daily_weather(date, coordinates)
        .await?
        .ok_or(FetchError::Empty)?;
    Ok(Some(weather.into()))
}

pub async fn events<F: FactSource + ?Sized>(
    source: &F,
    month: u32,
    day: u32,
) -> Result<Vec<EventFact>, FetchError> {
    let events: Vec<EventFact> = source
        .events_on(month, day)
        .await?
        .into_iter()
        .take(MAX_EVENTS)
        .map(EventFact::from)
        .collect();

    if events.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(events)
}

pub async fn movie<F: FactSource + ?Sized>(source: &F, year: i32) -> Result<MovieFact, FetchError> {
    let movie = source.popular_movie(year).await?.ok_or(FetchError::Empty)?;
    Ok(MovieFact {
        title: movie.title,
        overview: movie.overview,
        poster: movie.poster_url,
    })
}

pub async fn music<F: FactSource + ?Sized>(source: &F, year: i32) -> Result<MusicFact, FetchError> {
    let release = source.top_release(year).await?.ok_or(FetchError::Empty)?;
    Ok(MusicFact {
        album: release.title,
        artist: release
            .artist
            .unwrap_or_else(|| "Unknown Artist".to_string()),
    })
}

pub async fn population<F: FactSource + ?Sized>(
    source: &F,
    year: i32,
) -> Result<String, FetchError> {
    let population = source
        .world_population(year)
        .await?
        .filter(|p| *p > 0)
        .ok_or(FetchError::Empty)?;
    Ok(format_thousands(population))
}

pub async fn science<F: FactSource + ?Sized>(source: &F, year: i32) -> Result<String, FetchError> {
    let prize = source.physics_prize(year).await?;
    Ok(match prize {
        Some(prize) if !prize.laureates.is_empty() => format!(
            "Nobel Prize in Physics: Awarded to {} for their contribution to science.",
            prize.laureate_names()
        ),
        _ => format!("No Physics Nobel Prize was awarded in {year}, or records are incomplete."),
    })
}

/// Placeholder values, derived from the session only.
pub mod fallback {
    use crate::facts::{EventFact, MovieFact, MusicFact, WeatherSnapshot};

    pub fn book_fact(year: i32) -> String {
        format!(
            "The cultural archive for {year} is encrypted, but it was an important era for literature."
        )
    }

    pub fn number_fact(year: i32) -> String {
        format!("The origin number {year} hides a value we could not decipher.")
    }

    pub fn weather() -> Option<WeatherSnapshot> {
        None
    }

    pub fn events() -> Vec<EventFact> {
        vec![EventFact::new(
            "Historical records are fragmented for this date.",
        )]
    }

    pub fn movie(year: i32) -> MovieFact {
        MovieFact {
            title: format!("Cinema of {year}"),
            overview: "The visual archives for this sector are corrupted. However, it is known \
                       that moving pictures were a dominant art form."
                .to_string(),
            poster: None,
        }
    }

    pub fn music(year: i32) -> MusicFact {
        MusicFact {
            album: format!("Audio Logs of {year}"),
            artist: "Various Artists".to_string(),
        }
    }

    pub fn population() -> String {
        "Global census data unavailable for this era.".to_string()
    }

    pub fn science() -> String {
        "Scientific milestones for this cycle are encrypted.".to_string()
    }
}
