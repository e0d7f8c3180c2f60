//! Sessions: the birth date (and optional place) every fact is derived from.
//!
//! A session is a plain value passed to every cache call. Two sessions are the
//! same session when their [`SessionId`]s match.

use crate::source::{FactSource, FetchError};
use almanac::Coordinates;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Earliest accepted birth year.
pub const MIN_YEAR: i32 = 1900;

const SESSION_NAMESPACE: Uuid = Uuid::from_u128(0x5c2e_91d4_0a6b_4f3e_9d1a_7b8c_2e4f_6a01);

/// The calendar year on the local clock.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Error type for birth date validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Year {year} is outside {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("Month {0} is not between 1 and 12")]
    InvalidMonth(u32),

    #[error("Day {day} does not exist in {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },

    #[error("Invalid date notation: {0} (expected YYYY-MM-DD)")]
    InvalidNotation(String),
}

/// A validated Gregorian birth date.
///
/// Decoding runs the same checks as [`BirthDate::new`], so a tampered record
/// cannot carry an impossible date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDate")]
pub struct BirthDate {
    year: i32,
    month: u32,
    day: u32,
}

#[derive(Deserialize)]
struct RawDate {
    year: i32,
    month: u32,
    day: u32,
}

impl TryFrom<RawDate> for BirthDate {
    type Error = DateError;

    fn try_from(raw: RawDate) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month, raw.day)
    }
}

impl BirthDate {
    /// Validate a date against the current calendar year.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        Self::validate(year, month, day, current_year())
    }

    /// Validate a date against an explicit "current" year.
    pub fn validate(year: i32, month: u32, day: u32, current_year: i32) -> Result<Self, DateError> {
        if !(MIN_YEAR..=current_year).contains(&year) {
            return Err(DateError::YearOutOfRange {
                year,
                min: MIN_YEAR,
                max: current_year,
            });
        }

        if !(1..=12).contains(&month) {
            return Err(DateError::InvalidMonth(month));
        }

        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(DateError::InvalidDay { year, month, day });
        }

        Ok(Self { year, month, day })
    }

    /// Build a date known to be valid at compile time (fixtures).
    pub(crate) const fn from_parts_unchecked(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Month/day/year, as shown in page headers.
    pub fn us_format(&self) -> String {
        format!("{}/{}/{}", self.month, self.day, self.year)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BirthDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DateError::InvalidNotation(s.to_string());
        let mut parts = s.trim().splitn(3, '-');

        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;

        Self::new(year, month, day)
    }
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(city: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            city: city.into(),
            lat,
            lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Deterministic identity of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One birth date plus an optional location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub date: BirthDate,
    pub location: Option<Location>,
}

impl Session {
    pub fn new(date: BirthDate) -> Self {
        Self {
            date,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// UUID v5 over the canonical date and location text.
    ///
    /// Coordinates are rounded to four decimals so a JSON round trip never
    /// changes the identity.
    pub fn id(&self) -> SessionId {
        let canonical = match &self.location {
            Some(loc) => format!(
                "{}|{}|{:.4}|{:.4}",
                self.date,
                loc.city.trim().to_lowercase(),
                loc.lat,
                loc.lon
            ),
            None => format!("{}|-", self.date),
        };
        SessionId(Uuid::new_v5(&SESSION_NAMESPACE, canonical.as_bytes()))
    }

    pub fn city(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.city.as_str())
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().map(Location::coordinates)
    }
}

/// Raw user input for a new session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub city: Option<String>,
}

impl SessionRequest {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

/// Errors from session creation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid date: {0}")]
    InvalidDate(#[from] DateError),

    #[error("Could not locate \"{0}\". Please try a major city.")]
    CityNotFound(String),

    #[error("Error connecting to geocoding service: {0}")]
    Geocoding(FetchError),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),
}

/// Validate a request and geocode its city.
///
/// A blank city yields a session without a location. Geocoding failures are
/// surfaced: there is no sensible fallback coordinate for a named city.
pub async fn resolve_session<F>(source: &F, request: &SessionRequest) -> Result<Session, SessionError>
where
    F: FactSource + ?Sized,
{
    let date = BirthDate::new(request.year, request.month, request.day)?;
    let session = Session::new(date);

    let Some(city) = request
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    else {
        return Ok(session);
    };

    tracing::debug!(city, "geocoding city");
    let coordinates = source
        .geocode(city)
        .await
        .map_err(SessionError::Geocoding)?
        .ok_or_else(|| SessionError::CityNotFound(city.to_string()))?;

    Ok(session.with_location(Location::new(city, coordinates.lat, coordinates.lon)))
}
