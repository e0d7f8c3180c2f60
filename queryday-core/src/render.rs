//! Text shaping for dashboards and the share artifact.

use crate::facts::{CoreFacts, CultureFacts, EventFact, TechFacts, WeatherSnapshot};

const SHORT_EVENT_CHARS: usize = 100;

/// Group digits in threes with commas (`6228000000` -> `6,228,000,000`).
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn weather_summary(weather: Option<&WeatherSnapshot>) -> String {
    match weather {
        Some(w) => format!(
            "Max Temp: {}°C\nMin Temp: {}°C\nPrecipitation: {}mm",
            w.max_temp, w.min_temp, w.precip
        ),
        None => "Atmospheric data unavailable for this coordinate/date.".to_string(),
    }
}

pub fn headline_event(events: &[EventFact]) -> &str {
    events
        .first()
        .map(|e| e.text.as_str())
        .unwrap_or("No historical events found in the archives.")
}

/// `YEAR {year}: {event}`, preferring the first reasonably short event.
pub fn impact_phrase(year: i32, events: &[EventFact]) -> String {
    let text = events
        .iter()
        .find(|e| e.text.chars().count() < SHORT_EVENT_CHARS)
        .or_else(|| events.first())
        .map(|e| e.text.as_str())
        .unwrap_or("A quiet day in history.");
    format!("YEAR {year}: {text}")
}

pub fn share_file_name(year: i32) -> String {
    format!("chrono-artifact-{year}.png")
}

/// One titled block of dashboard text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCard {
    pub title: String,
    pub body: String,
}

impl DashboardCard {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

pub fn core_cards(core: &CoreFacts) -> Vec<DashboardCard> {
    let weather_title = match &core.city {
        Some(city) => format!("Historical Weather ({city})"),
        None => "Historical Weather".to_string(),
    };

    vec![
        DashboardCard::new("Book of the Year", core.book_fact.as_str()),
        DashboardCard::new("Number Fact", core.number_fact.as_str()),
        DashboardCard::new(weather_title, weather_summary(core.weather_data.as_ref())),
        DashboardCard::new("On This Day", headline_event(&core.events_data)),
    ]
}

pub fn culture_cards(culture: &CultureFacts) -> Vec<DashboardCard> {
    let movie = &culture.movie_data;
    let mut movie_body = format!("{}\n{}", movie.title, movie.overview);
    if let Some(poster) = &movie.poster {
        movie_body.push_str(&format!("\nPoster: {poster}"));
    }

    vec![
        DashboardCard::new("Cinema", movie_body),
        DashboardCard::new(
            "Music",
            format!(
                "Top Release: {} by {}",
                culture.music_data.album, culture.music_data.artist
            ),
        ),
    ]
}

pub fn tech_cards(tech: &TechFacts) -> Vec<DashboardCard> {
    vec![
        DashboardCard::new(
            "World",
            format!("Estimated World Population: {}", tech.pop_data),
        ),
        DashboardCard::new("Science", tech.science_data.as_str()),
    ]
}
