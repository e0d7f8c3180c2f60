//! Fact groups and their sub-fields.
//!
//! Field names serialize in camelCase so the persisted record keeps the
//! `bookFact` / `movieData` / `popData` shape presentation code expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The statically known fact groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactGroupName {
    /// Book fact, number fact, weather, historical events.
    Core,
    /// Film and music.
    Culture,
    /// Population and science.
    Tech,
}

impl FactGroupName {
    pub const ALL: [FactGroupName; 3] = [Self::Core, Self::Culture, Self::Tech];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Culture => "culture",
            Self::Tech => "tech",
        }
    }

    /// Sub-fields fetched for this group, in record order.
    pub fn sub_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Core => &["bookFact", "numberFact", "weatherData", "eventsData"],
            Self::Culture => &["movieData", "musicData"],
            Self::Tech => &["popData", "scienceData"],
        }
    }
}

impl fmt::Display for FactGroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown fact group: {0}")]
pub struct UnknownGroup(pub String);

impl FromStr for FactGroupName {
    type Err = UnknownGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(Self::Core),
            "culture" => Ok(Self::Culture),
            "tech" => Ok(Self::Tech),
            other => Err(UnknownGroup(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreFacts {
    pub book_fact: String,
    pub number_fact: String,
    /// `None` when the archive had no data for the date or place.
    pub weather_data: Option<WeatherSnapshot>,
    pub events_data: Vec<EventFact>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub max_temp: f64,
    pub min_temp: f64,
    pub precip: f64,
}

impl From<almanac::DailyWeather> for WeatherSnapshot {
    fn from(weather: almanac::DailyWeather) -> Self {
        Self {
            max_temp: weather.max_temp,
            min_temp: weather.min_temp,
            precip: weather.precipitation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFact {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl EventFact {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            year: None,
        }
    }
}

impl From<almanac::HistoricalEvent> for EventFact {
    fn from(event: almanac::HistoricalEvent) -> Self {
        Self {
            text: event.text,
            year: event.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CultureFacts {
    pub movie_data: MovieFact,
    pub music_data: MusicFact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieFact {
    pub title: String,
    pub overview: String,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicFact {
    pub album: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechFacts {
    pub pop_data: String,
    pub science_data: String,
}

/// A fully populated fact group.
#[derive(Debug, Clone, PartialEq)]
pub enum FactGroup {
    Core(CoreFacts),
    Culture(CultureFacts),
    Tech(TechFacts),
}

impl FactGroup {
    pub fn name(&self) -> FactGroupName {
        match self {
            Self::Core(_) => FactGroupName::Core,
            Self::Culture(_) => FactGroupName::Culture,
            Self::Tech(_) => FactGroupName::Tech,
        }
    }

    pub fn as_core(&self) -> Option<&CoreFacts> {
        match self {
            Self::Core(core) => Some(core),
            _ => None,
        }
    }

    pub fn as_culture(&self) -> Option<&CultureFacts> {
        match self {
            Self::Culture(culture) => Some(culture),
            _ => None,
        }
    }

    pub fn as_tech(&self) -> Option<&TechFacts> {
        match self {
            Self::Tech(tech) => Some(tech),
            _ => None,
        }
    }
}

/// The per-group slots of a cache record. `None` means absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facts {
    pub core: Option<CoreFacts>,
    pub culture: Option<CultureFacts>,
    pub tech: Option<TechFacts>,
}

impl Facts {
    pub fn get(&self, name: FactGroupName) -> Option<FactGroup> {
        match name {
            FactGroupName::Core => self.core.clone().map(FactGroup::Core),
            FactGroupName::Culture => self.culture.clone().map(FactGroup::Culture),
            FactGroupName::Tech => self.tech.clone().map(FactGroup::Tech),
        }
    }

    pub fn is_present(&self, name: FactGroupName) -> bool {
        match name {
            FactGroupName::Core => self.core.is_some(),
            FactGroupName::Culture => self.culture.is_some(),
            FactGroupName::Tech => self.tech.is_some(),
        }
    }

    /// Fill the slot matching the group, leaving the others untouched.
    pub fn insert(&mut self, group: FactGroup) {
        match group {
            FactGroup::Core(core) => self.core = Some(core),
            FactGroup::Culture(culture) => self.culture = Some(culture),
            FactGroup::Tech(tech) => self.tech = Some(tech),
        }
    }

    pub fn present_groups(&self) -> Vec<FactGroupName> {
        FactGroupName::ALL
            .into_iter()
            .filter(|name| self.is_present(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tech() -> TechFacts {
        TechFacts {
            pop_data: "6,228,000,000".to_string(),
            science_data: "Nobel Prize in Physics".to_string(),
        }
    }

    #[test]
    fn test_group_name_parse() {
        assert_eq!("core".parse::<FactGroupName>(), Ok(FactGroupName::Core));
        assert_eq!(" Culture ".parse::<FactGroupName>(), Ok(FactGroupName::Culture));
        assert_eq!(
            "weather".parse::<FactGroupName>(),
            Err(UnknownGroup("weather".to_string()))
        );
    }

    #[test]
    fn test_insert_leaves_siblings_untouched() {
        let mut facts = Facts::default();
        facts.insert(FactGroup::Tech(sample_tech()));

        assert!(facts.is_present(FactGroupName::Tech));
        assert!(!facts.is_present(FactGroupName::Core));
        assert!(!facts.is_present(FactGroupName::Culture));
        assert_eq!(facts.present_groups(), vec![FactGroupName::Tech]);
        assert_eq!(
            facts.get(FactGroupName::Tech),
            Some(FactGroup::Tech(sample_tech()))
        );
    }

    #[test]
    fn test_record_shape_is_camel_case() {
        let core = CoreFacts {
            book_fact: "book".to_string(),
            number_fact: "number".to_string(),
            weather_data: Some(WeatherSnapshot {
                max_temp: 12.4,
                min_temp: 4.1,
                precip: 0.0,
            }),
            events_data: vec![EventFact::new("Something happened")],
            city: Some("Paris".to_string()),
        };
        let facts = Facts {
            core: Some(core),
            ..Facts::default()
        };

        let value = serde_json::to_value(&facts).unwrap();
        assert_eq!(value["core"]["bookFact"], "book");
        assert_eq!(value["core"]["weatherData"]["maxTemp"], 12.4);
        assert_eq!(value["core"]["eventsData"][0]["text"], "Something happened");
        assert!(value["core"]["eventsData"][0].get("year").is_none());
        assert!(value["culture"].is_null());
        assert!(value["tech"].is_null());
    }
}
