//! Subcommand handlers.

use almanac::Almanac;
use anyhow::{anyhow, Context, Result};
use queryday_core::facts::FactGroupName;
use queryday_core::fortune::draw_fortunes;
use queryday_core::render::{self, DashboardCard};
use queryday_core::{
    BirthDate, CacheError, FactCache, FileStore, QueryDayConfig, Session, SessionRequest,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const START_HINT: &str = "run `queryday start --date YYYY-MM-DD [--city NAME]` first";

pub struct App {
    cache: FactCache<FileStore, Almanac>,
}

impl App {
    pub fn open(state_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = QueryDayConfig::from_env().context("invalid configuration")?;
        if let Some(dir) = state_dir {
            config = config.with_state_dir(dir);
        }

        let almanac = config.build_almanac()?;
        tracing::debug!(state_dir = %config.state_dir.display(), "opening record store");

        Ok(Self {
            cache: FactCache::new(FileStore::new(config.state_dir), almanac),
        })
    }

    pub async fn start(&self, date: BirthDate, city: Option<String>) -> Result<()> {
        let mut request = SessionRequest::new(date.year(), date.month(), date.day());
        if let Some(city) = city {
            request = request.with_city(city);
        }

        let session = self.cache.establish_session(&request).await?;
        println!("Session started for {}", describe(&session));
        if let Some(coordinates) = session.coordinates() {
            println!("Coordinates: {:.4}, {:.4}", coordinates.lat, coordinates.lon);
        }
        Ok(())
    }

    pub async fn core(&self) -> Result<()> {
        let session = self.session().await?;
        let core = self.cache.ensure_core(&session).await?;
        print_page("Mission Control", &session, &render::core_cards(&core));
        Ok(())
    }

    pub async fn culture(&self) -> Result<()> {
        let session = self.session().await?;
        let culture = self.cache.ensure_culture(&session).await?;
        print_page("Culture", &session, &render::culture_cards(&culture));
        Ok(())
    }

    pub async fn tech(&self) -> Result<()> {
        let session = self.session().await?;
        let tech = self.cache.ensure_tech(&session).await?;
        print_page("Tech & World", &session, &render::tech_cards(&tech));
        Ok(())
    }

    pub async fn show(&self) -> Result<()> {
        let session = self.session().await?;
        let record = self.cache.snapshot(&session).await?;
        println!("{}", serde_json::to_string_pretty(&record)?);
        Ok(())
    }

    pub async fn quiz(&self, seed: Option<u64>) -> Result<()> {
        let session = self.session().await?;
        let core = self
            .cache
            .cached(FactGroupName::Core, &session)
            .await?
            .and_then(|group| group.as_core().cloned())
            .ok_or_else(|| {
                anyhow!("core facts not loaded; run `queryday core` first")
            })?;

        let mut rng = rng(seed);
        crate::quiz::run_interactive(&session, &core, &mut rng)
    }

    pub fn fortune(&self, count: usize, seed: Option<u64>) -> Result<()> {
        let mut rng = rng(seed);
        for (i, fortune) in draw_fortunes(count, &mut rng).iter().enumerate() {
            println!("{}. {fortune}", i + 1);
        }
        Ok(())
    }

    pub async fn share(&self) -> Result<()> {
        let session = self.session().await?;
        let core = self.cache.ensure_core(&session).await?;
        let year = session.date.year();

        println!("{}", render::impact_phrase(year, &core.events_data));
        println!("Artifact: {}", render::share_file_name(year));
        Ok(())
    }

    async fn session(&self) -> Result<Session> {
        match self.cache.active_session().await {
            Ok(session) => Ok(session),
            Err(CacheError::NoSession) => Err(anyhow!("no active session; {START_HINT}")),
            Err(e) => Err(e.into()),
        }
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn describe(session: &Session) -> String {
    match session.city() {
        Some(city) => format!("{} ({city})", session.date.us_format()),
        None => session.date.us_format(),
    }
}

fn print_page(title: &str, session: &Session, cards: &[DashboardCard]) {
    println!("=== {title} :: {} ===", describe(session));
    for card in cards {
        println!();
        println!("[{}]", card.title);
        println!("{}", card.body);
    }
}
