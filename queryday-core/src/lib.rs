//! Resumable birth-date fact cache.
//!
//! This crate provides:
//! - Session validation and geocoding
//! - A persisted, session-scoped record of lazily fetched fact groups
//! - Fault-tolerant fetch plans with deterministic fallbacks
//! - Quiz, fortune and dashboard helpers built on cached facts
//!
//! # Quick Start
//!
//! ```ignore
//! use queryday_core::{FactCache, FactGroupName, FileStore, QueryDayConfig, SessionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QueryDayConfig::from_env()?;
//!     let cache = FactCache::new(FileStore::new(&config.state_dir), config.build_almanac()?);
//!
//!     let request = SessionRequest::new(2001, 3, 15).with_city("Paris");
//!     let session = cache.establish_session(&request).await?;
//!
//!     let core = cache.ensure_core(&session).await?;
//!     println!("{}", core.book_fact);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod facts;
pub mod fortune;
pub mod persist;
pub mod quiz;
pub mod render;
pub mod session;
pub mod source;
pub mod store;
pub mod tasks;
pub mod testing;

// Primary public API
pub use cache::{CacheError, FactCache};
pub use config::{ConfigError, QueryDayConfig};
pub use facts::{CoreFacts, CultureFacts, FactGroup, FactGroupName, Facts, TechFacts};
pub use persist::{CacheRecord, STATE_KEY};
pub use session::{BirthDate, Location, Session, SessionError, SessionId, SessionRequest};
pub use source::{FactSource, FetchError};
pub use store::{FileStore, MemoryStore, RecordStore, StoreError};
pub use testing::{MockSource, TestHarness};
