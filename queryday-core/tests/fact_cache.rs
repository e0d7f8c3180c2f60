//! Behavioural tests for the fact cache against a scripted source.
//!
//! Run with: `cargo test -p queryday-core --test fact_cache`

use queryday_core::facts::{FactGroup, FactGroupName};
use queryday_core::tasks::fallback;
use queryday_core::testing::{paris_session, MockSource, TestHarness};
use queryday_core::{BirthDate, CacheError, FetchError, Location, Session};

fn tokyo_1990() -> Session {
    let date = BirthDate::validate(1990, 7, 4, 2024).expect("valid date");
    Session::new(date).with_location(Location::new("Tokyo", 35.68, 139.69))
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn test_second_call_is_a_cache_hit() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001()).await;
    let session = paris_session();

    let first = harness
        .cache
        .ensure_group(FactGroupName::Core, &session)
        .await
        .expect("first ensure");
    let calls_after_first = harness.source.total_calls();
    let writes_after_first = harness.store.write_count();

    let second = harness
        .cache
        .ensure_group(FactGroupName::Core, &session)
        .await
        .expect("second ensure");

    assert_eq!(first, second);
    assert_eq!(calls_after_first, 4);
    assert_eq!(harness.source.total_calls(), calls_after_first);
    assert_eq!(harness.store.write_count(), writes_after_first);
}

// =============================================================================
// Completeness
// =============================================================================

#[tokio::test]
async fn test_every_sub_field_is_present() {
    for source in [MockSource::paris_2001(), MockSource::failing()] {
        let harness = TestHarness::with_paris_session(source).await;
        let session = paris_session();

        let core = harness.cache.ensure_core(&session).await.expect("core");
        assert!(!core.book_fact.is_empty());
        assert!(!core.number_fact.is_empty());
        assert!(!core.events_data.is_empty());
        assert_eq!(core.city.as_deref(), Some("Paris"));

        let culture = harness.cache.ensure_culture(&session).await.expect("culture");
        assert!(!culture.movie_data.title.is_empty());
        assert!(!culture.music_data.album.is_empty());

        let tech = harness.cache.ensure_tech(&session).await.expect("tech");
        assert!(!tech.pop_data.is_empty());
        assert!(!tech.science_data.is_empty());
    }
}

#[tokio::test]
async fn test_result_matches_durable_record() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001()).await;
    let session = paris_session();

    let tech = harness.cache.ensure_tech(&session).await.expect("tech");
    let record = harness.cache.snapshot(&session).await.expect("snapshot");

    assert_eq!(record.facts.tech, Some(tech));
    assert_eq!(
        tech_science(&record.facts.tech),
        "Nobel Prize in Physics: Awarded to Eric A. Cornell, Wolfgang Ketterle, Carl E. Wieman for their contribution to science."
    );
}

fn tech_science(tech: &Option<queryday_core::TechFacts>) -> &str {
    tech.as_ref().map(|t| t.science_data.as_str()).unwrap_or("")
}

// =============================================================================
// Isolation across groups
// =============================================================================

#[tokio::test]
async fn test_groups_do_not_disturb_each_other() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001()).await;
    let session = paris_session();

    let culture = harness.cache.ensure_culture(&session).await.expect("culture");
    harness.cache.ensure_core(&session).await.expect("core");

    let record = harness.cache.snapshot(&session).await.expect("snapshot");
    assert_eq!(record.facts.culture, Some(culture));
    assert!(record.facts.tech.is_none());
    assert_eq!(
        record.facts.present_groups(),
        vec![FactGroupName::Core, FactGroupName::Culture]
    );
}

// The yielding source suspends every fetch once, so both `ensure_group`
// calls read the record before either commits.

#[tokio::test]
async fn test_concurrent_groups_are_both_kept() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001().yielding()).await;
    let session = paris_session();

    let (core, tech) = tokio::join!(
        harness.cache.ensure_group(FactGroupName::Core, &session),
        harness.cache.ensure_group(FactGroupName::Tech, &session),
    );
    let core = core.expect("core");
    let tech = tech.expect("tech");

    let record = harness.cache.snapshot(&session).await.expect("snapshot");
    assert_eq!(
        record.facts.present_groups(),
        vec![FactGroupName::Core, FactGroupName::Tech]
    );
    assert_eq!(record.facts.get(FactGroupName::Core), Some(core));
    assert_eq!(record.facts.get(FactGroupName::Tech), Some(tech));
    // Session start plus one commit per group
    assert_eq!(harness.store.write_count(), 3);
}

#[tokio::test]
async fn test_concurrent_same_group_agrees() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001().yielding()).await;
    let session = paris_session();

    let (a, b) = tokio::join!(
        harness.cache.ensure_group(FactGroupName::Culture, &session),
        harness.cache.ensure_group(FactGroupName::Culture, &session),
    );
    let a = a.expect("first");
    let b = b.expect("second");

    // Both calls missed and fetched; only the first commit was written
    assert_eq!(harness.source.call_count("popular_movie"), 2);
    assert_eq!(harness.store.write_count(), 2);

    assert_eq!(a, b);
    let stored = harness
        .cache
        .cached(FactGroupName::Culture, &session)
        .await
        .expect("cached");
    assert_eq!(stored, Some(a));
}

#[tokio::test]
async fn test_session_replaced_mid_fetch_discards_result() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001().yielding()).await;
    let paris = paris_session();
    let tokyo = tokyo_1990();

    let (fetched, restarted) = tokio::join!(
        harness.cache.ensure_group(FactGroupName::Core, &paris),
        async {
            // Wait until the Paris fetch is in flight
            while harness.source.total_calls() == 0 {
                tokio::task::yield_now().await;
            }
            harness.cache.start_session(tokyo.clone()).await
        },
    );

    assert!(matches!(fetched, Err(CacheError::NoSession)));
    restarted.expect("start");

    let record = harness.cache.snapshot(&tokyo).await.expect("snapshot");
    assert!(record.facts.present_groups().is_empty());
    assert_eq!(harness.source.call_count("notable_book"), 1);
}

// =============================================================================
// Session reset
// =============================================================================

#[tokio::test]
async fn test_new_session_clears_all_groups() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001()).await;
    let paris = paris_session();
    harness.cache.ensure_core(&paris).await.expect("core");
    harness.cache.ensure_tech(&paris).await.expect("tech");
    assert_eq!(harness.source.call_count("notable_book"), 1);

    let tokyo = tokyo_1990();
    let record = harness
        .cache
        .start_session(tokyo.clone())
        .await
        .expect("start");
    assert!(record.facts.present_groups().is_empty());

    let core = harness.cache.ensure_core(&tokyo).await.expect("core");
    assert_eq!(harness.source.call_count("notable_book"), 2);
    assert_eq!(core.city.as_deref(), Some("Tokyo"));
    assert!(harness
        .cache
        .cached(FactGroupName::Tech, &tokyo)
        .await
        .expect("cached")
        .is_none());

    // The old session is gone
    assert!(matches!(
        harness.cache.ensure_core(&paris).await,
        Err(CacheError::NoSession)
    ));
}

#[tokio::test]
async fn test_restarting_same_session_is_still_a_reset() {
    let harness = TestHarness::with_paris_session(MockSource::paris_2001()).await;
    let session = paris_session();
    harness.cache.ensure_core(&session).await.expect("core");

    harness
        .cache
        .start_session(session.clone())
        .await
        .expect("restart");
    harness.cache.ensure_core(&session).await.expect("core");

    assert_eq!(harness.source.call_count("notable_book"), 2);
}

#[tokio::test]
async fn test_missing_session_is_reported() {
    let harness = TestHarness::new(MockSource::paris_2001());
    for group in FactGroupName::ALL {
        assert!(matches!(
            harness.cache.ensure_group(group, &paris_session()).await,
            Err(CacheError::NoSession)
        ));
    }
    assert_eq!(harness.source.total_calls(), 0);
}

// =============================================================================
// Fallback determinism
// =============================================================================

#[tokio::test]
async fn test_failing_source_gives_identical_fallbacks() {
    let mut results = Vec::new();
    for _ in 0..2 {
        let harness = TestHarness::with_paris_session(MockSource::failing()).await;
        let session = paris_session();
        let mut groups = Vec::new();
        for group in FactGroupName::ALL {
            groups.push(
                harness
                    .cache
                    .ensure_group(group, &session)
                    .await
                    .expect("fallbacks never fail"),
            );
        }
        results.push(groups);
    }

    assert_eq!(results[0], results[1]);
    match &results[0][0] {
        FactGroup::Core(core) => {
            assert_eq!(core.book_fact, fallback::book_fact(2001));
            assert_eq!(core.number_fact, fallback::number_fact(2001));
            assert!(core.weather_data.is_none());
            assert_eq!(core.events_data, fallback::events());
        }
        other => panic!("expected core, got {:?}", other.name()),
    }
}

// =============================================================================
// Paris, 2001-03-15 with a failing movie service
// =============================================================================

#[tokio::test]
async fn test_paris_scenario_with_failing_movie_service() {
    let source = MockSource::paris_2001()
        .with_movie(Err(FetchError::Status(503)));
    let harness = TestHarness::with_paris_session(source).await;
    let session = paris_session();

    let core = harness.cache.ensure_core(&session).await.expect("core");
    assert_eq!(
        core.book_fact,
        "The most notable book of this year was 'Life of Pi' by Yann Martel."
    );
    assert_eq!(
        core.number_fact,
        "The number 2001 is tied to the publication of 5120 notable cultural records."
    );
    assert!(core.weather_data.is_some());
    assert_eq!(core.events_data.len(), 2);
    assert_eq!(harness.source.call_count("popular_movie"), 0);

    let culture = harness.cache.ensure_culture(&session).await.expect("culture");
    assert_eq!(culture.movie_data.title, "Cinema of 2001");
    assert_eq!(culture.movie_data, fallback::movie(2001));
    assert_eq!(culture.music_data.album, "Discovery");
    assert_eq!(culture.music_data.artist, "Daft Punk");
    assert_eq!(harness.source.call_count("popular_movie"), 1);
}
