//! SQLite position store integration tests against a temp database.

use chrono::{Duration as ChronoDuration, Utc};
use skysim_core::PositionFix;
use skysim_engine::persistence::{init_database, PositionStore, SqlitePositionStore};

async fn temp_store() -> SqlitePositionStore {
    let path = std::env::temp_dir()
        .join(format!("skysim-test-{}.db", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string();
    let db = init_database(&path, 1).await.expect("init db");
    SqlitePositionStore::new(db)
}

fn fix(lat: f64, lng: f64) -> PositionFix {
    PositionFix {
        lat,
        lng,
        heading: 180.0,
        altitude: 28_000.0,
        speed: 410.0,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn append_and_read_back_round_trip() {
    let store = temp_store().await;

    assert!(store.last_position("f-1").await.unwrap().is_none());

    store.append_position("f-1", &fix(19.1, 72.9), 100).await.unwrap();
    store.append_position("f-1", &fix(19.2, 73.0), 100).await.unwrap();

    let last = store.last_position("f-1").await.unwrap().unwrap();
    assert_eq!(last.lat, 19.2);

    let log = store.positions("f-1").await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].lat, 19.1);

    // Logs are per flight.
    assert!(store.positions("f-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn append_trims_to_cap_keeping_newest() {
    let store = temp_store().await;

    for i in 0..7 {
        store
            .append_position("f-1", &fix(10.0 + i as f64, 70.0), 4)
            .await
            .unwrap();
    }

    let log = store.positions("f-1").await.unwrap();
    assert_eq!(log.len(), 4);
    assert_eq!(log.first().unwrap().lat, 13.0);
    assert_eq!(log.last().unwrap().lat, 16.0);
}

#[tokio::test]
async fn positions_between_uses_inclusive_bounds() {
    let store = temp_store().await;
    let start = Utc::now();

    for i in 0..4i64 {
        let mut sample = fix(20.0 + i as f64, 70.0);
        sample.timestamp = start + ChronoDuration::seconds(i * 10);
        store.append_position("f-1", &sample, 100).await.unwrap();
    }

    let window = store
        .positions_between("f-1", start + ChronoDuration::seconds(10), start + ChronoDuration::seconds(20))
        .await
        .unwrap();
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].lat, 21.0);
    assert_eq!(window[1].lat, 22.0);
}

#[tokio::test]
async fn delete_older_than_sweeps_across_flights() {
    let store = temp_store().await;
    let now = Utc::now();

    let mut old = fix(10.0, 70.0);
    old.timestamp = now - ChronoDuration::days(10);
    store.append_position("f-1", &old, 100).await.unwrap();
    store.append_position("f-2", &old, 100).await.unwrap();
    store.append_position("f-1", &fix(11.0, 71.0), 100).await.unwrap();

    let deleted = store
        .delete_older_than(now - ChronoDuration::days(7))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    assert_eq!(store.positions("f-1").await.unwrap().len(), 1);
    assert!(store.positions("f-2").await.unwrap().is_empty());
}
