#![cfg(feature = "sqlite-store")]

use chrono::{Duration, TimeZone, Utc};
use tempfile::tempdir;

use extcal_lib::{Account, Event, EventStore, Events, SqliteEventStore};

fn events(ids: &[&str]) -> Events {
    let start = Utc.with_ymd_and_hms(2022, 10, 17, 9, 0, 0).unwrap();
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let start = start + Duration::hours(i as i64);
            let mut event = Event::new(id, format!("Event {id}"), start);
            event.end = Some(event.start + Duration::minutes(30));
            event.location = Some("Room 1".into());
            event
        })
        .collect()
}

#[test]
fn test_sqlite_store() {
    env_logger::builder().is_test(true).try_init().ok();

    let dir = tempdir().unwrap();
    let store = SqliteEventStore::new(dir.path().join("nested").join("cache.sqlite")).unwrap();

    let alice = Account::new(1, 1, 1, "ical");
    let bob = Account::new(1, 2, 2, "ical");

    // insert

    store.insert_events(&alice, "a", &events(&["1", "2"])).unwrap();
    store.insert_events(&alice, "b", &events(&["3"])).unwrap();
    store.insert_events(&bob, "a", &events(&["4"])).unwrap();

    let cached = store.list_events(&alice, "a").unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0], events(&["1"])[0].clone().with_folder_id("a"));
    assert_eq!(cached[1].id, "2");

    // insert replaces events sharing the same id

    let mut updated = events(&["2"]);
    updated[0].summary = "Renamed".into();
    store.insert_events(&alice, "a", &updated).unwrap();
    let cached = store.list_events(&alice, "a").unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[1].summary, "Renamed");

    // replace

    store.replace_events(&alice, "a", &events(&["5"])).unwrap();
    let ids: Vec<String> = store
        .list_events(&alice, "a")
        .unwrap()
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(ids, vec!["5"]);

    // purge folder

    store.purge_folder(&alice, "b").unwrap();
    assert!(store.list_events(&alice, "b").unwrap().is_empty());

    // purge all only touches the given account

    store.purge_all(&alice).unwrap();
    assert!(store.list_events(&alice, "a").unwrap().is_empty());
    assert_eq!(store.list_events(&bob, "a").unwrap().len(), 1);
}
