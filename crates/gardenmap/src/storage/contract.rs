//! Behaviour every `RecordStore` backend must share.
//!
//! Each check takes a freshly opened, empty store. Backends run the whole
//! suite through [`record_store_contract_tests!`].

use std::thread;

use gardenmap_core::record::{PlantList, Record, RecordId};
use gardenmap_core::storage::RecordStore;
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    Record::try_from(value).expect("test records are objects")
}

fn records(value: Value) -> Vec<Record> {
    serde_json::from_value(value).expect("test records are objects")
}

pub fn empty_store_lists_nothing(store: &dyn RecordStore) {
    assert!(store.list_all().unwrap().is_empty());
    assert_eq!(
        serde_json::to_value(store.list_wrapped().unwrap()).unwrap(),
        json!({"plantlist": []})
    );
}

pub fn append_preserves_order(store: &dyn RecordStore) {
    let first = records(json!([{"id": "b"}, {"id": "a"}]));
    let second = records(json!([{"id": 3, "plant_id": "b", "x": 1.0, "y": 2.0}, {"name": "no id"}]));

    store.append(&first).unwrap();
    store.append(&second).unwrap();

    let expected: Vec<Record> = first.into_iter().chain(second).collect();
    assert_eq!(store.list_all().unwrap(), expected);
}

pub fn append_allows_duplicate_ids(store: &dyn RecordStore) {
    store
        .append(&records(json!([{"id": "rose", "v": 1}, {"id": "rose", "v": 2}])))
        .unwrap();

    assert_eq!(store.list_all().unwrap().len(), 2);
}

pub fn upsert_one_overwrites_in_place(store: &dyn RecordStore) {
    store
        .append(&records(json!([
            {"id": "a", "v": 1},
            {"id": "b", "v": 2, "keep": true},
            {"id": "c", "v": 3},
            {"id": "b", "v": 4}
        ])))
        .unwrap();

    store.upsert_one(&record(json!({"id": "b", "w": 9}))).unwrap();

    assert_eq!(
        store.list_all().unwrap(),
        records(json!([
            {"id": "a", "v": 1},
            {"id": "b", "w": 9},
            {"id": "c", "v": 3},
            {"id": "b", "v": 4}
        ]))
    );
}

pub fn upsert_one_appends_when_missing(store: &dyn RecordStore) {
    store.append(&records(json!([{"id": "a"}]))).unwrap();
    let incoming = record(json!({"id": "z", "type": "tree"}));

    store.upsert_one(&incoming).unwrap();

    let list = store.list_all().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.last(), Some(&incoming));
}

pub fn upsert_many_merges_fields(store: &dyn RecordStore) {
    store
        .append(&records(json!([
            {"id": 1, "plant_id": "rose", "x": 1.0, "y": 1.0},
            {"id": 2, "plant_id": "tulip", "x": 5.0, "y": 5.0}
        ])))
        .unwrap();

    store
        .upsert_many(&records(json!([
            {"id": 2, "x": 6.5},
            {"id": 3, "plant_id": "fern", "x": 0.0, "y": 0.0},
            {"id": 1, "y": 2.0, "note": "moved"}
        ])))
        .unwrap();

    assert_eq!(
        store.list_all().unwrap(),
        records(json!([
            {"id": 1, "plant_id": "rose", "x": 1.0, "y": 2.0, "note": "moved"},
            {"id": 2, "plant_id": "tulip", "x": 6.5, "y": 5.0},
            {"id": 3, "plant_id": "fern", "x": 0.0, "y": 0.0}
        ]))
    );
}

pub fn delete_removes_all_and_only_matching(store: &dyn RecordStore) {
    store
        .append(&records(json!([
            {"id": "a"},
            {"id": 1},
            {"name": "no id"},
            {"id": "a", "dup": true},
            {"id": "1"},
            {"id": "b"}
        ])))
        .unwrap();

    store
        .delete_by_ids(&[RecordId::from("a"), RecordId::from(1), RecordId::from("zz")])
        .unwrap();

    assert_eq!(
        store.list_all().unwrap(),
        records(json!([{"name": "no id"}, {"id": "1"}, {"id": "b"}]))
    );
}

pub fn delete_with_no_ids_is_noop(store: &dyn RecordStore) {
    store.append(&records(json!([{"id": "a"}, {"id": "b"}]))).unwrap();
    let before = store.list_all().unwrap();

    store.delete_by_ids(&[]).unwrap();

    assert_eq!(store.list_all().unwrap(), before);
}

pub fn delete_unknown_ids_is_noop(store: &dyn RecordStore) {
    store.append(&records(json!([{"id": "a"}]))).unwrap();

    store.delete_by_ids(&[RecordId::from("missing")]).unwrap();

    assert_eq!(store.list_all().unwrap(), records(json!([{"id": "a"}])));
}

pub fn delete_many_ids_in_one_call(store: &dyn RecordStore) {
    store
        .append(&records(json!([{"id": 0}, {"id": "keep"}, {"id": 39_999}, {"id": 40_000}])))
        .unwrap();

    let ids: Vec<RecordId> = (0..40_000).map(RecordId::from).collect();
    store.delete_by_ids(&ids).unwrap();

    assert_eq!(
        store.list_all().unwrap(),
        records(json!([{"id": "keep"}, {"id": 40_000}]))
    );
}

pub fn wrapped_view_round_trips(store: &dyn RecordStore) {
    let original = records(json!([
        {
            "id": "rose",
            "name": "Rosa",
            "bloom_start": 6,
            "scale": 1.25,
            "soil": ["loam", "clay"],
            "vegetation": {"height": {"1": 10.0, "6": 120.5}, "icon": {"6": "/icons/rose.svg"}},
            "notes": null
        },
        {"id": 7, "plant_id": "rose", "x": -3.5, "y": 1e3}
    ]));
    store.append(&original).unwrap();

    let text = serde_json::to_string(&store.list_wrapped().unwrap()).unwrap();
    let decoded: PlantList = serde_json::from_str(&text).unwrap();

    assert_eq!(decoded.plantlist, original);
}

pub fn concurrent_appends_keep_every_record(store: &dyn RecordStore) {
    const THREADS: i64 = 8;
    const PER_THREAD: i64 = 5;

    thread::scope(|s| {
        for t in 0..THREADS {
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    store
                        .append(&[record(json!({"id": t * 100 + i}))])
                        .unwrap();
                }
            });
        }
    });

    let mut ids: Vec<i64> = store
        .list_all()
        .unwrap()
        .iter()
        .map(|r| r.get("id").and_then(Value::as_i64).unwrap())
        .collect();
    ids.sort_unstable();

    let mut expected: Vec<i64> = (0..THREADS)
        .flat_map(|t| (0..PER_THREAD).map(move |i| t * 100 + i))
        .collect();
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

pub fn two_concurrent_appends(store: &dyn RecordStore) {
    thread::scope(|s| {
        s.spawn(|| store.append(&[record(json!({"id": "left"}))]).unwrap());
        s.spawn(|| store.append(&[record(json!({"id": "right"}))]).unwrap());
    });

    let list = store.list_all().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.contains(&record(json!({"id": "left"}))));
    assert!(list.contains(&record(json!({"id": "right"}))));
}

pub fn rose_lifecycle(store: &dyn RecordStore) {
    store
        .append(&[record(json!({"id": "rose", "type": "shrub"}))])
        .unwrap();
    assert_eq!(
        store.list_all().unwrap(),
        vec![record(json!({"id": "rose", "type": "shrub"}))]
    );

    store
        .upsert_one(&record(json!({"id": "rose", "type": "tree"})))
        .unwrap();
    assert_eq!(
        store.list_all().unwrap(),
        vec![record(json!({"id": "rose", "type": "tree"}))]
    );

    store.delete_by_ids(&[RecordId::from("rose")]).unwrap();
    assert!(store.list_all().unwrap().is_empty());
}

/// Expands to one `#[test]` per contract check.
///
/// `$fresh` must return `(guard, store)` where `guard` keeps the backing
/// resource alive for the duration of the test.
macro_rules! record_store_contract_tests {
    ($fresh:path) => {
        $crate::storage::contract::record_store_contract_tests!(
            @tests $fresh;
            contract_empty_store_lists_nothing => empty_store_lists_nothing,
            contract_append_preserves_order => append_preserves_order,
            contract_append_allows_duplicate_ids => append_allows_duplicate_ids,
            contract_upsert_one_overwrites_in_place => upsert_one_overwrites_in_place,
            contract_upsert_one_appends_when_missing => upsert_one_appends_when_missing,
            contract_upsert_many_merges_fields => upsert_many_merges_fields,
            contract_delete_removes_all_and_only_matching => delete_removes_all_and_only_matching,
            contract_delete_with_no_ids_is_noop => delete_with_no_ids_is_noop,
            contract_delete_unknown_ids_is_noop => delete_unknown_ids_is_noop,
            contract_delete_many_ids_in_one_call => delete_many_ids_in_one_call,
            contract_wrapped_view_round_trips => wrapped_view_round_trips,
            contract_concurrent_appends_keep_every_record => concurrent_appends_keep_every_record,
            contract_two_concurrent_appends => two_concurrent_appends,
            contract_rose_lifecycle => rose_lifecycle,
        );
    };
    (@tests $fresh:path; $($name:ident => $check:ident),* $(,)?) => {
        $(
            #[test]
            fn $name() {
                let (_guard, store) = $fresh();
                $crate::storage::contract::$check(&store);
            }
        )*
    };
}

pub(crate) use record_store_contract_tests;
